//! Color representation and per-format native pixel conversions.
use embedded_graphics_core::pixelcolor::{BinaryColor, Rgb565, RgbColor};

/// Straight (non-premultiplied) 8-bit RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const TRANSPARENT_BLACK: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn alpha_f(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Per-channel interpolation at `t` (0 = self, 1 = `end`), truncating.
    #[must_use]
    pub fn lerp(self, end: Color, t: f32) -> Color {
        let ch = |s: u8, e: u8| set_c(s as f32 + t * (e as f32 - s as f32));
        Color::rgba(ch(self.r, end.r), ch(self.g, end.g), ch(self.b, end.b), ch(self.a, end.a))
    }

    /// Blend `src` over `self`.
    ///
    /// With `coverage < 1` the source intensity is scaled by the coverage and the coverage
    /// replaces the source alpha, so partially covered pixels fade into the existing content.
    #[must_use]
    pub fn alpha_blend(self, src: Color, coverage: f32) -> Color {
        let mut src = src;
        if coverage < 1.0 {
            src.r = set_c(src.r as f32 * coverage);
            src.g = set_c(src.g as f32 * coverage);
            src.b = set_c(src.b as f32 * coverage);
            src.a = set_c(coverage * 255.0);
        }
        let keep = 1.0 - src.alpha_f();
        let ch = |s: u8, d: u8| set_c(s as f32 + keep * d as f32);
        Color::rgba(ch(src.r, self.r), ch(src.g, self.g), ch(src.b, self.b), ch(src.a, self.a))
    }
}

/// Clamp to a channel value, truncating the fraction.
pub(crate) fn set_c(value: f32) -> u8 {
    if value > 255.0 {
        255
    } else if value < 0.0 {
        0
    } else {
        value as u8
    }
}

/// `(fg * a + bg * (255 - a) + 127) / 255`, the rounding blend used by every backend.
#[inline(always)]
pub(crate) fn blend_channel(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((fg as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8
}

/// A backend's native pixel value.
pub trait NativePixel: Copy + PartialEq + core::fmt::Debug {
    fn from_color(color: Color) -> Self;
    fn to_color(self) -> Color;
}

/// Packed 32-bit RGBA, byte order `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba(pub [u8; 4]);

impl NativePixel for Rgba {
    fn from_color(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }

    fn to_color(self) -> Color {
        let [r, g, b, a] = self.0;
        Color::rgba(r, g, b, a)
    }
}

impl NativePixel for Rgb565 {
    /// Truncates to 5/6/5 bits; alpha is dropped.
    fn from_color(c: Color) -> Self {
        Rgb565::new(c.r >> 3, c.g >> 2, c.b >> 3)
    }

    /// Expands by bit replication so full intensity maps back to 255.
    fn to_color(self) -> Color {
        let (r, g, b) = (self.r(), self.g(), self.b());
        Color::rgb((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

impl NativePixel for BinaryColor {
    fn from_color(c: Color) -> Self {
        if c == Color::WHITE {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    fn to_color(self) -> Color {
        if self.is_on() {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

/// Blend two 565 pixels channel by channel in their native bit depths.
pub(crate) fn blend_565(fg: Rgb565, bg: Rgb565, alpha: u8) -> Rgb565 {
    match alpha {
        255 => fg,
        0 => bg,
        a => Rgb565::new(
            blend_channel(fg.r(), bg.r(), a),
            blend_channel(fg.g(), bg.g(), a),
            blend_channel(fg.b(), bg.b(), a),
        ),
    }
}
