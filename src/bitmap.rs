//! Pixel storage: borrowed surface views, owned bitmaps and blit paint modes.
//!
//! Layouts:
//! - `Rgba8888`: 4 bytes per pixel, `[r, g, b, a]`.
//! - `Rgb565`: little-endian `u16` per pixel.
//! - `Mono1`: 1 bit per pixel, MSB first, set bit = lit.
//!
//! Pixel accessors do not clip. Every caller in this crate clips against `bounds()` first;
//! an out-of-range coordinate panics on the slice index.

use core::fmt;

use embedded_graphics_core::pixelcolor::raw::RawU16;
use embedded_graphics_core::pixelcolor::{BinaryColor, IntoStorage, Rgb565};

use crate::color::{Color, NativePixel, Rgba};
use crate::error::{GraphicsError, Result};
use crate::geometry::{clip_blit, Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8888,
    Rgb565,
    Mono1,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 32,
            PixelFormat::Rgb565 => 16,
            PixelFormat::Mono1 => 1,
        }
    }

    /// Bytes needed for one row of `width` pixels.
    pub const fn min_stride(self, width: i32) -> usize {
        let w = if width < 0 { 0 } else { width as usize };
        (w * self.bits_per_pixel() + 7) / 8
    }

    pub const fn is_monochrome(self) -> bool {
        matches!(self, PixelFormat::Mono1)
    }
}

/// A view over raw pixel memory.
///
/// `B` is the backing buffer: `&[u8]` for reading ([`SurfaceRef`]), `&mut [u8]` for drawing
/// ([`SurfaceMut`]), `Vec<u8>` inside a [`Bitmap`].
#[derive(Clone)]
pub struct PixelSurface<B> {
    data: B,
    width: i32,
    height: i32,
    stride: usize,
    format: PixelFormat,
}

pub type SurfaceRef<'a> = PixelSurface<&'a [u8]>;
pub type SurfaceMut<'a> = PixelSurface<&'a mut [u8]>;

impl<B> fmt::Debug for PixelSurface<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl<B: AsRef<[u8]>> PixelSurface<B> {
    pub fn new(data: B, width: i32, height: i32, stride: usize, format: PixelFormat) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(GraphicsError::InvalidSurface(format!("negative size {width}x{height}")));
        }
        if stride < format.min_stride(width) {
            return Err(GraphicsError::InvalidSurface(format!(
                "stride {stride} too small for {width} px of {format:?}"
            )));
        }
        let needed = stride * height as usize;
        let len = data.as_ref().len();
        if len < needed {
            return Err(GraphicsError::InvalidSurface(format!("buffer holds {len} bytes, need {needed}")));
        }
        Ok(Self { data, width, height, stride, format })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn view(&self) -> SurfaceRef<'_> {
        PixelSurface {
            data: self.data.as_ref(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    #[inline(always)]
    fn offset(&self, x: i32, y: i32, bytes_pp: usize) -> usize {
        y as usize * self.stride + x as usize * bytes_pp
    }

    #[inline]
    pub fn rgba_at(&self, x: i32, y: i32) -> Rgba {
        let o = self.offset(x, y, 4);
        let d = self.data.as_ref();
        Rgba([d[o], d[o + 1], d[o + 2], d[o + 3]])
    }

    #[inline]
    pub fn rgb565_at(&self, x: i32, y: i32) -> Rgb565 {
        let o = self.offset(x, y, 2);
        let d = self.data.as_ref();
        Rgb565::from(RawU16::new(u16::from_le_bytes([d[o], d[o + 1]])))
    }

    #[inline]
    pub fn bit_at(&self, x: i32, y: i32) -> bool {
        let o = y as usize * self.stride + (x as usize >> 3);
        self.data.as_ref()[o] & (0x80 >> (x & 7)) != 0
    }

    /// Format-independent read, for inspection and replay. Not for pixel loops.
    pub fn color_at(&self, x: i32, y: i32) -> Color {
        match self.format {
            PixelFormat::Rgba8888 => self.rgba_at(x, y).to_color(),
            PixelFormat::Rgb565 => self.rgb565_at(x, y).to_color(),
            PixelFormat::Mono1 => {
                if self.bit_at(x, y) {
                    BinaryColor::On.to_color()
                } else {
                    BinaryColor::Off.to_color()
                }
            }
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PixelSurface<B> {
    pub fn view_mut(&mut self) -> SurfaceMut<'_> {
        PixelSurface {
            data: self.data.as_mut(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    /// The bytes of `[x0, x1)` on row `y`.
    #[inline]
    pub(crate) fn span_mut(&mut self, y: i32, x0: i32, x1: i32) -> &mut [u8] {
        let bpp = self.format.bits_per_pixel() / 8;
        let start = self.offset(x0, y, bpp);
        let end = self.offset(x1, y, bpp);
        &mut self.data.as_mut()[start..end]
    }

    #[inline]
    pub fn set_rgba(&mut self, x: i32, y: i32, px: Rgba) {
        let o = self.offset(x, y, 4);
        self.data.as_mut()[o..o + 4].copy_from_slice(&px.0);
    }

    #[inline]
    pub fn set_rgb565(&mut self, x: i32, y: i32, px: Rgb565) {
        let o = self.offset(x, y, 2);
        self.data.as_mut()[o..o + 2].copy_from_slice(&px.into_storage().to_le_bytes());
    }

    #[inline]
    pub fn set_bit(&mut self, x: i32, y: i32, lit: bool) {
        let o = y as usize * self.stride + (x as usize >> 3);
        let mask = 0x80u8 >> (x & 7);
        let byte = &mut self.data.as_mut()[o];
        if lit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Move the pixels inside `rect` by `delta`. Pixels shifted out of `rect` are dropped;
    /// the exposed strip keeps its old content.
    pub fn scroll_rect(&mut self, rect: Rect, delta: Point) {
        let mut area = rect;
        if !area.bound(self.bounds()) {
            return;
        }
        let dst = area.offset(delta).intersect(area);
        if dst.is_empty() || delta == Point::ZERO {
            return;
        }
        let src = dst.offset(-delta);

        // Walk against the direction of motion so no row or pixel is read after it was
        // overwritten.
        let (w, h) = (dst.width(), dst.height());
        let row_at = |i: i32| if delta.y > 0 { h - 1 - i } else { i };
        if self.format == PixelFormat::Mono1 {
            let col_at = |i: i32| if delta.x > 0 { w - 1 - i } else { i };
            for i in 0..h {
                let row = row_at(i);
                for j in 0..w {
                    let col = col_at(j);
                    let lit = self.bit_at(src.left + col, src.top + row);
                    self.set_bit(dst.left + col, dst.top + row, lit);
                }
            }
            return;
        }
        let bpp = self.format.bits_per_pixel() / 8;
        let len = w as usize * bpp;
        for i in 0..h {
            let row = row_at(i);
            let from = self.offset(src.left, src.top + row, bpp);
            let to = self.offset(dst.left, dst.top + row, bpp);
            self.data.as_mut().copy_within(from..from + len, to);
        }
    }

    /// Copy `src_rect` of `src` to `dst`, clipped to both surfaces. Formats must match.
    pub fn copy_rect_from(&mut self, src: &SurfaceRef<'_>, dst: Point, src_rect: Rect) -> Result<()> {
        if src.format != self.format {
            return Err(GraphicsError::FormatMismatch { expected: self.format, found: src.format });
        }
        let Some((dst, src_rect)) = clip_blit(dst, src_rect, src.bounds(), self.bounds()) else {
            return Ok(());
        };
        let (w, h) = (src_rect.width(), src_rect.height());
        if self.format == PixelFormat::Mono1 {
            for row in 0..h {
                for col in 0..w {
                    let lit = src.bit_at(src_rect.left + col, src_rect.top + row);
                    self.set_bit(dst.x + col, dst.y + row, lit);
                }
            }
            return Ok(());
        }
        let bpp = self.format.bits_per_pixel() / 8;
        let len = w as usize * bpp;
        for row in 0..h {
            let s = src.offset(src_rect.left, src_rect.top + row, bpp);
            let from = &src.data[s..s + len];
            self.span_mut(dst.y + row, dst.x, dst.x + w).copy_from_slice(from);
        }
        Ok(())
    }
}

/// Owned pixel storage with an "alpha channel in use" flag.
///
/// Only `Rgba8888` bitmaps carry alpha; the flag tells blitters whether to composite or copy.
#[derive(Clone, Debug)]
pub struct Bitmap {
    surface: PixelSurface<Vec<u8>>,
    alpha_used: bool,
}

impl Bitmap {
    /// Zero-filled bitmap with a tight stride. Negative sizes are treated as 0.
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let stride = format.min_stride(width);
        Self {
            surface: PixelSurface { data: vec![0; stride * height as usize], width, height, stride, format },
            alpha_used: false,
        }
    }

    /// Wrap existing pixel bytes (tight stride).
    pub fn from_data(width: i32, height: i32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let stride = format.min_stride(width);
        let surface = PixelSurface::new(data, width, height, stride, format)?;
        Ok(Self { surface, alpha_used: false })
    }

    /// Build from row-major colors, converting to `format`.
    ///
    /// An `Rgba8888` bitmap is marked alpha-bearing when any color is not opaque.
    pub fn from_colors(width: i32, height: i32, format: PixelFormat, colors: &[Color]) -> Result<Self> {
        let expected = width.max(0) as usize * height.max(0) as usize;
        if colors.len() != expected {
            return Err(GraphicsError::InvalidSurface(format!(
                "{} colors for a {width}x{height} bitmap",
                colors.len()
            )));
        }
        let mut bitmap = Bitmap::new(width, height, format);
        {
            let mut s = bitmap.access_for_write();
            for (i, c) in colors.iter().enumerate() {
                let (x, y) = ((i % width as usize) as i32, (i / width as usize) as i32);
                match format {
                    PixelFormat::Rgba8888 => s.set_rgba(x, y, Rgba::from_color(*c)),
                    PixelFormat::Rgb565 => s.set_rgb565(x, y, Rgb565::from_color(*c)),
                    PixelFormat::Mono1 => s.set_bit(x, y, BinaryColor::from_color(*c).is_on()),
                }
            }
        }
        bitmap.alpha_used = format == PixelFormat::Rgba8888 && colors.iter().any(|c| !c.is_opaque());
        Ok(bitmap)
    }

    pub fn width(&self) -> i32 {
        self.surface.width
    }

    pub fn height(&self) -> i32 {
        self.surface.height
    }

    pub fn size(&self) -> Rect {
        self.surface.bounds()
    }

    pub fn format(&self) -> PixelFormat {
        self.surface.format
    }

    pub fn is_alpha_channel_used(&self) -> bool {
        self.alpha_used
    }

    pub fn set_alpha_channel_used(&mut self, used: bool) {
        self.alpha_used = used;
    }

    pub fn access_for_read(&self) -> SurfaceRef<'_> {
        self.surface.view()
    }

    pub fn access_for_write(&mut self) -> SurfaceMut<'_> {
        self.surface.view_mut()
    }

    /// Bounds-checked read.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.size().contains(Point::new(x, y)).then(|| self.surface.color_at(x, y))
    }

    pub fn fill(&mut self, color: Color) {
        let (w, h) = (self.width(), self.height());
        let mut s = self.access_for_write();
        for y in 0..h {
            for x in 0..w {
                match s.format {
                    PixelFormat::Rgba8888 => s.set_rgba(x, y, Rgba::from_color(color)),
                    PixelFormat::Rgb565 => s.set_rgb565(x, y, Rgb565::from_color(color)),
                    PixelFormat::Mono1 => s.set_bit(x, y, BinaryColor::from_color(color).is_on()),
                }
            }
        }
    }

    /// Whole-buffer copy from a bitmap of identical size and format.
    pub fn copy_from(&mut self, other: &Bitmap) -> Result<()> {
        if other.format() != self.format() {
            return Err(GraphicsError::FormatMismatch { expected: self.format(), found: other.format() });
        }
        if other.size() != self.size() || other.surface.stride != self.surface.stride {
            return Err(GraphicsError::InvalidSurface(format!(
                "copy between {:?} and {:?}",
                other.surface, self.surface
            )));
        }
        self.surface.data.copy_from_slice(&other.surface.data);
        Ok(())
    }

    /// Copy the same `rect` from `other` into `self`.
    pub fn copy_rect_from(&mut self, other: &Bitmap, rect: Rect) -> Result<()> {
        let src = other.access_for_read();
        self.access_for_write().copy_rect_from(&src, rect.left_top(), rect)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PaintMode {
    /// Format-native alpha-over or copy.
    #[default]
    Normal,
    /// Source alpha used as a mask for a fixed color.
    Colored,
    /// Extra uniform alpha multiplied into the source.
    Blend,
}

/// Composition rule for a bitmap blit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitmapMode {
    pub paint_mode: PaintMode,
    pub color: Color,
    /// 0.0 ..= 1.0, used by `Blend`.
    pub alpha: f32,
}

impl BitmapMode {
    pub const NORMAL: BitmapMode = BitmapMode { paint_mode: PaintMode::Normal, color: Color::BLACK, alpha: 1.0 };

    pub const fn colored(color: Color) -> Self {
        Self { paint_mode: PaintMode::Colored, color, alpha: 1.0 }
    }

    pub fn blend(alpha: f32) -> Self {
        Self { paint_mode: PaintMode::Blend, color: Color::BLACK, alpha: alpha.clamp(0.0, 1.0) }
    }
}

impl Default for BitmapMode {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_rejects_short_buffer() {
        let mut buf = [0u8; 15];
        let err = PixelSurface::new(&mut buf[..], 2, 2, 8, PixelFormat::Rgba8888).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidSurface(_)));
    }

    #[test]
    fn surface_rejects_short_stride() {
        let buf = [0u8; 64];
        assert!(PixelSurface::new(&buf[..], 9, 2, 1, PixelFormat::Mono1).is_err());
        assert!(PixelSurface::new(&buf[..], 9, 2, 2, PixelFormat::Mono1).is_ok());
    }

    #[test]
    fn mono_bits_are_msb_first() {
        let mut b = Bitmap::new(10, 2, PixelFormat::Mono1);
        let mut s = b.access_for_write();
        s.set_bit(0, 0, true);
        s.set_bit(9, 1, true);
        assert_eq!(s.bytes(), &[0x80, 0x00, 0x00, 0x40]);
        s.set_bit(0, 0, false);
        assert!(!s.bit_at(0, 0));
        assert!(s.bit_at(9, 1));
    }

    #[test]
    fn rgb565_is_little_endian() {
        let mut b = Bitmap::new(1, 1, PixelFormat::Rgb565);
        b.access_for_write().set_rgb565(0, 0, Rgb565::new(31, 0, 0));
        assert_eq!(b.access_for_read().bytes(), &[0x00, 0xF8]);
    }

    #[test]
    fn from_colors_flags_alpha() {
        let opaque = Bitmap::from_colors(1, 1, PixelFormat::Rgba8888, &[Color::RED]).unwrap();
        assert!(!opaque.is_alpha_channel_used());
        let clear = Bitmap::from_colors(1, 1, PixelFormat::Rgba8888, &[Color::TRANSPARENT_BLACK]).unwrap();
        assert!(clear.is_alpha_channel_used());
        assert!(Bitmap::from_colors(2, 2, PixelFormat::Rgb565, &[Color::RED]).is_err());
    }

    #[test]
    fn copy_rect_clips_to_destination() {
        let src = Bitmap::from_colors(2, 2, PixelFormat::Rgb565, &[Color::WHITE; 4]).unwrap();
        let mut dst = Bitmap::new(3, 3, PixelFormat::Rgb565);
        dst.access_for_write()
            .copy_rect_from(&src.access_for_read(), Point::new(2, 2), src.size())
            .unwrap();
        assert_eq!(dst.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(dst.pixel(1, 1), Some(Color::BLACK));
        assert_eq!(dst.pixel(3, 3), None);
    }

    #[test]
    fn copy_from_requires_same_shape() {
        let a = Bitmap::new(2, 2, PixelFormat::Rgba8888);
        let mut b = Bitmap::new(3, 2, PixelFormat::Rgba8888);
        assert!(b.copy_from(&a).is_err());
        let mut c = Bitmap::new(2, 2, PixelFormat::Rgb565);
        assert!(matches!(c.copy_from(&a), Err(GraphicsError::FormatMismatch { .. })));
    }

    fn column(bm: &Bitmap, x: i32) -> Vec<Color> {
        (0..bm.height()).map(|y| bm.pixel(x, y).unwrap()).collect()
    }

    #[test]
    fn scroll_moves_overlapping_rows_both_ways() {
        let shades: Vec<Color> = (0..6u8).map(|i| Color::rgb(i * 40, 0, 0)).collect();
        let mut down = Bitmap::from_colors(1, 6, PixelFormat::Rgba8888, &shades).unwrap();
        down.access_for_write().scroll_rect(Rect::new(0, 1, 1, 6), Point::new(0, 2));
        let expect: Vec<Color> = [0, 1, 2, 1, 2, 3].iter().map(|&i| shades[i]).collect();
        assert_eq!(column(&down, 0), expect);

        let mut up = Bitmap::from_colors(1, 6, PixelFormat::Rgba8888, &shades).unwrap();
        up.access_for_write().scroll_rect(Rect::from_size(1, 6), Point::new(0, -2));
        let expect: Vec<Color> = [2, 3, 4, 5, 4, 5].iter().map(|&i| shades[i]).collect();
        assert_eq!(column(&up, 0), expect);
    }

    #[test]
    fn scroll_shifts_unaligned_mono_bits() {
        // 11 px wide so the rect straddles a byte boundary.
        let mut colors = vec![Color::BLACK; 11];
        colors[3] = Color::WHITE;
        colors[4] = Color::WHITE;
        let mut bm = Bitmap::from_colors(11, 1, PixelFormat::Mono1, &colors).unwrap();
        bm.access_for_write().scroll_rect(Rect::new(2, 0, 11, 1), Point::new(5, 0));
        let lit: Vec<i32> = (0..11).filter(|&x| bm.pixel(x, 0) == Some(Color::WHITE)).collect();
        // bits 3 and 4 stay in the exposed strip
        assert_eq!(lit, vec![3, 4, 8, 9]);

        bm.access_for_write().scroll_rect(Rect::new(0, 0, 11, 1), Point::new(-3, 0));
        let lit: Vec<i32> = (0..11).filter(|&x| bm.pixel(x, 0) == Some(Color::WHITE)).collect();
        assert_eq!(lit, vec![0, 1, 5, 6, 8, 9]);
    }

    #[test]
    fn scroll_by_zero_or_past_the_rect_is_a_noop() {
        let shades: Vec<Color> = (0..4u8).map(|i| Color::rgb(0, i * 50, 0)).collect();
        let mut bm = Bitmap::from_colors(4, 1, PixelFormat::Rgb565, &shades).unwrap();
        let before = bm.clone();
        bm.access_for_write().scroll_rect(Rect::from_size(4, 1), Point::ZERO);
        bm.access_for_write().scroll_rect(Rect::from_size(4, 1), Point::new(4, 0));
        assert_eq!(bm.access_for_read().bytes(), before.access_for_read().bytes());
    }
}
