//! Bitmap fonts and the font provider the rendering context resolves names through.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::bitmap::{Bitmap, BitmapMode, PixelFormat};
use crate::color::{set_c, Color, NativePixel, Rgba};
use crate::geometry::{Point, Rect};
use crate::render::{DrawMode, Graphics};

/// Passing this color to a monochrome font draws its glyphs inverted.
pub const INVERT_COLOR: Color = Color::rgba(1, 0, 0, 255);

/// A font the rendering context can measure and draw with.
pub trait Font {
    fn name(&self) -> &str;
    fn line_height(&self) -> i32;
    fn string_width(&self, text: &str) -> i32;
    /// Draw `text` with its top-left pen position at `pos` (logical coordinates).
    fn render(&self, graphics: &mut dyn Graphics, pos: Point, text: &str, color: Color);
}

/// Font lookup handed to a renderer at construction.
pub trait FontProvider {
    fn font(&self, name: &str) -> Option<&dyn Font>;
    /// Fallback when a name does not resolve; monochrome targets get a 1-bit font.
    fn default_font(&self, monochrome: bool) -> Option<&dyn Font>;
}

/// Provider without fonts. Text operations report `FontNotFound`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFonts;

impl FontProvider for NoFonts {
    fn font(&self, _name: &str) -> Option<&dyn Font> {
        None
    }

    fn default_font(&self, _monochrome: bool) -> Option<&dyn Font> {
        None
    }
}

#[derive(Default)]
pub struct FontRegistry {
    fonts: HashMap<String, Box<dyn Font>>,
    default_color: Option<String>,
    default_mono: Option<String>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `font` under its own name, replacing any font of that name.
    pub fn add(&mut self, font: impl Font + 'static) -> &mut Self {
        let name = font.name().to_owned();
        if self.fonts.insert(name.clone(), Box::new(font)).is_some() {
            log::debug!("font {name:?} replaced");
        }
        self
    }

    /// Returns false when no font of that name is registered.
    pub fn set_default(&mut self, name: &str, monochrome: bool) -> bool {
        if !self.fonts.contains_key(name) {
            log::warn!("default font {name:?} is not registered");
            return false;
        }
        let slot = if monochrome { &mut self.default_mono } else { &mut self.default_color };
        *slot = Some(name.to_owned());
        true
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl FontProvider for FontRegistry {
    fn font(&self, name: &str) -> Option<&dyn Font> {
        self.fonts.get(name).map(|f| &**f)
    }

    fn default_font(&self, monochrome: bool) -> Option<&dyn Font> {
        let name = if monochrome { &self.default_mono } else { &self.default_color };
        name.as_deref().and_then(|n| self.font(n))
    }
}

/// Position of one character inside the atlas and how to place it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
}

impl Glyph {
    pub fn atlas_rect(&self) -> Rect {
        Rect::with_size(self.x, self.y, self.width, self.height)
    }
}

/// A fixed-size font drawn from a glyph atlas.
///
/// 1-bit atlases are blitted as is (inverted for [`INVERT_COLOR`]). RGBA atlases are alpha
/// masks: each color gets a tinted copy of the atlas, kept in a small cache.
pub struct BitmapFont {
    name: String,
    atlas: Bitmap,
    line_height: i32,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), i32>,
    color_caching: bool,
    color_atlases: RefCell<VecDeque<(Color, Rc<Bitmap>)>>,
}

impl BitmapFont {
    pub const MAX_COLOR_ATLASES: usize = 4;

    pub fn new(name: impl Into<String>, atlas: Bitmap, line_height: i32) -> Self {
        Self {
            name: name.into(),
            atlas,
            line_height,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
            color_caching: true,
            color_atlases: RefCell::new(VecDeque::new()),
        }
    }

    pub fn with_glyph(mut self, ch: char, glyph: Glyph) -> Self {
        self.glyphs.insert(ch, glyph);
        self
    }

    /// Extra advance applied between `first` and a following `second`.
    pub fn with_kerning(mut self, first: char, second: char, amount: i32) -> Self {
        self.kerning.insert((first, second), amount);
        self
    }

    /// Without caching, RGBA atlases are blitted in `Colored` mode, which only the RGB565
    /// backend composes.
    pub fn set_color_caching(&mut self, enabled: bool) {
        self.color_caching = enabled;
        if !enabled {
            self.color_atlases.borrow_mut().clear();
        }
    }

    pub fn atlas(&self) -> &Bitmap {
        &self.atlas
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn cached_color_count(&self) -> usize {
        self.color_atlases.borrow().len()
    }

    fn kerning(&self, prev: Option<char>, ch: char) -> i32 {
        prev.and_then(|p| self.kerning.get(&(p, ch)).copied()).unwrap_or(0)
    }

    fn color_atlas(&self, color: Color) -> Rc<Bitmap> {
        let mut cache = self.color_atlases.borrow_mut();
        if let Some((_, bitmap)) = cache.iter().find(|(c, _)| *c == color) {
            return Rc::clone(bitmap);
        }
        if cache.len() >= Self::MAX_COLOR_ATLASES {
            cache.pop_front();
        }
        let bitmap = Rc::new(colorize(&self.atlas, color));
        cache.push_back((color, Rc::clone(&bitmap)));
        bitmap
    }

    fn blit_glyphs(&self, graphics: &mut dyn Graphics, atlas: &Bitmap, pos: Point, text: &str, mode: BitmapMode) {
        let mut x = pos.x;
        let mut prev = None;
        let mut reported = false;
        for ch in text.chars() {
            let Some(glyph) = self.glyphs.get(&ch) else {
                continue;
            };
            x += self.kerning(prev, ch);
            let dst = Point::new(x + glyph.x_offset, pos.y + glyph.y_offset);
            if let Err(err) = graphics.draw_bitmap(dst, atlas, glyph.atlas_rect(), mode) {
                if !reported {
                    log::warn!("font {:?}: glyph {ch:?} not drawn: {err}", self.name);
                    reported = true;
                }
            }
            x += glyph.x_advance;
            prev = Some(ch);
        }
    }
}

impl Font for BitmapFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }

    fn string_width(&self, text: &str) -> i32 {
        let mut width = 0;
        let mut prev = None;
        for ch in text.chars() {
            if let Some(glyph) = self.glyphs.get(&ch) {
                width += self.kerning(prev, ch) + glyph.x_advance;
                prev = Some(ch);
            }
        }
        width
    }

    fn render(&self, graphics: &mut dyn Graphics, pos: Point, text: &str, color: Color) {
        match self.atlas.format() {
            PixelFormat::Mono1 => {
                if color == INVERT_COLOR {
                    let previous = graphics.set_mode(DrawMode::INVERT);
                    self.blit_glyphs(graphics, &self.atlas, pos, text, BitmapMode::NORMAL);
                    graphics.set_mode(previous);
                } else {
                    self.blit_glyphs(graphics, &self.atlas, pos, text, BitmapMode::NORMAL);
                }
            }
            PixelFormat::Rgba8888 if self.color_caching => {
                let atlas = self.color_atlas(color);
                self.blit_glyphs(graphics, &atlas, pos, text, BitmapMode::NORMAL);
            }
            PixelFormat::Rgba8888 => {
                self.blit_glyphs(graphics, &self.atlas, pos, text, BitmapMode::colored(color));
            }
            PixelFormat::Rgb565 => {
                self.blit_glyphs(graphics, &self.atlas, pos, text, BitmapMode::NORMAL);
            }
        }
    }
}

/// RGB from `color`, alpha from the atlas scaled by the color's alpha.
fn colorize(atlas: &Bitmap, color: Color) -> Bitmap {
    let mut out = Bitmap::new(atlas.width(), atlas.height(), PixelFormat::Rgba8888);
    out.set_alpha_channel_used(true);
    let src = atlas.access_for_read();
    let mut dst = out.access_for_write();
    let scale = color.alpha_f();
    for y in 0..atlas.height() {
        for x in 0..atlas.width() {
            let a = src.rgba_at(x, y).0[3];
            let a = if color.is_opaque() { a } else { set_c(a as f32 / 255.0 * scale * 255.0) };
            dst.set_rgba(x, y, Rgba::from_color(Color::rgba(color.r, color.g, color.b, a)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(x: i32, advance: i32) -> Glyph {
        Glyph { x, y: 0, width: 2, height: 2, x_offset: 0, y_offset: 0, x_advance: advance }
    }

    fn font() -> BitmapFont {
        let atlas = Bitmap::new(8, 2, PixelFormat::Rgba8888);
        BitmapFont::new("test", atlas, 3)
            .with_glyph('A', glyph(0, 3))
            .with_glyph('V', glyph(2, 3))
            .with_kerning('A', 'V', -1)
    }

    #[test]
    fn width_sums_advances_and_kerning() {
        let f = font();
        assert_eq!(f.string_width("A"), 3);
        assert_eq!(f.string_width("AV"), 5);
        assert_eq!(f.string_width("VA"), 6);
        // unknown characters are skipped
        assert_eq!(f.string_width("A?V"), 5);
    }

    #[test]
    fn color_atlas_cache_is_bounded() {
        let f = font();
        for i in 0..6u8 {
            f.color_atlas(Color::rgb(i, 0, 0));
        }
        assert_eq!(f.cached_color_count(), BitmapFont::MAX_COLOR_ATLASES);
        let again = f.color_atlas(Color::rgb(5, 0, 0));
        assert_eq!(f.cached_color_count(), BitmapFont::MAX_COLOR_ATLASES);
        assert!(again.is_alpha_channel_used());
    }

    #[test]
    fn colorize_scales_alpha_for_translucent_colors() {
        let atlas = Bitmap::from_colors(1, 1, PixelFormat::Rgba8888, &[Color::rgba(9, 9, 9, 255)]).unwrap();
        let tinted = colorize(&atlas, Color::rgba(10, 20, 30, 51));
        let px = tinted.pixel(0, 0).unwrap();
        assert_eq!((px.r, px.g, px.b), (10, 20, 30));
        assert!((50..=51).contains(&px.a), "{px:?}");
        let opaque = colorize(&atlas, Color::RED);
        assert_eq!(opaque.pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn registry_defaults() {
        let mut reg = FontRegistry::new();
        reg.add(font());
        assert!(reg.font("test").is_some());
        assert!(reg.default_font(false).is_none());
        assert!(!reg.set_default("missing", false));
        assert!(reg.set_default("test", false));
        assert_eq!(reg.default_font(false).map(|f| f.name()), Some("test"));
        assert!(reg.default_font(true).is_none());
    }
}
