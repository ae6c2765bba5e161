//! Format-independent rendering context.
//!
//! Design rule: everything above `render/device/*` speaks logical coordinates; everything in
//! it speaks absolute, already clipped device coordinates.

pub mod command;
pub mod device;
pub mod executor;
pub mod frame;
pub mod scan;
pub(crate) mod text;

use bitflags::bitflags;

use crate::bitmap::{Bitmap, BitmapMode};
use crate::color::Color;
use crate::error::{GraphicsError, Result};
use crate::font::{Font, FontProvider};
use crate::geometry::{clip_blit, Point, Rect};
use crate::render::device::RenderDevice;

pub use command::{CommandDevice, CommandRenderer, CommandSink};
pub use executor::{CommandExecutor, ReplayStats};
pub use frame::{CommandPacket, SinkCommand};

bitflags! {
    /// Backend drawing flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DrawMode: u32 {
        const ANTIALIAS = 1 << 0;
        const INVERT = 1 << 1;
    }
}

bitflags! {
    /// Text anchor inside a rect. No flag means left/top.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Alignment: u32 {
        const H_CENTER = 1 << 0;
        const RIGHT = 1 << 1;
        const V_CENTER = 1 << 2;
        const BOTTOM = 1 << 3;

        const CENTER = Self::H_CENTER.bits() | Self::V_CENTER.bits();
        const H_MASK = Self::H_CENTER.bits() | Self::RIGHT.bits();
        const V_MASK = Self::V_CENTER.bits() | Self::BOTTOM.bits();
    }
}

impl Alignment {
    pub const LEFT_TOP: Alignment = Alignment::empty();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Clip and transform state handed to every absolute device operation.
///
/// `clip` is absolute and always inside `max_clip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    pub origin: Point,
    pub clip: Rect,
    pub max_clip: Rect,
    pub mode: DrawMode,
}

impl RenderState {
    pub fn new(bounds: Rect) -> Self {
        Self { origin: Point::ZERO, clip: bounds, max_clip: bounds, mode: DrawMode::empty() }
    }
}

/// Logical-coordinate drawing API used by painters and fonts.
pub trait Graphics {
    /// The surface bounds, in absolute coordinates.
    fn bounds(&self) -> Rect;
    fn is_monochrome(&self) -> bool;

    fn origin(&self) -> Point;
    fn set_origin(&mut self, origin: Point);

    /// Active clip in absolute coordinates.
    fn clip(&self) -> Rect;
    /// Replace the clip with `rect` (logical), bounded to the surface.
    fn set_clip(&mut self, rect: Rect);

    fn mode(&self) -> DrawMode;
    /// Returns the previous mode.
    fn set_mode(&mut self, mode: DrawMode) -> DrawMode;

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, p1: Point, p2: Point, color: Color);
    fn draw_linear_gradient(
        &mut self,
        start: Point,
        end: Point,
        start_color: Color,
        end_color: Color,
        direction: Direction,
    ) -> Result<()>;

    /// An empty `font_name` selects the default font.
    fn draw_string(&mut self, rect: Rect, text: &str, color: Color, font_name: &str, alignment: Alignment)
        -> Result<()>;
    fn draw_multi_line_string(
        &mut self,
        rect: Rect,
        text: &str,
        color: Color,
        font_name: &str,
        alignment: Alignment,
    ) -> Result<()>;
    fn string_width(&self, text: &str, font_name: &str) -> i32;

    fn draw_bitmap(&mut self, pos: Point, bitmap: &Bitmap, src_rect: Rect, mode: BitmapMode) -> Result<()>;
}

/// The rendering context over one backend.
pub struct Renderer<'f, D> {
    device: D,
    state: RenderState,
    fonts: &'f dyn FontProvider,
}

impl<'f, D: RenderDevice> Renderer<'f, D> {
    pub fn new(device: D, fonts: &'f dyn FontProvider) -> Self {
        let state = RenderState::new(device.bounds());
        Self { device, state, fonts }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    fn resolve_font(&self, name: &str) -> Option<&'f dyn Font> {
        let fonts = self.fonts;
        let named = if name.is_empty() { None } else { fonts.font(name) };
        named.or_else(|| fonts.default_font(self.device.is_monochrome()))
    }

    fn require_font(&self, name: &str) -> Result<&'f dyn Font> {
        self.resolve_font(name).ok_or_else(|| GraphicsError::FontNotFound(name.to_owned()))
    }

    fn draw_aligned(&mut self, font: &dyn Font, rect: Rect, text: &str, color: Color, alignment: Alignment) {
        let pos = text::anchor(font, rect, text, alignment);
        let absolute = pos + self.state.origin;
        if !self.device.draw_string_absolute(&self.state, font, absolute, text, color) {
            font.render(self, pos, text, color);
        }
    }

    fn horizontal_line(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        let o = self.state.origin;
        let (y, x0, x1) = (y.saturating_add(o.y), x0.saturating_add(o.x), x1.saturating_add(o.x));
        self.device.draw_horizontal_line_absolute(&self.state, y, x0, x1, color);
    }

    fn vertical_line(&mut self, x: i32, y0: i32, y1: i32, color: Color) {
        let o = self.state.origin;
        let (x, y0, y1) = (x.saturating_add(o.x), y0.saturating_add(o.y), y1.saturating_add(o.y));
        self.device.draw_vertical_line_absolute(&self.state, x, y0, y1, color);
    }
}

impl<'f, D: RenderDevice> Graphics for Renderer<'f, D> {
    fn bounds(&self) -> Rect {
        self.state.max_clip
    }

    fn is_monochrome(&self) -> bool {
        self.device.is_monochrome()
    }

    fn origin(&self) -> Point {
        self.state.origin
    }

    fn set_origin(&mut self, origin: Point) {
        self.state.origin = origin;
    }

    fn clip(&self) -> Rect {
        self.state.clip
    }

    fn set_clip(&mut self, rect: Rect) {
        let mut clip = rect.offset(self.state.origin);
        if !clip.bound(self.state.max_clip) {
            clip = Rect::default();
        }
        self.state.clip = clip;
    }

    fn mode(&self) -> DrawMode {
        self.state.mode
    }

    fn set_mode(&mut self, mode: DrawMode) -> DrawMode {
        core::mem::replace(&mut self.state.mode, mode)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut r = rect.offset(self.state.origin);
        if r.bound(self.state.clip) {
            self.device.fill_rect_absolute(&self.state, r, color);
        }
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.horizontal_line(rect.top, rect.left, rect.right, color);
        self.vertical_line(rect.left, rect.top + 1, rect.bottom - 1, color);
        if rect.height() > 1 {
            self.horizontal_line(rect.bottom - 1, rect.left, rect.right, color);
        }
        if rect.width() > 1 {
            self.vertical_line(rect.right - 1, rect.top + 1, rect.bottom - 1, color);
        }
    }

    fn draw_line(&mut self, p1: Point, p2: Point, color: Color) {
        let a = p1 + self.state.origin;
        let b = p2 + self.state.origin;
        if a.y == b.y {
            let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
            self.device.draw_horizontal_line_absolute(&self.state, a.y, x0, x1.saturating_add(1), color);
        } else if a.x == b.x {
            let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
            self.device.draw_vertical_line_absolute(&self.state, a.x, y0, y1.saturating_add(1), color);
        } else {
            self.device.draw_line_absolute(&self.state, a, b, color);
        }
    }

    fn draw_linear_gradient(
        &mut self,
        start: Point,
        end: Point,
        start_color: Color,
        end_color: Color,
        direction: Direction,
    ) -> Result<()> {
        let o = self.state.origin;
        self.device
            .draw_linear_gradient_absolute(&self.state, start + o, end + o, start_color, end_color, direction)
    }

    fn draw_string(
        &mut self,
        rect: Rect,
        text: &str,
        color: Color,
        font_name: &str,
        alignment: Alignment,
    ) -> Result<()> {
        let font = self.require_font(font_name)?;
        self.draw_aligned(font, rect, text, color, alignment);
        Ok(())
    }

    fn draw_multi_line_string(
        &mut self,
        rect: Rect,
        text: &str,
        color: Color,
        font_name: &str,
        alignment: Alignment,
    ) -> Result<()> {
        let font = self.require_font(font_name)?;
        for line in text::layout_lines(font, rect, text) {
            self.draw_aligned(font, line.rect, &line.text, color, alignment);
        }
        Ok(())
    }

    fn string_width(&self, text: &str, font_name: &str) -> i32 {
        self.resolve_font(font_name).map_or(0, |font| font.string_width(text))
    }

    fn draw_bitmap(&mut self, pos: Point, bitmap: &Bitmap, src_rect: Rect, mode: BitmapMode) -> Result<()> {
        let dst = pos + self.state.origin;
        let Some((dst, src)) = clip_blit(dst, src_rect, bitmap.size(), self.state.clip) else {
            return Ok(());
        };
        self.device.draw_bitmap_absolute(&self.state, dst, bitmap, src, mode)
    }
}
