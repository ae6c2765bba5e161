pub mod color;
pub mod mono;
pub mod rgb565;

pub use color::ColorDevice;
pub use mono::MonoDevice;
pub use rgb565::Rgb565Device;

use crate::bitmap::{Bitmap, BitmapMode, PaintMode};
use crate::color::Color;
use crate::error::{GraphicsError, Result};
use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::render::{Direction, RenderState};

/// Absolute drawing operations of one pixel format.
///
/// Design rule: only `render/device/*` touches pixel memory. Every write is checked against
/// `state.clip`; writes outside it are dropped silently.
pub trait RenderDevice {
    /// Surface bounds in pixels.
    fn bounds(&self) -> Rect;

    fn is_monochrome(&self) -> bool;

    /// `rect` is already inside `state.clip`.
    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color);

    /// Row `y`, columns `[x0, x1)`.
    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color);

    /// Column `x`, rows `[y0, y1)`.
    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color);

    /// General line, both endpoints included.
    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color);

    fn draw_linear_gradient_absolute(
        &mut self,
        state: &RenderState,
        start: Point,
        end: Point,
        start_color: Color,
        end_color: Color,
        direction: Direction,
    ) -> Result<()>;

    /// Blit `src_rect` of `src` with its top-left at `dst`.
    fn draw_bitmap_absolute(
        &mut self,
        state: &RenderState,
        dst: Point,
        src: &Bitmap,
        src_rect: Rect,
        mode: BitmapMode,
    ) -> Result<()>;

    /// Targets that render text themselves return `true`; the default lets the font
    /// draw glyph bitmaps through the context.
    fn draw_string_absolute(
        &mut self,
        _state: &RenderState,
        _font: &dyn Font,
        _pos: Point,
        _text: &str,
        _color: Color,
    ) -> bool {
        false
    }
}

impl<D: RenderDevice + ?Sized> RenderDevice for &mut D {
    fn bounds(&self) -> Rect {
        (**self).bounds()
    }

    fn is_monochrome(&self) -> bool {
        (**self).is_monochrome()
    }

    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color) {
        (**self).fill_rect_absolute(state, rect, color)
    }

    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color) {
        (**self).draw_horizontal_line_absolute(state, y, x0, x1, color)
    }

    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color) {
        (**self).draw_vertical_line_absolute(state, x, y0, y1, color)
    }

    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color) {
        (**self).draw_line_absolute(state, p0, p1, color)
    }

    fn draw_linear_gradient_absolute(
        &mut self,
        state: &RenderState,
        start: Point,
        end: Point,
        start_color: Color,
        end_color: Color,
        direction: Direction,
    ) -> Result<()> {
        (**self).draw_linear_gradient_absolute(state, start, end, start_color, end_color, direction)
    }

    fn draw_bitmap_absolute(
        &mut self,
        state: &RenderState,
        dst: Point,
        src: &Bitmap,
        src_rect: Rect,
        mode: BitmapMode,
    ) -> Result<()> {
        (**self).draw_bitmap_absolute(state, dst, src, src_rect, mode)
    }

    fn draw_string_absolute(
        &mut self,
        state: &RenderState,
        font: &dyn Font,
        pos: Point,
        text: &str,
        color: Color,
    ) -> bool {
        (**self).draw_string_absolute(state, font, pos, text, color)
    }
}

/// Clip a horizontal run `[x0, x1)` on row `y`; `None` when nothing is visible.
#[inline]
pub(crate) fn clip_hspan(clip: Rect, y: i32, x0: i32, x1: i32) -> Option<(i32, i32)> {
    if y < clip.top || y >= clip.bottom {
        return None;
    }
    let (x0, x1) = (x0.max(clip.left), x1.min(clip.right));
    (x0 < x1).then_some((x0, x1))
}

#[inline]
pub(crate) fn clip_vspan(clip: Rect, x: i32, y0: i32, y1: i32) -> Option<(i32, i32)> {
    clip_hspan(Rect::new(clip.top, clip.left, clip.bottom, clip.right), x, y0, y1)
}

/// Whether the box spanned by a segment lies entirely outside `clip`.
#[inline]
pub(crate) fn line_misses(clip: Rect, p0: Point, p1: Point) -> bool {
    p0.x.max(p1.x) < clip.left
        || p0.x.min(p1.x) >= clip.right
        || p0.y.max(p1.y) < clip.top
        || p0.y.min(p1.y) >= clip.bottom
}

/// Effective blit clip: the active clip limited to the device.
#[inline]
pub(crate) fn blit_clip(state: &RenderState, bounds: Rect) -> Rect {
    state.clip.intersect(bounds)
}

/// Backends that only composite in `Normal` mode reject the rest.
pub(crate) fn require_normal(mode: BitmapMode, target: &'static str) -> Result<()> {
    if mode.paint_mode == PaintMode::Normal {
        return Ok(());
    }
    log::error!("{target} backend: paint mode {:?} unsupported", mode.paint_mode);
    Err(GraphicsError::UnsupportedMode { mode: mode.paint_mode, target })
}
