//! Rendering into an external command stream instead of pixels.

use crate::bitmap::{Bitmap, BitmapMode, PixelFormat};
use crate::color::Color;
use crate::error::{GraphicsError, Result};
use crate::font::{Font, INVERT_COLOR};
use crate::geometry::{Point, Rect};
use crate::render::device::{require_normal, RenderDevice};
use crate::render::{Direction, DrawMode, RenderState, Renderer};

/// Receiver of absolute drawing commands.
///
/// A `set_clip` always precedes the primitives it applies to. The draw mode starts empty and
/// `set_mode` is sent whenever it changes before a primitive.
pub trait CommandSink {
    fn set_clip(&mut self, rect: Rect);
    fn set_mode(&mut self, _mode: DrawMode) {}
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Row `y`, columns `[x0, x1)`.
    fn draw_horizontal_line(&mut self, y: i32, x0: i32, x1: i32, color: Color);
    /// Column `x`, rows `[y0, y1)`.
    fn draw_vertical_line(&mut self, x: i32, y0: i32, y1: i32, color: Color);
    fn draw_line(&mut self, p0: Point, p1: Point, color: Color);
    fn draw_string(&mut self, font: &dyn Font, pos: Point, text: &str, color: Color);
    fn draw_bitmap(&mut self, dst: Point, bitmap: &Bitmap, src_rect: Rect);
}

/// Rendering context that streams to a [`CommandSink`].
pub type CommandRenderer<'s, 'f> = Renderer<'f, CommandDevice<'s>>;

/// Device half of [`CommandRenderer`]: forwards primitives and coalesces clip changes.
pub struct CommandDevice<'s> {
    sink: &'s mut dyn CommandSink,
    bounds: Rect,
    monochrome: bool,
    flushed_clip: Option<Rect>,
    flushed_mode: DrawMode,
}

impl<'s> CommandDevice<'s> {
    pub fn new(sink: &'s mut dyn CommandSink, bounds: Rect, monochrome: bool) -> Self {
        Self { sink, bounds, monochrome, flushed_clip: None, flushed_mode: DrawMode::empty() }
    }

    fn flush_state(&mut self, state: &RenderState) {
        if self.flushed_clip != Some(state.clip) {
            self.sink.set_clip(state.clip);
            self.flushed_clip = Some(state.clip);
        }
        if self.flushed_mode != state.mode {
            self.sink.set_mode(state.mode);
            self.flushed_mode = state.mode;
        }
    }
}

impl RenderDevice for CommandDevice<'_> {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn is_monochrome(&self) -> bool {
        self.monochrome
    }

    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color) {
        self.flush_state(state);
        self.sink.fill_rect(rect, color);
    }

    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color) {
        self.flush_state(state);
        self.sink.draw_horizontal_line(y, x0, x1, color);
    }

    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color) {
        self.flush_state(state);
        self.sink.draw_vertical_line(x, y0, y1, color);
    }

    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color) {
        self.flush_state(state);
        self.sink.draw_line(p0, p1, color);
    }

    fn draw_linear_gradient_absolute(
        &mut self,
        _state: &RenderState,
        _start: Point,
        _end: Point,
        _start_color: Color,
        _end_color: Color,
        _direction: Direction,
    ) -> Result<()> {
        Err(GraphicsError::Unsupported("linear gradient on a command stream"))
    }

    fn draw_bitmap_absolute(
        &mut self,
        state: &RenderState,
        dst: Point,
        src: &Bitmap,
        src_rect: Rect,
        mode: BitmapMode,
    ) -> Result<()> {
        if src_rect.width() <= 0 || src_rect.height() <= 0 {
            return Ok(());
        }
        let source_mono = src.format() == PixelFormat::Mono1;
        if source_mono != self.monochrome {
            let expected = if self.monochrome { PixelFormat::Mono1 } else { PixelFormat::Rgba8888 };
            return Err(GraphicsError::FormatMismatch { expected, found: src.format() });
        }
        require_normal(mode, "command")?;
        self.flush_state(state);
        self.sink.draw_bitmap(dst, src, src_rect);
        Ok(())
    }

    fn draw_string_absolute(
        &mut self,
        state: &RenderState,
        font: &dyn Font,
        pos: Point,
        text: &str,
        color: Color,
    ) -> bool {
        // 1-bit sinks know two colors: lit, or black for the invert sentinel.
        let color = match (self.monochrome, color == INVERT_COLOR) {
            (true, true) => Color::BLACK,
            (true, false) => Color::WHITE,
            (false, _) => color,
        };
        self.flush_state(state);
        self.sink.draw_string(font, pos, text, color);
        true
    }
}
