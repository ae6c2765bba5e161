use embedded_graphics_core::pixelcolor::BinaryColor;

use crate::bitmap::{Bitmap, BitmapMode, PixelFormat, SurfaceMut};
use crate::color::{Color, NativePixel};
use crate::error::{GraphicsError, Result};
use crate::geometry::{clip_blit, Point, Rect};
use crate::render::device::{blit_clip, clip_hspan, clip_vspan, line_misses, require_normal, RenderDevice};
use crate::render::{scan, Direction, DrawMode, RenderState};

/// 1-bit backend. A pixel is lit when the color is white, flipped by [`DrawMode::INVERT`].
pub struct MonoDevice<'a> {
    surface: SurfaceMut<'a>,
}

impl<'a> MonoDevice<'a> {
    pub fn new(surface: SurfaceMut<'a>) -> Result<Self> {
        if surface.format() != PixelFormat::Mono1 {
            return Err(GraphicsError::FormatMismatch { expected: PixelFormat::Mono1, found: surface.format() });
        }
        Ok(Self { surface })
    }

    pub fn surface(&self) -> &SurfaceMut<'a> {
        &self.surface
    }

    #[inline]
    fn lit(state: &RenderState, color: Color) -> bool {
        BinaryColor::from_color(color).is_on() ^ state.mode.contains(DrawMode::INVERT)
    }
}

impl RenderDevice for MonoDevice<'_> {
    fn bounds(&self) -> Rect {
        self.surface.bounds()
    }

    fn is_monochrome(&self) -> bool {
        true
    }

    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color) {
        let mut r = rect;
        if !r.bound(blit_clip(state, self.bounds())) {
            return;
        }
        let lit = Self::lit(state, color);
        for y in r.top..r.bottom {
            for x in r.left..r.right {
                self.surface.set_bit(x, y, lit);
            }
        }
    }

    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color) {
        if let Some((x0, x1)) = clip_hspan(blit_clip(state, self.bounds()), y, x0, x1) {
            let lit = Self::lit(state, color);
            for x in x0..x1 {
                self.surface.set_bit(x, y, lit);
            }
        }
    }

    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color) {
        if let Some((y0, y1)) = clip_vspan(blit_clip(state, self.bounds()), x, y0, y1) {
            let lit = Self::lit(state, color);
            for y in y0..y1 {
                self.surface.set_bit(x, y, lit);
            }
        }
    }

    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color) {
        let clip = blit_clip(state, self.bounds());
        if line_misses(clip, p0, p1) {
            return;
        }
        let lit = Self::lit(state, color);
        scan::bresenham(p0, p1, |x, y| {
            if clip.contains(Point::new(x, y)) {
                self.surface.set_bit(x, y, lit);
            }
        });
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
        Err(GraphicsError::Unsupported("linear gradient on a 1-bit surface"))
    }

    fn draw_bitmap_absolute(
        &mut self,
        state: &RenderState,
        dst: Point,
        src: &Bitmap,
        src_rect: Rect,
        mode: BitmapMode,
    ) -> Result<()> {
        if src.format() != PixelFormat::Mono1 {
            return Err(GraphicsError::FormatMismatch { expected: PixelFormat::Mono1, found: src.format() });
        }
        require_normal(mode, "mono")?;

        let Some((dst, src_rect)) = clip_blit(dst, src_rect, src.size(), blit_clip(state, self.bounds())) else {
            return Ok(());
        };
        let from = src.access_for_read();
        if !state.mode.contains(DrawMode::INVERT) {
            return self.surface.copy_rect_from(&from, dst, src_rect);
        }
        for row in 0..src_rect.height() {
            for col in 0..src_rect.width() {
                let bit = from.bit_at(src_rect.left + col, src_rect.top + row);
                self.surface.set_bit(dst.x + col, dst.y + row, !bit);
            }
        }
        Ok(())
    }
}
