use embedded_graphics_core::pixelcolor::Rgb565;

use crate::bitmap::{Bitmap, BitmapMode, PaintMode, PixelFormat, SurfaceMut};
use crate::color::{blend_565, set_c, Color, NativePixel};
use crate::error::{GraphicsError, Result};
use crate::geometry::{clip_blit, Point, Rect};
use crate::render::device::{blit_clip, clip_hspan, clip_vspan, line_misses, RenderDevice};
use crate::render::{scan, Direction, RenderState};

/// 16-bit 5-6-5 backend.
///
/// Accepts alpha-bearing RGBA sources (blended in all three paint modes) and opaque RGB565
/// sources (copied, or blended with a uniform alpha).
pub struct Rgb565Device<'a> {
    surface: SurfaceMut<'a>,
}

impl<'a> Rgb565Device<'a> {
    pub fn new(surface: SurfaceMut<'a>) -> Result<Self> {
        if surface.format() != PixelFormat::Rgb565 {
            return Err(GraphicsError::FormatMismatch { expected: PixelFormat::Rgb565, found: surface.format() });
        }
        Ok(Self { surface })
    }

    pub fn surface(&self) -> &SurfaceMut<'a> {
        &self.surface
    }

    fn fill_clipped(&mut self, rect: Rect, px: Rgb565) {
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                self.surface.set_rgb565(x, y, px);
            }
        }
    }

    /// Per-pixel blend of the clipped area: `f(src_x, src_y, dst_pixel) -> new_pixel`.
    fn compose(&mut self, dst: Point, src_rect: Rect, mut f: impl FnMut(i32, i32, Rgb565) -> Rgb565) {
        for row in 0..src_rect.height() {
            for col in 0..src_rect.width() {
                let (x, y) = (dst.x + col, dst.y + row);
                let under = self.surface.rgb565_at(x, y);
                let out = f(src_rect.left + col, src_rect.top + row, under);
                self.surface.set_rgb565(x, y, out);
            }
        }
    }
}

impl RenderDevice for Rgb565Device<'_> {
    fn bounds(&self) -> Rect {
        self.surface.bounds()
    }

    fn is_monochrome(&self) -> bool {
        false
    }

    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color) {
        let mut r = rect;
        if r.bound(blit_clip(state, self.bounds())) {
            self.fill_clipped(r, Rgb565::from_color(color));
        }
    }

    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color) {
        if let Some((x0, x1)) = clip_hspan(blit_clip(state, self.bounds()), y, x0, x1) {
            let px = Rgb565::from_color(color);
            for x in x0..x1 {
                self.surface.set_rgb565(x, y, px);
            }
        }
    }

    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color) {
        if let Some((y0, y1)) = clip_vspan(blit_clip(state, self.bounds()), x, y0, y1) {
            let px = Rgb565::from_color(color);
            for y in y0..y1 {
                self.surface.set_rgb565(x, y, px);
            }
        }
    }

    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color) {
        let clip = blit_clip(state, self.bounds());
        if line_misses(clip, p0, p1) {
            return;
        }
        let px = Rgb565::from_color(color);
        scan::bresenham(p0, p1, |x, y| {
            if clip.contains(Point::new(x, y)) {
                self.surface.set_rgb565(x, y, px);
            }
        });
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
        let clip = blit_clip(state, self.bounds());
        // Interpolate between the colors the surface can actually show.
        let c0 = Rgb565::from_color(start_color).to_color();
        let c1 = Rgb565::from_color(end_color).to_color();
        scan::linear_gradient(start, end, c0, c1, direction, |band, color| {
            let mut band = band;
            if band.bound(clip) {
                self.fill_clipped(band, Rgb565::from_color(color));
            }
        });
        Ok(())
    }

    fn draw_bitmap_absolute(
        &mut self,
        state: &RenderState,
        dst: Point,
        src: &Bitmap,
        src_rect: Rect,
        mode: BitmapMode,
    ) -> Result<()> {
        let expected = if src.is_alpha_channel_used() { PixelFormat::Rgba8888 } else { PixelFormat::Rgb565 };
        if src.format() != expected {
            return Err(GraphicsError::FormatMismatch { expected, found: src.format() });
        }
        if !src.is_alpha_channel_used() && mode.paint_mode == PaintMode::Colored {
            log::error!("rgb565 backend: colored paint needs an alpha mask");
            return Err(GraphicsError::UnsupportedMode { mode: mode.paint_mode, target: "rgb565" });
        }

        let Some((dst, src_rect)) = clip_blit(dst, src_rect, src.size(), blit_clip(state, self.bounds())) else {
            return Ok(());
        };
        let from = src.access_for_read();

        if src.is_alpha_channel_used() {
            match mode.paint_mode {
                PaintMode::Colored => {
                    let fg = Rgb565::from_color(mode.color);
                    self.compose(dst, src_rect, |sx, sy, under| blend_565(fg, under, from.rgba_at(sx, sy).0[3]));
                }
                PaintMode::Blend => {
                    let factor = mode.alpha;
                    self.compose(dst, src_rect, |sx, sy, under| {
                        let px = from.rgba_at(sx, sy);
                        let alpha = set_c(px.0[3] as f32 * factor);
                        blend_565(Rgb565::from_color(px.to_color()), under, alpha)
                    });
                }
                PaintMode::Normal => {
                    self.compose(dst, src_rect, |sx, sy, under| {
                        let px = from.rgba_at(sx, sy);
                        blend_565(Rgb565::from_color(px.to_color()), under, px.0[3])
                    });
                }
            }
            return Ok(());
        }

        match mode.paint_mode {
            PaintMode::Blend => {
                let alpha = set_c(mode.alpha * 255.0);
                self.compose(dst, src_rect, |sx, sy, under| blend_565(from.rgb565_at(sx, sy), under, alpha));
                Ok(())
            }
            _ => self.surface.copy_rect_from(&from, dst, src_rect),
        }
    }
}
