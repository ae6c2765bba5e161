use crate::bitmap::{Bitmap, BitmapMode, PixelFormat, SurfaceMut};
use crate::color::{blend_channel, Color, NativePixel, Rgba};
use crate::error::{GraphicsError, Result};
use crate::geometry::{clip_blit, Point, Rect};
use crate::render::device::{blit_clip, clip_hspan, clip_vspan, line_misses, require_normal, RenderDevice};
use crate::render::{scan, Direction, DrawMode, RenderState};

/// 32-bit RGBA backend.
pub struct ColorDevice<'a> {
    surface: SurfaceMut<'a>,
}

impl<'a> ColorDevice<'a> {
    pub fn new(surface: SurfaceMut<'a>) -> Result<Self> {
        if surface.format() != PixelFormat::Rgba8888 {
            return Err(GraphicsError::FormatMismatch { expected: PixelFormat::Rgba8888, found: surface.format() });
        }
        Ok(Self { surface })
    }

    pub fn surface(&self) -> &SurfaceMut<'a> {
        &self.surface
    }

    #[inline(always)]
    fn set_pixel(&mut self, clip: Rect, x: i32, y: i32, px: Rgba) {
        if clip.contains(Point::new(x, y)) {
            self.surface.set_rgba(x, y, px);
        }
    }

    #[inline]
    fn fill_span(&mut self, y: i32, x0: i32, x1: i32, px: Rgba) {
        for chunk in self.surface.span_mut(y, x0, x1).chunks_exact_mut(4) {
            chunk.copy_from_slice(&px.0);
        }
    }

    fn fill_clipped(&mut self, rect: Rect, px: Rgba) {
        for y in rect.top..rect.bottom {
            self.fill_span(y, rect.left, rect.right, px);
        }
    }
}

impl RenderDevice for ColorDevice<'_> {
    fn bounds(&self) -> Rect {
        self.surface.bounds()
    }

    fn is_monochrome(&self) -> bool {
        false
    }

    fn fill_rect_absolute(&mut self, state: &RenderState, rect: Rect, color: Color) {
        let mut r = rect;
        if r.bound(blit_clip(state, self.bounds())) {
            self.fill_clipped(r, Rgba::from_color(color));
        }
    }

    fn draw_horizontal_line_absolute(&mut self, state: &RenderState, y: i32, x0: i32, x1: i32, color: Color) {
        if let Some((x0, x1)) = clip_hspan(blit_clip(state, self.bounds()), y, x0, x1) {
            self.fill_span(y, x0, x1, Rgba::from_color(color));
        }
    }

    fn draw_vertical_line_absolute(&mut self, state: &RenderState, x: i32, y0: i32, y1: i32, color: Color) {
        if let Some((y0, y1)) = clip_vspan(blit_clip(state, self.bounds()), x, y0, y1) {
            let px = Rgba::from_color(color);
            for y in y0..y1 {
                self.surface.set_rgba(x, y, px);
            }
        }
    }

    fn draw_line_absolute(&mut self, state: &RenderState, p0: Point, p1: Point, color: Color) {
        let clip = blit_clip(state, self.bounds());
        if line_misses(clip, p0, p1) {
            return;
        }
        if state.mode.contains(DrawMode::ANTIALIAS) {
            scan::wu_line(p0, p1, |x, y, coverage| {
                if clip.contains(Point::new(x, y)) {
                    let under = self.surface.rgba_at(x, y).to_color();
                    self.surface.set_rgba(x, y, Rgba::from_color(under.alpha_blend(color, coverage)));
                }
            });
        } else {
            let px = Rgba::from_color(color);
            scan::bresenham(p0, p1, |x, y| self.set_pixel(clip, x, y, px));
        }
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
        scan::linear_gradient(start, end, start_color, end_color, direction, |band, color| {
            let mut band = band;
            if band.bound(clip) {
                self.fill_clipped(band, Rgba::from_color(color));
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
        if src.format() != PixelFormat::Rgba8888 {
            return Err(GraphicsError::FormatMismatch { expected: PixelFormat::Rgba8888, found: src.format() });
        }
        require_normal(mode, "rgba")?;

        let Some((dst, src_rect)) = clip_blit(dst, src_rect, src.size(), blit_clip(state, self.bounds())) else {
            return Ok(());
        };
        let from = src.access_for_read();
        if !src.is_alpha_channel_used() {
            // Opaque source: straight copy.
            return self.surface.copy_rect_from(&from, dst, src_rect);
        }
        for row in 0..src_rect.height() {
            for col in 0..src_rect.width() {
                let [sr, sg, sb, sa] = from.rgba_at(src_rect.left + col, src_rect.top + row).0;
                let (x, y) = (dst.x + col, dst.y + row);
                let [dr, dg, db, _] = self.surface.rgba_at(x, y).0;
                let out = [blend_channel(sr, dr, sa), blend_channel(sg, dg, sa), blend_channel(sb, db, sa), 255];
                self.surface.set_rgba(x, y, Rgba(out));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PaintMode;

    fn state(bounds: Rect) -> RenderState {
        RenderState::new(bounds)
    }

    #[test]
    fn rejects_non_rgba_surface() {
        let mut bm = Bitmap::new(2, 2, PixelFormat::Rgb565);
        assert!(ColorDevice::new(bm.access_for_write()).is_err());
    }

    #[test]
    fn translucent_source_blends_and_forces_opaque() {
        let mut bm = Bitmap::new(1, 1, PixelFormat::Rgba8888);
        bm.fill(Color::rgba(0, 0, 200, 10));
        let src = Bitmap::from_colors(1, 1, PixelFormat::Rgba8888, &[Color::rgba(255, 0, 0, 128)]).unwrap();
        {
            let mut dev = ColorDevice::new(bm.access_for_write()).unwrap();
            let st = state(dev.bounds());
            dev.draw_bitmap_absolute(&st, Point::ZERO, &src, src.size(), BitmapMode::NORMAL).unwrap();
        }
        // (255*128 + 0*127 + 127) / 255 = 128, (0*128 + 200*127 + 127) / 255 = 100
        assert_eq!(bm.pixel(0, 0), Some(Color::rgba(128, 0, 100, 255)));
    }

    #[test]
    fn non_normal_modes_are_rejected_without_writes() {
        let mut bm = Bitmap::new(2, 2, PixelFormat::Rgba8888);
        let src = Bitmap::from_colors(1, 1, PixelFormat::Rgba8888, &[Color::rgba(255, 0, 0, 128)]).unwrap();
        {
            let mut dev = ColorDevice::new(bm.access_for_write()).unwrap();
            let st = state(dev.bounds());
            let err = dev
                .draw_bitmap_absolute(&st, Point::ZERO, &src, src.size(), BitmapMode::colored(Color::WHITE))
                .unwrap_err();
            assert_eq!(err, GraphicsError::UnsupportedMode { mode: PaintMode::Colored, target: "rgba" });
            assert!(dev.draw_bitmap_absolute(&st, Point::ZERO, &src, src.size(), BitmapMode::blend(0.5)).is_err());
        }
        assert_eq!(bm.pixel(0, 0), Some(Color::TRANSPARENT_BLACK));
    }

    #[test]
    fn format_mismatch_is_reported() {
        let mut bm = Bitmap::new(2, 2, PixelFormat::Rgba8888);
        let src = Bitmap::new(2, 2, PixelFormat::Rgb565);
        let mut dev = ColorDevice::new(bm.access_for_write()).unwrap();
        let st = state(dev.bounds());
        let err = dev.draw_bitmap_absolute(&st, Point::ZERO, &src, src.size(), BitmapMode::NORMAL);
        assert!(matches!(err, Err(GraphicsError::FormatMismatch { .. })));
    }

    #[test]
    fn line_writes_respect_clip() {
        let mut bm = Bitmap::new(6, 6, PixelFormat::Rgba8888);
        {
            let mut dev = ColorDevice::new(bm.access_for_write()).unwrap();
            let mut st = state(dev.bounds());
            st.clip = Rect::new(0, 0, 3, 6);
            dev.draw_line_absolute(&st, Point::new(0, 0), Point::new(5, 5), Color::WHITE);
        }
        for i in 0..6 {
            let expected = if i < 3 { Color::WHITE } else { Color::TRANSPARENT_BLACK };
            assert_eq!(bm.pixel(i, i), Some(expected));
        }
    }

    #[test]
    fn gradient_is_clipped_to_bands_inside_clip() {
        let mut bm = Bitmap::new(4, 4, PixelFormat::Rgba8888);
        {
            let mut dev = ColorDevice::new(bm.access_for_write()).unwrap();
            let mut st = state(dev.bounds());
            st.clip = Rect::new(0, 1, 4, 3);
            dev.draw_linear_gradient_absolute(
                &st,
                Point::new(0, 0),
                Point::new(4, 4),
                Color::BLACK,
                Color::rgb(0, 0, 200),
                Direction::Vertical,
            )
            .unwrap();
        }
        assert_eq!(bm.pixel(0, 0), Some(Color::TRANSPARENT_BLACK));
        assert_eq!(bm.pixel(3, 1), Some(Color::rgb(0, 0, 50)));
        assert_eq!(bm.pixel(3, 2), Some(Color::rgb(0, 0, 100)));
        assert_eq!(bm.pixel(3, 3), Some(Color::TRANSPARENT_BLACK));
    }
}
