//! Drawing never touches pixels outside the active clip.

use coregfx::{Bitmap, BitmapMode, Color, ColorDevice, Graphics, NoFonts, PixelFormat, Point, Rect, Renderer};
use proptest::prelude::*;

const SIZE: i32 = 24;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-8i32..32, -8i32..32, 0i32..20, 0i32..20).prop_map(|(x, y, w, h)| Rect::with_size(x, y, w, h))
}

fn changed(bm: &Bitmap) -> Vec<Point> {
    let mut out = Vec::new();
    for y in 0..bm.height() {
        for x in 0..bm.width() {
            if bm.pixel(x, y) != Some(Color::TRANSPARENT_BLACK) {
                out.push(Point::new(x, y));
            }
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fill_rect_stays_in_clip(clip in arb_rect(), rect in arb_rect()) {
        let mut bm = Bitmap::new(SIZE, SIZE, PixelFormat::Rgba8888);
        let visible = rect.intersect(clip).intersect(Rect::from_size(SIZE, SIZE));
        {
            let mut g = Renderer::new(ColorDevice::new(bm.access_for_write()).unwrap(), &NoFonts);
            g.set_clip(clip);
            g.fill_rect(rect, Color::WHITE);
        }
        let lit = changed(&bm);
        for p in &lit {
            prop_assert!(visible.contains(*p), "{:?} outside {:?}", p, visible);
        }
        prop_assert_eq!(lit.len() as i64, if visible.is_empty() { 0 } else { visible.area() });
    }

    #[test]
    fn draw_bitmap_stays_in_clip(
        clip in arb_rect(),
        src_rect in arb_rect(),
        pos in (-10i32..30, -10i32..30),
        origin in (-4i32..4, -4i32..4),
    ) {
        let src = Bitmap::from_colors(8, 8, PixelFormat::Rgba8888, &[Color::RED; 64]).unwrap();
        let mut bm = Bitmap::new(SIZE, SIZE, PixelFormat::Rgba8888);
        let origin = Point::new(origin.0, origin.1);
        {
            let mut g = Renderer::new(ColorDevice::new(bm.access_for_write()).unwrap(), &NoFonts);
            g.set_origin(origin);
            g.set_clip(clip);
            g.draw_bitmap(Point::new(pos.0, pos.1), &src, src_rect, BitmapMode::NORMAL).unwrap();
        }
        let abs_clip = clip.offset(origin).intersect(Rect::from_size(SIZE, SIZE));
        for p in changed(&bm) {
            prop_assert!(abs_clip.contains(p), "{:?} outside clip {:?}", p, abs_clip);
            prop_assert_eq!(bm.pixel(p.x, p.y), Some(Color::RED));
        }
    }
}
