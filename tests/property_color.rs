//! Native pixel conversions: exact for RGBA, within channel precision for RGB565.

use coregfx::{Color, NativePixel, Rgba};
use embedded_graphics_core::pixelcolor::Rgb565;
use proptest::prelude::*;

fn arb_color() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b, a)| Color::rgba(r, g, b, a))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn rgba_round_trip_is_exact(c in arb_color()) {
        prop_assert_eq!(Rgba::from_color(c).to_color(), c);
    }

    #[test]
    fn rgb565_round_trip_within_precision(c in arb_color()) {
        let back = Rgb565::from_color(c).to_color();
        prop_assert!((back.r as i32 - c.r as i32).abs() <= 7, "{:?} -> {:?}", c, back);
        prop_assert!((back.g as i32 - c.g as i32).abs() <= 3, "{:?} -> {:?}", c, back);
        prop_assert!((back.b as i32 - c.b as i32).abs() <= 7, "{:?} -> {:?}", c, back);
        prop_assert_eq!(back.a, 255);
    }

    #[test]
    fn rgb565_is_monotonic(a in any::<u8>(), b in any::<u8>()) {
        let (lo, hi) = (a.min(b), a.max(b));
        let lo_c = Rgb565::from_color(Color::rgb(lo, lo, lo)).to_color();
        let hi_c = Rgb565::from_color(Color::rgb(hi, hi, hi)).to_color();
        prop_assert!(lo_c.r <= hi_c.r && lo_c.g <= hi_c.g && lo_c.b <= hi_c.b);
    }

    /// Blending with full coverage of an opaque source yields the source.
    #[test]
    fn opaque_blend_replaces(dst in arb_color(), (r, g, b) in (any::<u8>(), any::<u8>(), any::<u8>())) {
        let src = Color::rgb(r, g, b);
        prop_assert_eq!(dst.alpha_blend(src, 1.0), src);
    }
}

#[test]
fn rgb565_extremes() {
    assert_eq!(Rgb565::from_color(Color::WHITE).to_color(), Color::WHITE);
    assert_eq!(Rgb565::from_color(Color::BLACK).to_color(), Color::BLACK);
}
