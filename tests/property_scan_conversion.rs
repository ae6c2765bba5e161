//! Bresenham lines are exact, 8-connected and monotonic.

use coregfx::render::scan::bresenham;
use coregfx::Point;
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = Point> {
    (-64i32..64, -64i32..64).prop_map(|(x, y)| Point::new(x, y))
}

fn collect(p0: Point, p1: Point) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    bresenham(p0, p1, |x, y| out.push((x, y)));
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// One pixel per step along the major axis, endpoints included.
    #[test]
    fn point_count_and_endpoints(p0 in arb_point(), p1 in arb_point()) {
        let pts = collect(p0, p1);
        let dx = (p1.x - p0.x).abs();
        let dy = (p1.y - p0.y).abs();
        prop_assert_eq!(pts.len() as i32, dx.max(dy) + 1);
        prop_assert_eq!(pts[0], (p0.x, p0.y));
        prop_assert_eq!(*pts.last().unwrap(), (p1.x, p1.y));
    }

    /// Consecutive pixels touch, and neither coordinate ever walks backwards.
    #[test]
    fn connected_and_monotonic(p0 in arb_point(), p1 in arb_point()) {
        let pts = collect(p0, p1);
        let sx = (p1.x - p0.x).signum();
        let sy = (p1.y - p0.y).signum();
        for pair in pts.windows(2) {
            let (ax, ay) = pair[0];
            let (bx, by) = pair[1];
            prop_assert!((bx - ax).abs() <= 1 && (by - ay).abs() <= 1);
            prop_assert!(pair[0] != pair[1]);
            prop_assert!((bx - ax) * sx >= 0, "x reversed in {:?}", pts);
            prop_assert!((by - ay) * sy >= 0, "y reversed in {:?}", pts);
        }
    }

    /// Every pixel stays within half a pixel of the ideal line on the minor axis.
    #[test]
    fn stays_close_to_ideal_line(p0 in arb_point(), p1 in arb_point()) {
        let dx = (p1.x - p0.x) as f64;
        let dy = (p1.y - p0.y) as f64;
        for (x, y) in collect(p0, p1) {
            let err = if dx.abs() > dy.abs() {
                let ideal = p0.y as f64 + dy * (x - p0.x) as f64 / dx;
                (y as f64 - ideal).abs()
            } else if dy != 0.0 {
                let ideal = p0.x as f64 + dx * (y - p0.y) as f64 / dy;
                (x as f64 - ideal).abs()
            } else {
                0.0
            };
            prop_assert!(err <= 0.5 + 1e-9, "({}, {}) is {} off", x, y, err);
        }
    }
}

#[test]
fn diagonal_line() {
    assert_eq!(collect(Point::new(0, 0), Point::new(3, 3)), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}
