//! Scan conversion shared by every backend.
//!
//! Each algorithm walks pixels and hands them to a callback; the backend decides how a pixel
//! is clipped, converted and written.

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::render::Direction;

/// Integer Bresenham from `p0` to `p1`, both endpoints included.
pub fn bresenham(p0: Point, p1: Point, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (p0.x, p0.y);
    let (x1, y1) = (p1.x, p1.y);

    // i64 so endpoints at opposite ends of the i32 range still fit
    let mut dx = x1 as i64 - x0 as i64;
    let mut dy = y1 as i64 - y0 as i64;
    let xs = if dx < 0 {
        dx = -dx;
        -1
    } else {
        1
    };
    let ys = if dy < 0 {
        dy = -dy;
        -1
    } else {
        1
    };
    dx <<= 1;
    dy <<= 1;

    plot(x0, y0);
    if dx > dy {
        let mut fraction = dy - (dx >> 1);
        while x0 != x1 {
            if fraction >= 0 {
                y0 += ys;
                fraction -= dx;
            }
            x0 += xs;
            fraction += dy;
            plot(x0, y0);
        }
    } else {
        let mut fraction = dx - (dy >> 1);
        while y0 != y1 {
            if fraction >= 0 {
                x0 += xs;
                fraction -= dy;
            }
            y0 += ys;
            fraction += dx;
            plot(x0, y0);
        }
    }
}

#[inline(always)]
fn fpart(v: f32) -> f32 {
    v - v.floor()
}

#[inline(always)]
fn rfpart(v: f32) -> f32 {
    1.0 - fpart(v)
}

/// Xiaolin Wu antialiased line. `plot(x, y, coverage)` receives coverage in `(0, 1]`.
pub fn wu_line(p0: Point, p1: Point, mut plot: impl FnMut(i32, i32, f32)) {
    let (mut x0, mut y0) = (p0.x as f32, p0.y as f32);
    let (mut x1, mut y1) = (p1.x as f32, p1.y as f32);

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        core::mem::swap(&mut x0, &mut y0);
        core::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx == 0.0 { 1.0 } else { dy / dx };

    let mut put = |x: i32, y: i32, coverage: f32| {
        if coverage <= 0.0 {
            return;
        }
        if steep {
            plot(y, x, coverage);
        } else {
            plot(x, y, coverage);
        }
    };

    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;
    put(xpxl1, ypxl1, rfpart(yend) * xgap);
    put(xpxl1, ypxl1.saturating_add(1), fpart(yend) * xgap);
    let mut intery = yend + gradient;

    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;
    put(xpxl2, ypxl2, rfpart(yend) * xgap);
    put(xpxl2, ypxl2.saturating_add(1), fpart(yend) * xgap);

    for x in xpxl1.saturating_add(1)..xpxl2 {
        let y = intery.floor() as i32;
        put(x, y, rfpart(intery));
        put(x, y.saturating_add(1), fpart(intery));
        intery += gradient;
    }
}

/// Axis-aligned gradient over `[start, end)`.
///
/// Band `i` of `count` (the extent along `direction`) gets `start_color.lerp(end_color,
/// i / count)` and spans the whole perpendicular extent. Nothing is produced when either
/// extent is empty.
pub fn linear_gradient(
    start: Point,
    end: Point,
    start_color: Color,
    end_color: Color,
    direction: Direction,
    mut fill_band: impl FnMut(Rect, Color),
) {
    let area = Rect::new(start.x, start.y, end.x, end.y);
    if area.is_empty() {
        return;
    }
    let count = match direction {
        Direction::Horizontal => area.width(),
        Direction::Vertical => area.height(),
    };
    for i in 0..count {
        let t = i as f32 / count as f32;
        let band = match direction {
            Direction::Horizontal => Rect::new(area.left + i, area.top, area.left + i + 1, area.bottom),
            Direction::Vertical => Rect::new(area.left, area.top + i, area.right, area.top + i + 1),
        };
        fill_band(band, start_color.lerp(end_color, t));
    }
}
