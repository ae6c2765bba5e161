//! Integer pixel geometry.
//!
//! All rectangles are half-open: `right` and `bottom` are exclusive.

use core::ops::{Add, Neg, Sub};

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// `(0, 0, width, height)`.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub const fn left_top(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Number of pixels covered; 0 for empty rects.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.right as i64 - self.left as i64) * (self.bottom as i64 - self.top as i64)
        }
    }

    /// Translate by `d`; edges clamp at the `i32` range.
    #[must_use]
    pub const fn offset(self, d: Point) -> Rect {
        Rect::new(
            self.left.saturating_add(d.x),
            self.top.saturating_add(d.y),
            self.right.saturating_add(d.x),
            self.bottom.saturating_add(d.y),
        )
    }

    /// Intersection. The result may be empty (and then degenerate).
    #[must_use]
    pub fn intersect(self, other: Rect) -> Rect {
        Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Intersect in place; returns whether anything is left.
    pub fn bound(&mut self, other: Rect) -> bool {
        *self = self.intersect(other);
        !self.is_empty()
    }

    /// Bounding box of both; empty operands are ignored.
    #[must_use]
    pub fn union(self, other: Rect) -> Rect {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// True when `other` is non-empty and lies entirely inside `self`.
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(*other).is_empty()
    }

    /// `self - other` as up to four disjoint pieces: full-width bands above and below,
    /// then the left and right slivers of the overlapping band.
    pub fn subtract(self, other: Rect) -> SmallVec<[Rect; 4]> {
        let mut out = SmallVec::new();
        if self.is_empty() {
            return out;
        }
        let overlap = self.intersect(other);
        if overlap.is_empty() {
            out.push(self);
            return out;
        }
        if overlap.top > self.top {
            out.push(Rect::new(self.left, self.top, self.right, overlap.top));
        }
        if overlap.bottom < self.bottom {
            out.push(Rect::new(self.left, overlap.bottom, self.right, self.bottom));
        }
        if overlap.left > self.left {
            out.push(Rect::new(self.left, overlap.top, overlap.left, overlap.bottom));
        }
        if overlap.right < self.right {
            out.push(Rect::new(overlap.right, overlap.top, self.right, overlap.bottom));
        }
        out
    }
}

/// Clip a blit of `src` (inside a source of `src_bounds`) placed at `dst` against `clip`.
///
/// Returns the clipped destination origin and source rect, keeping both pixel-aligned: the
/// source shrinks on each edge by exactly what the destination lost.
pub(crate) fn clip_blit(dst: Point, src: Rect, src_bounds: Rect, clip: Rect) -> Option<(Point, Rect)> {
    let mut src = src;
    if !src.bound(src_bounds) {
        return None;
    }
    let full = Rect::with_size(dst.x, dst.y, src.width(), src.height());
    let mut visible = full;
    if !visible.bound(clip) {
        return None;
    }
    src.left += visible.left - full.left;
    src.top += visible.top - full.top;
    src.right -= full.right - visible.right;
    src.bottom -= full.bottom - visible.bottom;
    Some((visible.left_top(), src))
}
