//! Bounded lists of disjoint rectangles, the unit of "what changed".

use smallvec::SmallVec;

use crate::geometry::{Point, Rect};

/// Rects a region holds before it collapses to its bounding box.
pub const REGION_CAPACITY: usize = 5;

type Pieces = SmallVec<[Rect; 8]>;

/// A set of disjoint, non-empty rects.
///
/// Design rule: after every mutation the rects are pairwise disjoint and there are at most
/// [`REGION_CAPACITY`] of them. When an operation would exceed that, the region becomes its
/// bounding box: larger than requested, never smaller.
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: SmallVec<[Rect; REGION_CAPACITY]>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.join(rect);
        region
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn set_empty(&mut self) {
        self.rects.clear();
    }

    pub fn bounding_box(&self) -> Rect {
        self.rects.iter().fold(Rect::default(), |acc, r| acc.union(*r))
    }

    /// Covered pixel count.
    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rects.iter().any(|r| r.contains(p))
    }

    /// Union `rect` into the region.
    pub fn join(&mut self, rect: Rect) {
        if rect.is_empty() || self.rects.iter().any(|r| r.contains_rect(&rect)) {
            return;
        }
        self.rects.retain(|r| !rect.contains_rect(r));

        let mut pieces: Pieces = SmallVec::new();
        pieces.push(rect);
        for existing in &self.rects {
            pieces = pieces.into_iter().flat_map(|p| p.subtract(*existing)).collect();
            if pieces.is_empty() {
                return;
            }
        }
        let mut all: Pieces = self.rects.iter().copied().collect();
        all.extend(pieces);
        self.store(all);
    }

    /// Remove `rect` from the region.
    pub fn exclude(&mut self, rect: Rect) {
        if rect.is_empty() || !self.rects.iter().any(|r| r.intersects(&rect)) {
            return;
        }
        let remaining: Pieces = self.rects.iter().flat_map(|r| r.subtract(rect)).collect();
        self.store(remaining);
    }

    pub fn exclude_region(&mut self, other: &Region) {
        for rect in other.rects() {
            self.exclude(*rect);
        }
    }

    /// Intersect every rect with `rect`.
    pub fn bound(&mut self, rect: Rect) {
        self.rects.retain(|r| r.bound(rect));
    }

    /// Every pixel of `other` is covered by `self`.
    pub fn covers(&self, other: &Region) -> bool {
        other.rects.iter().all(|rect| {
            let mut pieces: Pieces = SmallVec::new();
            pieces.push(*rect);
            for mine in &self.rects {
                pieces = pieces.into_iter().flat_map(|p| p.subtract(*mine)).collect();
                if pieces.is_empty() {
                    break;
                }
            }
            pieces.is_empty()
        })
    }

    fn store(&mut self, mut rects: Pieces) {
        coalesce(&mut rects);
        if rects.len() > REGION_CAPACITY {
            let bbox = rects.iter().fold(Rect::default(), |acc, r| acc.union(*r));
            log::trace!("region overflow ({} rects), collapsing to {bbox:?}", rects.len());
            self.rects.clear();
            self.rects.push(bbox);
        } else {
            self.rects = rects.into_iter().collect();
        }
    }
}

/// Merge rect pairs that share a full edge until none do.
fn coalesce(rects: &mut Pieces) {
    'scan: loop {
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if let Some(merged) = merge_adjacent(rects[i], rects[j]) {
                    rects[i] = merged;
                    rects.swap_remove(j);
                    continue 'scan;
                }
            }
        }
        break;
    }
}

fn merge_adjacent(a: Rect, b: Rect) -> Option<Rect> {
    let same_rows = a.top == b.top && a.bottom == b.bottom;
    let same_cols = a.left == b.left && a.right == b.right;
    if same_rows && (a.right == b.left || b.right == a.left) {
        return Some(a.union(b));
    }
    if same_cols && (a.bottom == b.top || b.bottom == a.top) {
        return Some(a.union(b));
    }
    None
}

/// Equal as pixel sets, whatever the decomposition.
impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.area() == other.area() && self.covers(other)
    }
}

impl Eq for Region {}

impl PartialEq<Rect> for Region {
    fn eq(&self, other: &Rect) -> bool {
        *self == Region::from_rect(*other)
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(region: &Region) {
        let rects = region.rects();
        for (i, a) in rects.iter().enumerate() {
            assert!(!a.is_empty());
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn join_overlapping_keeps_rects_disjoint() {
        let mut r = Region::new();
        r.join(Rect::new(0, 0, 10, 10));
        r.join(Rect::new(5, 5, 15, 15));
        assert_disjoint(&r);
        assert_eq!(r.area(), 100 + 100 - 25);
        assert!(r.contains(Point::new(14, 14)));
        assert!(!r.contains(Point::new(14, 0)));
    }

    #[test]
    fn join_contained_is_noop() {
        let mut r = Region::from_rect(Rect::new(0, 0, 10, 10));
        r.join(Rect::new(2, 2, 4, 4));
        assert_eq!(r, Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn join_swallows_contained_rects() {
        let mut r = Region::new();
        r.join(Rect::new(1, 1, 2, 2));
        r.join(Rect::new(5, 5, 6, 6));
        r.join(Rect::new(0, 0, 10, 10));
        assert_eq!(r, Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn adjacent_rects_coalesce() {
        let mut r = Region::new();
        r.join(Rect::new(0, 0, 5, 5));
        r.join(Rect::new(5, 0, 10, 5));
        assert_eq!(r, Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn overflow_collapses_to_bounding_box() {
        let mut r = Region::new();
        for i in 0..6 {
            r.join(Rect::new(i * 10, i * 10, i * 10 + 2, i * 10 + 2));
        }
        assert_eq!(r.rects().len(), 1);
        assert_eq!(r, Rect::new(0, 0, 52, 52));
    }

    #[test]
    fn exclude_punches_hole() {
        let mut r = Region::from_rect(Rect::new(0, 0, 9, 9));
        r.exclude(Rect::new(3, 3, 6, 6));
        assert_disjoint(&r);
        assert_eq!(r.area(), 81 - 9);
        assert!(!r.contains(Point::new(4, 4)));
    }

    #[test]
    fn bound_clips_and_drops_outside() {
        let mut r = Region::new();
        r.join(Rect::new(0, 0, 4, 4));
        r.join(Rect::new(20, 20, 24, 24));
        r.bound(Rect::new(2, 2, 10, 10));
        assert_eq!(r, Rect::new(2, 2, 4, 4));
    }

    #[test]
    fn equality_ignores_decomposition() {
        let mut a = Region::new();
        a.join(Rect::new(0, 0, 10, 5));
        a.join(Rect::new(0, 5, 5, 10));
        let mut b = Region::new();
        b.join(Rect::new(0, 0, 5, 10));
        b.join(Rect::new(5, 0, 10, 5));
        assert_eq!(a, b);
        assert_ne!(a, Region::from_rect(Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn empty_region_has_empty_bounding_box() {
        assert!(Region::new().bounding_box().is_empty());
        assert_eq!(Region::new(), Rect::default());
    }
}
