//! Hit-testing: bounding boxes, marquee intersection, and direct hits on the
//! current selection.
//!
//! All tests run in logical space on axis-aligned boxes. Edges are inclusive:
//! a point on the border is inside, and rectangles that merely touch intersect.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::HashSet;

use crate::camera::Point;
use crate::doc::{BoardItem, ItemId, ItemStore};

/// An axis-aligned rectangle in logical space with non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle spanned by two corners, normalized so `x, y` is the
    /// top-left regardless of drag direction.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive on all four edges.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Separating-axis test; touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.right() < other.x || self.x > other.right() || self.bottom() < other.y || self.y > other.bottom())
    }
}

/// Bounding box of a list of points. Empty input yields a zero rect at the origin.
#[must_use]
pub fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Axis-aligned bounding box of an item.
///
/// Strokes span their points (a single-point stroke is a zero-area box).
/// Images span `position` plus their display size, which may be zero.
#[must_use]
pub fn bounding_box(item: &BoardItem) -> Rect {
    match item {
        BoardItem::Stroke(s) => points_bounds(&s.points),
        BoardItem::Image(i) => Rect::new(i.position.x, i.position.y, i.width.max(0.0), i.height.max(0.0)),
    }
}

/// Whether `p` lies inside the box of `item`.
#[must_use]
pub fn point_in_item(p: Point, item: &BoardItem) -> bool {
    bounding_box(item).contains(p)
}

/// Find the first currently selected item whose box contains `p`.
///
/// Only selected items are candidates: clicking an unselected item does not
/// start a move. Ids that no longer resolve to an item are skipped.
#[must_use]
pub fn hit_selected(p: Point, doc: &ItemStore, selection: &HashSet<ItemId>) -> Option<ItemId> {
    doc.iter()
        .rev()
        .filter(|item| selection.contains(&item.id()))
        .find(|item| point_in_item(p, item))
        .map(BoardItem::id)
}

/// Ids of every item whose box intersects `rect`, in paint order.
#[must_use]
pub fn items_in_rect(rect: &Rect, doc: &ItemStore) -> Vec<ItemId> {
    doc.iter()
        .filter(|item| rect.intersects(&bounding_box(item)))
        .map(BoardItem::id)
        .collect()
}
