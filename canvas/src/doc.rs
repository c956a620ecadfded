//! Document model: board items and the in-memory item store.
//!
//! This module defines what is on the canvas (`BoardItem`, a tagged union of
//! `Stroke` and `ImageItem`) and the runtime store that owns them
//! (`ItemStore`). The store is ordered: array order is paint order, later items
//! are drawn on top, and it is append-only except for explicit deletion and
//! undo.
//!
//! Items are deserialized from the board's persisted JSON at load time and are
//! serialized in the same shape when a finished item is submitted.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Unique identifier for a board item.
pub type ItemId = u64;

/// A freehand polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Unique identifier within the board.
    pub id: ItemId,
    /// Logical-space points in drawing order.
    pub points: Vec<Point>,
    /// CSS color string.
    pub color: String,
    /// Line width in logical units.
    pub width: f64,
}

impl Stroke {
    /// Start a new stroke with a single point.
    #[must_use]
    pub fn begin(id: ItemId, start: Point, color: impl Into<String>, width: f64) -> Self {
        Self { id, points: vec![start], color: color.into(), width }
    }

    /// The most recently appended point.
    #[must_use]
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// A stroke with fewer than two points paints nothing.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// A placed raster image. Holds only a URL; pixels are resolved by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Unique identifier within the board.
    pub id: ItemId,
    /// Where the image is loaded from.
    pub url: String,
    /// Top-left anchor in logical space.
    #[serde(rename = "coords")]
    pub position: Point,
    /// Display width in logical units. Zero means "natural size, unknown here".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: f64,
    /// Display height in logical units. Zero means "natural size, unknown here".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: f64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

/// Anything that can sit on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoardItem {
    Stroke(Stroke),
    Image(ImageItem),
}

impl BoardItem {
    #[must_use]
    pub fn id(&self) -> ItemId {
        match self {
            Self::Stroke(s) => s.id,
            Self::Image(i) => i.id,
        }
    }

    /// Short kind name, as used on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stroke(_) => "stroke",
            Self::Image(_) => "image",
        }
    }

    /// Capture the geometry needed to move this item from a fixed origin.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        match self {
            Self::Stroke(s) => Geometry::Points(s.points.clone()),
            Self::Image(i) => Geometry::Anchor(i.position),
        }
    }

    /// Set this item's geometry to `origin` shifted by `(dx, dy)`.
    ///
    /// Returns `false` if `origin` does not match the item's variant.
    pub fn place_from(&mut self, origin: &Geometry, dx: f64, dy: f64) -> bool {
        match (self, origin) {
            (Self::Stroke(s), Geometry::Points(points)) => {
                s.points.clear();
                s.points.extend(points.iter().map(|p| p.translated(dx, dy)));
                true
            }
            (Self::Image(i), Geometry::Anchor(anchor)) => {
                i.position = anchor.translated(dx, dy);
                true
            }
            _ => false,
        }
    }
}

/// A deep copy of an item's position data, taken when a move gesture begins.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Points(Vec<Point>),
    Anchor(Point),
}

/// Error returned by [`ItemStore::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The persisted board state is not a JSON array of board items.
    #[error("invalid board state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a persisted board state: a JSON array of items in paint order.
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the input is not a valid item array.
pub fn parse_items(raw: &str) -> Result<Vec<BoardItem>, LoadError> {
    Ok(serde_json::from_str(raw)?)
}

/// Ordered in-memory store of board items.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<BoardItem>,
    next_id: ItemId,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a persisted snapshot.
    #[must_use]
    pub fn with_items(items: Vec<BoardItem>) -> Self {
        let mut store = Self::new();
        store.load_snapshot(items);
        store
    }

    /// Parse a persisted board state (a JSON array of items).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the input is not a valid item array.
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Ok(Self::with_items(parse_items(raw)?))
    }

    /// Replace all items with a snapshot and reseed the id counter.
    ///
    /// The counter starts at the item count, bumped past the largest existing
    /// id so that ids freed by earlier deletions are never handed out again.
    pub fn load_snapshot(&mut self, items: Vec<BoardItem>) {
        let count = items.len() as ItemId;
        let past_max = items.iter().map(|i| i.id() + 1).max().unwrap_or(0);
        self.next_id = count.max(past_max);
        self.items = items;
    }

    /// Hand out a fresh id.
    pub fn allocate_id(&mut self) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The id the next call to [`ItemStore::allocate_id`] will return.
    #[must_use]
    pub fn next_id(&self) -> ItemId {
        self.next_id
    }

    /// Append an item on top of everything else.
    pub fn push(&mut self, item: BoardItem) {
        self.items.push(item);
    }

    /// Return a reference to an item by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Return a mutable reference to an item by id.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut BoardItem> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    /// Remove every item whose id is in `ids`, returning the removed ids in paint order.
    pub fn remove_ids(&mut self, ids: &HashSet<ItemId>) -> Vec<ItemId> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if ids.contains(&item.id()) {
                removed.push(item.id());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove the most recently appended item. Empty stores stay empty.
    pub fn undo_last(&mut self) -> Option<BoardItem> {
        self.items.pop()
    }

    /// Items in paint order (bottom first).
    pub fn iter(&self) -> std::slice::Iter<'_, BoardItem> {
        self.items.iter()
    }

    /// Mutable items in paint order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, BoardItem> {
        self.items.iter_mut()
    }

    /// Items as a slice in paint order.
    #[must_use]
    pub fn items(&self) -> &[BoardItem] {
        &self.items
    }

    /// Number of items currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the store contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
