//! Coordinate transforms between screen space and logical (board) space.
//!
//! Screen space is CSS pixels as reported by pointer events. Logical space is
//! the board's own coordinate system and is what every stored point uses.
//!
//! The inverse mapping is `logical = (screen - origin) / zoom - pan`. The
//! forward mapping used by the renderer is the affine transform
//! `scale = zoom * dpr`, `translate = pan * scale`, so stored geometry is never
//! pre-scaled.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise offset by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Measured bounding rectangle of the canvas element in client coordinates.
///
/// Must be refreshed whenever layout changes (resize, scroll); a stale origin
/// skews every pointer conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Client point relative to the rectangle's top-left corner.
    #[must_use]
    pub fn local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }

    /// Centre of the rectangle in local coordinates.
    #[must_use]
    pub fn local_center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A 2D affine transform in canvas `setTransform(a, b, c, d, e, f)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Uniform scale followed by a translation.
    #[must_use]
    pub fn scale_translate(scale: f64, tx: f64, ty: f64) -> Self {
        Self { a: scale, b: 0.0, c: 0.0, d: scale, e: tx, f: ty }
    }

    /// Map a point through this transform.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }
}

/// Pan/zoom camera on the infinite canvas.
///
/// `pan_x` / `pan_y` are a logical-space translation.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a client-space point to logical coordinates.
    #[must_use]
    pub fn to_logical(&self, client: Point, origin: &ScreenRect) -> Point {
        self.local_to_logical(origin.local(client))
    }

    /// Convert a logical point back to client coordinates.
    #[must_use]
    pub fn to_screen(&self, logical: Point, origin: &ScreenRect) -> Point {
        let local = self.logical_to_local(logical);
        Point::new(local.x + origin.left, local.y + origin.top)
    }

    /// Convert a point already relative to the canvas origin to logical coordinates.
    #[must_use]
    pub fn local_to_logical(&self, local: Point) -> Point {
        Point {
            x: local.x / self.zoom - self.pan_x,
            y: local.y / self.zoom - self.pan_y,
        }
    }

    /// Convert a logical point to coordinates relative to the canvas origin.
    #[must_use]
    pub fn logical_to_local(&self, logical: Point) -> Point {
        Point {
            x: (logical.x + self.pan_x) * self.zoom,
            y: (logical.y + self.pan_y) * self.zoom,
        }
    }

    /// Logical point to backing-buffer (device pixel) coordinates.
    #[must_use]
    pub fn to_device(&self, logical: Point, dpr: f64) -> Point {
        self.device_transform(dpr).apply(logical)
    }

    /// The transform the renderer installs before drawing logical geometry.
    #[must_use]
    pub fn device_transform(&self, dpr: f64) -> Transform {
        let scale = self.zoom * dpr;
        Transform::scale_translate(scale, self.pan_x * scale, self.pan_y * scale)
    }

    /// Convert a screen-space length (pixels) to a logical length.
    ///
    /// Used for decorations that keep a constant on-screen size at any zoom.
    #[must_use]
    pub fn screen_dist_to_logical(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }
}
