//! Viewport controller: canvas size, device pixel ratio, and pan/zoom steps.
//!
//! Every operation that depends on layout is a silent no-op until the host
//! has measured the canvas element at least once via [`Viewport::set_origin`].

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Camera, Point, ScreenRect};
use crate::config::Config;
use crate::consts::ZOOM_DECIMALS;

/// Direction of a discrete zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// `+1.0` for zooming in, `-1.0` for zooming out.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::In => 1.0,
            Self::Out => -1.0,
        }
    }

    /// Map a wheel delta to a zoom direction. Scrolling up zooms in.
    ///
    /// Returns `None` for a purely horizontal scroll.
    #[must_use]
    pub fn from_wheel(dy: f64) -> Option<Self> {
        if dy < 0.0 {
            Some(Self::In)
        } else if dy > 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Size, pixel density, camera, and cached layout rectangle of the canvas.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
    /// Physical pixels per CSS pixel.
    pub dpr: f64,
    /// Current pan/zoom.
    pub camera: Camera,
    origin: Option<ScreenRect>,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Viewport {
    /// Unmeasured viewport using the zoom limits from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
            camera: Camera::default(),
            origin: None,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
        }
    }

    // --- Layout ---

    /// Update the canvas CSS size. The caller must re-render afterwards since
    /// resizing the backing buffer clears it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Update the device pixel ratio. Non-positive or non-finite values are ignored.
    ///
    /// Returns `true` when the ratio actually changed.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> bool {
        if !dpr.is_finite() || dpr <= 0.0 {
            return false;
        }
        if (self.dpr - dpr).abs() < f64::EPSILON {
            return false;
        }
        self.dpr = dpr;
        true
    }

    /// Cache a fresh measurement of the canvas element's client rectangle.
    pub fn set_origin(&mut self, rect: ScreenRect) {
        self.origin = Some(rect);
    }

    /// The cached client rectangle, if the canvas has been measured.
    #[must_use]
    pub fn origin(&self) -> Option<&ScreenRect> {
        self.origin.as_ref()
    }

    /// Whether the canvas has been measured at least once.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.origin.is_some()
    }

    /// Backing-buffer dimensions in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpr).round().max(0.0) as u32,
            (self.height * self.dpr).round().max(0.0) as u32,
        )
    }

    // --- Coordinates ---

    /// Convert a client point to logical space, or `None` before first measurement.
    #[must_use]
    pub fn to_logical(&self, client: Point) -> Option<Point> {
        self.origin.map(|origin| self.camera.to_logical(client, &origin))
    }

    // --- Zoom ---

    /// Zoom one step in `direction`, keeping the logical point under the
    /// client point `client` fixed on screen.
    ///
    /// Returns `true` if the camera changed.
    pub fn zoom_at_point(&mut self, client: Point, direction: ZoomDirection) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        self.zoom_at_local(origin.local(client), direction)
    }

    /// Zoom one step in `direction`, anchored at the canvas centre.
    ///
    /// Returns `true` if the camera changed.
    pub fn zoom_at_center(&mut self, direction: ZoomDirection) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        self.zoom_at_local(origin.local_center(), direction)
    }

    /// The zoom factor one step away from `current`, clamped and rounded.
    #[must_use]
    pub fn stepped_zoom(&self, current: f64, direction: ZoomDirection) -> f64 {
        let raw = direction.sign().mul_add(self.zoom_step, current);
        round_to(raw.clamp(self.min_zoom, self.max_zoom), ZOOM_DECIMALS).clamp(self.min_zoom, self.max_zoom)
    }

    fn zoom_at_local(&mut self, anchor: Point, direction: ZoomDirection) -> bool {
        let old_zoom = self.camera.zoom;
        let new_zoom = self.stepped_zoom(old_zoom, direction);
        if (new_zoom - old_zoom).abs() < f64::EPSILON {
            return false;
        }
        let shift = 1.0 / new_zoom - 1.0 / old_zoom;
        self.camera.pan_x += anchor.x * shift;
        self.camera.pan_y += anchor.y * shift;
        self.camera.zoom = new_zoom;
        true
    }

    /// Zoom as a whole-number percentage for display.
    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        (self.camera.zoom * 100.0).round()
    }

    // --- Pan ---

    /// Convert a screen-pixel delta to a logical delta at the current zoom and
    /// pixel density.
    fn screen_delta_to_logical(&self, delta: Point) -> Point {
        let scale = self.camera.zoom * self.dpr;
        Point::new(delta.x / scale, delta.y / scale)
    }

    /// Translate the pan offset by a screen-pixel delta.
    ///
    /// Returns `true` if the camera changed.
    pub fn pan(&mut self, delta_screen: Point) -> bool {
        if !self.is_measured() {
            return false;
        }
        let delta = self.screen_delta_to_logical(delta_screen);
        self.camera.pan_x += delta.x;
        self.camera.pan_y += delta.y;
        true
    }

    /// Current pan offset as a point.
    #[must_use]
    pub fn pan_offset(&self) -> Point {
        Point::new(self.camera.pan_x, self.camera.pan_y)
    }

    /// Replace the pan offset.
    pub fn set_pan_offset(&mut self, pan: Point) {
        self.camera.pan_x = pan.x;
        self.camera.pan_y = pan.y;
    }
}

/// Round `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
