//! Drawing surface: the 2D context operations the renderer needs.
//!
//! [`Surface`] mirrors the subset of the Canvas 2D API used by
//! [`crate::render`]. The browser implementation lives in
//! `web_surface`; [`RecordingSurface`] captures calls as [`SurfaceOp`]s so
//! render output can be asserted natively.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::camera::{Point, Transform};
use crate::hit::Rect;

/// Error raised by a drawing surface call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The canvas element could not produce a 2D rendering context.
    #[error("canvas has no 2d context")]
    NoContext,
    /// A context call was rejected by the browser.
    #[error("canvas call `{call}` failed: {message}")]
    Canvas { call: &'static str, message: String },
}

/// Line end and corner shape. Strokes use `Round`; the dashed marquee uses
/// `Butt` caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Round,
    Butt,
}

impl LineStyle {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Butt => "butt",
        }
    }
}

/// The subset of a 2D drawing context used by the renderer.
///
/// Calls the browser can reject return `Result`; the rest are infallible.
pub trait Surface {
    /// Resize the backing buffer in device pixels. Clears the buffer.
    fn resize(&mut self, width: u32, height: u32);

    /// Replace the current transform.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Canvas`] if the context rejects the matrix.
    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError>;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn save(&mut self);

    fn restore(&mut self);

    fn begin_path(&mut self);

    fn move_to(&mut self, p: Point);

    fn line_to(&mut self, p: Point);

    fn stroke(&mut self);

    fn stroke_rect(&mut self, rect: Rect);

    fn set_stroke_style(&mut self, color: &str);

    fn set_line_width(&mut self, width: f64);

    fn set_line_cap(&mut self, style: LineStyle);

    fn set_line_join(&mut self, style: LineStyle);

    /// Set the dash pattern. An empty slice draws solid lines.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Canvas`] if the context rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError>;

    /// Draw the image at `url` with its top-left at `at`.
    ///
    /// A zero `width` or `height` means natural size. Surfaces that have not
    /// finished loading the image skip it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Canvas`] if the context rejects the draw.
    fn draw_image(&mut self, url: &str, at: Point, width: f64, height: f64) -> Result<(), RenderError>;
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Resize(u32, u32),
    SetTransform(Transform),
    ClearRect(Rect),
    Save,
    Restore,
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Stroke,
    StrokeRect(Rect),
    StrokeStyle(String),
    LineWidth(f64),
    LineCap(LineStyle),
    LineJoin(LineStyle),
    LineDash(Vec<f64>),
    DrawImage { url: String, at: Point, width: f64, height: f64 },
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    rejected_images: Vec<String>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Make every later `draw_image` of `url` fail, as a broken image would.
    pub fn reject_image(&mut self, url: impl Into<String>) {
        self.rejected_images.push(url.into());
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// The points of every `move_to`/`line_to` between each `begin_path` and
    /// `stroke`, in the order they were stroked.
    #[must_use]
    pub fn stroked_paths(&self) -> Vec<Vec<Point>> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        for op in &self.ops {
            match op {
                SurfaceOp::BeginPath => current.clear(),
                SurfaceOp::MoveTo(p) | SurfaceOp::LineTo(p) => current.push(*p),
                SurfaceOp::Stroke => paths.push(std::mem::take(&mut current)),
                _ => {}
            }
        }
        paths
    }

    fn record(&mut self, op: SurfaceOp) {
        self.ops.push(op);
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.record(SurfaceOp::Resize(width, height));
    }

    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError> {
        self.record(SurfaceOp::SetTransform(transform));
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(SurfaceOp::ClearRect(Rect::new(x, y, width, height)));
    }

    fn save(&mut self) {
        self.record(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.record(SurfaceOp::Restore);
    }

    fn begin_path(&mut self) {
        self.record(SurfaceOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.record(SurfaceOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.record(SurfaceOp::LineTo(p));
    }

    fn stroke(&mut self) {
        self.record(SurfaceOp::Stroke);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.record(SurfaceOp::StrokeRect(rect));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.record(SurfaceOp::StrokeStyle(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(SurfaceOp::LineWidth(width));
    }

    fn set_line_cap(&mut self, style: LineStyle) {
        self.record(SurfaceOp::LineCap(style));
    }

    fn set_line_join(&mut self, style: LineStyle) {
        self.record(SurfaceOp::LineJoin(style));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        self.record(SurfaceOp::LineDash(segments.to_vec()));
        Ok(())
    }

    fn draw_image(&mut self, url: &str, at: Point, width: f64, height: f64) -> Result<(), RenderError> {
        self.record(SurfaceOp::DrawImage { url: url.to_owned(), at, width, height });
        if self.rejected_images.iter().any(|rejected| rejected == url) {
            return Err(RenderError::Canvas { call: "drawImage", message: format!("{url} is broken") });
        }
        Ok(())
    }
}
