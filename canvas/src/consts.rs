//! Shared numeric constants for the canvas crate.
//!
//! These are the built-in defaults; [`crate::config::Config`] can override
//! every one of them at mount time.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.01;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Zoom change applied by one wheel notch or zoom button press.
pub const ZOOM_STEP: f64 = 0.1;

/// Zoom values are rounded to this many decimal places after every step.
pub const ZOOM_DECIMALS: i32 = 2;

// ── Pencil ──────────────────────────────────────────────────────

/// Default stroke color for new pencil strokes.
pub const DEFAULT_STROKE_COLOR: &str = "black";

/// Default stroke width for new pencil strokes, in logical units.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

// ── Decoration ──────────────────────────────────────────────────

/// Marquee dash pattern (on, off) in screen pixels.
pub const MARQUEE_DASH_PX: [f64; 2] = [4.0, 2.0];

/// Marquee outline width in screen pixels.
pub const MARQUEE_LINE_PX: f64 = 1.0;

/// Selection box outline width in screen pixels.
pub const SELECTION_LINE_PX: f64 = 2.0;

/// Stroke style shared by the marquee and the selection boxes.
pub const SELECTION_COLOR: &str = "rgba(0,120,255,0.8)";

// ── Persistence ─────────────────────────────────────────────────

/// Endpoint that appends one finished item to a board's stored state.
pub const SUBMIT_URL: &str = "/api/board/additem";
