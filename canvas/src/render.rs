//! Rendering: draws the full board scene to a [`Surface`].
//!
//! This module receives read-only views of the item store, the viewport and
//! the UI state and produces drawing calls; it never mutates application
//! state. Every full redraw resizes (and so clears) the backing buffer, then
//! draws in logical coordinates under the device transform.
//!
//! [`draw_segment`] is the one incremental path: it paints a single pencil
//! segment in device pixels on top of the previous frame, with the same
//! geometry and line metrics a full redraw would use.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashSet;

use crate::camera::{Camera, Point, Transform};
use crate::config::Config;
use crate::doc::{BoardItem, ImageItem, ItemId, Stroke};
use crate::hit::{self, Rect};
use crate::surface::{LineStyle, RenderError, Surface};
use crate::viewport::Viewport;

/// Everything the renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Items in paint order.
    pub items: &'a [BoardItem],
    /// The stroke being drawn, not yet in `items`.
    pub in_progress: Option<&'a Stroke>,
    pub selection: &'a HashSet<ItemId>,
    pub marquee: Option<Rect>,
    pub viewport: &'a Viewport,
    pub config: &'a Config,
}

/// Draw the full scene: items, the in-progress stroke, then selection UI.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn draw<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), RenderError> {
    let vp = scene.viewport;
    let (width, height) = vp.backing_size();

    // Layer 1: resize, clear, and install the device transform.
    surface.resize(width, height);
    surface.set_transform(Transform::IDENTITY)?;
    surface.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
    surface.set_transform(vp.camera.device_transform(vp.dpr))?;

    // Layer 2: items in paint order (bottom first). A failed image skips only itself.
    for item in scene.items {
        if let Err(e) = draw_item(surface, item) {
            log::warn!("item {} not drawn: {e}", item.id());
        }
    }

    // Layer 3: the active stroke, styled like a finished one.
    if let Some(stroke) = scene.in_progress {
        draw_stroke(surface, stroke);
    }

    // Layer 4: selection UI.
    if let Some(m) = scene.marquee {
        draw_marquee(surface, m, &vp.camera, scene.config)?;
    } else if !scene.selection.is_empty() {
        draw_selection(surface, scene.items, scene.selection, &vp.camera, scene.config);
    }

    Ok(())
}

/// Paint one pencil segment directly in device pixels.
///
/// Endpoints go through the same transform a full redraw installs, and the
/// line width is scaled by `zoom * dpr`, so the pixels match what [`draw`]
/// would produce for this segment.
///
/// # Errors
///
/// Returns `Err` if the surface rejects the identity transform.
pub fn draw_segment<S: Surface>(
    surface: &mut S,
    viewport: &Viewport,
    from: Point,
    to: Point,
    color: &str,
    width: f64,
) -> Result<(), RenderError> {
    let camera = &viewport.camera;
    let dpr = viewport.dpr;

    surface.save();
    surface.set_transform(Transform::IDENTITY)?;
    apply_line_style(surface, color, width * camera.zoom * dpr);
    surface.begin_path();
    surface.move_to(camera.to_device(from, dpr));
    surface.line_to(camera.to_device(to, dpr));
    surface.stroke();
    surface.restore();
    Ok(())
}

// =============================================================
// Items
// =============================================================

fn draw_item<S: Surface>(surface: &mut S, item: &BoardItem) -> Result<(), RenderError> {
    match item {
        BoardItem::Stroke(s) => {
            draw_stroke(surface, s);
            Ok(())
        }
        BoardItem::Image(i) => draw_image(surface, i),
    }
}

/// Connected polyline through the stroke's points. Single-point strokes paint nothing.
fn draw_stroke<S: Surface>(surface: &mut S, stroke: &Stroke) {
    if !stroke.is_drawable() {
        return;
    }
    let [first, rest @ ..] = stroke.points.as_slice() else {
        return;
    };

    surface.save();
    apply_line_style(surface, &stroke.color, stroke.width);
    surface.begin_path();
    surface.move_to(*first);
    for p in rest {
        surface.line_to(*p);
    }
    surface.stroke();
    surface.restore();
}

fn draw_image<S: Surface>(surface: &mut S, image: &ImageItem) -> Result<(), RenderError> {
    surface.draw_image(&image.url, image.position, image.width, image.height)
}

// =============================================================
// Selection UI
// =============================================================

/// Dashed marquee with constant on-screen dash length and line width.
///
/// Butt caps keep each dash exactly its configured length.
fn draw_marquee<S: Surface>(surface: &mut S, marquee: Rect, camera: &Camera, config: &Config) -> Result<(), RenderError> {
    let [dash, gap] = config.marquee_dash_px;
    surface.save();
    surface.set_line_dash(&[camera.screen_dist_to_logical(dash), camera.screen_dist_to_logical(gap)])?;
    surface.set_stroke_style(&config.selection_color);
    surface.set_line_width(camera.screen_dist_to_logical(config.marquee_line_px));
    surface.set_line_cap(LineStyle::Butt);
    surface.stroke_rect(marquee);
    surface.set_line_dash(&[])?;
    surface.restore();
    Ok(())
}

/// Solid box around each selected item. Ids with no item are skipped.
fn draw_selection<S: Surface>(
    surface: &mut S,
    items: &[BoardItem],
    selection: &HashSet<ItemId>,
    camera: &Camera,
    config: &Config,
) {
    surface.save();
    surface.set_stroke_style(&config.selection_color);
    surface.set_line_width(camera.screen_dist_to_logical(config.selection_line_px));
    for item in items.iter().filter(|i| selection.contains(&i.id())) {
        surface.stroke_rect(hit::bounding_box(item));
    }
    surface.restore();
}

// =============================================================
// Helpers
// =============================================================

fn apply_line_style<S: Surface>(surface: &mut S, color: &str, width: f64) {
    surface.set_stroke_style(color);
    surface.set_line_width(width);
    surface.set_line_cap(LineStyle::Round);
    surface.set_line_join(LineStyle::Round);
}
