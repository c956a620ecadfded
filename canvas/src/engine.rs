use std::collections::{HashMap, HashSet};

use crate::camera::{Camera, Point, ScreenRect};
use crate::config::Config;
use crate::doc::{BoardItem, Geometry, ImageItem, ItemId, ItemStore, Stroke};
use crate::hit::{self, Rect};
use crate::input::{Button, Buttons, InputState, Key, Modifiers, PointerId, Tool, UiState, WheelDelta};
use crate::persist::ItemSink;
use crate::render::{self, Scene};
use crate::surface::Surface;
use crate::viewport::{Viewport, ZoomDirection};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Cursor shown while a pan gesture is active.
const PANNING_CURSOR: &str = "grabbing";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The full scene must be redrawn.
    RenderNeeded,
    /// Paint one pencil segment on top of the current frame.
    DrawSegment { from: Point, to: Point, color: String, width: f64 },
    /// A finished item was appended to the store and should be persisted.
    ItemCompleted { board_id: String, item: BoardItem },
    /// Items were removed locally.
    ItemsRemoved { board_id: String, ids: Vec<ItemId> },
    /// A move gesture was committed with these final items.
    ItemsMoved { board_id: String, items: Vec<BoardItem> },
    SetCursor(String),
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub config: Config,
    pub doc: ItemStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    /// Pointer that owns the active gesture.
    active_pointer: Option<PointerId>,
    board_id: String,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Config::default(), String::new())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: Config, board_id: impl Into<String>) -> Self {
        Self {
            viewport: Viewport::new(&config),
            config,
            doc: ItemStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            active_pointer: None,
            board_id: board_id.into(),
        }
    }

    // --- Data inputs ---

    /// Hydrate the store from persisted board state.
    ///
    /// Drops any selection or active gesture, since they refer to the old items.
    pub fn load_snapshot(&mut self, items: Vec<BoardItem>) -> Vec<Action> {
        self.doc.load_snapshot(items);
        self.ui.selection.clear();
        self.ui.marquee = None;
        self.input = InputState::Idle;
        self.active_pointer = None;
        log::info!("loaded {} items on board {:?}, next id {}", self.doc.len(), self.board_id, self.doc.next_id());
        vec![Action::RenderNeeded]
    }

    // --- Tool ---

    /// Set the active tool.
    ///
    /// Any active gesture is finished first, as if the pointer were released.
    /// Changing tool clears the selection and marquee.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.finish_gesture();
        if self.ui.tool != tool {
            log::debug!("tool {} -> {}", self.ui.tool.name(), tool.name());
            self.ui.tool = tool;
            self.ui.selection.clear();
            self.ui.marquee = None;
            actions.push(Action::RenderNeeded);
        }
        actions.push(Action::SetCursor(tool.cursor().to_owned()));
        actions
    }

    // --- Viewport ---

    /// Update the canvas CSS size. The backing buffer is cleared, so a render always follows.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport.resize(width, height);
        vec![Action::RenderNeeded]
    }

    /// Update the device pixel ratio.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> Vec<Action> {
        if self.viewport.set_device_pixel_ratio(dpr) {
            log::debug!("device pixel ratio now {dpr}");
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Cache a fresh measurement of the canvas element's client rectangle.
    pub fn set_origin(&mut self, rect: ScreenRect) {
        self.viewport.set_origin(rect);
    }

    /// Zoom one step in, anchored at the canvas centre.
    pub fn zoom_in(&mut self) -> Vec<Action> {
        render_if(self.viewport.zoom_at_center(ZoomDirection::In))
    }

    /// Zoom one step out, anchored at the canvas centre.
    pub fn zoom_out(&mut self) -> Vec<Action> {
        render_if(self.viewport.zoom_at_center(ZoomDirection::Out))
    }

    // --- Input events ---

    /// Start a gesture for `pointer`. Ignored while another gesture is active.
    pub fn on_pointer_down(
        &mut self,
        pointer: PointerId,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        let actions = self.begin_gesture(screen_pt, button, modifiers);
        if !self.input.is_idle() {
            self.active_pointer = Some(pointer);
        }
        actions
    }

    /// Continue the active gesture. Moves from any other pointer are ignored.
    pub fn on_pointer_move(&mut self, pointer: PointerId, screen_pt: Point, buttons: Buttons) -> Vec<Action> {
        if self.active_pointer != Some(pointer) {
            return Vec::new();
        }
        let Some(logical) = self.viewport.to_logical(screen_pt) else {
            return Vec::new();
        };

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Drawing { stroke } => {
                if !buttons.primary() {
                    return Vec::new();
                }
                let Some(from) = stroke.last_point() else {
                    return Vec::new();
                };
                stroke.points.push(logical);
                vec![Action::DrawSegment { from, to: logical, color: stroke.color.clone(), width: stroke.width }]
            }
            InputState::MarqueeSelecting { start } => {
                self.ui.marquee = Some(Rect::from_corners(*start, logical));
                vec![Action::RenderNeeded]
            }
            InputState::MovingSelection { start, originals } => {
                let dx = logical.x - start.x;
                let dy = logical.y - start.y;
                for (id, origin) in &*originals {
                    match self.doc.get_mut(*id) {
                        Some(item) => {
                            if !item.place_from(origin, dx, dy) {
                                log::warn!("item {id} changed kind during move");
                            }
                        }
                        None => log::warn!("moved item {id} no longer exists"),
                    }
                }
                vec![Action::RenderNeeded]
            }
            InputState::Panning { start_screen, start_pan } => {
                // Measured from the gesture start so repeated moves do not accumulate error.
                self.viewport.set_pan_offset(*start_pan);
                self.viewport.pan(Point::new(screen_pt.x - start_screen.x, screen_pt.y - start_screen.y));
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Finish the gesture owned by `pointer`. Any button ends it; idle is a no-op.
    pub fn on_pointer_up(&mut self, pointer: PointerId) -> Vec<Action> {
        if self.active_pointer.is_some_and(|owner| owner != pointer) {
            return Vec::new();
        }
        self.finish_gesture()
    }

    /// Pointer cancel is handled exactly like pointer up.
    pub fn on_pointer_cancel(&mut self, pointer: PointerId) -> Vec<Action> {
        self.on_pointer_up(pointer)
    }

    /// Scroll-to-zoom anchored at the pointer. Horizontal-only scrolls are ignored.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let Some(direction) = ZoomDirection::from_wheel(delta.dy) else {
            return Vec::new();
        };
        render_if(self.viewport.zoom_at_point(screen_pt, direction))
    }

    /// Global keyboard shortcuts: Ctrl/Cmd+Z undoes, Delete removes the selection.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() && key.is("z") {
            return self.undo();
        }
        if key.is("Delete") {
            return self.delete_selection();
        }
        Vec::new()
    }

    /// Place an image with its top-left at the logical point under `screen_pt`.
    ///
    /// `width` and `height` are in logical units. Pass zero when the size is
    /// not known yet; [`EngineCore::resolve_image_size`] fills it in later.
    pub fn place_image(&mut self, url: impl Into<String>, screen_pt: Point, width: f64, height: f64) -> Vec<Action> {
        let Some(position) = self.viewport.to_logical(screen_pt) else {
            return Vec::new();
        };
        let id = self.doc.allocate_id();
        let item = BoardItem::Image(ImageItem {
            id,
            url: url.into(),
            position,
            width: width.max(0.0),
            height: height.max(0.0),
        });
        self.complete(item)
    }

    /// Give every unsized image showing `url` its natural size.
    ///
    /// Images that already carry a size keep it.
    pub fn resolve_image_size(&mut self, url: &str, width: f64, height: f64) -> Vec<Action> {
        if width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }
        let mut resolved = 0;
        for item in self.doc.iter_mut() {
            if let BoardItem::Image(image) = item {
                if image.url == url && (image.width <= 0.0 || image.height <= 0.0) {
                    image.width = width;
                    image.height = height;
                    resolved += 1;
                }
            }
        }
        if resolved > 0 {
            log::debug!("sized {resolved} image(s) from {url} to {width}x{height}");
        }
        render_if(resolved > 0)
    }

    // --- Queries ---

    /// Ids of the currently selected items.
    #[must_use]
    pub fn selection(&self) -> &HashSet<ItemId> {
        &self.ui.selection
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.viewport.camera
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.doc.get(id)
    }

    /// Zoom as a whole-number percentage for display.
    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        self.viewport.zoom_percent()
    }

    /// Read-only view of everything the renderer draws.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            items: self.doc.items(),
            in_progress: self.input.in_progress_stroke(),
            selection: &self.ui.selection,
            marquee: self.ui.marquee,
            viewport: &self.viewport,
            config: &self.config,
        }
    }

    // --- Internals ---

    fn begin_gesture(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let Some(logical) = self.viewport.to_logical(screen_pt) else {
            return Vec::new();
        };

        if self.starts_pan(button, modifiers) {
            self.input = InputState::Panning { start_screen: screen_pt, start_pan: self.viewport.pan_offset() };
            return vec![Action::SetCursor(PANNING_CURSOR.to_owned())];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        match self.ui.tool {
            Tool::Pencil => {
                let id = self.doc.allocate_id();
                let stroke = Stroke::begin(id, logical, self.config.stroke_color.clone(), self.config.stroke_width);
                self.input = InputState::Drawing { stroke };
                Vec::new()
            }
            Tool::Select => {
                if hit::hit_selected(logical, &self.doc, &self.ui.selection).is_some() {
                    self.input = InputState::MovingSelection { start: logical, originals: self.snapshot_selection() };
                    Vec::new()
                } else {
                    self.input = InputState::MarqueeSelecting { start: logical };
                    self.ui.marquee = Some(Rect::from_corners(logical, logical));
                    vec![Action::RenderNeeded]
                }
            }
            Tool::Text | Tool::Shapes => Vec::new(),
        }
    }

    fn starts_pan(&self, button: Button, modifiers: Modifiers) -> bool {
        match button {
            Button::Secondary | Button::Middle => true,
            Button::Primary => modifiers.alt && self.ui.tool == Tool::Select,
        }
    }

    /// Deep copy of every selected item's geometry. Stale ids are skipped.
    fn snapshot_selection(&self) -> HashMap<ItemId, Geometry> {
        let mut originals = HashMap::new();
        for id in &self.ui.selection {
            match self.doc.get(*id) {
                Some(item) => {
                    originals.insert(*id, item.geometry());
                }
                None => log::warn!("selected item {id} no longer exists"),
            }
        }
        originals
    }

    fn finish_gesture(&mut self) -> Vec<Action> {
        self.active_pointer = None;
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Drawing { stroke } => self.complete(BoardItem::Stroke(stroke)),
            InputState::MarqueeSelecting { start } => {
                let rect = self.ui.marquee.take().unwrap_or_else(|| Rect::from_corners(start, start));
                self.ui.selection = hit::items_in_rect(&rect, &self.doc).into_iter().collect();
                log::debug!("marquee selected {} items", self.ui.selection.len());
                vec![Action::RenderNeeded]
            }
            InputState::MovingSelection { originals, .. } => {
                let items: Vec<BoardItem> = self
                    .doc
                    .iter()
                    .filter(|item| originals.get(&item.id()).is_some_and(|origin| *origin != item.geometry()))
                    .cloned()
                    .collect();
                let mut actions = vec![Action::RenderNeeded];
                if !items.is_empty() {
                    actions.push(Action::ItemsMoved { board_id: self.board_id.clone(), items });
                }
                actions
            }
            InputState::Panning { .. } => vec![Action::SetCursor(self.ui.tool.cursor().to_owned())],
        }
    }

    /// Append a finished item and request its persistence exactly once.
    fn complete(&mut self, item: BoardItem) -> Vec<Action> {
        log::debug!("completed {} {}", item.kind(), item.id());
        self.doc.push(item.clone());
        vec![Action::ItemCompleted { board_id: self.board_id.clone(), item }, Action::RenderNeeded]
    }

    fn undo(&mut self) -> Vec<Action> {
        let Some(item) = self.doc.undo_last() else {
            return Vec::new();
        };
        let id = item.id();
        self.ui.selection.remove(&id);
        vec![Action::ItemsRemoved { board_id: self.board_id.clone(), ids: vec![id] }, Action::RenderNeeded]
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        let ids = self.doc.remove_ids(&self.ui.selection);
        self.ui.selection.clear();
        if ids.is_empty() {
            log::warn!("selection held only removed items");
            return Vec::new();
        }
        vec![Action::ItemsRemoved { board_id: self.board_id.clone(), ids }, Action::RenderNeeded]
    }
}

fn render_if(changed: bool) -> Vec<Action> {
    if changed { vec![Action::RenderNeeded] } else { Vec::new() }
}

/// The full canvas engine. Wraps `EngineCore`, draws to a surface and hands
/// finished items to a sink.
///
/// A `None` surface (the canvas had no 2D context) turns every render into a no-op.
pub struct Engine<S: Surface, P: ItemSink> {
    pub core: EngineCore,
    surface: Option<S>,
    sink: P,
}

impl<S: Surface, P: ItemSink> Engine<S, P> {
    #[must_use]
    pub fn new(core: EngineCore, surface: Option<S>, sink: P) -> Self {
        Self { core, surface, sink }
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, items: Vec<BoardItem>) -> Vec<Action> {
        let actions = self.core.load_snapshot(items);
        self.dispatch(actions)
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let actions = self.core.set_tool(tool);
        self.dispatch(actions)
    }

    pub fn place_image(&mut self, url: impl Into<String>, screen_pt: Point, width: f64, height: f64) -> Vec<Action> {
        let actions = self.core.place_image(url, screen_pt, width, height);
        self.dispatch(actions)
    }

    pub fn resolve_image_size(&mut self, url: &str, width: f64, height: f64) -> Vec<Action> {
        let actions = self.core.resolve_image_size(url, width, height);
        self.dispatch(actions)
    }

    // --- Viewport ---

    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        let actions = self.core.resize(width, height);
        self.dispatch(actions)
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_device_pixel_ratio(dpr);
        self.dispatch(actions)
    }

    pub fn set_origin(&mut self, rect: ScreenRect) {
        self.core.set_origin(rect);
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let actions = self.core.zoom_in();
        self.dispatch(actions)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let actions = self.core.zoom_out();
        self.dispatch(actions)
    }

    // --- Input events ---

    pub fn on_pointer_down(
        &mut self,
        pointer: PointerId,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        let actions = self.core.on_pointer_down(pointer, screen_pt, button, modifiers);
        self.dispatch(actions)
    }

    pub fn on_pointer_move(&mut self, pointer: PointerId, screen_pt: Point, buttons: Buttons) -> Vec<Action> {
        let actions = self.core.on_pointer_move(pointer, screen_pt, buttons);
        self.dispatch(actions)
    }

    pub fn on_pointer_up(&mut self, pointer: PointerId) -> Vec<Action> {
        let actions = self.core.on_pointer_up(pointer);
        self.dispatch(actions)
    }

    pub fn on_pointer_cancel(&mut self, pointer: PointerId) -> Vec<Action> {
        let actions = self.core.on_pointer_cancel(pointer);
        self.dispatch(actions)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let actions = self.core.on_wheel(screen_pt, delta);
        self.dispatch(actions)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers);
        self.dispatch(actions)
    }

    // --- Render ---

    /// Draw the current state to the surface.
    pub fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(e) = render::draw(surface, &self.core.scene()) {
            log::warn!("render failed: {e}");
        }
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &HashSet<ItemId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.core.item(id)
    }

    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        self.core.zoom_percent()
    }

    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    #[must_use]
    pub fn sink(&self) -> &P {
        &self.sink
    }

    // --- Dispatch ---

    /// Apply side effects for `actions` and hand them back to the host.
    ///
    /// Sink calls happen in order. A requested full render is done once and
    /// supersedes any incremental segments in the same batch.
    fn dispatch(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let mut full_render = false;
        for action in &actions {
            match action {
                Action::RenderNeeded => full_render = true,
                Action::ItemCompleted { board_id, item } => self.sink.submit_item(item, board_id),
                Action::ItemsRemoved { board_id, ids } => self.sink.items_removed(board_id, ids),
                Action::ItemsMoved { board_id, items } => self.sink.items_moved(board_id, items),
                Action::DrawSegment { .. } | Action::SetCursor(_) => {}
            }
        }

        if full_render {
            self.render();
        } else {
            for action in &actions {
                if let Action::DrawSegment { from, to, color, width } = action {
                    self.draw_segment(*from, *to, color, *width);
                }
            }
        }
        actions
    }

    fn draw_segment(&mut self, from: Point, to: Point, color: &str, width: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(e) = render::draw_segment(surface, &self.core.viewport, from, to, color, width) {
            log::warn!("segment draw failed: {e}");
        }
    }
}
