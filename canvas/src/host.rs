//! Browser host: mounts an [`Engine`] on a `<canvas>` and wires DOM events.
//!
//! Every listener is registered once at mount time and reads the current
//! engine state through a shared `Rc<RefCell<..>>`. Handlers translate DOM
//! events into engine calls and apply the cursor hints the engine returns;
//! rendering and persistence happen inside the engine's own dispatch.
//!
//! The canvas is sized to fill the window. Layout is re-measured on window
//! resize and on scroll of any element (a capturing listener), and the device
//! pixel ratio is watched through a `(resolution: Ndppx)` media query that is
//! re-armed after every change.
//!
//! Each gesture belongs to the pointer that started it; other pointers'
//! moves and releases are passed through with their own ids and ignored by
//! the engine.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent, WheelEvent,
    Window,
};

use crate::camera::{Point, ScreenRect};
use crate::config::Config;
use crate::doc::parse_items;
use crate::engine::{Action, Engine, EngineCore};
use crate::input::{Button, Buttons, Key, Modifiers, PointerId, Tool, WheelDelta};
use crate::persist::HttpSink;
use crate::web_surface::WebSurface;

type BoardEngine = Engine<WebSurface, HttpSink>;
type Shared = Rc<RefCell<BoardEngine>>;

/// Install the panic hook and the console logger.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    if let Err(e) = console_log::init_with_level(level) {
        log::debug!("logger already installed: {e}");
    }
}

/// Handle returned to JavaScript for toolbar and zoom controls.
#[wasm_bindgen]
pub struct BoardHandle {
    engine: Shared,
    canvas: HtmlCanvasElement,
}

#[wasm_bindgen]
impl BoardHandle {
    /// Switch tool by toolbar name. Returns `false` for unknown names.
    pub fn set_tool(&self, name: &str) -> bool {
        let Some(tool) = Tool::from_name(name) else {
            log::warn!("unknown tool {name:?}");
            return false;
        };
        with_engine(&self.engine, &self.canvas, |engine| engine.set_tool(tool));
        true
    }

    /// Zoom in one step around the canvas centre and return the new percentage.
    pub fn zoom_in(&self) -> f64 {
        with_engine(&self.engine, &self.canvas, BoardEngine::zoom_in);
        self.zoom_percent()
    }

    /// Zoom out one step around the canvas centre and return the new percentage.
    pub fn zoom_out(&self) -> f64 {
        with_engine(&self.engine, &self.canvas, BoardEngine::zoom_out);
        self.zoom_percent()
    }

    pub fn zoom_percent(&self) -> f64 {
        self.engine.try_borrow().map_or(100.0, |engine| engine.zoom_percent())
    }

    /// Place an uploaded image at a client-space position.
    ///
    /// `width` and `height` are the display size in board units; pass zero to
    /// use the image's natural size once it loads.
    pub fn place_image(&self, url: &str, client_x: f64, client_y: f64, width: f64, height: f64) {
        let url = url.to_owned();
        with_engine(&self.engine, &self.canvas, move |engine| {
            engine.place_image(url, Point::new(client_x, client_y), width, height)
        });
    }
}

/// Mount a board on the canvas with id `canvas_id`.
///
/// `items_json` is the persisted board state (a JSON array of items).
/// `config_json` optionally overrides [`Config`] defaults.
///
/// # Errors
///
/// Returns a JS error string if the canvas is missing, the item or config
/// JSON is invalid, or listener registration fails.
#[wasm_bindgen]
pub fn mount_board(
    canvas_id: &str,
    board_id: &str,
    items_json: &str,
    config_json: Option<String>,
) -> Result<BoardHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| js_error(&format!("no element #{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error(&format!("#{canvas_id} is not a canvas")))?;

    let config = match config_json {
        Some(raw) => Config::from_json(&raw).map_err(|e| js_error(&e.to_string()))?,
        None => Config::default(),
    };
    let items = parse_items(items_json).map_err(|e| js_error(&e.to_string()))?;

    let surface = match WebSurface::new(canvas.clone()) {
        Ok(surface) => Some(surface),
        Err(e) => {
            log::error!("rendering disabled: {e}");
            None
        }
    };
    let sink = HttpSink::new(config.submit_url.clone());
    let core = EngineCore::new(config, board_id);
    let engine: Shared = Rc::new(RefCell::new(Engine::new(core, surface, sink)));

    let weak = Rc::downgrade(&engine);
    if let Some(surface) = engine.borrow_mut().surface_mut() {
        surface.set_image_ready(Rc::new(move |url: &str, width, height| image_loaded(&weak, url, width, height)));
    }

    measure(&engine, &canvas, &window);
    with_engine(&engine, &canvas, |engine| {
        let mut actions = engine.load_snapshot(items);
        actions.extend(engine.set_tool(Tool::default()));
        actions
    });

    wire_pointer(&engine, &canvas, &window)?;
    wire_wheel(&engine, &canvas)?;
    wire_keyboard(&engine, &canvas, &window)?;
    wire_layout(&engine, &canvas, &window)?;
    watch_device_pixel_ratio(&engine, &window)?;

    Ok(BoardHandle { engine, canvas })
}

// =============================================================
// Event wiring
// =============================================================

fn wire_pointer(engine: &Shared, canvas: &HtmlCanvasElement, window: &Window) -> Result<(), JsValue> {
    let target: &EventTarget = canvas.as_ref();

    let (e, c) = (engine.clone(), canvas.clone());
    listen(target, "pointerdown", move |ev: PointerEvent| {
        let button = Button::from_dom(ev.button());
        if button != Button::Primary {
            ev.prevent_default();
        }
        let gesture_started = with_engine(&e, &c, |engine| {
            let actions = engine.on_pointer_down(PointerId(ev.pointer_id()), client_point(&ev), button, modifiers(&ev));
            (!engine.core.input.is_idle(), actions)
        });
        if gesture_started == Some(true) {
            if let Err(err) = c.set_pointer_capture(ev.pointer_id()) {
                log::warn!("pointer capture failed: {err:?}");
            }
        }
    })?;

    let (e, c) = (engine.clone(), canvas.clone());
    listen(target, "pointermove", move |ev: PointerEvent| {
        with_engine(&e, &c, |engine| {
            engine.on_pointer_move(PointerId(ev.pointer_id()), client_point(&ev), Buttons(ev.buttons()))
        });
    })?;

    for event in ["pointerup", "pointercancel"] {
        let (e, c) = (engine.clone(), canvas.clone());
        listen(target, event, move |ev: PointerEvent| {
            if c.has_pointer_capture(ev.pointer_id()) {
                if let Err(err) = c.release_pointer_capture(ev.pointer_id()) {
                    log::warn!("pointer release failed: {err:?}");
                }
            }
            with_engine(&e, &c, |engine| engine.on_pointer_up(PointerId(ev.pointer_id())));
        })?;
    }

    // Fallback when capture is lost and the release lands outside the canvas.
    let (e, c) = (engine.clone(), canvas.clone());
    listen(window.as_ref(), "pointerup", move |ev: PointerEvent| {
        with_engine(&e, &c, |engine| engine.on_pointer_up(PointerId(ev.pointer_id())));
    })?;

    listen(target, "contextmenu", |ev: MouseEvent| ev.prevent_default())
}

fn wire_wheel(engine: &Shared, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let (e, c) = (engine.clone(), canvas.clone());
    let cb = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
        ev.prevent_default();
        let delta = WheelDelta { dy: ev.delta_y() };
        with_engine(&e, &c, |engine| engine.on_wheel(client_point(&ev), delta));
    });
    let opts = AddEventListenerOptions::new();
    opts.set_passive(false);
    canvas.add_event_listener_with_callback_and_add_event_listener_options(
        "wheel",
        cb.as_ref().unchecked_ref(),
        &opts,
    )?;
    cb.forget();
    Ok(())
}

fn wire_keyboard(engine: &Shared, canvas: &HtmlCanvasElement, window: &Window) -> Result<(), JsValue> {
    let (e, c) = (engine.clone(), canvas.clone());
    listen(window.as_ref(), "keydown", move |ev: KeyboardEvent| {
        let key = Key(ev.key());
        let mods = Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() };
        let handled = with_engine(&e, &c, |engine| {
            let actions = engine.on_key_down(&key, mods);
            (!actions.is_empty(), actions)
        });
        if handled == Some(true) {
            ev.prevent_default();
        }
    })
}

fn wire_layout(engine: &Shared, canvas: &HtmlCanvasElement, window: &Window) -> Result<(), JsValue> {
    let (e, c, w) = (engine.clone(), canvas.clone(), window.clone());
    listen(window.as_ref(), "resize", move |_: web_sys::Event| {
        measure(&e, &c, &w);
    })?;

    // `scroll` does not bubble; capture sees scrolls of every ancestor container.
    let (e, c) = (engine.clone(), canvas.clone());
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Ok(mut engine) = e.try_borrow_mut() {
            engine.set_origin(client_rect(&c));
        }
    });
    let opts = AddEventListenerOptions::new();
    opts.set_capture(true);
    opts.set_passive(true);
    window.add_event_listener_with_callback_and_add_event_listener_options("scroll", cb.as_ref().unchecked_ref(), &opts)?;
    cb.forget();
    Ok(())
}

/// Re-read the device pixel ratio whenever it stops matching the current one.
fn watch_device_pixel_ratio(engine: &Shared, window: &Window) -> Result<(), JsValue> {
    let query = format!("(resolution: {}dppx)", window.device_pixel_ratio());
    let Some(mql) = window.match_media(&query)? else {
        return Ok(());
    };

    let (e, w) = (engine.clone(), window.clone());
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Ok(mut engine) = e.try_borrow_mut() {
            engine.set_device_pixel_ratio(w.device_pixel_ratio());
        }
        if let Err(err) = watch_device_pixel_ratio(&e, &w) {
            log::warn!("could not re-arm pixel ratio watch: {err:?}");
        }
    });
    let opts = AddEventListenerOptions::new();
    opts.set_once(true);
    mql.add_event_listener_with_callback_and_add_event_listener_options("change", cb.as_ref().unchecked_ref(), &opts)?;
    cb.forget();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Register a listener that lives as long as the page.
fn listen<E>(target: &EventTarget, event: &str, handler: impl FnMut(E) + 'static) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let cb = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Run `f` against the engine and apply any cursor hints it returns.
///
/// Re-entrant calls (an event fired while the engine is already borrowed)
/// are dropped with a warning.
fn with_engine<R: EngineResult>(
    engine: &Shared,
    canvas: &HtmlCanvasElement,
    f: impl FnOnce(&mut BoardEngine) -> R,
) -> Option<R::Value> {
    let Ok(mut guard) = engine.try_borrow_mut() else {
        log::warn!("engine busy; event dropped");
        return None;
    };
    let (value, actions) = f(&mut *guard).split();
    drop(guard);
    apply_cursor(canvas, &actions);
    Some(value)
}

/// Engine calls either return actions alone or a value alongside them.
trait EngineResult {
    type Value;
    fn split(self) -> (Self::Value, Vec<Action>);
}

impl EngineResult for Vec<Action> {
    type Value = ();
    fn split(self) -> ((), Vec<Action>) {
        ((), self)
    }
}

impl EngineResult for (bool, Vec<Action>) {
    type Value = bool;
    fn split(self) -> (bool, Vec<Action>) {
        self
    }
}

fn apply_cursor(canvas: &HtmlCanvasElement, actions: &[Action]) {
    for action in actions {
        if let Action::SetCursor(cursor) = action {
            if let Err(e) = canvas.style().set_property("cursor", cursor) {
                log::warn!("could not set cursor: {e:?}");
            }
        }
    }
}

/// Size unsized items from a freshly loaded image and draw it.
fn image_loaded(engine: &Weak<RefCell<BoardEngine>>, url: &str, width: f64, height: f64) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    let Ok(mut engine) = engine.try_borrow_mut() else {
        log::warn!("engine busy; {url} drawn on the next frame");
        return;
    };
    if engine.resolve_image_size(url, width, height).is_empty() {
        engine.render();
    }
}

/// Fill the window, then refresh the cached client rectangle, canvas size and pixel ratio.
fn measure(engine: &Shared, canvas: &HtmlCanvasElement, window: &Window) {
    match inner_size(window) {
        Some((width, height)) => {
            let style = canvas.style();
            for (property, value) in [("width", width), ("height", height)] {
                if let Err(e) = style.set_property(property, &format!("{value}px")) {
                    log::warn!("could not set canvas {property}: {e:?}");
                }
            }
        }
        None => log::warn!("window has no inner size; keeping the canvas CSS size"),
    }
    let rect = client_rect(canvas);
    with_engine(engine, canvas, |engine| {
        engine.set_origin(rect);
        let mut actions = engine.set_device_pixel_ratio(window.device_pixel_ratio());
        actions.extend(engine.resize(rect.width, rect.height));
        actions
    });
}

fn inner_size(window: &Window) -> Option<(f64, f64)> {
    match (window.inner_width(), window.inner_height()) {
        (Ok(width), Ok(height)) => Some((width.as_f64()?, height.as_f64()?)),
        _ => None,
    }
}

fn client_rect(canvas: &HtmlCanvasElement) -> ScreenRect {
    let rect = canvas.get_bounding_client_rect();
    ScreenRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

fn client_point(ev: &MouseEvent) -> Point {
    Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn modifiers(ev: &MouseEvent) -> Modifiers {
    Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() }
}

fn js_error(message: &str) -> JsValue {
    JsValue::from_str(message)
}
