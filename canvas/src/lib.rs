//! Canvas interaction engine for the Boardsy whiteboard.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of a board canvas: translating raw DOM input events into
//! board mutations, maintaining viewport state for pan/zoom across device
//! pixel ratios, hit-testing items, and redrawing the scene. The host layer
//! only wires DOM events to the engine; finished items flow out through an
//! [`persist::ItemSink`].
//!
//! Everything except `web_surface` and `host` builds natively, so the engine
//! is tested with a recording surface and sink instead of a browser.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`doc`] | Board item types and the ordered item store |
//! | [`camera`] | Screen/logical coordinate transforms |
//! | [`viewport`] | Canvas size, pixel ratio, anchored zoom and pan |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Bounding boxes, marquee intersection, selection hits |
//! | [`render`] | Full-scene redraw and the incremental pencil segment |
//! | [`surface`] | Drawing-surface trait and a recording implementation |
//! | [`persist`] | Persistence sink trait and submission encoding |
//! | [`config`] | Runtime settings with defaults from [`consts`] |
//! | [`consts`] | Shared constants (zoom limits, stroke defaults, decoration metrics) |
//! | `web_surface` | Canvas 2D surface (wasm32 only) |
//! | `host` | DOM event wiring exported to JavaScript (wasm32 only) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod persist;
pub mod render;
pub mod surface;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod web_surface;
