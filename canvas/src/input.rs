//! Pointer, wheel and keyboard vocabulary plus the board's gesture states.
//!
//! `Tool`, `Modifiers` and the button types describe a single DOM event after
//! the host has decoded it. `InputState` is the gesture between pointer-down
//! and pointer-up: the in-progress stroke, the marquee anchor, the snapshot a
//! move is measured from, or the pan origin.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::{HashMap, HashSet};

use crate::camera::Point;
use crate::doc::{Geometry, ItemId, Stroke};
use crate::hit::Rect;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Marquee selection and moving the selection (default).
    #[default]
    Select,
    /// Freehand drawing.
    Pencil,
    /// Text tool. Present in the toolbar only; pointer input is ignored.
    Text,
    /// Shapes tool. Present in the toolbar only; pointer input is ignored.
    Shapes,
}

impl Tool {
    /// Parse a toolbar name (`"selector"`, `"pencil"`, `"text"`, `"shapes"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "selector" | "select" => Some(Self::Select),
            "pencil" => Some(Self::Pencil),
            "text" => Some(Self::Text),
            "shapes" => Some(Self::Shapes),
            _ => None,
        }
    }

    /// Toolbar name of this tool.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "selector",
            Self::Pencil => "pencil",
            Self::Text => "text",
            Self::Shapes => "shapes",
        }
    }

    /// CSS cursor shown over the canvas while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pencil => "crosshair",
            Self::Select | Self::Text | Self::Shapes => "default",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Identity of one pointer (mouse, pen, or a single finger), as in DOM `PointerEvent.pointerId`.
///
/// A gesture belongs to the pointer that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

/// Bitmask of buttons held during a pointer move, as in DOM `PointerEvent.buttons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const SECONDARY: Self = Self(2);

    /// Whether the primary button is held.
    #[must_use]
    pub fn primary(self) -> bool {
        self.0 & 1 != 0
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Case-insensitive comparison against a single key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta. Only the vertical axis zooms.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Ids of the currently selected items.
    pub selection: HashSet<ItemId>,
    /// Live marquee rectangle in logical space, only while a marquee gesture runs.
    pub marquee: Option<Rect>,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The pencil is down and a stroke is being recorded.
    Drawing {
        /// The in-progress stroke; not yet part of the item store.
        stroke: Stroke,
    },
    /// The user is dragging a selection rectangle over empty space.
    MarqueeSelecting {
        /// Logical position of the pointer-down that started the marquee.
        start: Point,
    },
    /// The user is dragging the current selection.
    MovingSelection {
        /// Logical position of the pointer-down that started the move.
        start: Point,
        /// Geometry of every selected item at gesture start.
        originals: HashMap<ItemId, Geometry>,
    },
    /// The user is panning the canvas.
    Panning {
        /// Client position of the pointer-down, used to compute the total delta.
        start_screen: Point,
        /// Pan offset at gesture start.
        start_pan: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The stroke being drawn, if the pencil is down.
    #[must_use]
    pub fn in_progress_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Drawing { stroke } => Some(stroke),
            _ => None,
        }
    }
}
