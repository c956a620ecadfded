use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_names_round_trip() {
    for tool in [Tool::Select, Tool::Pencil, Tool::Text, Tool::Shapes] {
        assert_eq!(Tool::from_name(tool.name()), Some(tool));
    }
}

#[test]
fn tool_from_name_accepts_select_alias() {
    assert_eq!(Tool::from_name("select"), Some(Tool::Select));
}

#[test]
fn tool_from_unknown_name_is_none() {
    assert_eq!(Tool::from_name("eraser"), None);
}

#[test]
fn tool_cursor() {
    assert_eq!(Tool::Pencil.cursor(), "crosshair");
    assert_eq!(Tool::Select.cursor(), "default");
    assert_eq!(Tool::Text.cursor(), "default");
}

// =============================================================
// Modifiers / buttons / keys
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.command());
}

#[test]
fn command_is_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

#[test]
fn button_from_dom() {
    assert_eq!(Button::from_dom(0), Button::Primary);
    assert_eq!(Button::from_dom(1), Button::Middle);
    assert_eq!(Button::from_dom(2), Button::Secondary);
    assert_eq!(Button::from_dom(4), Button::Primary);
}

#[test]
fn buttons_primary_bit() {
    assert!(Buttons::PRIMARY.primary());
    assert!(Buttons(3).primary());
    assert!(!Buttons::SECONDARY.primary());
    assert!(!Buttons::NONE.primary());
}

#[test]
fn key_is_case_insensitive() {
    let key = Key("Z".to_owned());
    assert!(key.is("z"));
    assert!(!key.is("y"));
}

// =============================================================
// UiState / InputState
// =============================================================

#[test]
fn ui_state_default_is_empty() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selection.is_empty());
    assert!(ui.marquee.is_none());
}

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(state.in_progress_stroke().is_none());
}

#[test]
fn drawing_state_exposes_stroke() {
    let stroke = Stroke::begin(7, Point::new(1.0, 2.0), "black", 2.0);
    let state = InputState::Drawing { stroke: stroke.clone() };
    assert!(!state.is_idle());
    assert_eq!(state.in_progress_stroke(), Some(&stroke));
}

#[test]
fn panning_state_has_no_stroke() {
    let state = InputState::Panning { start_screen: Point::new(0.0, 0.0), start_pan: Point::new(0.0, 0.0) };
    assert!(state.in_progress_stroke().is_none());
}
