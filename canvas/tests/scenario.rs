//! End-to-end scenarios through the public `Engine` with recording
//! collaborators: what the user does, what gets drawn, what gets persisted.
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use boardsy_canvas::camera::{Point, ScreenRect};
use boardsy_canvas::config::Config;
use boardsy_canvas::doc::{BoardItem, ItemStore};
use boardsy_canvas::engine::{Engine, EngineCore};
use boardsy_canvas::input::{Button, Buttons, Key, Modifiers, PointerId, Tool, WheelDelta};
use boardsy_canvas::persist::RecordingSink;
use boardsy_canvas::surface::{RecordingSurface, SurfaceOp};

type TestEngine = Engine<RecordingSurface, RecordingSink>;

const MOUSE: PointerId = PointerId(1);

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn mount(items_json: &str) -> TestEngine {
    let mut engine = Engine::new(
        EngineCore::new(Config::default(), "board-42"),
        Some(RecordingSurface::new()),
        RecordingSink::new(),
    );
    engine.set_origin(ScreenRect::new(0.0, 0.0, 640.0, 480.0));
    engine.resize(640.0, 480.0);
    let store = ItemStore::from_json(items_json).unwrap();
    engine.load_snapshot(store.items().to_vec());
    engine
}

fn drag(engine: &mut TestEngine, from: Point, to: Point) {
    engine.on_pointer_down(MOUSE, from, Button::Primary, Modifiers::default());
    engine.on_pointer_move(MOUSE, to, Buttons::PRIMARY);
    engine.on_pointer_up(MOUSE);
}

fn stroke_points(engine: &TestEngine, id: u64) -> Vec<Point> {
    match engine.item(id) {
        Some(BoardItem::Stroke(s)) => s.points.clone(),
        other => panic!("expected stroke {id}, got {other:?}"),
    }
}

fn ops(engine: &mut TestEngine) -> Vec<SurfaceOp> {
    engine.surface_mut().map(RecordingSurface::take_ops).unwrap_or_default()
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn draw_a_stroke_and_persist_it_once() {
    let mut engine = mount("[]");
    engine.set_tool(Tool::Pencil);

    engine.on_pointer_down(MOUSE, pt(100.0, 100.0), Button::Primary, Modifiers::default());
    engine.on_pointer_move(MOUSE, pt(110.0, 100.0), Buttons::PRIMARY);
    engine.on_pointer_up(MOUSE);

    assert_eq!(stroke_points(&engine, 0), vec![pt(100.0, 100.0), pt(110.0, 100.0)]);
    let submitted = &engine.sink().submitted;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, "board-42");
    assert_eq!(submitted[0].1.id(), 0);
}

#[test]
fn live_segment_matches_the_final_redraw() {
    let mut engine = mount("[]");
    engine.set_device_pixel_ratio(2.0);
    engine.on_wheel(pt(0.0, 0.0), WheelDelta { dy: -1.0 });
    engine.set_tool(Tool::Pencil);
    engine.on_pointer_down(MOUSE, pt(50.0, 60.0), Button::Primary, Modifiers::default());
    ops(&mut engine);

    engine.on_pointer_move(MOUSE, pt(80.0, 90.0), Buttons::PRIMARY);
    let segment = ops(&mut engine);
    let segment_width = segment.iter().find_map(|op| match op {
        SurfaceOp::LineWidth(w) => Some(*w),
        _ => None,
    });

    engine.on_pointer_up(MOUSE);
    let redraw = ops(&mut engine);
    let transform = redraw
        .iter()
        .filter_map(|op| match op {
            SurfaceOp::SetTransform(t) => Some(*t),
            _ => None,
        })
        .last()
        .unwrap();

    let camera = engine.camera();
    let device: Vec<Point> = stroke_points(&engine, 0).iter().map(|p| transform.apply(*p)).collect();
    let segment_points: Vec<Point> = segment
        .iter()
        .filter_map(|op| match op {
            SurfaceOp::MoveTo(p) | SurfaceOp::LineTo(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(segment_points, device);
    assert_eq!(segment_width, Some(2.0 * camera.zoom * 2.0));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_move_and_move_again_without_drift() {
    let mut engine = mount(r#"[{"type":"stroke","id":0,"points":[{"x":0,"y":0},{"x":1,"y":1}],"color":"black","width":2}]"#);

    drag(&mut engine, pt(-1.0, -1.0), pt(2.0, 2.0));
    assert_eq!(engine.selection(), &HashSet::from([0]));

    drag(&mut engine, pt(0.5, 0.5), pt(5.5, 5.5));
    assert_eq!(stroke_points(&engine, 0), vec![pt(5.0, 5.0), pt(6.0, 6.0)]);

    drag(&mut engine, pt(5.5, 5.5), pt(6.5, 5.5));
    assert_eq!(stroke_points(&engine, 0), vec![pt(6.0, 5.0), pt(7.0, 6.0)]);

    assert_eq!(engine.sink().moved.len(), 2);
    assert!(engine.sink().submitted.is_empty());
}

#[test]
fn switching_tool_drops_the_selection() {
    let mut engine = mount("[]");
    engine.core.ui.selection = HashSet::from([3, 7]);
    engine.set_tool(Tool::Pencil);
    assert!(engine.selection().is_empty());
    assert!(engine.core.ui.marquee.is_none());
}

#[test]
fn delete_selected_then_undo_the_rest() {
    let mut engine = mount(
        r#"[
            {"type":"stroke","id":0,"points":[{"x":0,"y":0},{"x":10,"y":10}],"color":"black","width":2},
            {"type":"stroke","id":1,"points":[{"x":100,"y":100},{"x":110,"y":110}],"color":"black","width":2},
            {"type":"image","id":2,"url":"/uploads/a.webp","coords":{"x":300,"y":300}}
        ]"#,
    );
    drag(&mut engine, pt(95.0, 95.0), pt(120.0, 120.0));
    engine.on_key_down(&Key("Delete".to_owned()), Modifiers::default());
    assert!(engine.item(1).is_none());

    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
    engine.on_key_down(&Key("z".to_owned()), ctrl);
    engine.on_key_down(&Key("z".to_owned()), ctrl);
    engine.on_key_down(&Key("z".to_owned()), ctrl);
    assert!(engine.core.doc.is_empty());
    assert_eq!(engine.sink().removed.iter().map(|(_, ids)| ids.clone()).collect::<Vec<_>>(), vec![
        vec![1],
        vec![2],
        vec![0]
    ]);
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn zoom_keeps_the_point_under_the_cursor() {
    let mut engine = mount("[]");
    let cursor = pt(320.0, 200.0);
    let before = engine.core.viewport.to_logical(cursor).unwrap();
    for _ in 0..5 {
        engine.on_wheel(cursor, WheelDelta { dy: -120.0 });
    }
    let after = engine.core.viewport.to_logical(cursor).unwrap();
    assert_eq!(engine.zoom_percent(), 150.0);
    assert!((after.x - before.x).abs() < 1e-9);
    assert!((after.y - before.y).abs() < 1e-9);
}

#[test]
fn right_drag_pans_and_new_strokes_land_in_logical_space() {
    let mut engine = mount("[]");
    engine.on_pointer_down(MOUSE, pt(0.0, 0.0), Button::Secondary, Modifiers::default());
    engine.on_pointer_move(MOUSE, pt(50.0, 20.0), Buttons::SECONDARY);
    engine.on_pointer_up(MOUSE);

    engine.set_tool(Tool::Pencil);
    drag(&mut engine, pt(50.0, 20.0), pt(60.0, 20.0));
    assert_eq!(stroke_points(&engine, 0), vec![pt(0.0, 0.0), pt(10.0, 0.0)]);
}

#[test]
fn placed_image_is_persisted_and_drawn() {
    let mut engine = mount("[]");
    ops(&mut engine);
    engine.place_image("/uploads/cat.webp", pt(40.0, 30.0), 0.0, 0.0);
    assert_eq!(engine.sink().submitted.len(), 1);
    let drawn = ops(&mut engine);
    assert!(drawn.contains(&SurfaceOp::DrawImage {
        url: "/uploads/cat.webp".to_owned(),
        at: pt(40.0, 30.0),
        width: 0.0,
        height: 0.0,
    }));
}
