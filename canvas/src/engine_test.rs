#![allow(clippy::float_cmp)]

use super::*;
use crate::collab::RecordingEvent;
use crate::doc::ActiveSlot;

// =============================================================
// Helpers
// =============================================================

const GREEN: Color = Color::rgb(0, 200, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(Size::new(1920, 1080));
    core
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn pt(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

fn key(name: &str) -> Key {
    Key::new(name)
}

fn down(core: &mut EngineCore, x: i32, y: i32) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary, no_modifiers())
}

fn ctrl_down(core: &mut EngineCore, x: i32, y: i32) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary, Modifiers::ctrl())
}

fn drag(core: &mut EngineCore, from: (i32, i32), to: (i32, i32)) -> Vec<Action> {
    let mut actions = down(core, from.0, from.1);
    actions.extend(core.on_pointer_move(pt(to.0, to.1), no_modifiers()));
    actions.extend(core.on_pointer_up(pt(to.0, to.1), Button::Primary, no_modifiers()));
    actions
}

fn type_str(core: &mut EngineCore, s: &str) {
    for c in s.chars() {
        core.on_key_down(&Key::new(c.to_string()), no_modifiers());
    }
}

fn shape(x0: i32, y0: i32, x1: i32, y1: i32) -> Shape {
    Shape::new(pt(x0, y0), pt(x1, y1), Style::default())
}

fn text_at(content: &str, x0: i32, y0: i32, x1: i32, y1: i32) -> Text {
    Text { shape: shape(x0, y0, x1, y1), caret: 0, content: content.into() }
}

struct FakeSource {
    image: Option<RawImage>,
}

impl CanvasSource for FakeSource {
    fn capture(&mut self) -> Result<RawImage, CollabError> {
        self.image.clone().ok_or_else(|| CollabError::Capture("no display".into()))
    }

    fn load_image(&mut self, path: &Path) -> Result<RawImage, CollabError> {
        self.image.clone().ok_or_else(|| CollabError::Load {
            path: path.display().to_string(),
            reason: "missing".into(),
        })
    }
}

#[derive(Default)]
struct CountingRenderer {
    frames: Vec<usize>,
}

impl Renderer for CountingRenderer {
    fn paint(&mut self, session: &EngineCore) -> Result<(), CollabError> {
        self.frames.push(session.store.total());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FakeEncoder {
    resolution: Option<Size>,
    frames: usize,
}

impl Encoder for FakeEncoder {
    fn start(&mut self, resolution: Size) -> Result<(), CollabError> {
        self.resolution = Some(resolution);
        Ok(())
    }

    fn push_frame(&mut self, _frame: &RawImage) -> Result<(), CollabError> {
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CollabError> {
        Ok(())
    }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn core_new_is_idle_and_live() {
    let core = EngineCore::new();
    assert_eq!(core.mode(), EditMode::Idle);
    assert_eq!(core.draw_mode(), AnnotationKind::Rectangle);
    assert!(core.live_mode());
    assert!(core.store.is_empty());
    assert!(core.canvas().is_none());
}

#[test]
fn core_style_uses_configured_stroke_width() {
    let config = OverlayConfig { stroke_width: 7, ..OverlayConfig::default() };
    let core = EngineCore::with_config(config);
    assert_eq!(core.style().stroke_width, 7);
    assert_eq!(core.style().color, Color::RED);
}

#[test]
fn viewport_without_canvas_maps_one_to_one() {
    let core = core();
    assert_eq!(core.camera.canvas_original_size, Size::new(1920, 1080));
    assert_eq!(core.camera.screen_to_canvas(pt(640, 480)), pt(640, 480));
}

// =============================================================
// Drawing shapes
// =============================================================

#[test]
fn drag_commits_rectangle() {
    let mut core = core();
    let actions = drag(&mut core, (100, 100), (200, 200));
    assert_eq!(core.store.rectangles(), &[shape(100, 100, 200, 200)]);
    assert!(actions.contains(&Action::AnnotationAdded { kind: AnnotationKind::Rectangle, index: 0 }));
    assert_eq!(core.mode(), EditMode::Idle);
    assert!(core.gesture().is_none());
}

#[test]
fn pointer_down_enters_drawing_with_collapsed_gesture() {
    let mut core = core();
    let actions = down(&mut core, 40, 50);
    assert_eq!(core.mode(), EditMode::Drawing);
    assert!(actions.contains(&Action::ModeChanged(EditMode::Drawing)));
    let g = core.gesture().unwrap();
    assert_eq!(g.start, pt(40, 50));
    assert_eq!(g.end, pt(40, 50));
}

#[test]
fn pointer_move_updates_gesture_end_without_committing() {
    let mut core = core();
    down(&mut core, 0, 0);
    core.on_pointer_move(pt(30, 40), no_modifiers());
    assert_eq!(core.gesture().unwrap().end, pt(30, 40));
    assert!(core.store.is_empty());
}

#[test]
fn pointer_move_while_idle_is_noop() {
    let mut core = core();
    assert!(core.on_pointer_move(pt(1, 1), no_modifiers()).is_empty());
}

#[test]
fn each_shape_kind_lands_in_its_collection() {
    let mut core = core();
    for kind in [
        AnnotationKind::Rectangle,
        AnnotationKind::Line,
        AnnotationKind::Arrow,
        AnnotationKind::Ellipse,
        AnnotationKind::Highlight,
    ] {
        core.set_draw_mode(kind);
        drag(&mut core, (0, 0), (10, 10));
        assert_eq!(core.store.count(kind), 1, "{kind:?}");
    }
    assert_eq!(core.store.total(), 5);
}

#[test]
fn non_primary_button_is_ignored() {
    let mut core = core();
    assert!(core.on_pointer_down(pt(5, 5), Button::Secondary, no_modifiers()).is_empty());
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn committed_shape_uses_active_style() {
    let mut core = core();
    core.set_color(BLUE);
    core.set_stroke_width(9);
    drag(&mut core, (0, 0), (10, 10));
    assert_eq!(core.store.rectangles()[0].style, Style { color: BLUE, stroke_width: 9 });
}

#[test]
fn drawing_maps_through_zoom() {
    let mut core = core();
    core.camera.zoom_at(pt(0, 0), 2.0);
    drag(&mut core, (200, 200), (400, 400));
    assert_eq!(core.store.rectangles()[0].start, pt(100, 100));
    assert_eq!(core.store.rectangles()[0].end, pt(200, 200));
}

#[test]
fn drawing_maps_through_density() {
    let config = OverlayConfig { density_factor: 2.0, ..OverlayConfig::default() };
    let mut core = EngineCore::with_config(config);
    core.set_viewport(Size::new(1920, 1080));
    core.set_canvas(RawImage::filled(960, 540, GREEN));
    assert_eq!(core.camera.canvas_original_size, Size::new(1920, 1080));
    drag(&mut core, (100, 100), (300, 200));
    assert_eq!(core.store.rectangles()[0].start, pt(50, 50));
    assert_eq!(core.store.rectangles()[0].end, pt(150, 100));
}

// =============================================================
// Freeform
// =============================================================

#[test]
fn freeform_records_distinct_points() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 10, 10);
    core.on_pointer_move(pt(20, 20), no_modifiers());
    core.on_pointer_move(pt(20, 20), no_modifiers());
    core.on_pointer_move(pt(30, 30), no_modifiers());
    let actions = core.on_pointer_up(pt(30, 30), Button::Primary, no_modifiers());
    assert_eq!(core.store.freeforms()[0].points, vec![pt(10, 10), pt(20, 20), pt(30, 30)]);
    assert!(actions.contains(&Action::AnnotationAdded { kind: AnnotationKind::Freeform, index: 0 }));
    assert!(core.store.active().is_none());
}

#[test]
fn freeform_is_active_while_drawing() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 0, 0);
    core.on_pointer_move(pt(5, 5), no_modifiers());
    assert_eq!(core.store.active(), Some(ActiveSlot { kind: AnnotationKind::Freeform, index: 0 }));
}

#[test]
fn freeform_without_movement_is_discarded() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 10, 10);
    let actions = core.on_pointer_up(pt(10, 10), Button::Primary, no_modifiers());
    assert_eq!(core.store.count(AnnotationKind::Freeform), 0);
    assert!(!actions.iter().any(|a| matches!(a, Action::AnnotationAdded { .. })));
    assert!(core.store.active().is_none());
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn freeform_moves_back_to_start_are_discarded() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 10, 10);
    core.on_pointer_move(pt(10, 10), no_modifiers());
    core.on_pointer_up(pt(10, 10), Button::Primary, no_modifiers());
    assert_eq!(core.store.count(AnnotationKind::Freeform), 0);
}

#[test]
fn second_freeform_appends_after_first() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    drag(&mut core, (0, 0), (5, 5));
    drag(&mut core, (50, 50), (60, 60));
    assert_eq!(core.store.freeforms().len(), 2);
    assert_eq!(core.store.freeforms()[1].points, vec![pt(50, 50), pt(60, 60)]);
}

// =============================================================
// Text entry
// =============================================================

fn start_text(core: &mut EngineCore) -> Vec<Action> {
    core.set_draw_mode(AnnotationKind::Text);
    drag(core, (10, 10), (110, 40))
}

#[test]
fn text_drag_enters_typing_with_empty_record() {
    let mut core = core();
    let actions = start_text(&mut core);
    assert_eq!(core.mode(), EditMode::TypingText);
    assert!(actions.contains(&Action::TextEditStarted { index: 0 }));
    assert_eq!(core.store.texts()[0].content, "");
    assert_eq!(core.store.active(), Some(ActiveSlot { kind: AnnotationKind::Text, index: 0 }));
}

#[test]
fn typing_inserts_and_enter_commits() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "hi");
    let actions = core.on_key_down(&key(Key::ENTER), no_modifiers());
    assert_eq!(core.store.texts()[0].content, "hi");
    assert_eq!(core.store.texts()[0].caret, 2);
    assert!(actions.contains(&Action::TextCommitted { index: 0 }));
    assert_eq!(core.mode(), EditMode::Idle);
    assert!(core.store.active().is_none());
}

#[test]
fn empty_text_is_discarded_on_enter() {
    let mut core = core();
    start_text(&mut core);
    let actions = core.on_key_down(&key(Key::ENTER), no_modifiers());
    assert!(actions.contains(&Action::TextDiscarded));
    assert_eq!(core.store.count(AnnotationKind::Text), 0);
}

#[test]
fn escape_behaves_like_enter() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "x");
    core.on_key_down(&key(Key::ESCAPE), no_modifiers());
    assert_eq!(core.mode(), EditMode::Idle);
    assert_eq!(core.store.texts()[0].content, "x");

    start_text(&mut core);
    core.on_key_down(&key(Key::ESCAPE), no_modifiers());
    assert_eq!(core.store.count(AnnotationKind::Text), 1);
}

#[test]
fn modified_enter_inserts_newline() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "a");
    core.on_key_down(&key(Key::ENTER), Modifiers::shift());
    type_str(&mut core, "b");
    core.on_key_down(&key(Key::ENTER), Modifiers::ctrl());
    assert_eq!(core.store.texts()[0].content, "a\nb\n");
    assert_eq!(core.mode(), EditMode::TypingText);
}

#[test]
fn backspace_and_arrows_edit_at_caret() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "ac");
    core.on_key_down(&key(Key::LEFT), no_modifiers());
    type_str(&mut core, "b");
    assert_eq!(core.store.texts()[0].content, "abc");
    core.on_key_down(&key(Key::RIGHT), no_modifiers());
    core.on_key_down(&key(Key::BACKSPACE), no_modifiers());
    assert_eq!(core.store.texts()[0].content, "ab");
}

#[test]
fn backspace_at_start_is_noop() {
    let mut core = core();
    start_text(&mut core);
    core.on_key_down(&key(Key::BACKSPACE), no_modifiers());
    assert_eq!(core.store.texts()[0].caret, 0);
    assert_eq!(core.mode(), EditMode::TypingText);
}

#[test]
fn up_and_down_follow_line_boundaries() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "ab");
    core.on_key_down(&key(Key::ENTER), Modifiers::shift());
    type_str(&mut core, "cd");
    core.on_key_down(&key(Key::LEFT), no_modifiers());
    assert_eq!(core.store.texts()[0].caret, 4);
    core.on_key_down(&key(Key::UP), no_modifiers());
    assert_eq!(core.store.texts()[0].caret, 0);
    core.on_key_down(&key(Key::DOWN), no_modifiers());
    assert_eq!(core.store.texts()[0].caret, 3);
    core.on_key_down(&key(Key::DOWN), no_modifiers());
    assert_eq!(core.store.texts()[0].caret, 5);
}

#[test]
fn ctrl_shortcuts_do_not_type() {
    let mut core = core();
    start_text(&mut core);
    core.on_key_down(&key("z"), Modifiers::ctrl());
    assert_eq!(core.store.texts()[0].content, "");
}

#[test]
fn ctrl_text_draw_freezes_live_canvas() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Text);
    ctrl_down(&mut core, 10, 10);
    let actions = core.on_pointer_up(pt(100, 40), Button::Primary, no_modifiers());
    assert!(actions.contains(&Action::CanvasFrozen));
    assert!(!core.live_mode());
}

#[test]
fn plain_text_draw_keeps_live_canvas() {
    let mut core = core();
    let actions = start_text(&mut core);
    assert!(!actions.contains(&Action::CanvasFrozen));
    assert!(core.live_mode());
}

#[test]
fn ctrl_click_on_text_reenters_it_at_the_end() {
    let mut core = core();
    core.store.push(Annotation::Text(text_at("a", 0, 0, 100, 50)));
    core.store.push(Annotation::Text(text_at("b", 200, 0, 300, 50)));
    let actions = ctrl_down(&mut core, 50, 25);
    assert_eq!(core.mode(), EditMode::TypingText);
    assert!(actions.contains(&Action::TextEditStarted { index: 1 }));
    let contents: Vec<&str> = core.store.texts().iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["b", "a"]);
    type_str(&mut core, "x");
    assert_eq!(core.store.texts()[1].content, "ax");
}

#[test]
fn ctrl_click_away_from_text_starts_drawing() {
    let mut core = core();
    core.store.push(Annotation::Text(text_at("a", 0, 0, 100, 50)));
    ctrl_down(&mut core, 900, 900);
    assert_eq!(core.mode(), EditMode::Drawing);
    assert!(core.gesture().unwrap().modifiers.ctrl);
}

#[test]
fn click_while_typing_commits_and_starts_new_draw() {
    let mut core = core();
    start_text(&mut core);
    type_str(&mut core, "done");
    let actions = down(&mut core, 500, 500);
    assert!(actions.contains(&Action::TextCommitted { index: 0 }));
    assert_eq!(core.mode(), EditMode::Drawing);
    assert!(core.store.active().is_none());
}

// =============================================================
// Delete mode
// =============================================================

#[test]
fn toggle_delete_flips_between_idle_and_deleting() {
    let mut core = core();
    core.toggle_delete();
    assert_eq!(core.mode(), EditMode::Deleting);
    core.toggle_delete();
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn delete_click_removes_hit_and_returns_to_idle() {
    let mut core = core();
    core.store.push(Annotation::Rectangle(shape(100, 100, 200, 200)));
    core.toggle_delete();
    let actions = down(&mut core, 150, 150);
    assert!(actions.contains(&Action::AnnotationRemoved { kind: AnnotationKind::Rectangle, index: 0 }));
    assert!(core.store.is_empty());
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn delete_click_on_overlap_removes_earliest() {
    let mut core = core();
    core.store.push(Annotation::Rectangle(shape(0, 0, 100, 100)));
    core.store.push(Annotation::Rectangle(shape(50, 50, 150, 150)));
    core.toggle_delete();
    down(&mut core, 75, 75);
    assert_eq!(core.store.rectangles(), &[shape(50, 50, 150, 150)]);
}

#[test]
fn delete_click_with_no_hit_only_leaves_mode() {
    let mut core = core();
    core.store.push(Annotation::Rectangle(shape(100, 100, 200, 200)));
    let before = core.store.clone();
    core.toggle_delete();
    down(&mut core, 900, 900);
    assert_eq!(core.store, before);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn delete_targets_current_draw_kind_only() {
    let mut core = core();
    core.store.push(Annotation::Rectangle(shape(100, 100, 200, 200)));
    core.set_draw_mode(AnnotationKind::Ellipse);
    core.toggle_delete();
    down(&mut core, 150, 150);
    assert_eq!(core.store.count(AnnotationKind::Rectangle), 1);
}

#[test]
fn toggle_delete_ignored_while_typing() {
    let mut core = core();
    start_text(&mut core);
    assert!(core.toggle_delete().is_empty());
    assert_eq!(core.mode(), EditMode::TypingText);
}

// =============================================================
// Color picker
// =============================================================

#[test]
fn picker_samples_canvas_color() {
    let mut core = core();
    core.set_canvas(RawImage::filled(1920, 1080, GREEN));
    core.toggle_picker();
    assert_eq!(core.mode(), EditMode::PickingColor);
    let actions = down(&mut core, 10, 10);
    assert!(actions.contains(&Action::ColorPicked(GREEN)));
    assert_eq!(core.style().color, GREEN);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn picker_escape_restores_prior_color() {
    let mut core = core();
    core.toggle_picker();
    core.set_color(BLUE);
    core.escape();
    assert_eq!(core.style().color, Color::RED);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn picker_toggle_off_restores_prior_color() {
    let mut core = core();
    core.toggle_picker();
    core.set_color(BLUE);
    core.toggle_picker();
    assert_eq!(core.style().color, Color::RED);
}

#[test]
fn picker_without_canvas_keeps_color() {
    let mut core = core();
    core.toggle_picker();
    let actions = down(&mut core, 10, 10);
    assert!(!actions.iter().any(|a| matches!(a, Action::ColorPicked(_))));
    assert_eq!(core.style().color, Color::RED);
    assert_eq!(core.mode(), EditMode::Idle);
}

// =============================================================
// Escape / undo / clear-all
// =============================================================

#[test]
fn escape_leaves_delete_mode() {
    let mut core = core();
    core.toggle_delete();
    core.on_key_down(&key(Key::ESCAPE), no_modifiers());
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn escape_resets_zoom_when_zoomed() {
    let mut core = core();
    core.on_wheel(pt(100, 100), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    assert!(core.camera.is_zoomed());
    let actions = core.escape();
    assert!(actions.contains(&Action::ZoomReset));
    assert_eq!(core.camera.zoom_scale, 1.0);
    assert_eq!(core.camera.pan_offset, pt(0, 0));
}

#[test]
fn escape_when_idle_and_unzoomed_is_noop() {
    let mut core = core();
    assert!(core.escape().is_empty());
}

#[test]
fn undo_on_empty_collection_changes_nothing() {
    let mut core = core();
    core.store.push(Annotation::Line(shape(0, 0, 1, 1)));
    let before = core.store.clone();
    assert!(core.undo().is_empty());
    assert_eq!(core.store, before);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn undo_removes_most_recent_of_draw_kind() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    drag(&mut core, (20, 20), (30, 30));
    let actions = core.undo();
    assert!(actions.contains(&Action::AnnotationRemoved { kind: AnnotationKind::Rectangle, index: 1 }));
    assert_eq!(core.store.rectangles(), &[shape(0, 0, 10, 10)]);
}

#[test]
fn undo_ignored_in_modal_state() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    core.toggle_delete();
    assert!(core.undo().is_empty());
    assert_eq!(core.store.total(), 1);
}

#[test]
fn undo_while_typing_drops_active_text_and_ends_edit() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    start_text(&mut core);
    type_str(&mut core, "hi");
    let actions = core.undo();
    assert!(actions.contains(&Action::AnnotationRemoved { kind: AnnotationKind::Text, index: 0 }));
    assert!(actions.contains(&Action::ModeChanged(EditMode::Idle)));
    assert!(core.store.texts().is_empty());
    assert_eq!(core.store.rectangles().len(), 1);
    assert_eq!(core.store.active(), None);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn undo_while_drawing_keeps_the_gesture() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    drag(&mut core, (20, 20), (30, 30));
    down(&mut core, 50, 50);
    let actions = core.undo();
    assert!(actions.contains(&Action::AnnotationRemoved { kind: AnnotationKind::Rectangle, index: 1 }));
    assert_eq!(core.mode(), EditMode::Drawing);
    core.on_pointer_move(pt(60, 60), no_modifiers());
    core.on_pointer_up(pt(60, 60), Button::Primary, no_modifiers());
    assert_eq!(core.store.rectangles(), &[shape(0, 0, 10, 10), shape(50, 50, 60, 60)]);
}

#[test]
fn undo_while_drawing_freeform_discards_stroke() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 0, 0);
    core.on_pointer_move(pt(10, 10), no_modifiers());
    let actions = core.undo();
    assert!(actions.contains(&Action::AnnotationRemoved { kind: AnnotationKind::Freeform, index: 0 }));
    assert!(core.store.freeforms().is_empty());
    assert_eq!(core.mode(), EditMode::Idle);
    assert!(core.gesture().is_none());
    assert!(core.on_pointer_up(pt(20, 20), Button::Primary, no_modifiers()).is_empty());
    assert!(core.store.freeforms().is_empty());
}

#[test]
fn clear_all_while_typing_ends_edit() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    start_text(&mut core);
    type_str(&mut core, "hi");
    let actions = core.clear_all();
    assert!(actions.contains(&Action::Cleared));
    assert!(actions.contains(&Action::ModeChanged(EditMode::Idle)));
    assert!(core.store.is_empty());
    assert_eq!(core.store.active(), None);
    assert_eq!(core.mode(), EditMode::Idle);
    type_str(&mut core, "x");
    assert!(core.store.is_empty());
}

#[test]
fn clear_all_while_drawing_drops_gesture() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    down(&mut core, 40, 40);
    core.clear_all();
    assert_eq!(core.mode(), EditMode::Idle);
    assert!(core.gesture().is_none());
    assert!(core.on_pointer_up(pt(60, 60), Button::Primary, no_modifiers()).is_empty());
    assert!(core.store.is_empty());
}

#[test]
fn clear_all_ignored_in_modal_state() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    core.toggle_picker();
    assert!(core.clear_all().is_empty());
    assert_eq!(core.store.total(), 1);
    assert_eq!(core.mode(), EditMode::PickingColor);
}

#[test]
fn escape_while_drawing_cancels_before_zoom_reset() {
    let mut core = core();
    core.on_wheel(pt(100, 100), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    down(&mut core, 100, 100);
    let actions = core.escape();
    assert!(actions.contains(&Action::ModeChanged(EditMode::Idle)));
    assert!(actions.contains(&Action::ZoomReset));
    assert!(core.gesture().is_none());
    assert!(core.on_pointer_up(pt(300, 300), Button::Primary, no_modifiers()).is_empty());
    assert!(core.store.is_empty());
}

#[test]
fn escape_while_drawing_freeform_discards_stroke() {
    let mut core = core();
    core.set_draw_mode(AnnotationKind::Freeform);
    down(&mut core, 0, 0);
    core.on_pointer_move(pt(10, 10), no_modifiers());
    core.escape();
    assert!(core.store.freeforms().is_empty());
    assert_eq!(core.store.active(), None);
    assert_eq!(core.mode(), EditMode::Idle);
}

#[test]
fn clear_all_empties_store() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    core.set_draw_mode(AnnotationKind::Line);
    drag(&mut core, (0, 0), (10, 10));
    let actions = core.clear_all();
    assert!(actions.contains(&Action::Cleared));
    assert!(core.store.is_empty());
    assert_eq!(core.mode(), EditMode::Idle);
}

// =============================================================
// Wheel / pan
// =============================================================

#[test]
fn wheel_up_zooms_in_by_step() {
    let mut core = core();
    core.on_wheel(pt(0, 0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    assert!((core.camera.zoom_scale - 1.1).abs() < 1e-9);
}

#[test]
fn wheel_down_never_zooms_below_one() {
    let mut core = core();
    core.on_wheel(pt(0, 0), WheelDelta { dx: 0.0, dy: 1.0 }, no_modifiers());
    assert_eq!(core.camera.zoom_scale, 1.0);
}

#[test]
fn wheel_zoom_is_capped() {
    let config = OverlayConfig { max_zoom: 1.5, ..OverlayConfig::default() };
    let mut core = EngineCore::with_config(config);
    core.set_viewport(Size::new(800, 600));
    for _ in 0..20 {
        core.on_wheel(pt(400, 300), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    }
    assert_eq!(core.camera.zoom_scale, 1.5);
}

#[test]
fn horizontal_only_wheel_is_ignored() {
    let mut core = core();
    assert!(core.on_wheel(pt(0, 0), WheelDelta { dx: 5.0, dy: 0.0 }, no_modifiers()).is_empty());
}

#[test]
fn pan_refused_while_live_and_unzoomed() {
    let mut core = core();
    assert!(core.on_pan(pt(50, 0)).is_empty());
    assert_eq!(core.camera.pan_offset, pt(0, 0));
}

#[test]
fn pan_allowed_once_zoomed() {
    let mut core = core();
    core.on_wheel(pt(0, 0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    core.on_pan(pt(100, 0));
    // Canvas is 2112 wide in a 1920 viewport: drag scaled by 1.1.
    assert_eq!(core.camera.pan_offset.x, -110);
}

#[test]
fn pan_is_clamped_to_canvas_edges() {
    let mut core = core();
    core.on_wheel(pt(0, 0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    core.on_pan(pt(-500, -500));
    assert_eq!(core.camera.pan_offset, pt(0, 0));
    core.on_pan(pt(10_000, 10_000));
    assert_eq!(core.camera.pan_offset, pt(1920 - 2112, 1080 - 1188));
}

// =============================================================
// Canvas / collaborators
// =============================================================

#[test]
fn freeze_captures_and_leaves_live_mode() {
    let mut core = core();
    let mut source = FakeSource { image: Some(RawImage::filled(100, 50, GREEN)) };
    let actions = core.freeze(&mut source).unwrap();
    assert!(actions.contains(&Action::CanvasFrozen));
    assert!(!core.live_mode());
    assert_eq!(core.camera.canvas_original_size, Size::new(100, 50));
    assert_eq!(core.camera.viewport_size, Size::new(1920, 1080));
}

#[test]
fn failed_capture_leaves_session_unchanged() {
    let mut core = core();
    let mut source = FakeSource { image: None };
    assert!(core.freeze(&mut source).is_err());
    assert!(core.live_mode());
    assert!(core.canvas().is_none());
}

#[test]
fn load_canvas_installs_image() {
    let mut core = core();
    let mut source = FakeSource { image: Some(RawImage::filled(4, 4, BLUE)) };
    core.load_canvas(&mut source, Path::new("shot.png")).unwrap();
    assert_eq!(core.canvas().map(RawImage::size), Some(Size::new(4, 4)));
    assert!(!core.live_mode());
}

#[test]
fn load_canvas_error_names_path() {
    let mut core = core();
    let mut source = FakeSource { image: None };
    let err = core.load_canvas(&mut source, Path::new("missing.png")).unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn render_hands_session_to_renderer() {
    let mut core = core();
    drag(&mut core, (0, 0), (10, 10));
    let mut renderer = CountingRenderer::default();
    core.render(&mut renderer).unwrap();
    assert_eq!(renderer.frames, vec![1]);
}

#[test]
fn recording_uses_viewport_resolution_and_canvas_frames() {
    let mut core = core();
    let mut recorder = Recorder::new(FakeEncoder::default());
    assert_eq!(core.toggle_recording(&mut recorder).unwrap(), RecordingEvent::Started);
    assert_eq!(recorder.encoder().resolution, Some(Size::new(1920, 1080)));

    core.record_frame(&mut recorder).unwrap();
    assert_eq!(recorder.encoder().frames, 0);
    core.set_canvas(RawImage::filled(2, 2, GREEN));
    core.record_frame(&mut recorder).unwrap();
    assert_eq!(recorder.encoder().frames, 1);

    assert_eq!(core.toggle_recording(&mut recorder).unwrap(), RecordingEvent::Finished);
}

#[test]
fn load_replaces_session_at_zoom_one() {
    let mut core = core();
    core.on_wheel(pt(0, 0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers());
    core.toggle_delete();

    let mut store = AnnotationStore::new();
    store.push(Annotation::Ellipse(shape(1, 2, 3, 4)));
    core.load(store, Some(RawImage::filled(1920, 1080, GREEN)), false);

    assert_eq!(core.mode(), EditMode::Idle);
    assert_eq!(core.camera.zoom_scale, 1.0);
    assert_eq!(core.store.count(AnnotationKind::Ellipse), 1);
    assert!(!core.live_mode());
}

#[test]
fn hover_hit_reports_index_under_cursor() {
    let mut core = core();
    core.store.push(Annotation::Arrow(shape(100, 100, 300, 100)));
    assert_eq!(core.hover_hit(AnnotationKind::Arrow, pt(200, 105)), Some(0));
    assert_eq!(core.hover_hit(AnnotationKind::Arrow, pt(200, 300)), None);
}
