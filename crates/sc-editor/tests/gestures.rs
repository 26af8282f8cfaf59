//! Integration tests: pointer and keyboard gestures driving the store.

use pretty_assertions::assert_eq;
use sc_core::{Bounds, Point, ProfileRecord, WidgetId, WidgetKind};
use sc_editor::{CanvasStore, DragResizeController, Gesture, InputEvent, Modifiers};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Store with one score chip at (100, 380) 165×60, selected.
fn setup() -> (CanvasStore, DragResizeController, WidgetId) {
    init_logging();
    let mut store = CanvasStore::default();
    store.set_source(Some(ProfileRecord::placeholder()));
    let id = store.add_widget(WidgetKind::ScoreChip).unwrap();
    (store, DragResizeController::new(), id)
}

fn bounds(store: &CanvasStore, id: WidgetId) -> Bounds {
    store.widget(id).unwrap().bounds()
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_moves_live_and_commits_once() {
    let (mut store, mut ctl, id) = setup();
    let len = store.history().len();

    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    assert!(matches!(ctl.gesture(), Gesture::Dragging { .. }));

    ctl.handle(&mut store, &InputEvent::pointer_move(160.0, 420.0));
    assert_eq!(bounds(&store, id), Bounds::new(110.0, 400.0, 165.0, 60.0));
    assert_eq!(store.history().len(), len);

    ctl.handle(&mut store, &InputEvent::pointer_up(170.0, 440.0));
    assert_eq!(bounds(&store, id), Bounds::new(120.0, 420.0, 165.0, 60.0));
    assert_eq!(store.history().len(), len + 1);
    assert_eq!(ctl.gesture(), Gesture::Idle);

    store.undo();
    assert_eq!(bounds(&store, id), Bounds::new(100.0, 380.0, 165.0, 60.0));
}

#[test]
fn drag_is_clamped_to_canvas() {
    let (mut store, mut ctl, id) = setup();
    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(&mut store, &InputEvent::pointer_move(-500.0, 2000.0));
    assert_eq!(bounds(&store, id), Bounds::new(0.0, 580.0, 165.0, 60.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(-500.0, 2000.0));
    assert_eq!(bounds(&store, id).origin(), Point::new(0.0, 580.0));
}

#[test]
fn shift_drag_locks_to_dominant_axis() {
    let (mut store, mut ctl, id) = setup();
    let shift = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(
        &mut store,
        &InputEvent::PointerMove {
            x: 180.0,
            y: 410.0,
            modifiers: shift,
        },
    );
    assert_eq!(bounds(&store, id).origin(), Point::new(130.0, 380.0));
}

#[test]
fn cancel_puts_widget_back() {
    let (mut store, mut ctl, id) = setup();
    let len = store.history().len();
    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(&mut store, &InputEvent::pointer_move(250.0, 100.0));
    assert!(ctl.handle(&mut store, &InputEvent::PointerCancel));
    assert_eq!(bounds(&store, id), Bounds::new(100.0, 380.0, 165.0, 60.0));
    assert_eq!(store.history().len(), len);
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn top_left_resize_keeps_opposite_corner() {
    let (mut store, mut ctl, id) = setup();
    ctl.handle(&mut store, &InputEvent::pointer_down(100.0, 380.0));
    assert!(matches!(ctl.gesture(), Gesture::Resizing { .. }));

    ctl.handle(&mut store, &InputEvent::pointer_move(80.0, 370.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(80.0, 370.0));
    let b = bounds(&store, id);
    assert_eq!(b, Bounds::new(80.0, 370.0, 185.0, 70.0));
    assert_eq!((b.right(), b.bottom()), (265.0, 440.0));
}

#[test]
fn resize_respects_minimum_size() {
    let (mut store, mut ctl, id) = setup();
    // South-east handle, dragged far past the north-west corner.
    ctl.handle(&mut store, &InputEvent::pointer_down(265.0, 440.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(0.0, 0.0));
    let min = store.min_size(WidgetKind::ScoreChip);
    assert_eq!(bounds(&store, id), Bounds::new(100.0, 380.0, min.width, min.height));
}

// ─── Locked widgets ─────────────────────────────────────────────────────

#[test]
fn locked_widget_is_selected_but_never_moved() {
    let (mut store, mut ctl, id) = setup();
    store.set_locked(id, true);
    store.select(None);
    let len = store.history().len();

    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    assert_eq!(store.selected(), Some(id));
    assert_eq!(ctl.gesture(), Gesture::Idle);

    ctl.handle(&mut store, &InputEvent::pointer_move(250.0, 500.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(250.0, 500.0));
    // Corner handles are not live on a locked widget either.
    ctl.handle(&mut store, &InputEvent::pointer_down(100.0, 380.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(60.0, 300.0));

    assert_eq!(bounds(&store, id), Bounds::new(100.0, 380.0, 165.0, 60.0));
    assert_eq!(store.history().len(), len);
}

// ─── Background and keyboard ────────────────────────────────────────────

#[test]
fn background_click_deselects_but_drag_does_not() {
    let (mut store, mut ctl, id) = setup();

    ctl.handle(&mut store, &InputEvent::pointer_down(20.0, 20.0));
    ctl.handle(&mut store, &InputEvent::pointer_move(40.0, 40.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(40.0, 40.0));
    assert_eq!(store.selected(), Some(id));

    ctl.handle(&mut store, &InputEvent::pointer_down(20.0, 20.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(21.0, 21.0));
    assert_eq!(store.selected(), None);
}

#[test]
fn click_picks_topmost_widget() {
    let (mut store, mut ctl, below) = setup();
    let above = store.add_widget(WidgetKind::ScoreChip).unwrap();
    store.select(None);
    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(150.0, 400.0));
    assert_eq!(store.selected(), Some(above));

    store.send_to_back(above);
    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(150.0, 400.0));
    assert_eq!(store.selected(), Some(below));
}

#[test]
fn delete_key_removes_selected_widget() {
    let (mut store, mut ctl, id) = setup();
    let len = store.history().len();
    assert!(ctl.handle(&mut store, &InputEvent::key("Delete")));
    assert!(store.widget(id).is_none());
    assert_eq!(store.history().len(), len + 1);

    // Nothing selected: no-op.
    assert!(!ctl.handle(&mut store, &InputEvent::key("Backspace")));
}

#[test]
fn delete_key_removes_locked_widget() {
    let (mut store, mut ctl, id) = setup();
    store.set_locked(id, true);
    store.select(None);

    ctl.handle(&mut store, &InputEvent::pointer_down(150.0, 400.0));
    ctl.handle(&mut store, &InputEvent::pointer_up(150.0, 400.0));
    assert_eq!(store.selected(), Some(id));
    assert_eq!(bounds(&store, id), Bounds::new(100.0, 380.0, 165.0, 60.0));

    let len = store.history().len();
    assert!(ctl.handle(&mut store, &InputEvent::key("Delete")));
    assert!(store.widget(id).is_none());
    assert_eq!(store.selected(), None);
    assert_eq!(store.history().len(), len + 1);

    assert!(store.undo());
    let restored = store.widget(id).unwrap();
    assert!(restored.locked);
    assert_eq!(restored.bounds(), Bounds::new(100.0, 380.0, 165.0, 60.0));
}

#[test]
fn escape_clears_selection_without_history() {
    let (mut store, mut ctl, _) = setup();
    let len = store.history().len();
    assert!(ctl.handle(&mut store, &InputEvent::key("Escape")));
    assert_eq!(store.selected(), None);
    assert_eq!(store.history().len(), len);
}
