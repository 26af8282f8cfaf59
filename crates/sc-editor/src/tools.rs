//! Pointer gestures on the canvas: select, drag, and handle-resize.
//!
//! The controller turns `InputEvent`s into store calls. Moves during a
//! gesture go through `CanvasStore::preview_geometry` (no history), and the
//! release commits once, so a whole drag or resize is one undo step.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Drag | Resize |
//! |----------|------|--------|
//! | **Shift** | Axis-constrain | - |

use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::CanvasStore;
use sc_core::{Bounds, WidgetId};
use sc_render::{HitPart, ResizeAnchor, hit_test};

/// A background press that travels less than this is a click.
pub const CLICK_SLOP: f32 = 3.0;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: WidgetId,
        start: (f32, f32),
        origin: Bounds,
    },
    Resizing {
        id: WidgetId,
        anchor: ResizeAnchor,
        start: (f32, f32),
        origin: Bounds,
    },
    /// Pressed on empty canvas; deselects on release if it stayed a click.
    PressedBackground { start: (f32, f32), moved: bool },
}

impl Gesture {
    /// The widget being moved or resized, if any.
    pub fn target(&self) -> Option<WidgetId> {
        match self {
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DragResizeController {
    gesture: Gesture,
}

impl DragResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture.target().is_some()
    }

    /// Feed one event. Returns `true` when the canvas needs a repaint.
    pub fn handle(&mut self, store: &mut CanvasStore, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down(store, *x, *y),
            InputEvent::PointerMove { x, y, modifiers } => self.pointer_move(store, *x, *y, *modifiers),
            InputEvent::PointerUp { x, y, modifiers } => {
                let moved = self.pointer_move(store, *x, *y, *modifiers);
                self.pointer_up(store) || moved
            }
            InputEvent::PointerCancel => self.cancel(store),
            InputEvent::Key { key, modifiers } => self.key(store, key, *modifiers),
        }
    }

    fn pointer_down(&mut self, store: &mut CanvasStore, x: f32, y: f32) -> bool {
        // A stray down mid-gesture (second finger) ends the old one first.
        let mut repaint = self.finish(store);

        let Some(hit) = hit_test(store.state(), x, y) else {
            self.gesture = Gesture::PressedBackground {
                start: (x, y),
                moved: false,
            };
            return repaint;
        };
        let Some(widget) = store.widget(hit.id) else {
            return repaint;
        };
        let (origin, locked) = (widget.bounds(), widget.locked);

        repaint |= store.select(Some(hit.id));
        self.gesture = match hit.part {
            HitPart::Handle(anchor) => Gesture::Resizing {
                id: hit.id,
                anchor,
                start: (x, y),
                origin,
            },
            HitPart::Body if locked => {
                log::debug!("{} is locked; selecting only", hit.id);
                Gesture::Idle
            }
            HitPart::Body => Gesture::Dragging {
                id: hit.id,
                start: (x, y),
                origin,
            },
        };
        repaint
    }

    fn pointer_move(&mut self, store: &mut CanvasStore, x: f32, y: f32, modifiers: Modifiers) -> bool {
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::PressedBackground { start, moved } => {
                if (x - start.0).hypot(y - start.1) >= CLICK_SLOP {
                    *moved = true;
                }
                false
            }
            Gesture::Dragging { id, start, origin } => {
                let (mut dx, mut dy) = (x - start.0, y - start.1);
                if modifiers.shift {
                    if dx.abs() > dy.abs() {
                        dy = 0.0;
                    } else {
                        dx = 0.0;
                    }
                }
                let moved = Bounds::new(origin.x + dx, origin.y + dy, origin.width, origin.height);
                store.preview_geometry(*id, moved)
            }
            Gesture::Resizing {
                id,
                anchor,
                start,
                origin,
            } => {
                let (id, anchor, origin) = (*id, *anchor, *origin);
                let Some(kind) = store.widget(id).map(|w| w.kind) else {
                    return false;
                };
                let resized = resize_bounds(
                    origin,
                    anchor,
                    x - start.0,
                    y - start.1,
                    store.min_size(kind),
                    store.canvas().bounds(),
                );
                store.preview_geometry(id, resized)
            }
        }
    }

    fn pointer_up(&mut self, store: &mut CanvasStore) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                store.commit();
                false
            }
            Gesture::PressedBackground { moved: false, .. } => store.select(None),
            _ => false,
        }
    }

    /// Commit whatever gesture is in progress and go idle.
    fn finish(&mut self, store: &mut CanvasStore) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => store.commit(),
            _ => false,
        }
    }

    /// Abandon the gesture and put the widget back where it started.
    pub fn cancel(&mut self, store: &mut CanvasStore) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                store.revert_uncommitted();
                true
            }
            _ => false,
        }
    }

    fn key(&mut self, store: &mut CanvasStore, key: &str, modifiers: Modifiers) -> bool {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        if self.is_active() {
            log::debug!("ignoring {action:?} during a pointer gesture");
            return false;
        }
        match action {
            ShortcutAction::Delete => match store.selected() {
                Some(id) => store.delete_widget(id),
                None => false,
            },
            ShortcutAction::Deselect => store.select(None),
        }
    }
}

/// New box for a handle drag of `(dx, dy)` from `origin`.
///
/// Only the edges the anchor owns move; the opposite edges stay put. Moving
/// edges stop at the canvas border and at `min` from the fixed edge.
pub fn resize_bounds(
    origin: Bounds,
    anchor: ResizeAnchor,
    dx: f32,
    dy: f32,
    min: sc_core::Size,
    canvas: Bounds,
) -> Bounds {
    let (mut left, mut top) = (origin.x, origin.y);
    let (mut right, mut bottom) = (origin.right(), origin.bottom());

    if anchor.moves_left() {
        left = (left + dx).max(canvas.x).min(right - min.width);
    }
    if anchor.moves_right() {
        right = (right + dx).min(canvas.right()).max(left + min.width);
    }
    if anchor.moves_top() {
        top = (top + dy).max(canvas.y).min(bottom - min.height);
    }
    if anchor.moves_bottom() {
        bottom = (bottom + dy).min(canvas.bottom()).max(top + min.height);
    }
    Bounds::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sc_core::Size;

    const CANVAS: Bounds = Bounds::new(0.0, 0.0, 360.0, 640.0);
    const MIN: Size = Size::new(22.0, 8.0);

    #[test]
    fn east_handle_moves_right_edge_only() {
        let origin = Bounds::new(100.0, 100.0, 100.0, 50.0);
        let b = resize_bounds(origin, ResizeAnchor::E, 30.0, 99.0, MIN, CANVAS);
        assert_eq!(b, Bounds::new(100.0, 100.0, 130.0, 50.0));
    }

    #[test]
    fn north_west_handle_keeps_south_east_corner() {
        let origin = Bounds::new(100.0, 100.0, 100.0, 50.0);
        let b = resize_bounds(origin, ResizeAnchor::Nw, -20.0, -10.0, MIN, CANVAS);
        assert_eq!(b, Bounds::new(80.0, 90.0, 120.0, 60.0));
        assert_eq!((b.right(), b.bottom()), (200.0, 150.0));
    }

    #[test]
    fn shrinking_stops_at_minimum() {
        let origin = Bounds::new(100.0, 100.0, 100.0, 50.0);
        let b = resize_bounds(origin, ResizeAnchor::Nw, 500.0, 500.0, MIN, CANVAS);
        assert_eq!(b, Bounds::new(178.0, 142.0, 22.0, 8.0));
    }

    #[test]
    fn growing_stops_at_canvas_edge() {
        let origin = Bounds::new(300.0, 600.0, 40.0, 20.0);
        let b = resize_bounds(origin, ResizeAnchor::Se, 100.0, 100.0, MIN, CANVAS);
        assert_eq!(b, Bounds::new(300.0, 600.0, 60.0, 40.0));
        let b = resize_bounds(origin, ResizeAnchor::W, -400.0, 0.0, MIN, CANVAS);
        assert_eq!(b.x, 0.0);
        assert_eq!(b.right(), 340.0);
    }

    #[test]
    fn gesture_target() {
        let id = WidgetId::intern("tools_target");
        let drag = Gesture::Dragging {
            id,
            start: (0.0, 0.0),
            origin: Bounds::default(),
        };
        assert_eq!(drag.target(), Some(id));
        assert_eq!(Gesture::Idle.target(), None);
    }
}
