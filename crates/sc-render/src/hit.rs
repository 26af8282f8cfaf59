//! Hit testing: point → widget / resize handle.
//!
//! Resize handles of the selected, unlocked widget are checked first (they
//! sit on top of everything), then widget bodies from the highest z-order
//! down. Rotated widgets are tested in their own local frame.

use kurbo::{Affine, Point};
use sc_core::{Bounds, CanvasState, Widget, WidgetId};

/// Side length of a resize handle square, in canvas units.
pub const HANDLE_SIZE: f32 = 10.0;

/// Extra tolerance around handles so they are easy to grab.
const HANDLE_SLOP: f32 = 3.0;

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::Nw,
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, ResizeAnchor::Nw | ResizeAnchor::W | ResizeAnchor::Sw)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeAnchor::Ne | ResizeAnchor::E | ResizeAnchor::Se)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeAnchor::Nw | ResizeAnchor::N | ResizeAnchor::Ne)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeAnchor::Sw | ResizeAnchor::S | ResizeAnchor::Se)
    }

    /// Center of this handle on the (unrotated) box.
    pub fn point_on(self, b: &Bounds) -> (f32, f32) {
        let x = if self.moves_left() {
            b.x
        } else if self.moves_right() {
            b.right()
        } else {
            b.x + b.width / 2.0
        };
        let y = if self.moves_top() {
            b.y
        } else if self.moves_bottom() {
            b.bottom()
        } else {
            b.y + b.height / 2.0
        };
        (x, y)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeAnchor::N => "n",
            ResizeAnchor::Ne => "ne",
            ResizeAnchor::E => "e",
            ResizeAnchor::Se => "se",
            ResizeAnchor::S => "s",
            ResizeAnchor::Sw => "sw",
            ResizeAnchor::W => "w",
            ResizeAnchor::Nw => "nw",
        }
    }
}

/// Which part of a widget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(ResizeAnchor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: WidgetId,
    pub part: HitPart,
}

/// Map a canvas point into the widget's unrotated frame.
fn to_local(widget: &Widget, x: f32, y: f32) -> (f32, f32) {
    if widget.rotation_deg == 0.0 {
        return (x, y);
    }
    let c = widget.bounds().center();
    let unrotate = Affine::rotate_about(
        -f64::from(widget.rotation_deg).to_radians(),
        Point::new(f64::from(c.x), f64::from(c.y)),
    );
    let p = unrotate * Point::new(f64::from(x), f64::from(y));
    (p.x as f32, p.y as f32)
}

/// Find what is under `(x, y)`. Returns `None` for empty background.
pub fn hit_test(state: &CanvasState, x: f32, y: f32) -> Option<Hit> {
    if let Some(widget) = state.selected_widget()
        && !widget.locked
        && let Some(anchor) = hit_handle(widget, x, y)
    {
        return Some(Hit {
            id: widget.id,
            part: HitPart::Handle(anchor),
        });
    }

    hit_widget(&state.widgets, x, y).map(|id| Hit {
        id,
        part: HitPart::Body,
    })
}

/// Topmost widget whose body contains the point.
pub fn hit_widget(widgets: &[Widget], x: f32, y: f32) -> Option<WidgetId> {
    widgets
        .iter()
        .filter(|w| {
            let (lx, ly) = to_local(w, x, y);
            w.bounds().contains(lx, ly)
        })
        .max_by_key(|w| w.z_order)
        .map(|w| w.id)
}

/// Resize handle of `widget` under the point, if any.
pub fn hit_handle(widget: &Widget, x: f32, y: f32) -> Option<ResizeAnchor> {
    let (lx, ly) = to_local(widget, x, y);
    let b = widget.bounds();
    let reach = HANDLE_SIZE / 2.0 + HANDLE_SLOP;
    ResizeAnchor::ALL.into_iter().find(|anchor| {
        let (hx, hy) = anchor.point_on(&b);
        (lx - hx).abs() <= reach && (ly - hy).abs() <= reach
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{Point as CardPoint, Size, WidgetKind, WidgetStyle};

    fn widget(name: &str, x: f32, y: f32, w: f32, h: f32, z: i32) -> Widget {
        Widget {
            id: WidgetId::intern(name),
            kind: WidgetKind::ScoreChip,
            position: CardPoint::new(x, y),
            size: Size::new(w, h),
            rotation_deg: 0.0,
            z_order: z,
            locked: false,
            style: WidgetStyle::default_for(WidgetKind::ScoreChip),
        }
    }

    fn state(widgets: Vec<Widget>) -> CanvasState {
        CanvasState {
            widgets,
            ..Default::default()
        }
    }

    #[test]
    fn topmost_widget_wins() {
        let s = state(vec![
            widget("top", 50.0, 50.0, 100.0, 100.0, 3),
            widget("bottom", 0.0, 0.0, 120.0, 120.0, 1),
        ]);
        assert_eq!(hit_widget(&s.widgets, 60.0, 60.0), Some(WidgetId::intern("top")));
        assert_eq!(hit_widget(&s.widgets, 10.0, 10.0), Some(WidgetId::intern("bottom")));
        assert_eq!(hit_test(&s, 300.0, 300.0), None);
    }

    #[test]
    fn handles_only_on_selected_unlocked_widget() {
        let mut s = state(vec![widget("chip", 100.0, 100.0, 80.0, 40.0, 0)]);
        // Bottom-right corner, unselected: just the body.
        assert_eq!(hit_test(&s, 179.0, 139.0).map(|h| h.part), Some(HitPart::Body));

        s.selected = Some(WidgetId::intern("chip"));
        assert_eq!(
            hit_test(&s, 180.0, 140.0).map(|h| h.part),
            Some(HitPart::Handle(ResizeAnchor::Se))
        );
        assert_eq!(
            hit_test(&s, 140.0, 100.0).map(|h| h.part),
            Some(HitPart::Handle(ResizeAnchor::N))
        );

        s.widgets[0].locked = true;
        assert_eq!(hit_test(&s, 179.0, 139.0).map(|h| h.part), Some(HitPart::Body));
    }

    #[test]
    fn rotated_widget_is_tested_in_local_frame() {
        let mut w = widget("tilted", 100.0, 100.0, 200.0, 20.0, 0);
        // Unrotated, (200, 180) is well below the bar.
        assert!(hit_widget(std::slice::from_ref(&w), 200.0, 180.0).is_none());
        w.rotation_deg = 90.0;
        // Rotated 90° about (200, 110) the bar runs vertically.
        assert_eq!(hit_widget(std::slice::from_ref(&w), 200.0, 180.0), Some(w.id));
        assert!(hit_widget(std::slice::from_ref(&w), 290.0, 110.0).is_none());
    }

    #[test]
    fn anchor_geometry() {
        let b = Bounds::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(ResizeAnchor::Nw.point_on(&b), (10.0, 20.0));
        assert_eq!(ResizeAnchor::E.point_on(&b), (110.0, 45.0));
        assert_eq!(ResizeAnchor::S.point_on(&b), (60.0, 70.0));
        assert!(ResizeAnchor::Sw.moves_left() && ResizeAnchor::Sw.moves_bottom());
    }
}
