//! Card geometry shared by the on-screen painter and the SVG emitter.
//!
//! Both backends walk the same display lists; this module decides where
//! things go (widget placement transforms, gradient axis, grid lines,
//! overlay positions) so the two outputs line up exactly.

use kurbo::{Affine, Point as KPoint, Vec2};
use sc_core::{
    Bounds, CanvasConfig, CanvasState, Color, ContentTransform, Size, Widget, WidgetId, fit_content,
    registry::ACCENT,
};

/// Distance between grid-glow lines, in canvas units.
pub const GRID_SPACING: f32 = 40.0;
pub const GRID_COLOR: Color = Color::rgba(0.2196, 0.7412, 0.9725, 0.22);
/// Blur applied to the grid lines when the glow is on.
pub const GRID_GLOW_STD_DEV: f32 = 2.0;

pub const SAFE_ZONE_COLOR: Color = Color::rgba(0.957, 0.247, 0.369, 0.14);
pub const SAFE_ZONE_EDGE: Color = Color::rgba(0.957, 0.247, 0.369, 0.7);

pub const SELECTION_COLOR: Color = ACCENT;
pub const LOCK_BADGE_RADIUS: f32 = 9.0;
pub const LOCK_BADGE_FILL: Color = Color::rgba(0.059, 0.09, 0.165, 0.92);

/// Glow halo color drawn behind widget content.
pub const GLOW_COLOR: Color = Color::rgba(0.2196, 0.7412, 0.9725, 0.45);

/// Editor-only decorations. Never part of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlays {
    pub selected: Option<WidgetId>,
    pub safe_zones: bool,
    pub lock_badges: bool,
}

impl Overlays {
    pub const NONE: Overlays = Overlays {
        selected: None,
        safe_zones: false,
        lock_badges: false,
    };

    /// Overlays matching the live editor state.
    pub fn editor(state: &CanvasState) -> Self {
        Self {
            selected: state.selected,
            safe_zones: state.safe_zones_enabled,
            lock_badges: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Where a widget's native-size content ends up on the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub bounds: Bounds,
    pub rotation_deg: f32,
    pub native: Size,
    pub content: ContentTransform,
}

impl Placement {
    pub fn new(widget: &Widget, native: Size) -> Self {
        Self {
            bounds: widget.bounds(),
            rotation_deg: widget.rotation_deg,
            native,
            content: fit_content(widget.size, native),
        }
    }

    /// Box-local → canvas: translate to the box origin, rotate about its center.
    pub fn frame_affine(&self) -> Affine {
        let b = &self.bounds;
        let center = KPoint::new(f64::from(b.width) / 2.0, f64::from(b.height) / 2.0);
        Affine::translate(Vec2::new(f64::from(b.x), f64::from(b.y)))
            * Affine::rotate_about(f64::from(self.rotation_deg).to_radians(), center)
    }

    /// Native content → box-local.
    pub fn content_local_affine(&self) -> Affine {
        let c = &self.content;
        Affine::translate(Vec2::new(f64::from(c.offset_x), f64::from(c.offset_y)))
            * Affine::scale(f64::from(c.scale))
    }

    /// Native content → canvas.
    pub fn content_affine(&self) -> Affine {
        self.frame_affine() * self.content_local_affine()
    }
}

/// Grid-glow lines as `(x1, y1, x2, y2)`, vertical lines first.
pub fn grid_lines(canvas: &CanvasConfig) -> Vec<(f32, f32, f32, f32)> {
    let mut lines = Vec::new();
    let mut x = GRID_SPACING;
    while x < canvas.width {
        lines.push((x, 0.0, x, canvas.height));
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < canvas.height {
        lines.push((0.0, y, canvas.width, y));
        y += GRID_SPACING;
    }
    lines
}

/// Start and end of a CSS-style linear gradient axis over `bounds`.
///
/// `angle_deg` follows the CSS convention: 0 points up, 90 right,
/// 180 down. The axis is long enough for the corners to hit the end stops.
pub fn gradient_endpoints(angle_deg: f32, bounds: &Bounds) -> ((f32, f32), (f32, f32)) {
    let theta = angle_deg.to_radians();
    let (dx, dy) = (theta.sin(), -theta.cos());
    let half = (bounds.width * dx.abs() + bounds.height * dy.abs()) / 2.0;
    let c = bounds.center();
    (
        (c.x - dx * half, c.y - dy * half),
        (c.x + dx * half, c.y + dy * half),
    )
}

/// Lock badge center in box-local coordinates (top-right corner).
pub fn lock_badge_center(bounds: &Bounds) -> (f32, f32) {
    (bounds.width, 0.0)
}
