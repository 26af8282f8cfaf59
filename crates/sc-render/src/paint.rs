//! Card → Vello drawing commands.
//!
//! Paints the on-screen card: background, optional grid glow, every widget
//! in ascending z-order (each inside its own opacity layer), then the editor
//! overlays. Widget content comes from the component registry and is placed
//! with the scaling engine's transform, so on-screen and exported output
//! agree.
//!
//! This is the native preview backend, for hosts that own a wgpu surface and
//! hand the scene to a `vello::Renderer`. The browser bridge previews through
//! `svg::render_card_svg` and export rasterizes that same SVG.

use crate::card::{self, Overlays, Placement};
use crate::hit::{HANDLE_SIZE, ResizeAnchor};
use kurbo::{
    Affine, Arc as KurboArc, Cap, Circle, Line, Point, Rect, RoundedRect, Shape, Stroke as KurboStroke,
};
use peniko::{Fill, Gradient, Mix};
use sc_core::background::resolve_gradient;
use sc_core::registry::StrokeSpec;
use sc_core::{
    Background, Bounds, CanvasConfig, CardView, Color, ComponentRegistry, DrawOp, Glow, ProfileRecord,
    Widget,
};
use vello::Scene;

/// Shown under an uploaded image until the scene gets image support.
const IMAGE_FALLBACK: Color = Color::rgba(0.059, 0.09, 0.165, 1.0);

/// Paint the whole card into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`.
/// The caller presents the scene.
pub fn paint_card(
    scene: &mut Scene,
    view: CardView<'_>,
    registry: &ComponentRegistry,
    profile: &ProfileRecord,
    canvas: &CanvasConfig,
    overlays: &Overlays,
) {
    paint_background(scene, view.background, canvas);
    if view.grid_glow_enabled {
        paint_grid(scene, canvas);
    }

    let ordered = view.paint_order();
    for widget in &ordered {
        paint_widget(scene, widget, registry, profile);
    }

    if overlays.safe_zones {
        paint_safe_zones(scene, canvas);
    }
    for widget in &ordered {
        let native = registry.native_size(widget.kind);
        let placement = Placement::new(widget, native);
        if overlays.selected == Some(widget.id) {
            paint_selection(scene, widget, &placement);
        }
        if overlays.lock_badges && widget.locked {
            paint_lock_badge(scene, &placement);
        }
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────────

fn paint_background(scene: &mut Scene, background: &Background, canvas: &CanvasConfig) {
    let bounds = canvas.bounds();
    let rect = to_rect(&bounds);
    match background {
        Background::Gradient { id } => {
            let def = resolve_gradient(id);
            let ((x1, y1), (x2, y2)) = card::gradient_endpoints(def.angle_deg, &bounds);
            let stops: Vec<(f32, peniko::Color)> =
                def.stops.iter().map(|s| (s.offset, to_color(s.color))).collect();
            let gradient = Gradient::new_linear(
                Point::new(f64::from(x1), f64::from(y1)),
                Point::new(f64::from(x2), f64::from(y2)),
            )
            .with_stops(stops.as_slice());
            scene.fill(Fill::NonZero, Affine::IDENTITY, &gradient, None, &rect);
        }
        Background::Image { id, name, .. } => {
            log::trace!("BACKGROUND image {id} ({name:?}) drawn as solid fill on screen");
            scene.fill(Fill::NonZero, Affine::IDENTITY, to_color(IMAGE_FALLBACK), None, &rect);
        }
    }
}

fn paint_grid(scene: &mut Scene, canvas: &CanvasConfig) {
    let stroke = KurboStroke::new(1.0);
    let color = to_color(card::GRID_COLOR);
    for (x1, y1, x2, y2) in card::grid_lines(canvas) {
        let line = Line::new(
            (f64::from(x1), f64::from(y1)),
            (f64::from(x2), f64::from(y2)),
        );
        scene.stroke(&stroke, Affine::IDENTITY, color, None, &line);
    }
}

fn paint_widget(
    scene: &mut Scene,
    widget: &Widget,
    registry: &ComponentRegistry,
    profile: &ProfileRecord,
) {
    let content = registry.render(widget.kind, profile, &widget.style);
    let placement = Placement::new(widget, content.native);
    let transform = placement.content_affine();
    let finish = widget.style.finish().normalized();
    log::trace!(
        "PAINT {} {} at ({}, {}) scale {:.3}",
        widget.kind,
        widget.id,
        widget.position.x,
        widget.position.y,
        placement.content.scale
    );

    let native = Rect::new(
        0.0,
        0.0,
        f64::from(content.native.width),
        f64::from(content.native.height),
    );
    let std_dev = f64::from(finish.glow.blur_std_dev());
    // Clip leaves room for the glow halo.
    let clip = native.inflate(std_dev * 3.0, std_dev * 3.0);
    scene.push_layer(Mix::Normal, finish.opacity, transform, &clip);

    if finish.glow != Glow::Off {
        let radius = native.width().min(native.height()) / 4.0;
        scene.draw_blurred_rounded_rect(transform, native, to_color(card::GLOW_COLOR), radius, std_dev);
    }
    for op in &content.ops {
        paint_op(scene, transform, op);
    }

    scene.pop_layer();
}

fn paint_op(scene: &mut Scene, transform: Affine, op: &DrawOp) {
    match op {
        DrawOp::Rect {
            bounds,
            radius,
            fill,
            stroke,
        } => {
            let shape: RoundedRect = to_rect(bounds).to_rounded_rect(f64::from(*radius));
            fill_shape(scene, transform, &shape, *fill);
            stroke_shape(scene, transform, &shape, *stroke, Cap::Butt);
        }
        DrawOp::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        } => {
            let shape = Circle::new((f64::from(*cx), f64::from(*cy)), f64::from(*r));
            fill_shape(scene, transform, &shape, *fill);
            stroke_shape(scene, transform, &shape, *stroke, Cap::Butt);
        }
        DrawOp::Arc {
            cx,
            cy,
            r,
            start_deg,
            sweep_deg,
            stroke,
        } => {
            let shape = KurboArc::new(
                (f64::from(*cx), f64::from(*cy)),
                (f64::from(*r), f64::from(*r)),
                f64::from(*start_deg).to_radians(),
                f64::from(*sweep_deg).to_radians(),
                0.0,
            );
            stroke_shape(scene, transform, &shape, Some(*stroke), Cap::Round);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            let shape = Line::new(
                (f64::from(*x1), f64::from(*y1)),
                (f64::from(*x2), f64::from(*y2)),
            );
            stroke_shape(scene, transform, &shape, Some(*stroke), Cap::Round);
        }
        DrawOp::Text(run) => {
            log::trace!("TEXT {:?} at ({}, {}) size {}", run.text, run.x, run.y, run.size);
            // Glyph runs need a font context; the SVG card path renders text.
        }
    }
}

// ─── Overlays ────────────────────────────────────────────────────────────────

fn paint_safe_zones(scene: &mut Scene, canvas: &CanvasConfig) {
    let (top, bottom) = canvas.safe_zone_bands();
    let edge = KurboStroke::new(1.0).with_dashes(0.0, [6.0, 4.0]);
    for (band, edge_y) in [(top, top.bottom()), (bottom, bottom.y)] {
        scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            to_color(card::SAFE_ZONE_COLOR),
            None,
            &to_rect(&band),
        );
        let line = Line::new((0.0, f64::from(edge_y)), (f64::from(canvas.width), f64::from(edge_y)));
        scene.stroke(&edge, Affine::IDENTITY, to_color(card::SAFE_ZONE_EDGE), None, &line);
    }
}

fn paint_selection(scene: &mut Scene, widget: &Widget, placement: &Placement) {
    let frame = placement.frame_affine();
    let local = Bounds::new(0.0, 0.0, widget.size.width, widget.size.height);
    let outline = KurboStroke::new(1.5).with_dashes(0.0, [4.0, 3.0]);
    let accent = to_color(card::SELECTION_COLOR);
    scene.stroke(&outline, frame, accent, None, &to_rect(&local));

    if widget.locked {
        return;
    }
    let half = f64::from(HANDLE_SIZE) / 2.0;
    for anchor in ResizeAnchor::ALL {
        let (hx, hy) = anchor.point_on(&local);
        let handle = Rect::from_center_size(
            (f64::from(hx), f64::from(hy)),
            (half * 2.0, half * 2.0),
        );
        scene.fill(Fill::NonZero, frame, to_color(Color::WHITE), None, &handle);
        scene.stroke(&KurboStroke::new(1.0), frame, accent, None, &handle);
    }
}

fn paint_lock_badge(scene: &mut Scene, placement: &Placement) {
    let frame = placement.frame_affine();
    let (cx, cy) = card::lock_badge_center(&placement.bounds);
    let (cx, cy) = (f64::from(cx), f64::from(cy));
    let r = f64::from(card::LOCK_BADGE_RADIUS);
    scene.fill(
        Fill::NonZero,
        frame,
        to_color(card::LOCK_BADGE_FILL),
        None,
        &Circle::new((cx, cy), r),
    );

    let white = to_color(Color::WHITE);
    let body = Rect::new(cx - 4.0, cy - 1.0, cx + 4.0, cy + 5.0).to_rounded_rect(1.0);
    scene.fill(Fill::NonZero, frame, white, None, &body);
    let shackle = KurboArc::new((cx, cy - 1.0), (3.0, 3.5), std::f64::consts::PI, std::f64::consts::PI, 0.0);
    scene.stroke(&KurboStroke::new(1.5), frame, white, None, &shackle);
}

// ─── Fill and stroke ─────────────────────────────────────────────────────────

fn fill_shape(scene: &mut Scene, transform: Affine, shape: &impl Shape, fill: Option<Color>) {
    if let Some(color) = fill {
        scene.fill(Fill::NonZero, transform, to_color(color), None, shape);
    }
}

fn stroke_shape(
    scene: &mut Scene,
    transform: Affine,
    shape: &impl Shape,
    stroke: Option<StrokeSpec>,
    cap: Cap,
) {
    if let Some(spec) = stroke {
        let style = KurboStroke::new(f64::from(spec.width)).with_caps(cap);
        scene.stroke(&style, transform, to_color(spec.color), None, shape);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn to_color(c: Color) -> peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

fn to_rect(b: &Bounds) -> Rect {
    Rect::new(
        f64::from(b.x),
        f64::from(b.y),
        f64::from(b.right()),
        f64::from(b.bottom()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{CanvasState, Point, Size, WidgetId, WidgetKind, WidgetStyle};

    fn card_state() -> CanvasState {
        let mut state = CanvasState {
            grid_glow_enabled: true,
            safe_zones_enabled: true,
            ..Default::default()
        };
        for (i, kind) in WidgetKind::ALL.into_iter().enumerate() {
            state.widgets.push(Widget {
                id: WidgetId::intern(&format!("paint_{i}")),
                kind,
                position: Point::new(10.0 * i as f32, 20.0 * i as f32),
                size: Size::new(120.0, 90.0),
                rotation_deg: 15.0 * i as f32,
                z_order: i as i32,
                locked: i % 2 == 0,
                style: WidgetStyle::default_for(kind),
            });
        }
        state.selected = Some(WidgetId::intern("paint_1"));
        state
    }

    #[test]
    fn paints_every_layer_without_panicking() {
        let state = card_state();
        let mut scene = Scene::new();
        paint_card(
            &mut scene,
            state.view(),
            &ComponentRegistry::builtin(),
            &ProfileRecord::placeholder(),
            &CanvasConfig::default(),
            &Overlays::editor(&state),
        );
    }

    #[test]
    fn paints_placeholders_and_image_backgrounds() {
        let mut state = card_state();
        state.background = Background::Image {
            id: sc_core::BackgroundId::intern("upload_paint"),
            name: "gym.png".into(),
            data_url: "data:image/png;base64,".into(),
        };
        let mut scene = Scene::new();
        paint_card(
            &mut scene,
            state.view(),
            &ComponentRegistry::empty(),
            &ProfileRecord::default(),
            &CanvasConfig::default(),
            &Overlays::NONE,
        );
    }

    #[test]
    fn rects_convert_edge_to_edge() {
        let r = to_rect(&Bounds::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (10.0, 20.0, 40.0, 60.0));
    }
}
