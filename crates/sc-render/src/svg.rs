//! Card → SVG document.
//!
//! The SVG is the card's complete, self-contained description: the editor
//! preview injects it into the page, and export rasterizes the same string.
//! Coordinates are canvas units; the root `viewBox` is the canvas, so any
//! output resolution is a uniform scale away.

use crate::card::{self, Overlays, Placement};
use crate::hit::{HANDLE_SIZE, ResizeAnchor};
use sc_core::background::resolve_gradient;
use sc_core::registry::{StrokeSpec, TextAnchor};
use sc_core::{
    Background, Bounds, CanvasConfig, CardView, Color, ComponentRegistry, DrawOp, Glow, ProfileRecord,
    Widget,
};
use std::fmt;

const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

/// Compact number formatting: two decimals at most, no trailing zeros.
struct Num(f32);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = (self.0 * 100.0).round() / 100.0;
        if rounded == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{rounded}")
        }
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `fill="…"` (plus opacity when translucent), or `fill="none"`.
fn paint_attr(name: &str, color: Option<Color>) -> String {
    match color {
        None => format!(" {name}=\"none\""),
        Some(c) if c.a >= 1.0 => format!(" {name}=\"{}\"", c.to_hex_rgb()),
        Some(c) => format!(" {name}=\"{}\" {name}-opacity=\"{}\"", c.to_hex_rgb(), Num(c.a)),
    }
}

fn stroke_attrs(stroke: Option<StrokeSpec>) -> String {
    match stroke {
        None => String::new(),
        Some(s) => format!("{} stroke-width=\"{}\"", paint_attr("stroke", Some(s.color)), Num(s.width)),
    }
}

fn glow_filter_id(glow: Glow) -> String {
    format!("glow-{}", glow.as_str())
}

/// Render the card. With `Overlays::NONE` the output is exactly what export
/// rasterizes.
pub fn render_card_svg(
    view: CardView<'_>,
    registry: &ComponentRegistry,
    profile: &ProfileRecord,
    canvas: &CanvasConfig,
    overlays: &Overlays,
) -> String {
    let (w, h) = (Num(canvas.width), Num(canvas.height));
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
    ));

    let ordered = view.paint_order();
    push_defs(&mut svg, view, &ordered, canvas);
    push_background(&mut svg, view.background, canvas);
    if view.grid_glow_enabled {
        push_grid(&mut svg, canvas);
    }

    svg.push_str(&format!("<g font-family=\"{FONT_FAMILY}\">\n"));
    for widget in &ordered {
        push_widget(&mut svg, widget, registry, profile);
    }
    svg.push_str("</g>\n");

    if !overlays.is_empty() {
        push_overlays(&mut svg, &ordered, registry, canvas, overlays);
    }

    svg.push_str("</svg>\n");
    svg
}

fn push_defs(svg: &mut String, view: CardView<'_>, ordered: &[&Widget], canvas: &CanvasConfig) {
    svg.push_str("<defs>\n");

    if let Background::Gradient { id } = view.background {
        let def = resolve_gradient(id);
        let ((x1, y1), (x2, y2)) = card::gradient_endpoints(def.angle_deg, &canvas.bounds());
        svg.push_str(&format!(
            "<linearGradient id=\"card-bg\" gradientUnits=\"userSpaceOnUse\" \
             x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">\n",
            Num(x1),
            Num(y1),
            Num(x2),
            Num(y2)
        ));
        for stop in &def.stops {
            svg.push_str(&format!(
                "<stop offset=\"{}\" stop-color=\"{}\" stop-opacity=\"{}\"/>\n",
                Num(stop.offset),
                stop.color.to_hex_rgb(),
                Num(stop.color.a)
            ));
        }
        svg.push_str("</linearGradient>\n");
    }

    if view.grid_glow_enabled {
        push_glow_filter(svg, "grid-glow", card::GRID_GLOW_STD_DEV);
    }

    // One filter per glow level actually in use.
    for glow in Glow::ALL {
        if glow == Glow::Off {
            continue;
        }
        if ordered.iter().any(|w| w.style.glow() == glow) {
            push_glow_filter(svg, &glow_filter_id(glow), glow.blur_std_dev());
        }
    }

    svg.push_str("</defs>\n");
}

/// Blurred copy merged under the source graphic.
fn push_glow_filter(svg: &mut String, id: &str, std_dev: f32) {
    svg.push_str(&format!(
        "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\n\
         <feGaussianBlur in=\"SourceGraphic\" stdDeviation=\"{}\" result=\"blur\"/>\n\
         <feMerge><feMergeNode in=\"blur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge>\n\
         </filter>\n",
        Num(std_dev)
    ));
}

fn push_background(svg: &mut String, background: &Background, canvas: &CanvasConfig) {
    let (w, h) = (Num(canvas.width), Num(canvas.height));
    match background {
        Background::Gradient { .. } => {
            svg.push_str(&format!(
                "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"url(#card-bg)\"/>\n"
            ));
        }
        Background::Image { data_url, .. } => {
            // Letterbox color shows only if the image fails to decode.
            svg.push_str(&format!(
                "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"#0F172A\"/>\n\
                 <image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" \
                 preserveAspectRatio=\"xMidYMid slice\" xlink:href=\"{}\"/>\n",
                escape_xml(data_url)
            ));
        }
    }
}

fn push_grid(svg: &mut String, canvas: &CanvasConfig) {
    svg.push_str(&format!(
        "<g data-layer=\"grid\"{} stroke-width=\"1\" filter=\"url(#grid-glow)\">\n",
        paint_attr("stroke", Some(card::GRID_COLOR))
    ));
    for (x1, y1, x2, y2) in card::grid_lines(canvas) {
        svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"/>\n",
            Num(x1),
            Num(y1),
            Num(x2),
            Num(y2)
        ));
    }
    svg.push_str("</g>\n");
}

/// `translate(x y) rotate(deg cx cy)` for a widget frame.
fn frame_transform(placement: &Placement) -> String {
    let b = &placement.bounds;
    let mut t = format!("translate({} {})", Num(b.x), Num(b.y));
    if placement.rotation_deg != 0.0 {
        t.push_str(&format!(
            " rotate({} {} {})",
            Num(placement.rotation_deg),
            Num(b.width / 2.0),
            Num(b.height / 2.0)
        ));
    }
    t
}

fn push_widget(svg: &mut String, widget: &Widget, registry: &ComponentRegistry, profile: &ProfileRecord) {
    let content = registry.render(widget.kind, profile, &widget.style);
    let placement = Placement::new(widget, content.native);
    let finish = widget.style.finish().normalized();
    let c = placement.content;

    svg.push_str(&format!(
        "<g data-widget-id=\"{}\" data-kind=\"{}\" transform=\"{}\"",
        escape_xml(widget.id.as_str()),
        widget.kind,
        frame_transform(&placement)
    ));
    if finish.opacity < 1.0 {
        svg.push_str(&format!(" opacity=\"{}\"", Num(finish.opacity)));
    }
    svg.push_str(">\n");

    svg.push_str(&format!(
        "<g transform=\"translate({} {}) scale({})\"",
        Num(c.offset_x),
        Num(c.offset_y),
        c.scale
    ));
    if finish.glow != Glow::Off {
        svg.push_str(&format!(" filter=\"url(#{})\"", glow_filter_id(finish.glow)));
    }
    svg.push_str(">\n");

    for op in &content.ops {
        push_op(svg, op);
    }

    svg.push_str("</g>\n</g>\n");
}

fn push_op(svg: &mut String, op: &DrawOp) {
    match op {
        DrawOp::Rect {
            bounds,
            radius,
            fill,
            stroke,
        } => {
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                Num(bounds.x),
                Num(bounds.y),
                Num(bounds.width),
                Num(bounds.height)
            ));
            if *radius > 0.0 {
                svg.push_str(&format!(" rx=\"{}\"", Num(*radius)));
            }
            svg.push_str(&paint_attr("fill", *fill));
            svg.push_str(&stroke_attrs(*stroke));
            svg.push_str("/>\n");
        }
        DrawOp::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        } => {
            svg.push_str(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}{}/>\n",
                Num(*cx),
                Num(*cy),
                Num(*r),
                paint_attr("fill", *fill),
                stroke_attrs(*stroke)
            ));
        }
        DrawOp::Arc {
            cx,
            cy,
            r,
            start_deg,
            sweep_deg,
            stroke,
        } => {
            if sweep_deg.abs() >= 360.0 {
                svg.push_str(&format!(
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\"{}/>\n",
                    Num(*cx),
                    Num(*cy),
                    Num(*r),
                    stroke_attrs(Some(*stroke))
                ));
                return;
            }
            let point = |deg: f32| {
                let (sin, cos) = deg.to_radians().sin_cos();
                (cx + r * cos, cy + r * sin)
            };
            let (sx, sy) = point(*start_deg);
            let (ex, ey) = point(start_deg + sweep_deg);
            let large_arc = u8::from(sweep_deg.abs() > 180.0);
            let sweep_flag = u8::from(*sweep_deg > 0.0);
            svg.push_str(&format!(
                "<path d=\"M {} {} A {} {} 0 {large_arc} {sweep_flag} {} {}\" fill=\"none\" \
                 stroke-linecap=\"round\"{}/>\n",
                Num(sx),
                Num(sy),
                Num(*r),
                Num(*r),
                Num(ex),
                Num(ey),
                stroke_attrs(Some(*stroke))
            ));
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            svg.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke-linecap=\"round\"{}/>\n",
                Num(*x1),
                Num(*y1),
                Num(*x2),
                Num(*y2),
                stroke_attrs(Some(*stroke))
            ));
        }
        DrawOp::Text(run) => {
            let anchor = match run.anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"{}\" text-anchor=\"{anchor}\"{}>{}</text>\n",
                Num(run.x),
                Num(run.y),
                Num(run.size),
                run.weight,
                paint_attr("fill", Some(run.color)),
                escape_xml(&run.text)
            ));
        }
    }
}

// ─── Editor overlays ─────────────────────────────────────────────────────────

fn push_overlays(
    svg: &mut String,
    ordered: &[&Widget],
    registry: &ComponentRegistry,
    canvas: &CanvasConfig,
    overlays: &Overlays,
) {
    svg.push_str("<g data-layer=\"overlays\">\n");

    if overlays.safe_zones {
        let (top, bottom) = canvas.safe_zone_bands();
        for (band, edge_y) in [(top, top.bottom()), (bottom, bottom.y)] {
            svg.push_str(&format!(
                "<rect data-overlay=\"safe-zone\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>\n",
                Num(band.x),
                Num(band.y),
                Num(band.width),
                Num(band.height),
                paint_attr("fill", Some(card::SAFE_ZONE_COLOR))
            ));
            svg.push_str(&format!(
                "<line x1=\"0\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke-dasharray=\"6 4\"{}/>\n",
                Num(canvas.width),
                stroke_attrs(Some(StrokeSpec::new(card::SAFE_ZONE_EDGE, 1.0))),
                y = Num(edge_y)
            ));
        }
    }

    for widget in ordered {
        let placement = Placement::new(widget, registry.native_size(widget.kind));
        if overlays.selected == Some(widget.id) {
            push_selection(svg, widget, &placement);
        }
        if overlays.lock_badges && widget.locked {
            push_lock_badge(svg, &placement);
        }
    }

    svg.push_str("</g>\n");
}

fn push_selection(svg: &mut String, widget: &Widget, placement: &Placement) {
    let local = Bounds::new(0.0, 0.0, widget.size.width, widget.size.height);
    svg.push_str(&format!(
        "<g data-overlay=\"selection\" transform=\"{}\">\n",
        frame_transform(placement)
    ));
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"none\" stroke-dasharray=\"4 3\"{}/>\n",
        Num(local.width),
        Num(local.height),
        stroke_attrs(Some(StrokeSpec::new(card::SELECTION_COLOR, 1.5)))
    ));
    if !widget.locked {
        let half = HANDLE_SIZE / 2.0;
        for anchor in ResizeAnchor::ALL {
            let (hx, hy) = anchor.point_on(&local);
            svg.push_str(&format!(
                "<rect data-handle=\"{}\" x=\"{}\" y=\"{}\" width=\"{size}\" height=\"{size}\" \
                 fill=\"#FFFFFF\"{}/>\n",
                anchor.as_str(),
                Num(hx - half),
                Num(hy - half),
                stroke_attrs(Some(StrokeSpec::new(card::SELECTION_COLOR, 1.0))),
                size = Num(HANDLE_SIZE)
            ));
        }
    }
    svg.push_str("</g>\n");
}

fn push_lock_badge(svg: &mut String, placement: &Placement) {
    let (cx, cy) = card::lock_badge_center(&placement.bounds);
    svg.push_str(&format!(
        "<g data-overlay=\"lock\" transform=\"{}\">\n\
         <circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}/>\n\
         <rect x=\"{}\" y=\"{}\" width=\"8\" height=\"6\" rx=\"1\" fill=\"#FFFFFF\"/>\n\
         <path d=\"M {} {} A 3 3.5 0 0 1 {} {}\" fill=\"none\" stroke=\"#FFFFFF\" stroke-width=\"1.5\"/>\n\
         </g>\n",
        frame_transform(placement),
        Num(cx),
        Num(cy),
        Num(card::LOCK_BADGE_RADIUS),
        paint_attr("fill", Some(card::LOCK_BADGE_FILL)),
        Num(cx - 4.0),
        Num(cy - 1.0),
        Num(cx - 3.0),
        Num(cy - 1.0),
        Num(cx + 3.0),
        Num(cy - 1.0),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{CanvasState, Finish, Point, Size, WidgetId, WidgetKind, WidgetStyle};

    fn widget(name: &str, kind: WidgetKind, z: i32) -> Widget {
        Widget {
            id: WidgetId::intern(name),
            kind,
            position: Point::new(40.0, 100.0),
            size: Size::new(200.0, 200.0),
            rotation_deg: 0.0,
            z_order: z,
            locked: false,
            style: WidgetStyle::default_for(kind),
        }
    }

    fn render(state: &CanvasState, overlays: &Overlays) -> String {
        render_card_svg(
            state.view(),
            &ComponentRegistry::builtin(),
            &ProfileRecord::placeholder(),
            &CanvasConfig::default(),
            overlays,
        )
    }

    #[test]
    fn widgets_are_emitted_in_z_order() {
        let state = CanvasState {
            widgets: vec![
                widget("svg_top", WidgetKind::ScoreChip, 5),
                widget("svg_bottom", WidgetKind::ScoreDial, 1),
            ],
            ..Default::default()
        };
        let svg = render(&state, &Overlays::NONE);
        let bottom = svg.find("data-widget-id=\"svg_bottom\"").unwrap();
        let top = svg.find("data-widget-id=\"svg_top\"").unwrap();
        assert!(bottom < top);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 360 640\""));
    }

    #[test]
    fn content_transform_matches_scaling_engine() {
        let mut dial = widget("svg_wide", WidgetKind::ScoreDial, 0);
        dial.size = Size::new(300.0, 150.0);
        let state = CanvasState {
            widgets: vec![dial],
            ..Default::default()
        };
        let svg = render(&state, &Overlays::NONE);
        let expected = format!("translate(75 0) scale({})", 150.0_f32 / 280.0);
        assert!(svg.contains(&expected), "missing {expected} in\n{svg}");
    }

    #[test]
    fn opacity_and_glow_are_applied_per_widget() {
        let mut chip = widget("svg_glow", WidgetKind::ScoreChip, 0);
        chip.style = WidgetStyle::Chip(sc_core::ChipStyle {
            finish: Finish {
                opacity: 0.75,
                glow: Glow::Max,
            },
            ..Default::default()
        });
        let state = CanvasState {
            widgets: vec![chip],
            ..Default::default()
        };
        let svg = render(&state, &Overlays::NONE);
        assert!(svg.contains("opacity=\"0.75\""));
        assert!(svg.contains("filter=\"url(#glow-max)\""));
        assert!(svg.contains("<filter id=\"glow-max\""));
        assert!(svg.contains("stdDeviation=\"12\""));
        assert!(!svg.contains("id=\"glow-subtle\""));
    }

    #[test]
    fn text_is_escaped() {
        let mut profile = ProfileRecord::placeholder();
        profile.meta.display_name = Some("Sam <The Engine> & Co".into());
        let state = CanvasState {
            widgets: vec![widget("svg_name", WidgetKind::Nameplate, 0)],
            ..Default::default()
        };
        let svg = render_card_svg(
            state.view(),
            &ComponentRegistry::builtin(),
            &profile,
            &CanvasConfig::default(),
            &Overlays::NONE,
        );
        assert!(svg.contains("Sam &lt;The Engine&gt; &amp; Co"));
    }

    #[test]
    fn overlays_only_in_editor_view() {
        let mut locked = widget("svg_locked", WidgetKind::ScoreChip, 1);
        locked.locked = true;
        let mut state = CanvasState {
            grid_glow_enabled: true,
            safe_zones_enabled: true,
            widgets: vec![widget("svg_sel", WidgetKind::ScoreDial, 0), locked],
            ..Default::default()
        };
        state.selected = Some(WidgetId::intern("svg_sel"));

        let export = render(&state, &Overlays::NONE);
        assert!(!export.contains("data-overlay"));
        // Grid glow is content, not an overlay.
        assert!(export.contains("data-layer=\"grid\""));

        let editor = render(&state, &Overlays::editor(&state));
        assert_eq!(editor.matches("data-handle=").count(), 8);
        assert_eq!(editor.matches("data-overlay=\"safe-zone\"").count(), 2);
        assert_eq!(editor.matches("data-overlay=\"lock\"").count(), 1);

        // Selecting the locked widget shows the outline but no handles.
        state.selected = Some(WidgetId::intern("svg_locked"));
        let editor = render(&state, &Overlays::editor(&state));
        assert_eq!(editor.matches("data-overlay=\"selection\"").count(), 1);
        assert_eq!(editor.matches("data-handle=").count(), 0);
    }

    #[test]
    fn image_background_embeds_data_url() {
        let state = CanvasState {
            background: Background::Image {
                id: sc_core::BackgroundId::intern("upload_svg"),
                name: "track.jpg".into(),
                data_url: "data:image/jpeg;base64,/9j/".into(),
            },
            ..Default::default()
        };
        let svg = render(&state, &Overlays::NONE);
        assert!(svg.contains("xlink:href=\"data:image/jpeg;base64,/9j/\""));
        assert!(!svg.contains("card-bg"));
    }

    #[test]
    fn half_sweep_arc_uses_small_arc_flag() {
        let mut out = String::new();
        push_op(
            &mut out,
            &DrawOp::Arc {
                cx: 100.0,
                cy: 100.0,
                r: 50.0,
                start_deg: -90.0,
                sweep_deg: 90.0,
                stroke: StrokeSpec::new(Color::WHITE, 4.0),
            },
        );
        assert!(out.starts_with("<path d=\"M 100 50 A 50 50 0 0 1 150 100\""), "{out}");
    }
}
