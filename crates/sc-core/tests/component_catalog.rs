//! Integration tests: palette catalog, profile decoding, and content fit
//! across every widget type.

use pretty_assertions::assert_eq;
use sc_core::registry::DrawOp;
use sc_core::scaling::min_size;
use sc_core::{CanvasConfig, ComponentRegistry, ProfileRecord, Size, WidgetKind, WidgetStyle, fit_content};

fn texts(ops: &[DrawOp]) -> Vec<&str> {
    ops.iter().filter_map(DrawOp::as_text).map(|t| t.text.as_str()).collect()
}

#[test]
fn default_placements_fit_the_canvas() {
    let registry = ComponentRegistry::builtin();
    let canvas = CanvasConfig::default().bounds();
    for entry in registry.palette() {
        let b = entry.default_bounds;
        let floor = min_size(entry.native);
        assert!(
            b.x >= 0.0 && b.y >= 0.0 && b.right() <= canvas.right() && b.bottom() <= canvas.bottom(),
            "{} default placement leaves the canvas: {b:?}",
            entry.kind
        );
        assert!(b.width >= floor.width && b.height >= floor.height, "{} below floor", entry.kind);
    }
}

#[test]
fn palette_follows_declared_order() {
    let registry = ComponentRegistry::builtin();
    let kinds: Vec<WidgetKind> = registry.palette().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, WidgetKind::ALL.to_vec());
    for kind in WidgetKind::ALL {
        assert_eq!(kind.as_str().parse::<WidgetKind>(), Ok(kind));
    }
}

#[test]
fn every_kind_renders_without_profile_data() {
    let registry = ComponentRegistry::builtin();
    let empty = ProfileRecord::default();
    for kind in WidgetKind::ALL {
        let content = registry.render(kind, &empty, &WidgetStyle::default_for(kind));
        assert!(content.known);
        assert!(!content.ops.is_empty(), "{kind} drew nothing");
    }
    let dial = registry.render(
        WidgetKind::ScoreDial,
        &empty,
        &WidgetStyle::default_for(WidgetKind::ScoreDial),
    );
    assert!(texts(&dial.ops).contains(&"--"));
}

#[test]
fn profile_json_tolerates_gaps_and_extras() {
    let record = ProfileRecord::from_json(
        r#"{
            "strength": { "squat_lb": 365 },
            "running": { "10k_s": 2700, "ultra_s": 99999 },
            "meta": { "display_name": "  Coach K  " },
            "leaderboard_rank": 12
        }"#,
    )
    .unwrap();
    assert_eq!(record.strength.squat_lb, Some(365.0));
    assert_eq!(record.strength.bench_lb, None);
    assert_eq!(record.running.ten_k_s, Some(2700.0));
    assert_eq!(record.display_name(), "Coach K");
    assert_eq!(record.score_label(), "--");
}

#[test]
fn content_keeps_its_aspect_in_any_box() {
    let registry = ComponentRegistry::builtin();
    for kind in WidgetKind::ALL {
        let native = registry.native_size(kind);
        for box_size in [Size::new(100.0, 300.0), Size::new(300.0, 100.0), native] {
            let fit = fit_content(box_size, native);
            let placed = fit.content_bounds(native);
            assert!((placed.width / placed.height - native.width / native.height).abs() < 1e-3);
            assert!(placed.width <= box_size.width + 1e-3 && placed.height <= box_size.height + 1e-3);
            // Centered on both axes.
            assert!((placed.x * 2.0 + placed.width - box_size.width).abs() < 1e-3);
            assert!((placed.y * 2.0 + placed.height - box_size.height).abs() < 1e-3);
        }
    }
}
