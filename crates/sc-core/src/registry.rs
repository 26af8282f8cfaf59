//! Component registry: widget type → renderer + native size.
//!
//! Renderers are pure functions from source data and style to a display list
//! of `DrawOp`s in the widget's native coordinate space (origin at the
//! content's top-left, `native.width × native.height`). Backends (the
//! on-screen painter, the SVG card emitter) place that list with the
//! `ContentTransform` from the scaling engine.
//!
//! A type without a registry entry renders an explicit "unknown component"
//! placeholder instead of failing.

use crate::model::{
    Alignment, Bounds, ChipStyle, Color, DialStyle, NameplateStyle, PrListStyle, Size, WidgetKind,
    WidgetStyle,
};
use crate::profile::{ProfileRecord, format_duration, format_lb};
use std::collections::HashMap;

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSpec {
    pub color: Color,
    pub width: f32,
}

impl StrokeSpec {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A single line of text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub size: f32,
    pub weight: u16,
    pub color: Color,
    pub anchor: TextAnchor,
}

/// Drawing primitive in native content coordinates.
///
/// Angles are in degrees, clockwise from 3 o'clock (screen convention).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        bounds: Bounds,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<StrokeSpec>,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Color>,
        stroke: Option<StrokeSpec>,
    },
    Arc {
        cx: f32,
        cy: f32,
        r: f32,
        start_deg: f32,
        sweep_deg: f32,
        stroke: StrokeSpec,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: StrokeSpec,
    },
    Text(TextRun),
}

impl DrawOp {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            DrawOp::Text(run) => Some(run),
            _ => None,
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

pub type RenderFn = fn(&ProfileRecord, &WidgetStyle) -> Vec<DrawOp>;

/// Native size used for types without a registry entry.
pub const PLACEHOLDER_NATIVE: Size = Size::new(200.0, 100.0);

#[derive(Clone, Copy)]
pub struct ComponentEntry {
    pub kind: WidgetKind,
    /// Palette label.
    pub label: &'static str,
    /// Reference dimensions for scale computation only.
    pub native: Size,
    /// Where a freshly added widget lands, in canvas coordinates.
    pub default_bounds: Bounds,
    pub render: RenderFn,
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("kind", &self.kind)
            .field("native", &self.native)
            .finish_non_exhaustive()
    }
}

/// Output of a registry render: the display list plus the native size it was
/// drawn against.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedContent {
    pub native: Size,
    pub ops: Vec<DrawOp>,
    /// `false` when the placeholder was drawn.
    pub known: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: HashMap<WidgetKind, ComponentEntry>,
}

impl ComponentRegistry {
    /// Registry with no entries; every type renders the placeholder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in widget type.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for entry in builtin_entries() {
            registry.register(entry);
        }
        registry
    }

    pub fn register(&mut self, entry: ComponentEntry) {
        self.entries.insert(entry.kind, entry);
    }

    pub fn get(&self, kind: WidgetKind) -> Option<&ComponentEntry> {
        self.entries.get(&kind)
    }

    /// Registered entries in palette order.
    pub fn palette(&self) -> Vec<&ComponentEntry> {
        WidgetKind::ALL
            .iter()
            .filter_map(|kind| self.entries.get(kind))
            .collect()
    }

    pub fn native_size(&self, kind: WidgetKind) -> Size {
        self.get(kind).map_or(PLACEHOLDER_NATIVE, |e| e.native)
    }

    pub fn render(
        &self,
        kind: WidgetKind,
        profile: &ProfileRecord,
        style: &WidgetStyle,
    ) -> RenderedContent {
        match self.get(kind) {
            Some(entry) => RenderedContent {
                native: entry.native,
                ops: (entry.render)(profile, style),
                known: true,
            },
            None => {
                log::debug!("no renderer registered for {kind}; drawing placeholder");
                RenderedContent {
                    native: PLACEHOLDER_NATIVE,
                    ops: render_placeholder(),
                    known: false,
                }
            }
        }
    }
}

fn builtin_entries() -> [ComponentEntry; 8] {
    [
        ComponentEntry {
            kind: WidgetKind::ScoreDial,
            label: "Score dial",
            native: Size::new(280.0, 280.0),
            default_bounds: Bounds::new(80.0, 150.0, 200.0, 200.0),
            render: render_score_dial,
        },
        ComponentEntry {
            kind: WidgetKind::ScoreDialVariant,
            label: "Score gauge",
            native: Size::new(280.0, 280.0),
            default_bounds: Bounds::new(80.0, 150.0, 200.0, 200.0),
            render: render_score_gauge,
        },
        ComponentEntry {
            kind: WidgetKind::ScoreChip,
            label: "Score chip",
            native: Size::new(220.0, 80.0),
            default_bounds: Bounds::new(100.0, 380.0, 165.0, 60.0),
            render: render_score_chip,
        },
        ComponentEntry {
            kind: WidgetKind::StrengthPrList,
            label: "Strength PRs",
            native: Size::new(240.0, 200.0),
            default_bounds: Bounds::new(36.0, 400.0, 144.0, 120.0),
            render: render_strength_list,
        },
        ComponentEntry {
            kind: WidgetKind::StrengthPrListHorizontal,
            label: "Strength PRs (row)",
            native: Size::new(420.0, 120.0),
            default_bounds: Bounds::new(30.0, 420.0, 300.0, 86.0),
            render: render_strength_row,
        },
        ComponentEntry {
            kind: WidgetKind::RunningPrList,
            label: "Running PRs",
            native: Size::new(240.0, 240.0),
            default_bounds: Bounds::new(180.0, 400.0, 144.0, 144.0),
            render: render_running_list,
        },
        ComponentEntry {
            kind: WidgetKind::BalanceChipGroup,
            label: "Balance chips",
            native: Size::new(360.0, 96.0),
            default_bounds: Bounds::new(30.0, 540.0, 300.0, 80.0),
            render: render_balance_chips,
        },
        ComponentEntry {
            kind: WidgetKind::Nameplate,
            label: "Nameplate",
            native: Size::new(320.0, 96.0),
            default_bounds: Bounds::new(40.0, 60.0, 280.0, 84.0),
            render: render_nameplate,
        },
    ]
}

// ─── Palette ─────────────────────────────────────────────────────────────

const TEXT: Color = Color::WHITE;
const MUTED: Color = Color::rgba(1.0, 1.0, 1.0, 0.68);
const PANEL: Color = Color::rgba(0.043, 0.071, 0.125, 0.62);
const PANEL_EDGE: Color = Color::rgba(1.0, 1.0, 1.0, 0.12);
const TRACK: Color = Color::rgba(1.0, 1.0, 1.0, 0.14);
const DIVIDER: Color = Color::rgba(1.0, 1.0, 1.0, 0.08);
/// #38BDF8
pub const ACCENT: Color = Color::rgba(0.2196, 0.7412, 0.9725, 1.0);
/// #A78BFA
const ACCENT_ALT: Color = Color::rgba(0.6549, 0.5451, 0.9804, 1.0);

fn text(x: f32, y: f32, s: impl Into<String>, size: f32, weight: u16, color: Color, anchor: TextAnchor) -> DrawOp {
    DrawOp::Text(TextRun {
        x,
        y,
        text: s.into(),
        size,
        weight,
        color,
        anchor,
    })
}

fn panel(native: Size, radius: f32) -> DrawOp {
    DrawOp::Rect {
        bounds: Bounds::new(0.0, 0.0, native.width, native.height),
        radius,
        fill: Some(PANEL),
        stroke: Some(StrokeSpec::new(PANEL_EDGE, 1.5)),
    }
}

/// Horizontal anchor for aligned text inside `[left, right]`.
fn aligned(alignment: Alignment, left: f32, right: f32) -> (f32, TextAnchor) {
    match alignment {
        Alignment::Left => (left, TextAnchor::Start),
        Alignment::Center => ((left + right) / 2.0, TextAnchor::Middle),
        Alignment::Right => (right, TextAnchor::End),
    }
}

fn dial_style(style: &WidgetStyle) -> DialStyle {
    match style {
        WidgetStyle::Dial(s) => *s,
        _ => DialStyle::default(),
    }
}

fn chip_style(style: &WidgetStyle) -> ChipStyle {
    match style {
        WidgetStyle::Chip(s) => *s,
        _ => ChipStyle::default(),
    }
}

fn list_style(style: &WidgetStyle) -> PrListStyle {
    match style {
        WidgetStyle::PrList(s) => *s,
        _ => PrListStyle::default(),
    }
}

fn nameplate_style(style: &WidgetStyle) -> NameplateStyle {
    match style {
        WidgetStyle::Nameplate(s) => *s,
        _ => NameplateStyle::default(),
    }
}

/// Radial tick marks between `r_inner` and `r_outer`.
fn ticks(
    ops: &mut Vec<DrawOp>,
    (cx, cy): (f32, f32),
    r_inner: f32,
    r_outer: f32,
    start_deg: f32,
    sweep_deg: f32,
    count: usize,
) {
    let steps = count.saturating_sub(1).max(1) as f32;
    for i in 0..count {
        let major = i % 5 == 0;
        let inner = if major { r_inner - 4.0 } else { r_inner };
        let angle = (start_deg + sweep_deg * i as f32 / steps).to_radians();
        let (sin, cos) = angle.sin_cos();
        ops.push(DrawOp::Line {
            x1: cx + inner * cos,
            y1: cy + inner * sin,
            x2: cx + r_outer * cos,
            y2: cy + r_outer * sin,
            stroke: StrokeSpec::new(if major { MUTED } else { TRACK }, if major { 2.5 } else { 1.5 }),
        });
    }
}

// ─── Renderers ───────────────────────────────────────────────────────────

fn render_score_dial(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let dial = dial_style(style);
    let center = (140.0, 140.0);
    let width = dial.ring.stroke_width();
    let r = 140.0 - width / 2.0 - 8.0;

    let mut ops = vec![
        DrawOp::Circle {
            cx: center.0,
            cy: center.1,
            r: 136.0,
            fill: Some(PANEL),
            stroke: None,
        },
        DrawOp::Circle {
            cx: center.0,
            cy: center.1,
            r,
            fill: None,
            stroke: Some(StrokeSpec::new(TRACK, width)),
        },
    ];

    let fraction = profile.score_fraction();
    if fraction > 0.0 {
        ops.push(DrawOp::Arc {
            cx: center.0,
            cy: center.1,
            r,
            start_deg: -90.0,
            sweep_deg: 360.0 * fraction,
            stroke: StrokeSpec::new(ACCENT, width),
        });
    }

    if dial.tick_marks {
        let edge = r - width / 2.0 - 6.0;
        // 40 ticks over a closed circle: last tick would overlap the first.
        ticks(&mut ops, center, edge - 8.0, edge, -90.0, 351.0, 40);
    }

    ops.push(text(140.0, 166.0, profile.score_label(), 84.0, 800, TEXT, TextAnchor::Middle));
    ops.push(text(140.0, 200.0, "HYBRID SCORE", 15.0, 600, MUTED, TextAnchor::Middle));
    ops
}

fn render_score_gauge(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let dial = dial_style(style);
    let center = (140.0, 150.0);
    let width = dial.ring.stroke_width();
    let r = 118.0 - width / 2.0;
    const START: f32 = 135.0;
    const SWEEP: f32 = 270.0;

    let mut ops = vec![
        panel(Size::new(280.0, 280.0), 48.0),
        DrawOp::Arc {
            cx: center.0,
            cy: center.1,
            r,
            start_deg: START,
            sweep_deg: SWEEP,
            stroke: StrokeSpec::new(TRACK, width),
        },
    ];

    let fraction = profile.score_fraction();
    if fraction > 0.0 {
        ops.push(DrawOp::Arc {
            cx: center.0,
            cy: center.1,
            r,
            start_deg: START,
            sweep_deg: SWEEP * fraction,
            stroke: StrokeSpec::new(ACCENT_ALT, width),
        });
    }

    if dial.tick_marks {
        let edge = r - width / 2.0 - 6.0;
        ticks(&mut ops, center, edge - 8.0, edge, START, SWEEP, 11);
    }

    ops.push(text(140.0, 170.0, profile.score_label(), 72.0, 800, TEXT, TextAnchor::Middle));
    ops.push(text(140.0, 200.0, "/ 100", 16.0, 600, MUTED, TextAnchor::Middle));
    ops.push(text(140.0, 256.0, "HYBRID", 15.0, 700, MUTED, TextAnchor::Middle));
    ops
}

fn render_score_chip(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let chip = chip_style(style);
    let f = chip.text_size.factor();
    vec![
        panel(Size::new(220.0, 80.0), 40.0),
        DrawOp::Circle {
            cx: 40.0,
            cy: 40.0,
            r: 18.0,
            fill: Some(ACCENT),
            stroke: None,
        },
        text(72.0, 34.0, "HYBRID SCORE", 12.0 * f, 600, MUTED, TextAnchor::Start),
        text(72.0, 62.0, profile.score_label(), 28.0 * f, 800, TEXT, TextAnchor::Start),
    ]
}

/// Title plus one text row per `(label, value)`, aligned per style.
fn pr_rows(
    native: Size,
    title: &str,
    rows: &[(&str, String)],
    style: PrListStyle,
    first_row_y: f32,
    row_step: f32,
) -> Vec<DrawOp> {
    let f = style.text_size.factor();
    let (x, anchor) = aligned(style.alignment, 20.0, native.width - 20.0);
    let mut ops = vec![
        panel(native, 20.0),
        text(x, 36.0, title, 14.0 * f, 700, ACCENT, anchor),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let y = first_row_y + row_step * i as f32;
        if i > 0 {
            ops.push(DrawOp::Line {
                x1: 20.0,
                y1: y - row_step + 12.0,
                x2: native.width - 20.0,
                y2: y - row_step + 12.0,
                stroke: StrokeSpec::new(DIVIDER, 1.0),
            });
        }
        ops.push(text(x, y, format!("{label}  {value}"), 18.0 * f, 600, TEXT, anchor));
    }
    ops
}

fn render_strength_list(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let s = &profile.strength;
    let rows = [
        ("Squat", format_lb(s.squat_lb)),
        ("Bench", format_lb(s.bench_lb)),
        ("Deadlift", format_lb(s.deadlift_lb)),
    ];
    pr_rows(Size::new(240.0, 200.0), "STRENGTH PRs", &rows, list_style(style), 84.0, 40.0)
}

fn render_strength_row(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let list = list_style(style);
    let f = list.text_size.factor();
    let s = &profile.strength;
    let columns = [
        ("SQUAT", format_lb(s.squat_lb)),
        ("BENCH", format_lb(s.bench_lb)),
        ("DEADLIFT", format_lb(s.deadlift_lb)),
    ];

    let mut ops = vec![panel(Size::new(420.0, 120.0), 20.0)];
    for (i, (label, value)) in columns.iter().enumerate() {
        let cx = 70.0 + 140.0 * i as f32;
        if i > 0 {
            ops.push(DrawOp::Line {
                x1: cx - 70.0,
                y1: 24.0,
                x2: cx - 70.0,
                y2: 96.0,
                stroke: StrokeSpec::new(DIVIDER, 1.0),
            });
        }
        ops.push(text(cx, 62.0, value.clone(), 24.0 * f, 800, TEXT, TextAnchor::Middle));
        ops.push(text(cx, 90.0, *label, 12.0 * f, 600, MUTED, TextAnchor::Middle));
    }
    ops
}

fn render_running_list(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let r = &profile.running;
    let rows = [
        ("Mile", format_duration(r.mile_s)),
        ("5K", format_duration(r.five_k_s)),
        ("10K", format_duration(r.ten_k_s)),
        ("Half", format_duration(r.half_s)),
        ("Marathon", format_duration(r.marathon_s)),
    ];
    pr_rows(Size::new(240.0, 240.0), "RUNNING PRs", &rows, list_style(style), 76.0, 36.0)
}

fn render_balance_chips(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let chip = chip_style(style);
    let f = chip.text_size.factor();
    let multiple = profile
        .strength
        .bodyweight_multiple()
        .map_or_else(|| "--".to_string(), |m| format!("{m:.1}x"));
    let chips = [
        ("TOTAL", format_lb(profile.strength.total_lb())),
        ("BODYWEIGHT", multiple),
        ("MILE", format_duration(profile.running.mile_s)),
    ];

    let mut ops = Vec::with_capacity(chips.len() * 3);
    for (i, (label, value)) in chips.iter().enumerate() {
        let x = 124.0 * i as f32;
        ops.push(DrawOp::Rect {
            bounds: Bounds::new(x, 16.0, 112.0, 64.0),
            radius: 32.0,
            fill: Some(PANEL),
            stroke: Some(StrokeSpec::new(PANEL_EDGE, 1.5)),
        });
        ops.push(text(x + 56.0, 42.0, *label, 10.0 * f, 700, MUTED, TextAnchor::Middle));
        ops.push(text(x + 56.0, 66.0, value.clone(), 17.0 * f, 800, TEXT, TextAnchor::Middle));
    }
    ops
}

fn render_nameplate(profile: &ProfileRecord, style: &WidgetStyle) -> Vec<DrawOp> {
    let plate = nameplate_style(style);
    let f = plate.text_size.factor();
    let (x, anchor) = aligned(plate.alignment, 24.0, 296.0);
    vec![
        panel(Size::new(320.0, 96.0), 24.0),
        text(x, 52.0, profile.display_name(), 30.0 * f, 800, TEXT, anchor),
        text(x, 76.0, "HYBRID ATHLETE", 12.0 * f, 700, ACCENT, anchor),
    ]
}

fn render_placeholder() -> Vec<DrawOp> {
    let warn = Color::rgba(0.973, 0.443, 0.443, 1.0);
    vec![
        DrawOp::Rect {
            bounds: Bounds::new(0.0, 0.0, PLACEHOLDER_NATIVE.width, PLACEHOLDER_NATIVE.height),
            radius: 12.0,
            fill: Some(warn.with_alpha(0.08)),
            stroke: Some(StrokeSpec::new(warn, 2.0)),
        },
        text(100.0, 56.0, "Unknown component", 16.0, 600, warn, TextAnchor::Middle),
    ]
}
