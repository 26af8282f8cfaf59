//! Card data model.
//!
//! A share card is a fixed-size canvas holding a background and an ordered
//! list of placed widgets. Widgets are positioned in canvas coordinates
//! (top-left origin, logical units of the editor canvas); export maps those
//! coordinates onto the output raster.

use crate::error::StudioError;
use crate::id::{BackgroundId, WidgetId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channel = |i: usize| -> Option<f32> {
            let v = hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?;
            Some(v as f32 / 255.0)
        };

        match bytes.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// `#RRGGBB` without alpha; pair with `self.a` for SVG opacity attributes.
    pub fn to_hex_rgb(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale both axes by the same factor.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Axis-aligned box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Logical size of the editor canvas (the phone-mockup card).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
        }
    }
}

impl CanvasConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    /// Bands at the top and bottom of the card that story viewers cover with
    /// their own chrome. Returned as `(top_band, bottom_band)`.
    pub fn safe_zone_bands(&self) -> (Bounds, Bounds) {
        let top = self.height * 0.14;
        let bottom = self.height * 0.20;
        (
            Bounds::new(0.0, 0.0, self.width, top),
            Bounds::new(0.0, self.height - bottom, self.width, bottom),
        )
    }
}

// ─── Widget types ────────────────────────────────────────────────────────

/// The fixed set of widget types available in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    ScoreDial,
    ScoreDialVariant,
    ScoreChip,
    StrengthPrList,
    StrengthPrListHorizontal,
    RunningPrList,
    BalanceChipGroup,
    Nameplate,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 8] = [
        WidgetKind::ScoreDial,
        WidgetKind::ScoreDialVariant,
        WidgetKind::ScoreChip,
        WidgetKind::StrengthPrList,
        WidgetKind::StrengthPrListHorizontal,
        WidgetKind::RunningPrList,
        WidgetKind::BalanceChipGroup,
        WidgetKind::Nameplate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::ScoreDial => "score-dial",
            WidgetKind::ScoreDialVariant => "score-dial-variant",
            WidgetKind::ScoreChip => "score-chip",
            WidgetKind::StrengthPrList => "strength-pr-list",
            WidgetKind::StrengthPrListHorizontal => "strength-pr-list-horizontal",
            WidgetKind::RunningPrList => "running-pr-list",
            WidgetKind::BalanceChipGroup => "balance-chip-group",
            WidgetKind::Nameplate => "nameplate",
        }
    }

    /// Prefix used when allocating ids for new widgets of this type.
    pub fn id_prefix(self) -> &'static str {
        match self {
            WidgetKind::ScoreDial | WidgetKind::ScoreDialVariant => "dial",
            WidgetKind::ScoreChip => "chip",
            WidgetKind::StrengthPrList | WidgetKind::StrengthPrListHorizontal => "strength",
            WidgetKind::RunningPrList => "running",
            WidgetKind::BalanceChipGroup => "balance",
            WidgetKind::Nameplate => "nameplate",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StudioError::UnknownWidget(s.to_string()))
    }
}

// ─── Styles ──────────────────────────────────────────────────────────────

pub const MIN_OPACITY: f32 = 0.6;
pub const MAX_OPACITY: f32 = 1.0;

/// Glow intensity behind a widget's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glow {
    Off,
    Subtle,
    #[default]
    Standard,
    Max,
}

impl Glow {
    pub const ALL: [Glow; 4] = [Glow::Off, Glow::Subtle, Glow::Standard, Glow::Max];

    /// Gaussian blur standard deviation, in the widget's native units.
    pub fn blur_std_dev(self) -> f32 {
        match self {
            Glow::Off => 0.0,
            Glow::Subtle => 3.0,
            Glow::Standard => 6.0,
            Glow::Max => 12.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Glow::Off => "off",
            Glow::Subtle => "subtle",
            Glow::Standard => "standard",
            Glow::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingThickness {
    Thin,
    #[default]
    Regular,
    Bold,
}

impl RingThickness {
    /// Stroke width of the dial ring in native units.
    pub fn stroke_width(self) -> f32 {
        match self {
            RingThickness::Thin => 10.0,
            RingThickness::Regular => 18.0,
            RingThickness::Bold => 28.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    pub fn factor(self) -> f32 {
        match self {
            TextSize::Small => 0.85,
            TextSize::Medium => 1.0,
            TextSize::Large => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Attributes every widget style carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finish {
    pub opacity: f32,
    pub glow: Glow,
}

impl Default for Finish {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            glow: Glow::default(),
        }
    }
}

impl Finish {
    /// Clamp opacity into the editable range.
    pub fn normalized(self) -> Self {
        let opacity = if self.opacity.is_nan() {
            MAX_OPACITY
        } else {
            self.opacity.clamp(MIN_OPACITY, MAX_OPACITY)
        };
        Self { opacity, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DialStyle {
    pub finish: Finish,
    pub ring: RingThickness,
    pub tick_marks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChipStyle {
    pub finish: Finish,
    pub text_size: TextSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrListStyle {
    pub finish: Finish,
    pub text_size: TextSize,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NameplateStyle {
    pub finish: Finish,
    pub text_size: TextSize,
    pub alignment: Alignment,
}

/// Presentation attributes, one variant per family of widget types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum WidgetStyle {
    /// `score-dial`, `score-dial-variant`
    Dial(DialStyle),
    /// `score-chip`, `balance-chip-group`
    Chip(ChipStyle),
    /// `strength-pr-list`, `strength-pr-list-horizontal`, `running-pr-list`
    PrList(PrListStyle),
    /// `nameplate`
    Nameplate(NameplateStyle),
}

impl WidgetStyle {
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::ScoreDial | WidgetKind::ScoreDialVariant => WidgetStyle::Dial(DialStyle {
                tick_marks: true,
                ..Default::default()
            }),
            WidgetKind::ScoreChip | WidgetKind::BalanceChipGroup => {
                WidgetStyle::Chip(ChipStyle::default())
            }
            WidgetKind::StrengthPrList
            | WidgetKind::StrengthPrListHorizontal
            | WidgetKind::RunningPrList => WidgetStyle::PrList(PrListStyle::default()),
            WidgetKind::Nameplate => WidgetStyle::Nameplate(NameplateStyle::default()),
        }
    }

    /// Whether this style variant belongs to widgets of `kind`.
    pub fn fits(&self, kind: WidgetKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&WidgetStyle::default_for(kind))
    }

    pub fn finish(&self) -> Finish {
        match self {
            WidgetStyle::Dial(s) => s.finish,
            WidgetStyle::Chip(s) => s.finish,
            WidgetStyle::PrList(s) => s.finish,
            WidgetStyle::Nameplate(s) => s.finish,
        }
    }

    fn finish_mut(&mut self) -> &mut Finish {
        match self {
            WidgetStyle::Dial(s) => &mut s.finish,
            WidgetStyle::Chip(s) => &mut s.finish,
            WidgetStyle::PrList(s) => &mut s.finish,
            WidgetStyle::Nameplate(s) => &mut s.finish,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.finish().opacity
    }

    pub fn glow(&self) -> Glow {
        self.finish().glow
    }

    pub fn text_size(&self) -> TextSize {
        match self {
            WidgetStyle::Dial(_) => TextSize::Medium,
            WidgetStyle::Chip(s) => s.text_size,
            WidgetStyle::PrList(s) => s.text_size,
            WidgetStyle::Nameplate(s) => s.text_size,
        }
    }

    /// Same style with opacity clamped into 0.6..=1.0.
    pub fn normalized(mut self) -> Self {
        let finish = self.finish().normalized();
        *self.finish_mut() = finish;
        self
    }
}

// ─── Widgets ─────────────────────────────────────────────────────────────

/// One placed element on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub position: Point,
    pub size: Size,
    pub rotation_deg: f32,
    pub z_order: i32,
    pub locked: bool,
    pub style: WidgetStyle,
}

impl Widget {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_parts(self.position, self.size)
    }
}

/// Partial change set for `update_widget`. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation_deg: Option<f32>,
    pub style: Option<WidgetStyle>,
}

impl WidgetPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn style(style: WidgetStyle) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }

    /// Whether the patch changes position, size, or rotation.
    pub fn touches_geometry(&self) -> bool {
        self.position.is_some() || self.size.is_some() || self.rotation_deg.is_some()
    }
}

// ─── Background ──────────────────────────────────────────────────────────

/// The card's backdrop: a built-in gradient or an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    Gradient {
        id: String,
    },
    Image {
        id: BackgroundId,
        name: String,
        /// `data:` URL; shared so history snapshots do not copy the payload.
        data_url: Arc<str>,
    },
}

impl Background {
    pub fn gradient(id: &str) -> Self {
        Background::Gradient { id: id.to_string() }
    }

    pub fn upload_id(&self) -> Option<BackgroundId> {
        match self {
            Background::Image { id, .. } => Some(*id),
            Background::Gradient { .. } => None,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::gradient(crate::background::DEFAULT_GRADIENT)
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

/// Immutable copy of the card's content, used by undo/redo and export.
///
/// Selection and view-only toggles are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub background: Background,
    pub grid_glow_enabled: bool,
    pub widgets: Vec<Widget>,
}

impl CanvasSnapshot {
    pub fn view(&self) -> CardView<'_> {
        CardView {
            background: &self.background,
            grid_glow_enabled: self.grid_glow_enabled,
            widgets: &self.widgets,
        }
    }
}

/// Live editing state for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    pub background: Background,
    pub grid_glow_enabled: bool,
    pub safe_zones_enabled: bool,
    /// Insertion order. Paint order follows `z_order`.
    pub widgets: Vec<Widget>,
    pub selected: Option<WidgetId>,
}

impl CanvasState {
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn selected_widget(&self) -> Option<&Widget> {
        self.selected.and_then(|id| self.widget(id))
    }

    /// Highest z-order + 1, or 0 on an empty canvas.
    pub fn next_z_order(&self) -> i32 {
        self.widgets
            .iter()
            .map(|w| w.z_order)
            .max()
            .map_or(0, |z| z + 1)
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            background: self.background.clone(),
            grid_glow_enabled: self.grid_glow_enabled,
            widgets: self.widgets.clone(),
        }
    }

    /// Replace content with a snapshot, keeping view state. Selection is
    /// dropped if the selected widget does not exist in the snapshot.
    pub fn restore(&mut self, snapshot: &CanvasSnapshot) {
        self.background = snapshot.background.clone();
        self.grid_glow_enabled = snapshot.grid_glow_enabled;
        self.widgets = snapshot.widgets.clone();
        if let Some(id) = self.selected
            && self.widget(id).is_none()
        {
            self.selected = None;
        }
    }

    pub fn view(&self) -> CardView<'_> {
        CardView {
            background: &self.background,
            grid_glow_enabled: self.grid_glow_enabled,
            widgets: &self.widgets,
        }
    }
}

/// Borrowed view of card content, shared by the live state and snapshots.
#[derive(Debug, Clone, Copy)]
pub struct CardView<'a> {
    pub background: &'a Background,
    pub grid_glow_enabled: bool,
    pub widgets: &'a [Widget],
}

impl<'a> CardView<'a> {
    /// Widgets in ascending z-order (bottom first).
    pub fn paint_order(&self) -> Vec<&'a Widget> {
        let mut ordered: Vec<&Widget> = self.widgets.iter().collect();
        ordered.sort_by_key(|w| w.z_order);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_kind_parses_palette_names() {
        for kind in WidgetKind::ALL {
            assert_eq!(kind.as_str().parse::<WidgetKind>(), Ok(kind));
        }
        assert_eq!(
            "sparkline".parse::<WidgetKind>(),
            Err(StudioError::UnknownWidget("sparkline".into()))
        );
    }

    #[test]
    fn style_variant_must_match_kind() {
        let dial = WidgetStyle::default_for(WidgetKind::ScoreDial);
        assert!(dial.fits(WidgetKind::ScoreDialVariant));
        assert!(!dial.fits(WidgetKind::Nameplate));
        let list = WidgetStyle::default_for(WidgetKind::RunningPrList);
        assert!(list.fits(WidgetKind::StrengthPrListHorizontal));
    }

    #[test]
    fn opacity_is_clamped_to_editable_range() {
        let style = WidgetStyle::Chip(ChipStyle {
            finish: Finish {
                opacity: 0.2,
                glow: Glow::Max,
            },
            text_size: TextSize::Large,
        });
        assert_eq!(style.normalized().opacity(), MIN_OPACITY);
        assert_eq!(style.normalized().glow(), Glow::Max);
    }

    #[test]
    fn hex_colors() {
        let c = Color::from_hex("#38BDF8").unwrap();
        assert_eq!(c.to_rgba8(), [0x38, 0xBD, 0xF8, 0xFF]);
        assert_eq!(c.to_hex_rgb(), "#38BDF8");
        assert!(Color::from_hex("#12").is_none());
    }

    #[test]
    fn next_z_order_starts_at_zero() {
        let state = CanvasState::default();
        assert_eq!(state.next_z_order(), 0);
    }

    #[test]
    fn style_serializes_with_family_tag() {
        let json = serde_json::to_value(WidgetStyle::default_for(WidgetKind::Nameplate)).unwrap();
        assert_eq!(json["family"], "nameplate");
        assert_eq!(json["finish"]["glow"], "standard");
    }
}
