//! Canvas store: the single owner of editing state.
//!
//! Every mutation of the card goes through `CanvasStore`. Operations apply
//! their change to the live `CanvasState`, then record one history snapshot
//! if (and only if) the card content actually changed. View-only state
//! (selection, safe zones) never creates history steps.
//!
//! Live gestures use `preview_geometry` for per-frame updates and `commit`
//! once at pointer-up, so a whole drag is a single undo step.

use crate::history::{History, HistoryConfig};
use sc_core::error::Result;
use sc_core::id::IdAllocator;
use sc_core::registry::PLACEHOLDER_NATIVE;
use sc_core::scaling::min_size;
use sc_core::{
    Background, BackgroundId, BackgroundManager, Bounds, CanvasConfig, CanvasState, ComponentRegistry,
    DEFAULT_GRADIENT, Point, ProfileRecord, Size, StudioError, UploadLimits, Widget, WidgetId,
    WidgetKind, WidgetPatch, WidgetStyle,
};
use std::sync::LazyLock;

/// How far a duplicate is nudged from its original, on both axes.
pub const DUPLICATE_OFFSET: f32 = 16.0;

static PLACEHOLDER_PROFILE: LazyLock<ProfileRecord> = LazyLock::new(ProfileRecord::placeholder);

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub canvas: CanvasConfig,
    pub history: HistoryConfig,
    pub uploads: UploadLimits,
}

/// Z-order moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

#[derive(Debug)]
pub struct CanvasStore {
    state: CanvasState,
    history: History,
    backgrounds: BackgroundManager,
    registry: ComponentRegistry,
    canvas: CanvasConfig,
    source: Option<ProfileRecord>,
    ids: IdAllocator,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl CanvasStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_registry(config, ComponentRegistry::builtin())
    }

    pub fn with_registry(config: StoreConfig, registry: ComponentRegistry) -> Self {
        let state = CanvasState::default();
        let history = History::new(state.snapshot(), config.history);
        Self {
            state,
            history,
            backgrounds: BackgroundManager::with_limits(config.uploads),
            registry,
            canvas: config.canvas,
            source: None,
            ids: IdAllocator::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.state.widget(id)
    }

    pub fn selected(&self) -> Option<WidgetId> {
        self.state.selected
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn backgrounds(&self) -> &BackgroundManager {
        &self.backgrounds
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Loaded source data, if any.
    pub fn source(&self) -> Option<&ProfileRecord> {
        self.source.as_ref()
    }

    /// Data widgets render with: the loaded record, or the placeholder
    /// while nothing is loaded.
    pub fn render_profile(&self) -> &ProfileRecord {
        self.source.as_ref().unwrap_or(&PLACEHOLDER_PROFILE)
    }

    /// Provide (or clear) the source data. Not a card change.
    pub fn set_source(&mut self, source: Option<ProfileRecord>) {
        self.source = source;
    }

    /// Smallest box a widget of `kind` may have.
    pub fn min_size(&self, kind: WidgetKind) -> Size {
        min_size(self.registry.native_size(kind))
    }

    // ─── History plumbing ────────────────────────────────────────────────

    /// Record a snapshot if live content differs from the cursor entry.
    fn record_if_changed(&mut self) -> bool {
        let snapshot = self.state.snapshot();
        if self.history.current() == Some(&snapshot) {
            return false;
        }
        self.history.record(snapshot);
        true
    }

    /// Finish a live gesture: one snapshot for everything since the last
    /// recorded state. Returns whether anything changed.
    pub fn commit(&mut self) -> bool {
        self.record_if_changed()
    }

    /// Throw away uncommitted live changes.
    pub fn revert_uncommitted(&mut self) {
        if let Some(snapshot) = self.history.current().cloned() {
            self.state.restore(&snapshot);
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.state.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.state.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Fit a box inside the canvas and above the type's minimum size.
    /// Size is settled first, then the origin is pulled back inside.
    pub fn clamp_bounds(&self, kind: WidgetKind, bounds: Bounds) -> Bounds {
        let floor = self.min_size(kind);
        let cw = self.canvas.width;
        let ch = self.canvas.height;
        let width = bounds.width.max(floor.width).min(cw);
        let height = bounds.height.max(floor.height).min(ch);
        let x = bounds.x.clamp(0.0, (cw - width).max(0.0));
        let y = bounds.y.clamp(0.0, (ch - height).max(0.0));
        Bounds::new(x, y, width, height)
    }

    /// Apply geometry during a live gesture. No history; locked widgets are
    /// left alone.
    pub fn preview_geometry(&mut self, id: WidgetId, bounds: Bounds) -> bool {
        let Some(widget) = self.state.widget(id) else {
            return false;
        };
        if widget.locked {
            return false;
        }
        let clamped = self.clamp_bounds(widget.kind, bounds);
        let Some(widget) = self.state.widget_mut(id) else {
            return false;
        };
        if widget.bounds() == clamped {
            return false;
        }
        widget.position = clamped.origin();
        widget.size = clamped.size();
        true
    }

    // ─── Widget operations ───────────────────────────────────────────────

    /// Place a new widget of `kind` at its palette default and select it.
    ///
    /// Fails with `NoData` until source data has been provided.
    pub fn add_widget(&mut self, kind: WidgetKind) -> Result<WidgetId> {
        if self.source.is_none() {
            log::warn!("add {kind} blocked: no profile data yet");
            return Err(StudioError::NoData);
        }

        let bounds = match self.registry.get(kind) {
            Some(entry) => entry.default_bounds,
            None => Bounds::new(
                (self.canvas.width - PLACEHOLDER_NATIVE.width) / 2.0,
                (self.canvas.height - PLACEHOLDER_NATIVE.height) / 2.0,
                PLACEHOLDER_NATIVE.width,
                PLACEHOLDER_NATIVE.height,
            ),
        };
        let bounds = self.clamp_bounds(kind, bounds);
        let id = self.ids.widget(kind.id_prefix());
        let widget = Widget {
            id,
            kind,
            position: bounds.origin(),
            size: bounds.size(),
            rotation_deg: 0.0,
            z_order: self.state.next_z_order(),
            locked: false,
            style: WidgetStyle::default_for(kind),
        };
        log::debug!("add {kind} as {id} (z {})", widget.z_order);
        self.state.widgets.push(widget);
        self.state.selected = Some(id);
        self.record_if_changed();
        Ok(id)
    }

    /// Shallow-merge `patch` into a widget.
    ///
    /// A locked widget silently ignores patches that touch position, size,
    /// or rotation. A style of the wrong family is ignored. Returns whether
    /// the card changed.
    pub fn update_widget(&mut self, id: WidgetId, patch: WidgetPatch) -> bool {
        let Some(widget) = self.state.widget(id) else {
            return false;
        };
        if widget.locked && patch.touches_geometry() {
            log::debug!("update {id} ignored: widget is locked");
            return false;
        }
        if let Some(style) = &patch.style
            && !style.fits(widget.kind)
        {
            log::debug!("update {id} ignored: style does not fit {}", widget.kind);
            return false;
        }

        let requested = Bounds::from_parts(
            patch.position.unwrap_or(widget.position),
            patch.size.unwrap_or(widget.size),
        );
        let bounds = if patch.position.is_some() || patch.size.is_some() {
            self.clamp_bounds(widget.kind, requested)
        } else {
            widget.bounds()
        };

        let Some(widget) = self.state.widget_mut(id) else {
            return false;
        };
        widget.position = bounds.origin();
        widget.size = bounds.size();
        if let Some(rotation) = patch.rotation_deg.filter(|r| r.is_finite()) {
            widget.rotation_deg = rotation.rem_euclid(360.0);
        }
        if let Some(style) = patch.style {
            widget.style = style.normalized();
        }
        self.record_if_changed()
    }

    /// Replace a widget's style. Allowed on locked widgets.
    pub fn update_style(&mut self, id: WidgetId, style: WidgetStyle) -> bool {
        self.update_widget(id, WidgetPatch::style(style))
    }

    /// Remove a widget, locked or not. Clears the selection if it was selected.
    pub fn delete_widget(&mut self, id: WidgetId) -> bool {
        let Some(pos) = self.state.widgets.iter().position(|w| w.id == id) else {
            return false;
        };
        self.state.widgets.remove(pos);
        if self.state.selected == Some(id) {
            self.state.selected = None;
        }
        log::debug!("delete {id}");
        self.record_if_changed()
    }

    /// Copy a widget, offset by `DUPLICATE_OFFSET`, on top of everything.
    /// The copy starts unlocked and becomes the selection.
    pub fn duplicate_widget(&mut self, id: WidgetId) -> Option<WidgetId> {
        let original = self.state.widget(id)?.clone();
        let offset = Point::new(
            original.position.x + DUPLICATE_OFFSET,
            original.position.y + DUPLICATE_OFFSET,
        );
        let bounds = self.clamp_bounds(original.kind, Bounds::from_parts(offset, original.size));
        let copy_id = self.ids.widget(original.kind.id_prefix());
        let copy = Widget {
            id: copy_id,
            position: bounds.origin(),
            size: bounds.size(),
            z_order: self.state.next_z_order(),
            locked: false,
            ..original
        };
        log::debug!("duplicate {id} as {copy_id}");
        self.state.widgets.push(copy);
        self.state.selected = Some(copy_id);
        self.record_if_changed();
        Some(copy_id)
    }

    pub fn set_locked(&mut self, id: WidgetId, locked: bool) -> bool {
        let Some(widget) = self.state.widget_mut(id) else {
            return false;
        };
        widget.locked = locked;
        self.record_if_changed()
    }

    /// Move a widget in the stacking order. z-orders stay unique.
    pub fn reorder(&mut self, id: WidgetId, how: Reorder) -> bool {
        let Some(current) = self.state.widget(id).map(|w| w.z_order) else {
            return false;
        };
        let others: Vec<(WidgetId, i32)> = self
            .state
            .widgets
            .iter()
            .filter(|w| w.id != id)
            .map(|w| (w.id, w.z_order))
            .collect();
        let zs = || others.iter().map(|&(_, z)| z);

        let target = match how {
            Reorder::ToFront => zs().max().filter(|&top| top > current).map(|top| top + 1),
            Reorder::ToBack => zs().min().filter(|&low| low < current).map(|low| low - 1),
            // Swap with the nearest neighbour in that direction.
            Reorder::Forward | Reorder::Backward => {
                let neighbour = if how == Reorder::Forward {
                    others.iter().filter(|&&(_, z)| z > current).min_by_key(|&&(_, z)| z)
                } else {
                    others.iter().filter(|&&(_, z)| z < current).max_by_key(|&&(_, z)| z)
                };
                neighbour.map(|&(other, z)| {
                    if let Some(w) = self.state.widget_mut(other) {
                        w.z_order = current;
                    }
                    z
                })
            }
        };

        let Some(z) = target else {
            return false;
        };
        if let Some(widget) = self.state.widget_mut(id) {
            widget.z_order = z;
        }
        log::debug!("{id} z-order {current} -> {z}");
        self.record_if_changed()
    }

    pub fn bring_forward(&mut self, id: WidgetId) -> bool {
        self.reorder(id, Reorder::Forward)
    }

    pub fn send_backward(&mut self, id: WidgetId) -> bool {
        self.reorder(id, Reorder::Backward)
    }

    pub fn bring_to_front(&mut self, id: WidgetId) -> bool {
        self.reorder(id, Reorder::ToFront)
    }

    pub fn send_to_back(&mut self, id: WidgetId) -> bool {
        self.reorder(id, Reorder::ToBack)
    }

    // ─── Selection and view toggles ──────────────────────────────────────

    /// Select a widget (or nothing). Unknown ids are ignored.
    pub fn select(&mut self, id: Option<WidgetId>) -> bool {
        if let Some(id) = id
            && self.state.widget(id).is_none()
        {
            return false;
        }
        if self.state.selected == id {
            return false;
        }
        self.state.selected = id;
        true
    }

    /// Grid glow is exported with the card but toggling it is not an undo
    /// step: the current history entry is amended in place.
    pub fn set_grid_glow(&mut self, enabled: bool) -> bool {
        if self.state.grid_glow_enabled == enabled {
            return false;
        }
        self.state.grid_glow_enabled = enabled;
        if let Some(mut entry) = self.history.current().cloned() {
            entry.grid_glow_enabled = enabled;
            self.history.amend_current(entry);
        }
        true
    }

    pub fn set_safe_zones(&mut self, enabled: bool) -> bool {
        let changed = self.state.safe_zones_enabled != enabled;
        self.state.safe_zones_enabled = enabled;
        changed
    }

    // ─── Backgrounds ─────────────────────────────────────────────────────

    pub fn set_background(&mut self, background: Background) -> bool {
        self.state.background = background;
        self.record_if_changed()
    }

    /// Validate and store an upload, then make it the active background.
    /// Rejected files change nothing.
    pub fn upload_background(&mut self, name: &str, mime: &str, bytes: &[u8]) -> Result<BackgroundId> {
        let upload = self.backgrounds.add_upload(name, mime, bytes)?;
        let (id, background) = (upload.id, upload.as_background());
        self.set_background(background);
        Ok(id)
    }

    /// Drop an upload. If it is the active background the card falls back
    /// to the default gradient.
    pub fn delete_upload(&mut self, id: BackgroundId) -> bool {
        if self.backgrounds.remove_upload(id).is_none() {
            return false;
        }
        if self.state.background.upload_id() == Some(id) {
            self.set_background(Background::gradient(DEFAULT_GRADIENT));
        }
        true
    }
}
