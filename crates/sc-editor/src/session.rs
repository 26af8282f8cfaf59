//! Editing session: the store plus everything around it.
//!
//! `Studio` owns the canvas store, the gesture controller, the export
//! renderer, and the share dialog. It also runs the two asynchronous jobs
//! of a session: loading profile data (with a timeout and a placeholder
//! fallback) and exporting/sharing (guarded so only one export runs at a
//! time). Canvas state is only ever mutated from the caller's thread.

use crate::input::InputEvent;
use crate::share::{ShareDialog, ShareHost, ShareOutcome, SharePayload, caption_for, share_card};
use crate::store::{CanvasStore, StoreConfig};
use crate::tools::DragResizeController;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sc_core::error::Result;
use sc_core::{ProfileRecord, WidgetId, WidgetKind};
use sc_render::{ExportConfig, ExportFailure, ExportRenderer, ExportedImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

// ─── Profile loading ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile request timed out")]
    Timeout,

    #[error("profile request failed: {0}")]
    Fetch(String),

    #[error("profile payload is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The profile-records collaborator. Returns the raw JSON record.
#[async_trait(?Send)]
pub trait ProfileSource {
    async fn fetch_json(&self) -> std::result::Result<String, ProfileError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLoadConfig {
    pub timeout: Duration,
}

impl Default for ProfileLoadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
        }
    }
}

/// Fetch and decode the profile record.
///
/// With the `native` feature the request is bounded by `config.timeout`;
/// browser hosts enforce their own deadline on the request.
pub async fn fetch_profile<S: ProfileSource + ?Sized>(
    source: &S,
    config: &ProfileLoadConfig,
) -> std::result::Result<ProfileRecord, ProfileError> {
    #[cfg(feature = "native")]
    let json = tokio::time::timeout(config.timeout, source.fetch_json())
        .await
        .map_err(|_| ProfileError::Timeout)??;
    #[cfg(not(feature = "native"))]
    let json = {
        let _ = config;
        source.fetch_json().await?
    };
    Ok(ProfileRecord::from_json(&json)?)
}

/// Like `fetch_profile`, but never fails: errors resolve to the placeholder.
pub async fn load_profile<S: ProfileSource + ?Sized>(
    source: &S,
    config: &ProfileLoadConfig,
) -> ProfileRecord {
    match fetch_profile(source, config).await {
        Ok(record) => {
            log::info!("profile loaded for {}", record.display_name());
            record
        }
        Err(err) => {
            log::warn!("{err}; using placeholder profile");
            ProfileRecord::placeholder()
        }
    }
}

// ─── Export trigger ──────────────────────────────────────────────────────

/// Disables the export button while an export is in flight.
#[derive(Debug, Clone, Default)]
pub struct ExportTrigger {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one export; re-enables the trigger on drop,
/// whether the export succeeded or failed.
#[derive(Debug)]
pub struct ExportTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl ExportTrigger {
    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> std::result::Result<ExportTicket, ExportFailure> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportFailure::InFlight)?;
        Ok(ExportTicket {
            busy: Arc::clone(&self.busy),
        })
    }
}

// ─── Studio ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StudioConfig {
    pub store: StoreConfig,
    pub export: ExportConfig,
    pub profile: ProfileLoadConfig,
}

#[derive(Debug)]
pub struct Studio {
    store: CanvasStore,
    controller: DragResizeController,
    exporter: ExportRenderer,
    trigger: ExportTrigger,
    dialog: ShareDialog,
    profile_config: ProfileLoadConfig,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl Studio {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            store: CanvasStore::new(config.store),
            controller: DragResizeController::new(),
            exporter: ExportRenderer::new(config.export),
            trigger: ExportTrigger::default(),
            dialog: ShareDialog::closed(),
            profile_config: config.profile,
        }
    }

    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CanvasStore {
        &mut self.store
    }

    pub fn controller(&self) -> &DragResizeController {
        &self.controller
    }

    pub fn exporter_mut(&mut self) -> &mut ExportRenderer {
        &mut self.exporter
    }

    pub fn export_trigger(&self) -> &ExportTrigger {
        &self.trigger
    }

    pub fn profile_config(&self) -> ProfileLoadConfig {
        self.profile_config
    }

    pub fn dialog(&self) -> &ShareDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut ShareDialog {
        &mut self.dialog
    }

    /// Load profile data. Widgets can be added once this returns, with
    /// real data or the placeholder.
    pub async fn load<S: ProfileSource + ?Sized>(&mut self, source: &S) {
        let record = load_profile(source, &self.profile_config).await;
        self.store.set_source(Some(record));
    }

    /// Route a pointer or key event. Returns `true` when a repaint is needed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.controller.handle(&mut self.store, event)
    }

    /// Add a widget by its palette name (`"score-dial"`, ...).
    pub fn add_widget_named(&mut self, name: &str) -> Result<WidgetId> {
        let kind: WidgetKind = name.parse()?;
        self.store.add_widget(kind)
    }

    /// Rasterize the current card. Blocks the caller while encoding.
    pub fn export_now(&self, at: DateTime<Utc>) -> std::result::Result<ExportedImage, ExportFailure> {
        let _ticket = self.trigger.try_begin()?;
        self.render(at)
    }

    fn render(&self, at: DateTime<Utc>) -> std::result::Result<ExportedImage, ExportFailure> {
        let snapshot = self.store.state().snapshot();
        self.exporter
            .export(
                snapshot.view(),
                self.store.registry(),
                self.store.render_profile(),
                self.store.canvas(),
                at,
            )
            .inspect_err(|err| log::warn!("export failed: {err}"))
    }

    /// Rasterize on the blocking pool so the editor stays responsive. The
    /// card is snapshotted first; later edits do not affect this export.
    #[cfg(feature = "native")]
    pub async fn export(&self, at: DateTime<Utc>) -> std::result::Result<ExportedImage, ExportFailure> {
        let ticket = self.trigger.try_begin()?;
        let snapshot = self.store.state().snapshot();
        let registry = self.store.registry().clone();
        let profile = self.store.render_profile().clone();
        let canvas = *self.store.canvas();
        let exporter = self.exporter.clone();

        tokio::task::spawn_blocking(move || {
            let _ticket = ticket;
            exporter.export(snapshot.view(), &registry, &profile, &canvas, at)
        })
        .await
        .map_err(|err| ExportFailure::Encode(err.to_string()))?
    }

    /// Render the card for sharing. The returned ticket keeps the export
    /// trigger disabled until the share flow finishes with it.
    pub fn prepare_share(
        &self,
        at: DateTime<Utc>,
    ) -> std::result::Result<(ExportTicket, SharePayload), ExportFailure> {
        let ticket = self.trigger.try_begin()?;
        let image = self.render(at)?;
        let payload = SharePayload::new(image, caption_for(self.store.render_profile()));
        Ok((ticket, payload))
    }

    /// Keep a fallback dialog open for the host to render.
    pub fn apply_share_outcome(&mut self, outcome: &ShareOutcome) {
        if let ShareOutcome::Fallback(dialog) = outcome {
            self.dialog = dialog.clone();
        }
    }

    /// Export, then share through the host, falling back to the share dialog.
    pub async fn export_and_share<H: ShareHost + ?Sized>(
        &mut self,
        host: &H,
        at: DateTime<Utc>,
    ) -> std::result::Result<ShareOutcome, ExportFailure> {
        let (_ticket, payload) = self.prepare_share(at)?;
        let outcome = share_card(host, payload).await;
        self.apply_share_outcome(&outcome);
        Ok(outcome)
    }
}
