//! Sharing an exported card.
//!
//! The host's native share sheet is tried first. When the host cannot share
//! files, or the share sheet fails, the flow falls back to `ShareDialog`: a
//! declarative overlay with explicit open/close state listing copy actions,
//! per-network links, and a download button. The host renders the dialog
//! from `ShareDialog::view` and reports clicks back through `activate`.

use async_trait::async_trait;
use sc_core::ProfileRecord;
use sc_render::ExportedImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const PNG_MIME: &str = "image/png";

/// Caption attached to shared cards.
pub fn caption_for(profile: &ProfileRecord) -> String {
    format!(
        "My hybrid score is {}. Strength meets endurance. #HybridAthlete",
        profile.score_label()
    )
}

/// Everything a share needs: the image, its filename, and the caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub filename: String,
    pub png: Arc<[u8]>,
    pub caption: String,
}

impl SharePayload {
    pub fn new(image: ExportedImage, caption: String) -> Self {
        Self {
            filename: image.filename,
            png: image.png.into(),
            caption,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The user dismissed the share sheet.
    #[error("share cancelled")]
    Cancelled,

    #[error("native sharing is not available")]
    Unsupported,

    #[error("share sheet failed: {0}")]
    Failed(String),
}

/// Platform services the share flow relies on.
#[async_trait(?Send)]
pub trait ShareHost {
    /// Whether the native share sheet accepts image files.
    fn can_share_files(&self) -> bool;

    /// Open the native share sheet with the image and caption.
    async fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Cancelled,
    /// Native sharing was unavailable or failed; show this dialog.
    Fallback(ShareDialog),
}

/// Try the native share sheet, falling back to the manual dialog.
pub async fn share_card<H: ShareHost + ?Sized>(host: &H, payload: SharePayload) -> ShareOutcome {
    if !host.can_share_files() {
        log::info!("native file sharing unavailable; opening share dialog");
        return ShareOutcome::Fallback(ShareDialog::opened(payload));
    }
    match host.share(&payload).await {
        Ok(()) => {
            log::info!("shared {}", payload.filename);
            ShareOutcome::Shared
        }
        Err(ShareError::Cancelled) => {
            log::debug!("share sheet dismissed");
            ShareOutcome::Cancelled
        }
        Err(err) => {
            log::warn!("{err}; falling back to share dialog");
            ShareOutcome::Fallback(ShareDialog::opened(payload))
        }
    }
}

// ─── Fallback dialog ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareNetwork {
    X,
    Facebook,
    WhatsApp,
    Reddit,
}

impl ShareNetwork {
    pub const ALL: [ShareNetwork; 4] = [
        ShareNetwork::X,
        ShareNetwork::Facebook,
        ShareNetwork::WhatsApp,
        ShareNetwork::Reddit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShareNetwork::X => "X / Twitter",
            ShareNetwork::Facebook => "Facebook",
            ShareNetwork::WhatsApp => "WhatsApp",
            ShareNetwork::Reddit => "Reddit",
        }
    }

    /// Web intent URL prefilled with `caption`.
    pub fn intent_url(self, caption: &str) -> String {
        let text = urlencoding::encode(caption);
        match self {
            ShareNetwork::X => format!("https://twitter.com/intent/tweet?text={text}"),
            ShareNetwork::Facebook => {
                format!("https://www.facebook.com/sharer/sharer.php?quote={text}")
            }
            ShareNetwork::WhatsApp => format!("https://wa.me/?text={text}"),
            ShareNetwork::Reddit => format!("https://www.reddit.com/submit?title={text}"),
        }
    }
}

/// Buttons in the fallback dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "network", rename_all = "kebab-case")]
pub enum ShareAction {
    CopyImage,
    CopyCaption,
    Open(ShareNetwork),
    Download,
}

impl ShareAction {
    pub fn all() -> Vec<ShareAction> {
        let mut actions = vec![ShareAction::CopyImage, ShareAction::CopyCaption];
        actions.extend(ShareNetwork::ALL.map(ShareAction::Open));
        actions.push(ShareAction::Download);
        actions
    }

    pub fn label(self) -> &'static str {
        match self {
            ShareAction::CopyImage => "Copy image",
            ShareAction::CopyCaption => "Copy caption",
            ShareAction::Open(network) => network.label(),
            ShareAction::Download => "Download",
        }
    }
}

/// What the host must do after a dialog button is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEffect {
    CopyImage { png: Arc<[u8]>, mime: &'static str },
    CopyText(String),
    OpenUrl(String),
    Download { filename: String, png: Arc<[u8]> },
}

/// Manual share overlay with explicit open/close state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareDialog {
    payload: Option<SharePayload>,
}

/// Serializable snapshot of the dialog for the host to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareDialogView {
    pub open: bool,
    pub caption: String,
    pub filename: String,
    pub buttons: Vec<ShareButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareButton {
    #[serde(flatten)]
    pub action: ShareAction,
    pub label: &'static str,
    /// Target URL for network links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ShareDialog {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn opened(payload: SharePayload) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    pub fn open(&mut self, payload: SharePayload) {
        self.payload = Some(payload);
    }

    pub fn close(&mut self) {
        self.payload = None;
    }

    pub fn is_open(&self) -> bool {
        self.payload.is_some()
    }

    pub fn payload(&self) -> Option<&SharePayload> {
        self.payload.as_ref()
    }

    pub fn view(&self) -> ShareDialogView {
        let Some(payload) = &self.payload else {
            return ShareDialogView {
                open: false,
                caption: String::new(),
                filename: String::new(),
                buttons: Vec::new(),
            };
        };
        let buttons = ShareAction::all()
            .into_iter()
            .map(|action| ShareButton {
                action,
                label: action.label(),
                href: match action {
                    ShareAction::Open(network) => Some(network.intent_url(&payload.caption)),
                    _ => None,
                },
            })
            .collect();
        ShareDialogView {
            open: true,
            caption: payload.caption.clone(),
            filename: payload.filename.clone(),
            buttons,
        }
    }

    /// Resolve a button press. A closed dialog ignores presses.
    pub fn activate(&self, action: ShareAction) -> Option<DialogEffect> {
        let payload = self.payload.as_ref()?;
        Some(match action {
            ShareAction::CopyImage => DialogEffect::CopyImage {
                png: Arc::clone(&payload.png),
                mime: PNG_MIME,
            },
            ShareAction::CopyCaption => DialogEffect::CopyText(payload.caption.clone()),
            ShareAction::Open(network) => DialogEffect::OpenUrl(network.intent_url(&payload.caption)),
            ShareAction::Download => DialogEffect::Download {
                filename: payload.filename.clone(),
                png: Arc::clone(&payload.png),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn payload() -> SharePayload {
        SharePayload::new(
            ExportedImage {
                filename: "hybrid-share-card-20260314-091502.png".into(),
                png: vec![0x89, b'P', b'N', b'G'],
                width: 1080,
                height: 1920,
            },
            "My hybrid score is 78. Strength meets endurance. #HybridAthlete".into(),
        )
    }

    struct FakeHost {
        supports_files: bool,
        result: Result<(), ShareError>,
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl ShareHost for FakeHost {
        fn can_share_files(&self) -> bool {
            self.supports_files
        }

        async fn share(&self, _payload: &SharePayload) -> Result<(), ShareError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn host(supports_files: bool, result: Result<(), ShareError>) -> FakeHost {
        FakeHost {
            supports_files,
            result,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn caption_uses_rounded_score() {
        let mut profile = ProfileRecord::placeholder();
        profile.meta.hybrid_score = Some(81.6);
        assert_eq!(
            caption_for(&profile),
            "My hybrid score is 82. Strength meets endurance. #HybridAthlete"
        );
    }

    #[tokio::test]
    async fn native_share_success() {
        let host = host(true, Ok(()));
        assert_eq!(share_card(&host, payload()).await, ShareOutcome::Shared);
        assert_eq!(host.calls.get(), 1);
    }

    #[tokio::test]
    async fn dismissing_the_sheet_is_not_a_fallback() {
        let host = host(true, Err(ShareError::Cancelled));
        assert_eq!(share_card(&host, payload()).await, ShareOutcome::Cancelled);
    }

    #[tokio::test]
    async fn falls_back_when_unsupported_or_failing() {
        let unsupported = host(false, Ok(()));
        let outcome = share_card(&unsupported, payload()).await;
        assert_eq!(outcome, ShareOutcome::Fallback(ShareDialog::opened(payload())));
        assert_eq!(unsupported.calls.get(), 0);

        let failing = host(true, Err(ShareError::Failed("AbortError".into())));
        let ShareOutcome::Fallback(dialog) = share_card(&failing, payload()).await else {
            panic!("expected fallback dialog");
        };
        assert!(dialog.is_open());
    }

    #[test]
    fn dialog_lists_every_action() {
        let dialog = ShareDialog::opened(payload());
        let view = dialog.view();
        let labels: Vec<&str> = view.buttons.iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            vec![
                "Copy image",
                "Copy caption",
                "X / Twitter",
                "Facebook",
                "WhatsApp",
                "Reddit",
                "Download"
            ]
        );
        assert_eq!(
            view.buttons[2].href.as_deref(),
            Some(
                "https://twitter.com/intent/tweet?text=My%20hybrid%20score%20is%2078.%20Strength%20meets%20endurance.%20%23HybridAthlete"
            )
        );
    }

    #[test]
    fn closed_dialog_ignores_presses() {
        let mut dialog = ShareDialog::opened(payload());
        assert_eq!(
            dialog.activate(ShareAction::CopyCaption),
            Some(DialogEffect::CopyText(payload().caption))
        );
        dialog.close();
        assert!(!dialog.view().open);
        assert_eq!(dialog.activate(ShareAction::Download), None);
    }

    #[test]
    fn view_serializes_for_the_host() {
        let view = ShareDialog::opened(payload()).view();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["open"], true);
        assert_eq!(json["buttons"][0]["action"], "copy-image");
        assert_eq!(json["buttons"][5]["network"], "reddit");
    }
}
