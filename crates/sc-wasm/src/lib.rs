//! WASM bridge for Share Card Studio: exposes the editor to a web page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards pointer
//! and key events in canvas units, redraws from `render_svg` whenever a
//! call reports a change, and renders the share dialog from its JSON view.

mod browser;

use browser::{BrowserShareHost, JsProfileSource, download_png};
use chrono::{DateTime, Utc};
use sc_core::{Background, ProfileRecord, WidgetId, WidgetStyle};
use sc_editor::share::share_card;
use sc_editor::{
    DialogEffect, InputEvent, Modifiers, Reorder, ShareAction, ShareOutcome, Studio, StudioConfig,
};
use sc_render::{ExportConfig, Overlays, render_card_svg};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// The WASM-facing studio.
///
/// All page interaction goes through this struct. State lives behind an
/// `Rc<RefCell<_>>` so async jobs can write results back after they
/// resolve; no borrow is held across an `await`.
#[wasm_bindgen]
pub struct ShareCardStudio {
    inner: Rc<RefCell<Studio>>,
}

impl Default for ShareCardStudio {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn error_json(message: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": message.to_string() }).to_string()
}

#[wasm_bindgen]
impl ShareCardStudio {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        install_console_hooks();

        let config = StudioConfig {
            export: ExportConfig {
                // The page supplies card fonts through `load_font`.
                load_system_fonts: false,
                ..ExportConfig::default()
            },
            ..StudioConfig::default()
        };
        Self {
            inner: Rc::new(RefCell::new(Studio::new(config))),
        }
    }

    /// Register a font (TTF/OTF bytes) for exported card text.
    pub fn load_font(&self, data: Vec<u8>) {
        self.inner.borrow_mut().exporter_mut().load_font_data(data);
    }

    // ─── Profile ─────────────────────────────────────────────────────────

    /// Load profile data through `fetch`, a JS function returning
    /// `Promise<string>`. Resolves to `true` once widgets can be added;
    /// failures and timeouts resolve with placeholder data.
    pub fn load_profile(&self, fetch: js_sys::Function) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let config = inner.borrow().profile_config();
        wasm_bindgen_futures::future_to_promise(async move {
            let source = JsProfileSource::new(fetch, config.timeout);
            let record = sc_editor::session::load_profile(&source, &config).await;
            inner.borrow_mut().store_mut().set_source(Some(record));
            Ok(JsValue::TRUE)
        })
    }

    /// Use a profile the page fetched itself. Malformed JSON falls back to
    /// placeholder data. Returns `false` in that case.
    pub fn set_profile_json(&self, json: &str) -> bool {
        let (record, ok) = match ProfileRecord::from_json(json) {
            Ok(record) => (record, true),
            Err(err) => {
                log::warn!("profile payload is malformed: {err}; using placeholder profile");
                (ProfileRecord::placeholder(), false)
            }
        };
        self.inner.borrow_mut().store_mut().set_source(Some(record));
        ok
    }

    pub fn has_profile(&self) -> bool {
        self.inner.borrow().store().source().is_some()
    }

    // ─── Palette and widgets ─────────────────────────────────────────────

    /// `[{"kind":"score-dial","label":"Score dial"}, ...]`
    pub fn palette_json(&self) -> String {
        let studio = self.inner.borrow();
        let entries: Vec<_> = studio
            .store()
            .registry()
            .palette()
            .into_iter()
            .map(|entry| json!({ "kind": entry.kind, "label": entry.label }))
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Add a widget by palette kind. Returns `{"ok":true,"id":"dial_0"}` or
    /// `{"ok":false,"error":"..."}`.
    pub fn add_widget(&self, kind: &str) -> String {
        match self.inner.borrow_mut().add_widget_named(kind) {
            Ok(id) => json!({ "ok": true, "id": id.as_str() }).to_string(),
            Err(err) => error_json(err),
        }
    }

    /// All widgets with their geometry and style.
    pub fn widgets_json(&self) -> String {
        let studio = self.inner.borrow();
        serde_json::to_string(&studio.store().state().widgets).unwrap_or_else(|_| "[]".to_string())
    }

    /// Id of the selected widget, or an empty string.
    pub fn selected_id(&self) -> String {
        self.inner
            .borrow()
            .store()
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Select a widget by id; an empty string clears the selection.
    pub fn select(&self, id: &str) -> bool {
        let target = (!id.is_empty()).then(|| WidgetId::intern(id));
        self.inner.borrow_mut().store_mut().select(target)
    }

    pub fn delete_widget(&self, id: &str) -> bool {
        self.inner.borrow_mut().store_mut().delete_widget(WidgetId::intern(id))
    }

    /// Returns the copy's id, or an empty string for an unknown id.
    pub fn duplicate_widget(&self, id: &str) -> String {
        self.inner
            .borrow_mut()
            .store_mut()
            .duplicate_widget(WidgetId::intern(id))
            .map(|copy| copy.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn set_locked(&self, id: &str, locked: bool) -> bool {
        self.inner
            .borrow_mut()
            .store_mut()
            .set_locked(WidgetId::intern(id), locked)
    }

    /// `how` is one of `forward`, `backward`, `front`, `back`.
    pub fn reorder(&self, id: &str, how: &str) -> bool {
        let how = match how {
            "forward" => Reorder::Forward,
            "backward" => Reorder::Backward,
            "front" => Reorder::ToFront,
            "back" => Reorder::ToBack,
            _ => return false,
        };
        self.inner.borrow_mut().store_mut().reorder(WidgetId::intern(id), how)
    }

    /// Replace a widget's style from JSON (`{"family":"dial",...}`).
    pub fn set_style_json(&self, id: &str, json: &str) -> bool {
        let style: WidgetStyle = match serde_json::from_str(json) {
            Ok(style) => style,
            Err(err) => {
                log::warn!("ignoring malformed style for {id}: {err}");
                return false;
            }
        };
        self.inner
            .borrow_mut()
            .store_mut()
            .update_style(WidgetId::intern(id), style)
    }

    // ─── Pointer and keyboard ────────────────────────────────────────────

    /// Returns `true` if the canvas needs a redraw.
    pub fn handle_pointer_down(&self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        };
        self.inner.borrow_mut().handle_input(&event)
    }

    pub fn handle_pointer_move(&self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::PointerMove {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        };
        self.inner.borrow_mut().handle_input(&event)
    }

    pub fn handle_pointer_up(&self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::PointerUp {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        };
        self.inner.borrow_mut().handle_input(&event)
    }

    pub fn handle_pointer_cancel(&self) -> bool {
        self.inner.borrow_mut().handle_input(&InputEvent::PointerCancel)
    }

    /// `key` is `KeyboardEvent.key`.
    pub fn handle_key(&self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::Key {
            key: key.to_string(),
            modifiers: modifiers(shift, ctrl, alt, meta),
        };
        self.inner.borrow_mut().handle_input(&event)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&self) -> bool {
        self.inner.borrow_mut().store_mut().undo()
    }

    pub fn redo(&self) -> bool {
        self.inner.borrow_mut().store_mut().redo()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.borrow().store().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.borrow().store().can_redo()
    }

    // ─── Backgrounds and view toggles ────────────────────────────────────

    /// `{"gradients":[{"id","name"}...],"uploads":[{"id","name"}...],"active":{...}}`
    pub fn backgrounds_json(&self) -> String {
        let studio = self.inner.borrow();
        let store = studio.store();
        let gradients: Vec<_> = store
            .backgrounds()
            .gradients()
            .iter()
            .map(|g| json!({ "id": g.id, "name": g.name }))
            .collect();
        let uploads: Vec<_> = store
            .backgrounds()
            .uploads()
            .iter()
            .map(|u| json!({ "id": u.id.as_str(), "name": u.name, "bytes": u.byte_len }))
            .collect();
        json!({
            "gradients": gradients,
            "uploads": uploads,
            "active": store.state().background,
        })
        .to_string()
    }

    pub fn set_gradient(&self, id: &str) -> bool {
        self.inner
            .borrow_mut()
            .store_mut()
            .set_background(Background::gradient(id))
    }

    /// Make a stored upload the active background.
    pub fn use_upload(&self, id: &str) -> bool {
        let mut studio = self.inner.borrow_mut();
        let store = studio.store_mut();
        let Some(background) = store
            .backgrounds()
            .upload(sc_core::BackgroundId::intern(id))
            .map(|u| u.as_background())
        else {
            return false;
        };
        store.set_background(background)
    }

    /// Validate, store, and apply an uploaded image.
    pub fn upload_background(&self, name: &str, mime: &str, bytes: &[u8]) -> String {
        match self
            .inner
            .borrow_mut()
            .store_mut()
            .upload_background(name, mime, bytes)
        {
            Ok(id) => json!({ "ok": true, "id": id.as_str() }).to_string(),
            Err(err) => error_json(err),
        }
    }

    pub fn delete_upload(&self, id: &str) -> bool {
        self.inner
            .borrow_mut()
            .store_mut()
            .delete_upload(sc_core::BackgroundId::intern(id))
    }

    pub fn set_grid_glow(&self, enabled: bool) -> bool {
        self.inner.borrow_mut().store_mut().set_grid_glow(enabled)
    }

    pub fn set_safe_zones(&self, enabled: bool) -> bool {
        self.inner.borrow_mut().store_mut().set_safe_zones(enabled)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Editor view of the card as SVG, overlays included.
    pub fn render_svg(&self) -> String {
        let studio = self.inner.borrow();
        let store = studio.store();
        let state = store.state();
        render_card_svg(
            state.view(),
            store.registry(),
            store.render_profile(),
            store.canvas(),
            &Overlays::editor(state),
        )
    }

    // ─── Export and share ────────────────────────────────────────────────

    /// Whether the export button should be enabled.
    pub fn export_enabled(&self) -> bool {
        self.inner.borrow().export_trigger().is_enabled()
    }

    /// Export and save the PNG.
    pub fn download(&self) -> Result<(), JsValue> {
        let image = self
            .inner
            .borrow()
            .export_now(now())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        download_png(&image.filename, &image.png)
    }

    /// Export and open the native share sheet, falling back to the share
    /// dialog. Resolves to `"shared"`, `"cancelled"`, or `"dialog"`;
    /// rejects with a message if the export itself failed.
    pub fn share(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let prepared = inner.borrow().prepare_share(now());
        wasm_bindgen_futures::future_to_promise(async move {
            let (ticket, payload) = prepared.map_err(|err| JsValue::from_str(&err.to_string()))?;
            let outcome = share_card(&BrowserShareHost, payload).await;
            drop(ticket);
            let status = match &outcome {
                ShareOutcome::Shared => "shared",
                ShareOutcome::Cancelled => "cancelled",
                ShareOutcome::Fallback(_) => "dialog",
            };
            inner.borrow_mut().apply_share_outcome(&outcome);
            Ok(JsValue::from_str(status))
        })
    }

    /// `{"open":bool,"caption":..,"filename":..,"buttons":[...]}`
    pub fn share_dialog_json(&self) -> String {
        let view = self.inner.borrow().dialog().view();
        serde_json::to_string(&view).unwrap_or_else(|e| error_json(e))
    }

    pub fn close_share_dialog(&self) {
        self.inner.borrow_mut().dialog_mut().close();
    }

    /// Press a dialog button (`{"action":"open","network":"reddit"}`).
    ///
    /// Downloads happen here. Copy and link actions are returned for the
    /// page to carry out: `{"effect":"copy-text","text":..}`,
    /// `{"effect":"open-url","url":..}`, `{"effect":"copy-image"}` (bytes via
    /// `share_dialog_png`).
    pub fn activate_share_action(&self, action_json: &str) -> Result<String, JsValue> {
        let action: ShareAction = serde_json::from_str(action_json)
            .map_err(|err| JsValue::from_str(&format!("unknown share action: {err}")))?;
        let effect = self.inner.borrow().dialog().activate(action);
        let reply = match effect {
            None => json!({ "effect": "none" }),
            Some(DialogEffect::CopyText(text)) => json!({ "effect": "copy-text", "text": text }),
            Some(DialogEffect::OpenUrl(url)) => json!({ "effect": "open-url", "url": url }),
            Some(DialogEffect::CopyImage { mime, .. }) => json!({ "effect": "copy-image", "mime": mime }),
            Some(DialogEffect::Download { filename, png }) => {
                download_png(&filename, &png)?;
                json!({ "effect": "downloaded", "filename": filename })
            }
        };
        Ok(reply.to_string())
    }

    /// PNG bytes of the card in the open share dialog.
    pub fn share_dialog_png(&self) -> Option<Vec<u8>> {
        self.inner
            .borrow()
            .dialog()
            .payload()
            .map(|payload| payload.png.to_vec())
    }
}

// ─── Console logging and panic hook ──────────────────────────────────────

/// Level for `log` records forwarded to the browser console.
#[cfg(target_arch = "wasm32")]
const CONSOLE_LOG_LEVEL: log::Level = log::Level::Info;

fn install_console_hooks() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            if console_log::init_with_level(CONSOLE_LOG_LEVEL).is_err() {
                web_sys::console::warn_1(&"a logger is already installed".into());
            }
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Share Card Studio panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Validate a profile payload without a studio. Returns `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_profile(json: &str) -> String {
    match ProfileRecord::from_json(json) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(err) => error_json(err),
    }
}
