//! Browser services: Web Share, downloads, and the profile fetch.
//!
//! `navigator.share`/`canShare` are looked up dynamically so the bridge
//! works (and falls back cleanly) in browsers without the Web Share API.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use sc_editor::share::{PNG_MIME, ShareError};
use sc_editor::{ProfileError, ProfileSource, ShareHost, SharePayload};
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, FilePropertyBag, HtmlAnchorElement, Url};

const TIMEOUT_SENTINEL: &str = "sc-profile-timeout";
const REVOKE_DELAY_MS: i32 = 1_000;

fn navigator() -> Option<web_sys::Navigator> {
    web_sys::window().map(|w| w.navigator())
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn error_name(err: &JsValue) -> Option<String> {
    Reflect::get(err, &JsValue::from_str("name")).ok()?.as_string()
}

/// Best-effort text for a thrown JS value.
pub fn js_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| error_name(err))
        .unwrap_or_else(|| format!("{err:?}"))
}

fn png_parts(png: &[u8]) -> Array {
    Array::of1(&Uint8Array::from(png))
}

fn share_data(filename: &str, png: &[u8], caption: &str) -> Result<Object, JsValue> {
    let options = FilePropertyBag::new();
    options.set_type(PNG_MIME);
    let file = File::new_with_u8_array_sequence_and_options(&png_parts(png), filename, &options)?;

    let data = Object::new();
    Reflect::set(&data, &JsValue::from_str("files"), &Array::of1(&file))?;
    Reflect::set(&data, &JsValue::from_str("text"), &JsValue::from_str(caption))?;
    Ok(data)
}

/// Web Share API host.
#[derive(Debug, Default)]
pub struct BrowserShareHost;

#[async_trait(?Send)]
impl ShareHost for BrowserShareHost {
    fn can_share_files(&self) -> bool {
        let Some(nav) = navigator() else {
            return false;
        };
        if method(&nav, "share").is_none() {
            return false;
        }
        let Some(can_share) = method(&nav, "canShare") else {
            return false;
        };
        // canShare needs a concrete payload; an empty PNG file stands in.
        match share_data("card.png", &[], "") {
            Ok(probe) => can_share
                .call1(&nav, &probe)
                .map(|ok| ok.is_truthy())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn share(&self, payload: &SharePayload) -> Result<(), ShareError> {
        let nav = navigator().ok_or(ShareError::Unsupported)?;
        let share = method(&nav, "share").ok_or(ShareError::Unsupported)?;
        let failed = |err: JsValue| ShareError::Failed(js_message(&err));

        let data = share_data(&payload.filename, &payload.png, &payload.caption).map_err(failed)?;
        let promise: Promise = share
            .call1(&nav, &data)
            .map_err(failed)?
            .dyn_into()
            .map_err(failed)?;

        match JsFuture::from(promise).await {
            Ok(_) => Ok(()),
            Err(err) if error_name(&err).as_deref() == Some("AbortError") => Err(ShareError::Cancelled),
            Err(err) => Err(failed(err)),
        }
    }
}

/// Save PNG bytes through a temporary object URL and a synthetic link click.
///
/// The URL is revoked on a timer; revoking in the same tick as the click
/// cancels the download in Firefox and older Safari.
pub fn download_png(filename: &str, png: &[u8]) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let options = BlobPropertyBag::new();
    options.set_type(PNG_MIME);
    let blob = Blob::new_with_u8_array_sequence_and_options(&png_parts(png), &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into().map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let revoke = Closure::once_into_js(move || {
        if let Err(err) = Url::revoke_object_url(&url) {
            log::debug!("could not revoke download URL: {}", js_message(&err));
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        revoke.unchecked_ref(),
        REVOKE_DELAY_MS,
    )?;
    Ok(())
}

/// Profile source backed by a JS function returning `Promise<string>`.
/// The request races a timer so a hung fetch resolves to `Timeout`.
pub struct JsProfileSource {
    fetch: Function,
    timeout: Duration,
}

impl JsProfileSource {
    pub fn new(fetch: Function, timeout: Duration) -> Self {
        Self { fetch, timeout }
    }
}

#[async_trait(?Send)]
impl ProfileSource for JsProfileSource {
    async fn fetch_json(&self) -> Result<String, ProfileError> {
        let request: Promise = self
            .fetch
            .call0(&JsValue::NULL)
            .and_then(|value| value.dyn_into::<Promise>())
            .map_err(|err| ProfileError::Fetch(js_message(&err)))?;

        let ms = i32::try_from(self.timeout.as_millis()).unwrap_or(i32::MAX);
        let deadline = Promise::new(&mut |_resolve, reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_1(
                    &reject,
                    ms,
                    &JsValue::from_str(TIMEOUT_SENTINEL),
                );
            }
        });

        match JsFuture::from(Promise::race(&Array::of2(&request, &deadline))).await {
            Ok(body) => body
                .as_string()
                .ok_or_else(|| ProfileError::Fetch("profile response is not text".into())),
            Err(err) if err.as_string().as_deref() == Some(TIMEOUT_SENTINEL) => Err(ProfileError::Timeout),
            Err(err) => Err(ProfileError::Fetch(js_message(&err))),
        }
    }
}
