//! Background status polling.
//!
//! Polls `/status` and `/usage` on a fixed interval and hands the combined
//! snapshot to a JS callback. Poll failures are logged to the console and
//! otherwise ignored; the next tick tries again. The returned interval id
//! lets the page stop polling with `clearInterval`.

use compliance_client::ApiClient;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::transport::FetchTransport;

const POLL_INTERVAL_MS: i32 = 30_000;

async fn poll_once(api: &ApiClient<FetchTransport>, on_update: &js_sys::Function) {
    let documents = match api.status().await {
        Ok(count) => count,
        Err(err) => {
            web_sys::console::warn_1(&format!("status poll failed: {}", err).into());
            return;
        }
    };
    let usage = match api.usage().await {
        Ok(usage) => usage,
        Err(err) => {
            web_sys::console::warn_1(&format!("usage poll failed: {}", err).into());
            return;
        }
    };

    let snapshot = serde_json::json!({
        "documents": documents,
        "usage": usage,
    });
    match serde_wasm_bindgen::to_value(&snapshot) {
        Ok(value) => {
            let _ = on_update.call1(&JsValue::NULL, &value);
        }
        Err(err) => {
            web_sys::console::warn_1(&format!("status snapshot encode failed: {}", err).into());
        }
    }
}

/// Start polling the backend every 30 seconds. `on_update` receives
/// `{ documents, usage }` after each successful round.
#[wasm_bindgen]
pub fn start_status_polling(api_base: &str, on_update: js_sys::Function) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))?;
    let api = ApiClient::new(FetchTransport::new(api_base));

    let tick = Closure::<dyn FnMut()>::new(move || {
        let api = api.clone();
        let on_update = on_update.clone();
        spawn_local(async move {
            poll_once(&api, &on_update).await;
        });
    });

    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        POLL_INTERVAL_MS,
    )?;
    // The closure must outlive this call; the page owns the interval id
    tick.forget();
    Ok(id)
}
