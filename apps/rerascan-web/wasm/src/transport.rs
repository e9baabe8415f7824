//! Fetch-backed [`ApiTransport`] implementation.
//!
//! Every request goes through the browser's `fetch` with CORS mode and a
//! JSON content type. Non-2xx responses are read for their error body so
//! the UI can show the backend's message instead of a bare status code.

use compliance_client::{ApiTransport, TransportError};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// HTTP transport bound to one `/api` base URL
#[derive(Debug, Clone)]
pub struct FetchTransport {
    api_base: String,
}

impl FetchTransport {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn dispatch(&self, request: Request) -> Result<Value, TransportError> {
        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("no window object".to_string()))?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| TransportError::Network(js_error_message(&e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| TransportError::Network("fetch returned a non-Response".to_string()))?;

        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        if !response.ok() {
            // Prefer the backend's own error message when the body carries one
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or(text);
            return Err(TransportError::Status {
                code: response.status(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl ApiTransport for FetchTransport {
    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(&self.url(path), &opts)
            .map_err(|e| TransportError::Network(js_error_message(&e)))?;
        self.dispatch(request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        let body_str =
            serde_json::to_string(body).map_err(|e| TransportError::Decode(e.to_string()))?;
        opts.set_body(&JsValue::from_str(&body_str));

        let request = Request::new_with_str_and_init(&self.url(path), &opts)
            .map_err(|e| TransportError::Network(js_error_message(&e)))?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| TransportError::Network(js_error_message(&e)))?;
        self.dispatch(request).await
    }
}

/// Best-effort message out of a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
