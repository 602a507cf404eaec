//! API Command Wrappers
//!
//! Frontend bindings to the Taskwave REST API over `fetch`.

mod board;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use taskwave_board::{BoardError, BoardResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub use board::HttpBoardApi;

/// `{ "data": ... }` envelope used by the task and column endpoints
#[derive(Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body: `{ "message": ..., "error": ... }`
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Human-readable message from an error response body
pub fn error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    match (parsed.message, parsed.error) {
        (Some(message), Some(detail)) if message != detail => format!("{}: {}", message, detail),
        (Some(message), _) => message,
        (None, Some(detail)) => detail,
        (None, None) => format!("request failed with status {}", status),
    }
}

fn js_error(err: JsValue) -> BoardError {
    BoardError::Network(
        err.as_string()
            .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
            .unwrap_or_else(|| "network request failed".to_string()),
    )
}

/// Issue a request and return the raw response after checking its status
async fn send(method: &str, url: &str, token: Option<&str>, body: Option<String>) -> BoardResult<web_sys::Response> {
    let window = web_sys::window().ok_or_else(|| BoardError::Network("no window".to_string()))?;

    let headers = web_sys::Headers::new().map_err(js_error)?;
    headers.set("Content-Type", "application/json").map_err(js_error)?;
    if let Some(token) = token {
        headers.set("Authorization", &format!("Bearer {}", token)).map_err(js_error)?;
    }

    let init = web_sys::RequestInit::new();
    init.set_method(method);
    init.set_mode(web_sys::RequestMode::Cors);
    init.set_headers(&headers);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(&body));
    }

    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    let promise: js_sys::Promise = window.fetch_with_request(&request);
    let response: web_sys::Response = JsFuture::from(promise).await.map_err(js_error)?.dyn_into().map_err(js_error)?;

    if !response.ok() {
        let status = response.status();
        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise).await.ok().and_then(|v| v.as_string()).unwrap_or_default(),
            Err(_) => String::new(),
        };
        tracing::warn!(%method, %url, status, "request failed");
        return Err(BoardError::Http {
            status,
            message: error_message(status, &text),
        });
    }
    Ok(response)
}

/// Request returning a JSON body
pub async fn request<T: DeserializeOwned>(
    method: &str,
    url: &str,
    token: Option<&str>,
    body: Option<String>,
) -> BoardResult<T> {
    let response = send(method, url, token, body).await?;
    let json = JsFuture::from(response.json().map_err(js_error)?).await.map_err(js_error)?;
    serde_wasm_bindgen::from_value(json).map_err(|e| BoardError::Decode(e.to_string()))
}

/// Request whose body is ignored
pub async fn request_empty(method: &str, url: &str, token: Option<&str>) -> BoardResult<()> {
    send(method, url, token, None).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(400, r#"{"message":"Erreur de validation","error":"title required"}"#),
            "Erreur de validation: title required"
        );
        assert_eq!(error_message(401, r#"{"message":"Non autorisé"}"#), "Non autorisé");
        assert_eq!(error_message(500, "<html>"), "request failed with status 500");
    }

    #[test]
    fn test_envelope_decodes_task() {
        let body = r#"{"success":true,"data":{"task":{
            "id":"t1","title":"x","position":0,"columnId":"c1",
            "createdAt":"2025-05-15T10:00:00Z","updatedAt":"2025-05-15T10:00:00Z"
        }}}"#;
        let envelope: Envelope<board::TaskData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.task.column_id, "c1");
    }
}
