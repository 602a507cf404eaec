//! Client Configuration
//!
//! Compile-time defaults plus what the browser tells us at startup:
//! the board id from the location hash and the bearer token from the
//! persisted auth store.

use leptos_kanban_dnd::DragConfig;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_BOARD_ID: &str = "demo";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// localStorage key of the persisted auth store
    pub auth_storage_key: String,
    pub toast_duration_ms: u32,
    /// Serve the board from memory instead of the API
    pub offline: bool,
    pub drag: DragConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("TASKWAVE_API_URL").unwrap_or(DEFAULT_API_URL).to_string(),
            auth_storage_key: "auth-storage".to_string(),
            toast_duration_ms: 3000,
            offline: option_env!("TASKWAVE_OFFLINE").is_some_and(|flag| flag == "1" || flag == "true"),
            drag: DragConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Endpoint URL for an API path such as `/boards/42`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Deserialize)]
struct AuthStorage {
    state: AuthState,
}

#[derive(Deserialize)]
struct AuthState {
    #[serde(default)]
    token: Option<String>,
}

/// Bearer token from the persisted auth store's JSON (`{"state":{"token":...}}`)
pub fn token_from_auth_storage(raw: &str) -> Option<String> {
    serde_json::from_str::<AuthStorage>(raw)
        .ok()
        .and_then(|storage| storage.state.token)
        .filter(|token| !token.is_empty())
}

/// Board id from a `#/boards/{id}` location hash
pub fn board_id_from_hash(hash: &str) -> Option<String> {
    hash.trim_start_matches('#')
        .trim_start_matches('/')
        .strip_prefix("boards/")
        .map(|rest| rest.split(['/', '?']).next().unwrap_or_default().to_string())
        .filter(|id| !id.is_empty())
}

/// Token stored by the login flow, if any
pub fn load_token(config: &ClientConfig) -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let raw = storage.get_item(&config.auth_storage_key).ok()??;
    token_from_auth_storage(&raw)
}

pub fn current_board_id() -> String {
    web_sys::window()
        .and_then(|win| win.location().hash().ok())
        .and_then(|hash| board_id_from_hash(&hash))
        .unwrap_or_else(|| DEFAULT_BOARD_ID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_auth_storage() {
        let raw = r#"{"state":{"token":"abc.def","user":{"id":"u1"}},"version":0}"#;
        assert_eq!(token_from_auth_storage(raw), Some("abc.def".to_string()));
        assert_eq!(token_from_auth_storage(r#"{"state":{"token":null}}"#), None);
        assert_eq!(token_from_auth_storage(r#"{"state":{"token":""}}"#), None);
        assert_eq!(token_from_auth_storage("not json"), None);
    }

    #[test]
    fn test_board_id_from_hash() {
        assert_eq!(board_id_from_hash("#/boards/42"), Some("42".to_string()));
        assert_eq!(board_id_from_hash("#/boards/42/settings"), Some("42".to_string()));
        assert_eq!(board_id_from_hash("#boards/b-1?x=1"), Some("b-1".to_string()));
        assert_eq!(board_id_from_hash("#/boards/"), None);
        assert_eq!(board_id_from_hash(""), None);
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = ClientConfig {
            api_base_url: "http://api.test/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint("/tasks/1/move"), "http://api.test/api/tasks/1/move");
        assert_eq!(config.toast_duration_ms, 3000);
    }
}
