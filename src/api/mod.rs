use crate::models::{Note, NoteDraft};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    /// Read once at startup from `window.ENV.API_URL` (or the lowercase
    /// `api_url` spelling), falling back to the local dev backend.
    pub fn new() -> Self {
        let api_url = window_env("API_URL")
            .or_else(|| window_env("api_url"))
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        Self { api_url }
    }
}

fn window_env(key: &str) -> Option<String> {
    let env = web_sys::window()?.get("ENV")?;
    if !env.is_object() {
        return None;
    }
    js_sys::Reflect::get(&env, &key.into()).ok()?.as_string()
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn notes_path() -> String {
    "/api/notes".to_string()
}

pub(crate) fn note_path(id: &str) -> String {
    format!("/api/notes/{id}")
}

pub(crate) fn search_path(query: &str) -> String {
    format!("/api/search?q={}", urlencoding::encode(query))
}

/// Only the empty query means "everything"; a whitespace query is a real
/// search term and goes to the backend as-is.
pub(crate) fn list_or_search_path(query: &str) -> String {
    if query.is_empty() {
        notes_path()
    } else {
        search_path(query)
    }
}

/// Thin wrapper over the note backend. One request per call, no retries;
/// failures are surfaced to the caller as [`ApiError`].
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    pub async fn list_notes(&self) -> ApiResult<Vec<Note>> {
        self.request(reqwest::Method::GET, &notes_path(), None::<&()>)
            .await
    }

    /// Full-text search over titles and tags. An empty query is the same as
    /// an unfiltered list.
    pub async fn search_notes(&self, query: &str) -> ApiResult<Vec<Note>> {
        self.request(reqwest::Method::GET, &list_or_search_path(query), None::<&()>)
            .await
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> ApiResult<Note> {
        self.request(reqwest::Method::POST, &notes_path(), Some(draft))
            .await
    }

    pub async fn update_note(&self, id: &str, draft: &NoteDraft) -> ApiResult<Note> {
        self.request(reqwest::Method::PUT, &note_path(id), Some(draft))
            .await
    }

    /// Backend replies with an acknowledgement object we don't care about.
    pub async fn delete_note(&self, id: &str) -> ApiResult<()> {
        self.request::<serde_json::Value>(reqwest::Method::DELETE, &note_path(id), None::<&()>)
            .await
            .map(|_| ())
    }
}


// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_env_config_defaults_without_window_env() {
        // The test page defines no `window.ENV`.
        let cfg = EnvConfig::new();
        assert_eq!(cfg.api_url, "http://localhost:8000");
    }
}
