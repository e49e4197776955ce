//! Shared HTTP plumbing for the backend REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::storage::ClientStorage;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("datapuur-client/", env!("CARGO_PKG_VERSION"));

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the web tier (e.g. `http://localhost:3000`).
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:3000")
    }
}

/// Where bearer tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token read from client storage on every request, so a re-login is picked up.
#[async_trait]
impl TokenSource for ClientStorage {
    async fn token(&self) -> Option<String> {
        self.auth_token().await
    }
}

/// Authenticated JSON client rooted at a base URL.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.config.base_url)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

impl RestClient {
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenSource>) -> ClientResult<Self> {
        // No overall request timeout: a hung request only stalls its own call.
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the full URL for an `/api/...` path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// URL of one item in a collection, with `id` encoded as a single path
    /// segment. `/`, `?` and `%` in the id never reach the path verbatim.
    pub fn item_url(&self, collection: &str, id: &str) -> ClientResult<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ClientError::InvalidUrl(format!("unusable id {id:?}")));
        }
        let mut url =
            Url::parse(&self.url(collection)).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(format!("{} cannot carry a path", self.base_url())))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Authorized request to an already-built URL.
    pub async fn request(&self, method: Method, url: Url) -> ClientResult<RequestBuilder> {
        self.authorized(self.client.request(method, url)).await
    }

    pub async fn get(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.authorized(self.client.get(self.url(path))).await
    }

    pub async fn post(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.authorized(self.client.post(self.url(path))).await
    }

    pub async fn put(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.authorized(self.client.put(self.url(path))).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.authorized(self.client.delete(self.url(path))).await
    }

    async fn authorized(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self
            .tokens
            .token()
            .await
            .ok_or_else(|| ClientError::Unauthorized("No authentication token".to_string()))?;
        Ok(request.bearer_auth(token))
    }

    /// Send a request and decode a JSON body on success.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Send a request whose success body is irrelevant.
    pub async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized(message)),
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
        _ => Err(ClientError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `message` and `error` in that order; falls back to the
/// raw body.
pub fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                // FastAPI validation errors: [{"msg": "..."}]
                Some(serde_json::Value::Array(items)) => {
                    let msgs: Vec<_> = items
                        .iter()
                        .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                        .collect();
                    if !msgs.is_empty() {
                        return msgs.join("; ");
                    }
                }
                _ => {}
            }
        }
    }
    body.trim().to_string()
}
