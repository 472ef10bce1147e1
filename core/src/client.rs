//! Central request dispatch: base URL joining, default headers, bearer
//! injection and envelope-aware status checking.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::SessionContext;
use crate::transport::Transport;

/// Per-call knobs layered over the client defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Options carrying a JSON-serialized payload.
    pub fn json<T: Serialize>(method: HttpMethod, payload: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        })
    }

    /// Add a header, replacing any default of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

/// HTTP client for the marketplace API.
///
/// Every request goes out with `content-type: application/json` and, when
/// the session holds a token, `authorization: Bearer <token>`. Caller
/// headers override both. An `Err` from [`ApiClient::request`] or
/// [`ApiClient::send`] is terminal for that call; the component layer folds
/// it into an envelope.
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionContext,
    ) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Execute a request and deserialize the response body.
    pub fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.round_trip(endpoint, options)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Execute a request, discarding the response body. For endpoints that
    /// reply 204 or with a body the caller does not need.
    pub fn send(&self, endpoint: &str, options: RequestOptions) -> Result<(), ApiError> {
        self.round_trip(endpoint, options).map(|_| ())
    }

    fn round_trip(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(endpoint, options);
        tracing::debug!(method = ?request.method, path = %request.path, "dispatching request");
        let response = self
            .transport
            .execute(&request)
            .inspect_err(|e| tracing::warn!(path = %request.path, error = %e, "transport failure"))?;
        check_success(response)
            .inspect_err(|e| tracing::warn!(path = %request.path, error = %e, "request failed"))
    }

    fn build_request(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = self.session.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        HttpRequest {
            method: options.method,
            path: format!("{}{}", self.base_url, endpoint),
            headers,
            body: options.body,
        }
    }
}

/// Pass 2xx responses through; turn everything else into [`ApiError::Http`].
fn check_success(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if (200..300).contains(&response.status) {
        Ok(response)
    } else {
        Err(ApiError::Http {
            status: response.status,
            message: error_message(&response),
        })
    }
}

/// The server's `message` field when the error body carries one, otherwise a
/// generic line naming the status. An empty `message` counts as absent.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| body.get("message")?.as_str().map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("request failed with HTTP status {}", response.status))
}
