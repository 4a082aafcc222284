//! REST client for the university tracker backend
//!
//! Every request is built through [`ApiClient::request`], which takes the
//! caller's [`Credentials`] as a parameter. The client itself holds no
//! identity: whoever owns the session decides, per call, which token goes out.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

mod auth;
mod catalog;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ApiError, ErrorPayload, FieldErrors};
pub use models::{
    Application, ApplicationId, ApplicationStatus, ApplicationUpdate, AuthResponse, CatalogQuery,
    DashboardStats, ListResponse, Program, RegisterData, University, UniversityId,
    UniversityPayload, User,
};

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Identity attached to an outgoing request
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value of the Authorization header, if any
    pub fn header_value(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Token {}", t))
    }

    fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => req.header(reqwest::header::AUTHORIZATION, value),
            None => req,
        }
    }
}

// Never print the token itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Some(_) => f.write_str("Credentials(Token ***)"),
            None => f.write_str("Credentials(anonymous)"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client bound to one API root (e.g. `http://localhost:8000/api`)
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    /// Build a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("unitrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request to `path` (relative to the API root, leading slash)
    /// carrying `creds`
    pub fn request(&self, method: Method, path: &str, creds: &Credentials) -> RequestBuilder {
        creds.apply(self.http.request(method, self.url(path)))
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(req).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and discard any body
    pub(crate) async fn send_empty(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.send(req).await.map(|_| ())
    }

    async fn send(&self, req: RequestBuilder) -> Result<bytes::Bytes, ApiError> {
        let response = req.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.bytes().await?;

        if status.is_success() {
            tracing::debug!("{} -> {} ({} bytes)", path, status.as_u16(), body.len());
            Ok(body)
        } else {
            tracing::debug!("{} -> {} (error)", path, status.as_u16());
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}
