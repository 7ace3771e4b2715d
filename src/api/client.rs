//! StayHub API client implementation.
//!
//! This module provides the HTTP core shared by every endpoint: bearer
//! authentication, JSON request/response handling, error mapping and retry
//! logic for idempotent requests. Endpoints live in sibling modules as
//! further `impl StayHubClient` blocks.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use super::error::{ApiError, Result};
use super::session::{self, Session};
use crate::config::Settings;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// The StayHub API client.
#[derive(Debug, Clone)]
pub struct StayHubClient {
    /// The HTTP client.
    client: Client,
    /// The API base URL, without trailing slash.
    base_url: String,
    /// The signed-in session, if any.
    session: Option<Session>,
    /// Maximum attempts for idempotent requests.
    max_attempts: u32,
    /// Whether an unauthorized response deletes the stored token.
    clear_session_on_unauthorized: bool,
}

impl StayHubClient {
    /// Create a client from settings and an optional session.
    ///
    /// An unauthorized response discards the stored token, so the user is
    /// asked to sign in again.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built, for
    /// example when no TLS backend is available.
    pub fn new(settings: &Settings, session: Option<Session>) -> Result<Self> {
        let client = Self::build_http_client(settings.request_timeout_secs)?;
        Ok(Self {
            client,
            base_url: normalize_base_url(&settings.api_url),
            session,
            max_attempts: settings.retry_attempts.max(1),
            clear_session_on_unauthorized: true,
        })
    }

    /// Create a client for an explicit base URL.
    ///
    /// Does not touch the keyring on unauthorized responses.
    pub fn with_base_url(base_url: &str, session: Option<Session>) -> Result<Self> {
        let client = Self::build_http_client(10)?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            session,
            max_attempts: 3,
            clear_session_on_unauthorized: false,
        })
    }

    /// Set the maximum number of attempts for idempotent requests.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Replace the session (after signing in).
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// Whether the client carries a session token.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_http_client(timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(ApiError::Network)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        match &self.session {
            Some(session) => builder.header(header::AUTHORIZATION, session.header_value()),
            None => builder,
        }
    }

    /// Perform a GET request, retrying transient failures.
    #[instrument(skip(self))]
    pub(super) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let no_query: &[(&str, &str)] = &[];
        self.get_query(path, no_query).await
    }

    /// Perform a GET request with query parameters, retrying transient failures.
    #[instrument(skip(self, query))]
    pub(super) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut attempts = 0;
        let mut last_error: Option<ApiError> = None;

        while attempts < self.max_attempts {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, self.max_attempts);

            let result = async {
                let response = self
                    .request(self.client.get(&url))
                    .query(query)
                    .send()
                    .await?;
                self.handle_json(response).await
            }
            .await;

            match result {
                Ok(value) => return Ok(value),
                Err(e) if Self::is_retryable(&e) && attempts < self.max_attempts => {
                    let delay = Self::calculate_retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::ServerError("Max retries exceeded".to_string())))
    }

    /// Perform a POST request with a JSON body.
    #[instrument(skip(self, body))]
    pub(super) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        self.handle_json(response).await
    }

    /// Perform a POST request whose response body is ignored.
    #[instrument(skip(self, body))]
    pub(super) async fn post_no_content<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .request(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Perform a PUT request with a JSON body.
    #[instrument(skip(self, body))]
    pub(super) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?;
        self.handle_json(response).await
    }

    /// Perform a DELETE request.
    #[instrument(skip(self))]
    pub(super) async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .request(self.client.delete(self.url(path)))
            .send()
            .await?;
        self.handle_empty(response).await
    }

    async fn handle_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let response = self.check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    async fn handle_empty(&self, response: Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);

        let error = Self::error_from_response(status, &url, &body);
        if matches!(error, ApiError::Unauthorized) {
            self.on_unauthorized();
        }
        Err(error)
    }

    fn on_unauthorized(&self) {
        if self.session.is_some() && self.clear_session_on_unauthorized {
            warn!("Session rejected by the API, clearing stored token");
            if let Err(e) = session::delete_token() {
                warn!("Failed to clear stored token: {}", e);
            }
        }
    }

    /// Create an appropriate error from an HTTP response.
    ///
    /// The backend reports errors as `{"message": "..."}` or
    /// `{"message": ["...", "..."]}`.
    fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                let value = json.get("message").or_else(|| json.get("error"))?.clone();
                match value {
                    serde_json::Value::String(s) if !s.is_empty() => Some(s),
                    serde_json::Value::Array(items) => {
                        let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                        (!parts.is_empty()).then(|| parts.join(", "))
                    }
                    _ => None,
                }
            });

        ApiError::from_status(status, message.as_deref().unwrap_or(url))
    }

    /// Check if an error is retryable.
    fn is_retryable(error: &ApiError) -> bool {
        matches!(
            error,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(attempt: u32) -> u64 {
        RETRY_DELAY_MS * 2u64.pow(attempt - 1)
    }
}

/// Percent-encode an id for use as a path segment.
pub(super) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
