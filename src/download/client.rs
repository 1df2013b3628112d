//! HTTP client wrapper shared by the page scanner and the download engine.
//!
//! This module provides the `HttpClient` struct which attaches the fixed
//! User-Agent and the optional access token to every request, applies
//! timeouts, and maps non-success responses to [`DownloadError`] variants.

use std::fmt;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::rate_limiter::RateLimitInfo;
use crate::user_agent;

/// Connection settings for [`HttpClient`].
#[derive(Clone)]
pub struct HttpSettings {
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout (covers streaming large files).
    pub read_timeout: Duration,
    /// Opaque access token forwarded as `Authorization: token <credential>`.
    pub credential: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            credential: None,
        }
    }
}

impl fmt::Debug for HttpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSettings")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP client for listing pages and raw file content.
///
/// Created once per session and reused for every request, taking advantage
/// of connection pooling.
///
/// # Example
///
/// ```no_run
/// use repofetch_core::download::{HttpClient, HttpSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&HttpSettings::default())?;
/// let html = client.fetch_page("https://github.com/octo/demo").await?;
/// println!("{} bytes of markup", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    has_credential: bool,
}

impl HttpClient {
    /// Builds a client from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidCredential`] if the token cannot be
    /// sent as a header value, or [`DownloadError::ClientBuild`] if the
    /// underlying client fails to build.
    #[instrument(level = "debug")]
    pub fn new(settings: &HttpSettings) -> Result<Self, DownloadError> {
        let credential = settings
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let mut headers = HeaderMap::new();
        if let Some(token) = credential {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| DownloadError::InvalidCredential)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .default_headers(headers)
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;

        Ok(Self {
            client,
            has_credential: credential.is_some(),
        })
    }

    /// Returns true when requests carry an access token.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Fetches a listing page and returns its markup.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails, the
    /// server answers with a non-success status, or the body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(url, e))?;
        debug!(bytes = body.len(), "fetched listing page");
        Ok(body)
    }

    /// Sends a GET request and returns the response once the status is known
    /// to be a success. The body is left unread for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::RateLimited`] for 403/429,
    /// [`DownloadError::AuthRequired`] for 401, [`DownloadError::HttpStatus`]
    /// for other non-success codes, and network/timeout errors otherwise.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(status = status.as_u16(), "non-success response");
        Err(match status {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => DownloadError::rate_limited(
                url,
                status.as_u16(),
                RateLimitInfo::from_headers(response.headers()),
            ),
            StatusCode::UNAUTHORIZED => DownloadError::auth_required(url, status.as_u16()),
            _ => DownloadError::http_status(url, status.as_u16()),
        })
    }
}

pub(super) fn map_transport_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, error)
    }
}
