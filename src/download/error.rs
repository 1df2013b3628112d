//! Error types for the download module.
//!
//! Every HTTP request the crawler makes (listing pages and raw file content)
//! reports failures through [`DownloadError`], so a throttled listing page and
//! a throttled file download surface the same rate limit category.

use std::path::PathBuf;

use thiserror::Error;

use super::rate_limiter::RateLimitInfo;

/// Errors that can occur while fetching pages or downloading files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response other than authentication or throttling.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The host throttled the request (HTTP 403 or 429).
    #[error(
        "[RATE LIMIT] HTTP {status} fetching {url} ({info})\n  Suggestion: supply an access token with --token, or wait for the quota to reset"
    )]
    RateLimited {
        /// The URL that was throttled.
        url: String,
        /// The HTTP status code (403 or 429).
        status: u16,
        /// Quota context reported by the host.
        info: RateLimitInfo,
    },

    /// The credential was missing or rejected (HTTP 401).
    #[error("[AUTH] HTTP {status} fetching {url}\n  Suggestion: check that the access token is valid")]
    AuthRequired {
        /// The URL that requires authentication.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The credential contains characters that cannot appear in a header.
    #[error("access token contains characters not allowed in an HTTP header")]
    InvalidCredential,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a rate limit error with the host's quota context.
    pub fn rate_limited(url: impl Into<String>, status: u16, info: RateLimitInfo) -> Self {
        Self::RateLimited {
            url: url.into(),
            status,
            info,
        }
    }

    /// Creates an authentication-required error.
    pub fn auth_required(url: impl Into<String>, status: u16) -> Self {
        Self::AuthRequired {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true when the host throttled the request.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error does not carry.
