//! Host rate limit awareness.
//!
//! The provider throttles anonymous traffic. This module does two things:
//!
//! - [`RateLimitInfo`] captures the quota context the provider attaches to a
//!   throttled (403/429) response so it can be shown to the user.
//! - [`TransferPacer`] inserts the fixed pause that follows every file
//!   transfer, keeping a sequential run under the anonymous limit.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use repofetch_core::download::{TransferPacer, parse_retry_after};
//!
//! # async fn example() {
//! let pacer = TransferPacer::new(Duration::from_millis(500));
//! pacer.pause().await;
//! assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
//! # }
//! ```

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::{debug, warn};

use super::constants::MAX_RETRY_AFTER;

/// Header carrying the number of requests left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the total number of requests allowed per window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Header carrying the window reset time as Unix epoch seconds.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota context reported by the provider alongside a throttled response.
///
/// Every field is optional: listing pages are often throttled without any
/// quota headers at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests left in the current window.
    pub remaining: Option<u64>,
    /// Requests allowed per window.
    pub limit: Option<u64>,
    /// When the current window resets.
    pub reset_at: Option<SystemTime>,
    /// Server-requested wait before the next request.
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Reads quota headers from a response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_u64 = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        let info = Self {
            remaining: header_u64(RATE_LIMIT_REMAINING_HEADER),
            limit: header_u64(RATE_LIMIT_LIMIT_HEADER),
            reset_at: header_u64(RATE_LIMIT_RESET_HEADER)
                .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs))),
            retry_after: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after),
        };
        debug!(?info, "parsed rate limit headers");
        info
    }

    /// Returns true when none of the quota headers were present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_none()
            && self.limit.is_none()
            && self.reset_at.is_none()
            && self.retry_after.is_none()
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no quota details reported");
        }

        let mut parts = Vec::new();
        match (self.remaining, self.limit) {
            (Some(remaining), Some(limit)) => {
                parts.push(format!("remaining quota {remaining}/{limit}"));
            }
            (Some(remaining), None) => parts.push(format!("remaining quota {remaining}")),
            _ => {}
        }
        if let Some(reset_at) = self.reset_at {
            parts.push(format!("resets at {}", httpdate::fmt_http_date(reset_at)));
            if let Ok(wait) = reset_at.duration_since(SystemTime::now()) {
                parts.push(format!("about {} min from now", wait.as_secs().div_ceil(60)));
            }
        }
        if let Some(retry_after) = self.retry_after {
            parts.push(format!("retry after {}s", retry_after.as_secs()));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports integer seconds (`"120"`) and HTTP-dates
/// (`"Wed, 21 Oct 2015 07:28:00 GMT"`). Values above one hour are capped;
/// dates in the past yield zero.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        let Ok(seconds) = u64::try_from(seconds) else {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        };
        let duration = Duration::from_secs(seconds);
        if duration > MAX_RETRY_AFTER {
            warn!(
                seconds,
                max_seconds = MAX_RETRY_AFTER.as_secs(),
                "Retry-After exceeds maximum, capping at 1 hour"
            );
            return Some(MAX_RETRY_AFTER);
        }
        return Some(duration);
    }

    let datetime = httpdate::parse_http_date(header_value).ok()?;
    match datetime.duration_since(SystemTime::now()) {
        Ok(duration) => Some(duration.min(MAX_RETRY_AFTER)),
        Err(_) => {
            debug!(header_value, "Retry-After date is in the past");
            Some(Duration::ZERO)
        }
    }
}

/// Fixed pause inserted after each file transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferPacer {
    delay: Duration,
}

impl TransferPacer {
    /// Creates a pacer that sleeps `delay` after each transfer.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a pacer that never sleeps.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns the configured delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleeps for the configured delay (returns immediately when zero).
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
