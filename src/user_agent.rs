//! Shared User-Agent string for listing and raw-content requests.
//!
//! The provider rejects some anonymous requests that carry no browser-like
//! User-Agent, so the header always starts with a `Mozilla/5.0` token.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/repofetch";

/// Default User-Agent for every request made by the crawler.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("Mozilla/5.0 (compatible; repofetch/{version}; +{PROJECT_UA_URL})")
}
