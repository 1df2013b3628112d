//! Base URLs of the hosting provider.
//!
//! Listing pages come from the web host and file bytes from the raw content
//! host. Both are injectable so tests can point the crawler at a mock server.

use url::Url;

use crate::parser::RepositoryRef;

/// Default web host serving rendered directory listings.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// Default host serving raw file content.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Web and raw-content base URLs, stored without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    web_base: String,
    raw_base: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_BASE, DEFAULT_RAW_BASE)
    }
}

impl ProviderEndpoints {
    /// Creates endpoints from two base URLs.
    #[must_use]
    pub fn new(web_base: impl Into<String>, raw_base: impl Into<String>) -> Self {
        Self {
            web_base: web_base.into().trim_end_matches('/').to_string(),
            raw_base: raw_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the web base URL.
    #[must_use]
    pub fn web_base(&self) -> &str {
        &self.web_base
    }

    /// Returns the raw-content base URL.
    #[must_use]
    pub fn raw_base(&self) -> &str {
        &self.raw_base
    }

    /// Returns the listing URL of the repository's default branch root.
    #[must_use]
    pub fn root_listing_url(&self, repo: &RepositoryRef) -> String {
        format!("{}{}", self.web_base, repo.path_prefix())
    }

    /// Returns the web URL for a rooted path (`/owner/repo/tree/...`).
    #[must_use]
    pub fn listing_url(&self, rooted_path: &str) -> String {
        format!("{}{rooted_path}", self.web_base)
    }

    /// Returns the raw-content URL for a rooted path (`/owner/repo/branch/file`).
    #[must_use]
    pub fn raw_url(&self, rooted_path: &str) -> String {
        format!("{}{rooted_path}", self.raw_base)
    }

    /// Returns true if `url` points at the web host.
    #[must_use]
    pub fn is_web_url(&self, url: &Url) -> bool {
        Url::parse(&self.web_base).is_ok_and(|base| base.origin() == url.origin())
    }
}
