//! Repository traversal: from a repository reference to the list of files
//! worth downloading.
//!
//! [`PageScanner`] walks the rendered directory pages of the web host. Other
//! traversal strategies (such as a structured API) plug in behind the same
//! [`Scanner`] trait.

mod markup;
mod page;

use async_trait::async_trait;
use thiserror::Error;

use crate::download::DownloadError;
use crate::parser::RepositoryRef;
use crate::pattern::PatternSet;
use crate::session::{CrawlSession, EventSink};

pub use page::PageScanner;

/// One link extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    /// A file (`/blob/` link).
    File {
        /// Final path segment, percent-decoded.
        name: String,
        /// Path below the branch, percent-decoded (`src/lib.rs`).
        relative_path: String,
        /// Raw-content URL of the file bytes.
        content_url: String,
    },
    /// A subdirectory (`/tree/` link).
    Directory {
        /// Path below the branch, percent-decoded.
        relative_path: String,
        /// Web URL of the subdirectory's listing page.
        listing_url: String,
    },
}

/// A file whose name matched the pattern set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// File name shown to the user.
    pub display_name: String,
    /// Path below the branch; decides the on-disk location.
    pub relative_path: String,
    /// Where the bytes are fetched from.
    pub content_url: String,
}

/// Errors that end a scan.
///
/// Only the root listing page is fatal; failures on deeper pages are logged
/// and their branch is skipped.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The repository's root listing page could not be fetched.
    #[error("repository page {url} is unavailable: {source}")]
    RootUnavailable {
        /// Root listing URL.
        url: String,
        /// Why the fetch failed.
        #[source]
        source: DownloadError,
    },
}

impl ScanError {
    /// Creates a root-unavailable error.
    pub fn root_unavailable(url: impl Into<String>, source: DownloadError) -> Self {
        Self::RootUnavailable {
            url: url.into(),
            source,
        }
    }

    /// Returns true when the host throttled the root page.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RootUnavailable { source, .. } => source.is_rate_limited(),
        }
    }
}

/// Discovers matching files in a repository.
///
/// Implementations poll `session` for cancellation between network requests
/// and return whatever was collected so far when it is set.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Walks `repo` and returns every file matching `patterns`, in discovery
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RootUnavailable`] when the starting page cannot
    /// be fetched.
    async fn scan(
        &self,
        repo: &RepositoryRef,
        patterns: &PatternSet,
        session: &mut CrawlSession,
        events: &EventSink,
    ) -> Result<Vec<MatchedFile>, ScanError>;
}
