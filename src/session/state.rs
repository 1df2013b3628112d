//! Per-run mutable state: cancellation flag, visited listings and counters.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.
///
/// Written by the controlling layer, polled by the worker before every page
/// fetch and every written chunk. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. In-flight requests finish; nothing new starts.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Lifecycle of one crawl-and-download run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Request received, not yet validated.
    Idle,
    /// Walking listing pages.
    Scanning,
    /// Transferring matched files.
    Downloading,
    /// Every matched file was attempted.
    Completed,
    /// Stopped early on request.
    Cancelled,
    /// Stopped by an error before scanning could produce results.
    Failed,
}

impl SessionState {
    /// Returns true for the three end states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// State owned by one run; discarded when the run ends.
#[derive(Debug, Default)]
pub struct CrawlSession {
    cancel: CancelToken,
    visited_listing_urls: HashSet<String>,
    total_matched: usize,
    downloaded_count: usize,
    failed_count: usize,
}

impl CrawlSession {
    /// Creates a session observing `cancel`.
    #[must_use]
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Returns the session's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Records a listing URL as visited.
    ///
    /// Returns false if it was already visited in this session.
    pub fn mark_visited(&mut self, listing_url: &str) -> bool {
        self.visited_listing_urls.insert(listing_url.to_string())
    }

    /// Returns true if `listing_url` was already visited in this session.
    #[must_use]
    pub fn is_visited(&self, listing_url: &str) -> bool {
        self.visited_listing_urls.contains(listing_url)
    }

    /// Returns how many listing pages were visited.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited_listing_urls.len()
    }

    /// Returns the number of files the scan matched.
    #[must_use]
    pub fn total_matched(&self) -> usize {
        self.total_matched
    }

    /// Returns the number of files written completely.
    #[must_use]
    pub fn downloaded_count(&self) -> usize {
        self.downloaded_count
    }

    /// Returns the number of files that failed to download.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub(crate) fn set_total_matched(&mut self, total: usize) {
        self.total_matched = total;
    }

    pub(crate) fn record_downloaded(&mut self) {
        self.downloaded_count += 1;
    }

    pub(crate) fn record_failed(&mut self) {
        self.failed_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_clones_share_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_mark_visited_only_once() {
        let mut session = CrawlSession::default();
        assert!(session.mark_visited("https://github.com/octo/demo"));
        assert!(!session.mark_visited("https://github.com/octo/demo"));
        assert!(session.is_visited("https://github.com/octo/demo"));
        assert_eq!(session.visited_count(), 1);
    }

    #[test]
    fn test_counters() {
        let mut session = CrawlSession::new(CancelToken::new());
        session.set_total_matched(3);
        session.record_downloaded();
        session.record_downloaded();
        session.record_failed();
        assert_eq!(session.total_matched(), 3);
        assert_eq!(session.downloaded_count(), 2);
        assert_eq!(session.failed_count(), 1);
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Scanning.is_terminal());
        assert_eq!(SessionState::Downloading.to_string(), "downloading");
    }
}
