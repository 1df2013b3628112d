//! Listing-page traversal with an explicit worklist.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::markup::{self, PageLinks};
use super::{DirectoryEntry, MatchedFile, ScanError, Scanner};
use crate::download::HttpClient;
use crate::parser::RepositoryRef;
use crate::pattern::PatternSet;
use crate::provider::ProviderEndpoints;
use crate::session::{CrawlSession, EventSink};

/// Scanner that crawls the web host's rendered directory pages.
///
/// Traversal is depth-first in page order: a page's files, then each of its
/// subdirectories in full, then the next page of the same directory.
///
/// # Example
///
/// ```no_run
/// use repofetch_core::download::{HttpClient, HttpSettings};
/// use repofetch_core::parser::parse_repository_ref;
/// use repofetch_core::pattern::PatternSet;
/// use repofetch_core::provider::ProviderEndpoints;
/// use repofetch_core::scan::{PageScanner, Scanner};
/// use repofetch_core::session::{CancelToken, CrawlSession, EventSink};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&HttpSettings::default())?;
/// let scanner = PageScanner::new(client, ProviderEndpoints::default());
/// let repo = parse_repository_ref("https://github.com/octo/demo")?;
/// let mut session = CrawlSession::new(CancelToken::new());
/// let files = scanner
///     .scan(&repo, &PatternSet::parse(".py"), &mut session, &EventSink::detached())
///     .await?;
/// println!("{} files", files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PageScanner {
    client: HttpClient,
    endpoints: ProviderEndpoints,
}

impl PageScanner {
    /// Creates a scanner using `client` for every page request.
    #[must_use]
    pub fn new(client: HttpClient, endpoints: ProviderEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Returns the endpoints this scanner crawls.
    #[must_use]
    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl Scanner for PageScanner {
    #[instrument(skip(self, patterns, session, events), fields(repo = %repo))]
    async fn scan(
        &self,
        repo: &RepositoryRef,
        patterns: &PatternSet,
        session: &mut CrawlSession,
        events: &EventSink,
    ) -> Result<Vec<MatchedFile>, ScanError> {
        let root_url = self.endpoints.root_listing_url(repo);
        let mut worklist = vec![root_url.clone()];
        let mut emitted = HashSet::new();
        let mut matched = Vec::new();
        let mut files_seen = 0_usize;
        let mut directories_seen = 0_usize;

        while let Some(listing_url) = worklist.pop() {
            if session.is_cancelled() {
                events.info(format!(
                    "Scan cancelled; keeping {} file(s) found so far",
                    matched.len()
                ));
                break;
            }
            if !session.mark_visited(&listing_url) {
                continue;
            }

            events.debug(format!("Scanning {listing_url}"));
            let html = match self.client.fetch_page(&listing_url).await {
                Ok(html) => html,
                Err(source) if listing_url == root_url => {
                    return Err(ScanError::root_unavailable(root_url, source));
                }
                Err(error) => {
                    events.warn(format!("Skipping {listing_url}: {error}"));
                    continue;
                }
            };

            let PageLinks {
                entries,
                next_pages,
            } = markup::extract_page(&html, repo, &self.endpoints);

            let mut subdirectories = Vec::new();
            for entry in entries {
                match entry {
                    DirectoryEntry::File {
                        name,
                        relative_path,
                        content_url,
                    } => {
                        files_seen += 1;
                        if !patterns.matches(&name) {
                            continue;
                        }
                        if !emitted.insert(content_url.clone()) {
                            debug!(%content_url, "file already listed on another page");
                            continue;
                        }
                        events.debug(format!("Matched {relative_path}"));
                        matched.push(MatchedFile {
                            display_name: name,
                            relative_path,
                            content_url,
                        });
                    }
                    DirectoryEntry::Directory { listing_url, .. } => {
                        directories_seen += 1;
                        subdirectories.push(listing_url);
                    }
                }
            }

            // Popped in reverse push order: subdirectories first, then the next page.
            for next in next_pages.into_iter().rev() {
                if !session.is_visited(&next) {
                    worklist.push(next);
                }
            }
            for directory in subdirectories.into_iter().rev() {
                if !session.is_visited(&directory) {
                    worklist.push(directory);
                }
            }
        }

        events.info(format!(
            "Scanned {} page(s): {files_seen} file(s) and {directories_seen} subdirectories, {} matching {}",
            session.visited_count(),
            matched.len(),
            patterns.describe()
        ));
        Ok(matched)
    }
}
