//! Link extraction from rendered directory listing pages.
//!
//! The host has shipped several listing layouts over the years, so every
//! extractor in [`EXTRACTORS`] runs against each page and the results are
//! merged in order, first discovery winning. Parsing is synchronous and the
//! parsed document never outlives [`extract_page`].

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{trace, warn};
use url::Url;

use super::DirectoryEntry;
use crate::parser::RepositoryRef;
use crate::provider::ProviderEndpoints;

/// One listing layout the scanner understands.
struct Extractor {
    name: &'static str,
    css: &'static str,
}

const EXTRACTORS: &[Extractor] = &[
    Extractor {
        name: "row header",
        css: r#"div[role="row"] a[role="rowheader"]"#,
    },
    Extractor {
        name: "legacy navigation row",
        css: "div.js-navigation-item a.js-navigation-open",
    },
    Extractor {
        name: "content cell",
        css: "td.content a",
    },
    Extractor {
        name: "blob or tree anchor",
        css: r#"a[href*="/blob/"], a[href*="/tree/"]"#,
    },
    Extractor {
        name: "filename column",
        css: "div.react-directory-filename-column a",
    },
    Extractor {
        name: "box row",
        css: r#"div.Box-row a[href*="/blob/"], div.Box-row a[href*="/tree/"]"#,
    },
];

const PAGINATION_CSS: &str = r#"a[rel="next"], a[href*="?after="]"#;

static COMPILED_EXTRACTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    EXTRACTORS
        .iter()
        .filter_map(|extractor| match Selector::parse(extractor.css) {
            Ok(selector) => Some((extractor.name, selector)),
            Err(error) => {
                warn!(extractor = extractor.name, %error, "invalid extractor selector");
                None
            }
        })
        .collect()
});

static PAGINATION_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(PAGINATION_CSS).ok());

/// Everything the scanner needs from one listing page.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct PageLinks {
    /// Files and subdirectories in page order.
    pub entries: Vec<DirectoryEntry>,
    /// Listing URLs of following pages of the same directory.
    pub next_pages: Vec<String>,
}

/// Extracts directory entries and pagination links from listing markup.
pub(crate) fn extract_page(
    html: &str,
    repo: &RepositoryRef,
    endpoints: &ProviderEndpoints,
) -> PageLinks {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = PageLinks::default();

    for (name, selector) in COMPILED_EXTRACTORS.iter() {
        let mut found = 0_usize;
        for element in document.select(selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(rooted) = normalize_href(href, repo, endpoints) else {
                continue;
            };
            let Some(entry) = classify(&rooted, repo, endpoints) else {
                continue;
            };
            if seen.insert(entry_key(&entry).to_string()) {
                links.entries.push(entry);
                found += 1;
            }
        }
        if found > 0 {
            trace!(extractor = name, found, "extracted listing links");
        }
    }

    if let Some(selector) = PAGINATION_SELECTOR.as_ref() {
        let mut seen_pages = HashSet::new();
        for element in document.select(selector) {
            let Some(rooted) = element
                .value()
                .attr("href")
                .and_then(|href| normalize_href(href, repo, endpoints))
            else {
                continue;
            };
            if is_within_repository(&rooted, repo) && seen_pages.insert(rooted.clone()) {
                links.next_pages.push(endpoints.listing_url(&rooted));
            }
        }
    }

    links
}

/// Turns an href into a rooted `/owner/repo/...` path (query kept, fragment
/// dropped).
///
/// Absolute URLs are accepted only on the web host. Relative hrefs are taken
/// as relative to the repository root.
pub(crate) fn normalize_href(
    href: &str,
    repo: &RepositoryRef,
    endpoints: &ProviderEndpoints,
) -> Option<String> {
    let href = href.trim();
    let href = href.split_once('#').map_or(href, |(before, _)| before);
    if href.is_empty() || href.starts_with("//") {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        let url = Url::parse(href).ok()?;
        if !endpoints.is_web_url(&url) {
            return None;
        }
        return Some(match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        });
    }

    if href.starts_with('/') {
        Some(href.to_string())
    } else {
        Some(format!("{}/{href}", repo.path_prefix()))
    }
}

fn split_query(rooted: &str) -> (&str, Option<&str>) {
    match rooted.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rooted, None),
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Returns true if `rooted` points below `/owner/repo/`.
///
/// Owner and repository names are compared ignoring ASCII case, as the host
/// does.
fn is_within_repository(rooted: &str, repo: &RepositoryRef) -> bool {
    let (path, _) = split_query(rooted);
    let parts = segments(path);
    parts.len() > 2
        && parts[0].eq_ignore_ascii_case(repo.owner())
        && parts[1].eq_ignore_ascii_case(repo.name())
}

fn decode(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

fn decode_join(parts: &[&str]) -> String {
    parts.iter().map(|s| decode(s)).collect::<Vec<_>>().join("/")
}

/// Classifies a rooted path as a file or a subdirectory.
///
/// `/owner/repo/blob/<branch>/<path>` is a file and
/// `/owner/repo/tree/<branch>/<path>` a directory. Branch roots (no path
/// after the branch), tree links carrying a query (those are pagination) and
/// anything else are dropped.
pub(crate) fn classify(
    rooted: &str,
    repo: &RepositoryRef,
    endpoints: &ProviderEndpoints,
) -> Option<DirectoryEntry> {
    if !is_within_repository(rooted, repo) {
        return None;
    }
    let (path, query) = split_query(rooted);
    let parts = segments(path);
    if parts.len() < 5 {
        return None;
    }

    match parts[2] {
        "blob" => {
            let raw_path = format!("/{}/{}/{}", parts[0], parts[1], parts[3..].join("/"));
            Some(DirectoryEntry::File {
                name: decode(parts[parts.len() - 1]).into_owned(),
                relative_path: decode_join(&parts[4..]),
                content_url: endpoints.raw_url(&raw_path),
            })
        }
        "tree" if query.is_none() => Some(DirectoryEntry::Directory {
            relative_path: decode_join(&parts[4..]),
            listing_url: endpoints.listing_url(path),
        }),
        _ => None,
    }
}

fn entry_key(entry: &DirectoryEntry) -> &str {
    match entry {
        DirectoryEntry::File { content_url, .. } => content_url,
        DirectoryEntry::Directory { listing_url, .. } => listing_url,
    }
}
