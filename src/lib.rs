//! Repofetch Core Library
//!
//! This library crawls the rendered directory pages of a GitHub repository,
//! selects files by name patterns, and streams them to local disk, without
//! touching the host's structured API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Repository reference parsing (HTTPS and SSH forms)
//! - [`pattern`] - Extension and exact-name file patterns
//! - [`scan`] - Listing page extraction and worklist traversal
//! - [`download`] - HTTP client and streaming download engine
//! - [`session`] - Session state machine, cancellation and event stream
//! - [`provider`] - Web and raw-content base URLs

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod parser;
pub mod pattern;
pub mod provider;
pub mod scan;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use download::{DownloadEngine, DownloadError, HttpClient, HttpSettings, OutputLayout};
pub use parser::{ParseError, RepositoryRef, parse_repository_ref};
pub use pattern::{MatchPattern, PatternSet};
pub use provider::ProviderEndpoints;
pub use scan::{MatchedFile, PageScanner, ScanError, Scanner};
pub use session::{
    CancelToken, CrawlController, CrawlRequest, CrawlSession, SessionError, SessionEvent,
    SessionHandle, SessionOutcome, SessionState, Summary,
};
