//! HTTP access and streaming downloads.
//!
//! One [`HttpClient`] serves both listing pages and raw file content, so the
//! credential header, User-Agent and timeouts are configured once. The
//! [`DownloadEngine`] streams each matched file to disk in 8 KiB slices,
//! checking for cancellation between slices.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use repofetch_core::download::{
//!     DownloadEngine, HttpClient, HttpSettings, OutputLayout, TransferPacer,
//! };
//! use repofetch_core::scan::MatchedFile;
//! use repofetch_core::session::{CancelToken, CrawlSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&HttpSettings::default())?;
//! let engine = DownloadEngine::new(client, TransferPacer::disabled(), OutputLayout::Mirror);
//! let mut session = CrawlSession::new(CancelToken::new());
//! let file = MatchedFile {
//!     display_name: "lib.rs".to_string(),
//!     relative_path: "src/lib.rs".to_string(),
//!     content_url: "https://raw.githubusercontent.com/octo/demo/main/src/lib.rs".to_string(),
//! };
//! let outcome = engine.download(&file, Path::new("./out"), &mut session).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod filename;
pub mod rate_limiter;

pub use client::{HttpClient, HttpSettings};
pub use constants::{
    CHUNK_SIZE, CONNECT_TIMEOUT_SECS, DEFAULT_TRANSFER_DELAY, MAX_RETRY_AFTER, READ_TIMEOUT_SECS,
};
pub use engine::{DownloadEngine, FileOutcome};
pub use error::DownloadError;
pub use filename::OutputLayout;
pub use rate_limiter::{RateLimitInfo, TransferPacer, parse_retry_after};

// No module-local Result alias: signatures spell out `Result<T, DownloadError>`.
