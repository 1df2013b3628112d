//! Crawl session lifecycle.
//!
//! A session moves `Idle -> Scanning -> Downloading` and ends in exactly one
//! of `Completed`, `Cancelled` or `Failed`. [`CrawlController::spawn`] runs a
//! session on its own task and hands back a [`SessionHandle`] carrying the
//! cancellation token and the event receiver.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use repofetch_core::download::OutputLayout;
//! use repofetch_core::session::{CrawlController, CrawlRequest, SessionEvent};
//!
//! # async fn example() {
//! let mut handle = CrawlController::new().spawn(CrawlRequest {
//!     repository: "https://github.com/octo/demo".to_string(),
//!     patterns: ".py,README.md".to_string(),
//!     output_dir: PathBuf::from("./out"),
//!     credential: None,
//!     layout: OutputLayout::Mirror,
//! });
//! while let Some(event) = handle.events.recv().await {
//!     if let SessionEvent::Finished(outcome) = event {
//!         println!("{outcome:?}");
//!     }
//! }
//! # }
//! ```

mod controller;
mod error;
mod events;
mod state;

pub use controller::{CrawlController, CrawlRequest, SessionHandle};
pub use error::SessionError;
pub use events::{EventSink, FailureCategory, LogLevel, SessionEvent, SessionOutcome, Summary};
pub use state::{CancelToken, CrawlSession, SessionState};
