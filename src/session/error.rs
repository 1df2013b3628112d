//! Errors that end a session before any file is downloaded.

use std::path::PathBuf;

use thiserror::Error;

use super::events::{FailureCategory, SessionOutcome};
use crate::download::DownloadError;
use crate::parser::ParseError;
use crate::scan::ScanError;

/// Fatal session errors.
///
/// Per-page and per-file failures never surface here; they are logged and
/// counted in the summary instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The repository reference could not be parsed.
    #[error(transparent)]
    InvalidReference(#[from] ParseError),

    /// The pattern string held no usable pattern.
    #[error("no file patterns given\n  Suggestion: pass extensions or names such as \".py,README.md\"")]
    NoPatterns,

    /// The output directory could not be created or written.
    #[error("output directory {path} is not writable: {source}")]
    OutputDirectory {
        /// Directory that was checked.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built from the request settings.
    #[error(transparent)]
    Client(DownloadError),

    /// The repository's root page could not be fetched.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl SessionError {
    /// Creates an output directory error.
    pub fn output_directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDirectory {
            path: path.into(),
            source,
        }
    }

    /// Short heading shown above the message.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "Invalid repository reference",
            Self::NoPatterns => "No file patterns",
            Self::OutputDirectory { .. } => "Output directory not writable",
            Self::Client(_) => "HTTP client setup failed",
            Self::Scan(error) if error.is_rate_limited() => "Rate limit reached",
            Self::Scan(_) => "Repository unavailable",
        }
    }

    /// Classifies the error for the caller.
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::InvalidReference(_)
            | Self::NoPatterns
            | Self::OutputDirectory { .. }
            | Self::Client(_) => FailureCategory::InvalidRequest,
            Self::Scan(error) if error.is_rate_limited() => FailureCategory::RateLimited,
            Self::Scan(_) => FailureCategory::Network,
        }
    }

    /// Converts the error into the session's terminal outcome.
    #[must_use]
    pub fn into_outcome(self) -> SessionOutcome {
        SessionOutcome::Failed {
            title: self.title().to_string(),
            message: self.to_string(),
            category: self.category(),
        }
    }
}
