//! Error types for repository reference parsing.

use thiserror::Error;

/// Errors that can occur while parsing a repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The reference is not a recognizable repository on the supported host.
    #[error("invalid repository reference '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidReference {
        /// The reference as supplied by the caller.
        input: String,
        /// Why the reference was rejected.
        reason: String,
        /// How to fix the issue.
        suggestion: &'static str,
    },
}

impl ParseError {
    /// Creates an `InvalidReference` error for a reference on another host.
    #[must_use]
    pub fn wrong_host(input: &str, host: &str) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: format!("host '{host}' is not supported"),
            suggestion: "Use a github.com repository URL",
        }
    }

    /// Creates an `InvalidReference` error for a path without owner and name.
    #[must_use]
    pub fn missing_segments(input: &str) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: "expected an owner and a repository name".to_string(),
            suggestion: "Use the form https://github.com/owner/repo",
        }
    }

    /// Creates an `InvalidReference` error for input that is not a URL.
    #[must_use]
    pub fn malformed(input: &str, parse_error: &str) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Use https://github.com/owner/repo or git@github.com:owner/repo.git",
        }
    }
}
