//! Event stream from the crawl worker to whatever drives it.
//!
//! The worker only ever sends; a UI or CLI drains the receiver at its own
//! pace. The channel is unbounded so a slow consumer never stalls the crawl,
//! and a dropped receiver is ignored.

use std::fmt;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, warn};

use super::state::SessionState;

/// Severity of a user-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Verbose detail (per-file match decisions, skipped pages).
    Debug,
    /// Normal progress narration.
    Info,
    /// Recoverable problem (page or file failed).
    Warn,
    /// Problem that ends the run.
    Error,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Files the scan matched.
    pub matched: usize,
    /// Files written completely.
    pub downloaded: usize,
    /// Files that failed.
    pub failed: usize,
}

impl Summary {
    /// Files attempted so far (downloaded + failed).
    #[must_use]
    pub fn processed(&self) -> usize {
        self.downloaded + self.failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matched, {} processed, {} downloaded, {} failed",
            self.matched,
            self.processed(),
            self.downloaded,
            self.failed
        )
    }
}

/// Coarse classification of a run-ending error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The request itself was unusable (bad reference, no patterns, bad output directory).
    InvalidRequest,
    /// The host throttled the first listing page.
    RateLimited,
    /// The first listing page could not be fetched for another reason.
    Network,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every matched file was attempted.
    Completed(Summary),
    /// The scan finished and found nothing matching the patterns.
    NoMatches {
        /// Pattern text, for telling the user what was searched for.
        patterns: String,
    },
    /// Cancellation was requested; the summary covers work done before it.
    Cancelled(Summary),
    /// The run could not start or the first page was unreachable.
    Failed {
        /// Short heading for the error.
        title: String,
        /// Full explanation.
        message: String,
        /// Error classification.
        category: FailureCategory,
    },
}

impl SessionOutcome {
    /// Returns the state machine's end state for this outcome.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed(_) | Self::NoMatches { .. } => SessionState::Completed,
            Self::Cancelled(_) => SessionState::Cancelled,
            Self::Failed { .. } => SessionState::Failed,
        }
    }

    /// Returns the summary, if the run got far enough to have one.
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        match self {
            Self::Completed(summary) | Self::Cancelled(summary) => Some(*summary),
            Self::NoMatches { .. } => Some(Summary::default()),
            Self::Failed { .. } => None,
        }
    }
}

/// One event emitted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Human-readable log line.
    Log {
        /// Severity.
        level: LogLevel,
        /// Message text.
        message: String,
    },
    /// Download progress after each attempted file.
    Progress {
        /// Files written completely so far.
        downloaded: usize,
        /// Files matched by the scan.
        total: usize,
    },
    /// The state machine moved.
    State(SessionState),
    /// Terminal event; nothing follows it.
    Finished(SessionOutcome),
}

/// Sending half of the event stream.
///
/// Every log line is mirrored into `tracing` so a headless run still leaves
/// a trail.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Option<UnboundedSender<SessionEvent>>,
}

impl EventSink {
    /// Creates a connected sink/receiver pair.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Creates a sink that only writes to `tracing`.
    #[must_use]
    pub fn detached() -> Self {
        Self { sender: None }
    }

    /// Sends an event; a closed receiver is not an error.
    pub fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    /// Emits a log line at `level`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Debug => debug!("{message}"),
            LogLevel::Info => info!("{message}"),
            LogLevel::Warn => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
        }
        self.emit(SessionEvent::Log { level, message });
    }

    /// Emits a debug-level log line.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    /// Emits an info-level log line.
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Emits a warn-level log line.
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Emits a progress event.
    pub fn progress(&self, downloaded: usize, total: usize) {
        self.emit(SessionEvent::Progress { downloaded, total });
    }

    /// Emits a state change.
    pub fn state(&self, state: SessionState) {
        debug!(%state, "session state changed");
        self.emit(SessionEvent::State(state));
    }
}
