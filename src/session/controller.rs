//! Drives one request through validation, scanning and downloading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::error::SessionError;
use super::events::{EventSink, LogLevel, SessionEvent, SessionOutcome, Summary};
use super::state::{CancelToken, CrawlSession, SessionState};
use crate::download::{
    DEFAULT_TRANSFER_DELAY, DownloadEngine, FileOutcome, HttpClient, HttpSettings, OutputLayout,
    TransferPacer,
};
use crate::parser::{RepositoryRef, parse_repository_ref};
use crate::pattern::PatternSet;
use crate::provider::ProviderEndpoints;
use crate::scan::{PageScanner, Scanner};

const WRITE_PROBE_NAME: &str = ".repofetch-write-probe";

/// Everything a caller supplies for one run.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Repository reference in any accepted form.
    pub repository: String,
    /// Comma-separated patterns (`".py,README.md"`).
    pub patterns: String,
    /// Directory receiving the files; created if missing.
    pub output_dir: PathBuf,
    /// Optional access token.
    pub credential: Option<String>,
    /// Mirror the repository tree or flatten into one directory.
    pub layout: OutputLayout,
}

/// Handle to a session running on its own task.
#[derive(Debug)]
pub struct SessionHandle {
    /// Requests cancellation of the running session.
    pub cancel: CancelToken,
    /// Events in emission order; ends with [`SessionEvent::Finished`].
    pub events: UnboundedReceiver<SessionEvent>,
    /// Resolves to the same outcome carried by the final event.
    pub join: JoinHandle<SessionOutcome>,
}

/// Runs crawl sessions.
///
/// Holds the settings that stay fixed across requests; per-request values
/// come in through [`CrawlRequest`].
#[derive(Debug, Clone)]
pub struct CrawlController {
    endpoints: ProviderEndpoints,
    http: HttpSettings,
    transfer_delay: Duration,
}

impl Default for CrawlController {
    fn default() -> Self {
        Self {
            endpoints: ProviderEndpoints::default(),
            http: HttpSettings::default(),
            transfer_delay: DEFAULT_TRANSFER_DELAY,
        }
    }
}

struct Prepared {
    repo: RepositoryRef,
    patterns: PatternSet,
    client: HttpClient,
}

impl CrawlController {
    /// Creates a controller with default endpoints, timeouts and pacing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses different provider endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Uses different connect and read timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.http.connect_timeout = connect;
        self.http.read_timeout = read;
        self
    }

    /// Changes the pause inserted after each file transfer.
    #[must_use]
    pub fn with_transfer_delay(mut self, delay: Duration) -> Self {
        self.transfer_delay = delay;
        self
    }

    /// Starts `request` on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(self, request: CrawlRequest) -> SessionHandle {
        let cancel = CancelToken::new();
        let (sink, events) = EventSink::channel();
        let worker_cancel = cancel.clone();
        let join = tokio::spawn(async move { self.run(request, worker_cancel, &sink).await });
        SessionHandle {
            cancel,
            events,
            join,
        }
    }

    /// Runs `request` to completion on the current task.
    ///
    /// Never fails: fatal errors become [`SessionOutcome::Failed`]. The
    /// outcome is also sent as the final [`SessionEvent::Finished`].
    #[instrument(skip_all, fields(repository = %request.repository))]
    pub async fn run(
        &self,
        request: CrawlRequest,
        cancel: CancelToken,
        events: &EventSink,
    ) -> SessionOutcome {
        events.state(SessionState::Idle);
        let outcome = match self.execute(&request, cancel, events).await {
            Ok(outcome) => outcome,
            Err(error) => {
                events.log(LogLevel::Error, format!("{}: {error}", error.title()));
                error.into_outcome()
            }
        };
        events.state(outcome.state());
        events.emit(SessionEvent::Finished(outcome.clone()));
        outcome
    }

    async fn execute(
        &self,
        request: &CrawlRequest,
        cancel: CancelToken,
        events: &EventSink,
    ) -> Result<SessionOutcome, SessionError> {
        let Prepared {
            repo,
            patterns,
            client,
        } = self.prepare(request).await?;

        let mut session = CrawlSession::new(cancel);
        events.state(SessionState::Scanning);
        events.info(format!("Scanning {repo} for {}", patterns.describe()));

        let scanner: Box<dyn Scanner> =
            Box::new(PageScanner::new(client.clone(), self.endpoints.clone()));
        let files = scanner.scan(&repo, &patterns, &mut session, events).await?;
        session.set_total_matched(files.len());

        if session.is_cancelled() {
            return Ok(SessionOutcome::Cancelled(summary_of(&session)));
        }

        events.state(SessionState::Downloading);
        if files.is_empty() {
            events.info(format!("No files matching {} found", patterns.describe()));
            return Ok(SessionOutcome::NoMatches {
                patterns: patterns.describe(),
            });
        }

        let total = files.len();
        events.info(format!(
            "Downloading {total} file(s) to {}",
            request.output_dir.display()
        ));
        events.progress(0, total);

        let engine = DownloadEngine::new(
            client,
            TransferPacer::new(self.transfer_delay),
            request.layout,
        );
        // Cancelled only if a file was left unattempted or cut short.
        let mut stopped_early = false;
        for file in &files {
            if session.is_cancelled() {
                stopped_early = true;
                break;
            }
            match engine.download(file, &request.output_dir, &mut session).await {
                Ok(FileOutcome::Saved { path, .. }) => {
                    events.info(format!("Saved {} to {}", file.relative_path, path.display()));
                }
                Ok(FileOutcome::Cancelled { path }) => {
                    if let Some(path) = path {
                        events.info(format!("Cancelled; partial file left at {}", path.display()));
                    }
                    stopped_early = true;
                    break;
                }
                Err(error) => {
                    events.warn(format!("Failed to download {}: {error}", file.relative_path));
                }
            }
            events.progress(session.downloaded_count(), total);
        }

        let summary = summary_of(&session);
        events.info(format!("Finished: {summary}"));
        Ok(if stopped_early {
            SessionOutcome::Cancelled(summary)
        } else {
            SessionOutcome::Completed(summary)
        })
    }

    async fn prepare(&self, request: &CrawlRequest) -> Result<Prepared, SessionError> {
        let repo = parse_repository_ref(&request.repository)?;
        let patterns = PatternSet::parse(&request.patterns);
        if patterns.is_empty() {
            return Err(SessionError::NoPatterns);
        }
        ensure_writable(&request.output_dir).await?;

        let settings = HttpSettings {
            credential: request.credential.clone(),
            ..self.http.clone()
        };
        let client = HttpClient::new(&settings).map_err(SessionError::Client)?;
        debug!(
            repo = %repo,
            authenticated = client.has_credential(),
            "session prepared"
        );
        Ok(Prepared {
            repo,
            patterns,
            client,
        })
    }
}

fn summary_of(session: &CrawlSession) -> Summary {
    Summary {
        matched: session.total_matched(),
        downloaded: session.downloaded_count(),
        failed: session.failed_count(),
    }
}

/// Creates `dir` if needed and proves a file can be written in it.
async fn ensure_writable(dir: &Path) -> Result<(), SessionError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SessionError::output_directory(dir, e))?;
    let probe = dir.join(WRITE_PROBE_NAME);
    tokio::fs::write(&probe, b"")
        .await
        .map_err(|e| SessionError::output_directory(dir, e))?;
    tokio::fs::remove_file(&probe)
        .await
        .map_err(|e| SessionError::output_directory(dir, e))?;
    Ok(())
}
