//! Sequential download engine: one streaming transfer per matched file.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::client::{HttpClient, map_transport_error};
use super::constants::CHUNK_SIZE;
use super::error::DownloadError;
use super::filename::{OutputLayout, create_unique_file, destination_parts};
use super::rate_limiter::TransferPacer;
use crate::scan::MatchedFile;
use crate::session::{CancelToken, CrawlSession};

/// Result of one file transfer that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The whole body was written.
    Saved {
        /// Where the file landed (after collision renaming).
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// Cancellation was observed before the body was complete.
    ///
    /// `path` is the partial file left on disk, or `None` if nothing was
    /// created yet.
    Cancelled {
        /// Partial file, if one was created.
        path: Option<PathBuf>,
    },
}

impl FileOutcome {
    /// Returns the file written to disk, complete or partial.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Saved { path, .. } => Some(path),
            Self::Cancelled { path } => path.as_deref(),
        }
    }

    /// Returns true if the transfer stopped because of cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Downloads matched files into an output directory.
///
/// Transfers run one at a time; the pacer inserts a fixed pause after every
/// finished transfer so a long run does not hammer the content host.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    client: HttpClient,
    pacer: TransferPacer,
    layout: OutputLayout,
}

impl DownloadEngine {
    /// Creates an engine that shares `client` with the scanner.
    #[must_use]
    pub fn new(client: HttpClient, pacer: TransferPacer, layout: OutputLayout) -> Self {
        Self {
            client,
            pacer,
            layout,
        }
    }

    /// Returns the configured output layout.
    #[must_use]
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    /// Downloads one file and updates the session counters.
    ///
    /// A failure only affects this file: it is counted in the session's
    /// `failed_count` and returned so the caller can report it.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails, the server answers with
    /// a non-success status, or the file cannot be written.
    #[instrument(
        skip(self, file, output_dir, session),
        fields(url = %file.content_url, relative_path = %file.relative_path)
    )]
    pub async fn download(
        &self,
        file: &MatchedFile,
        output_dir: &Path,
        session: &mut CrawlSession,
    ) -> Result<FileOutcome, DownloadError> {
        if session.is_cancelled() {
            return Ok(FileOutcome::Cancelled { path: None });
        }

        let result = self.transfer(file, output_dir, session.cancel_token()).await;
        match &result {
            Ok(FileOutcome::Saved { path, bytes }) => {
                session.record_downloaded();
                debug!(path = %path.display(), bytes, "download completed");
                self.pacer.pause().await;
            }
            Ok(FileOutcome::Cancelled { path }) => {
                info!(partial = ?path, "download cancelled");
            }
            Err(error) => {
                session.record_failed();
                warn!(error = %error, "download failed");
                self.pacer.pause().await;
            }
        }
        result
    }

    async fn transfer(
        &self,
        file: &MatchedFile,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<FileOutcome, DownloadError> {
        let response = self.client.get(&file.content_url).await?;

        let (parent, file_name) = destination_parts(output_dir, &file.relative_path, self.layout);
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| DownloadError::io(&parent, e))?;
        let (path, handle) = create_unique_file(&parent, &file_name).await?;
        let mut writer = BufWriter::new(handle);
        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_transport_error(&file.content_url, e))?;
            for slice in chunk.chunks(CHUNK_SIZE) {
                if cancel.is_cancelled() {
                    writer
                        .flush()
                        .await
                        .map_err(|e| DownloadError::io(&path, e))?;
                    debug!(
                        path = %path.display(),
                        bytes = bytes_written,
                        "partial file left on disk"
                    );
                    return Ok(FileOutcome::Cancelled { path: Some(path) });
                }
                writer
                    .write_all(slice)
                    .await
                    .map_err(|e| DownloadError::io(&path, e))?;
                bytes_written += u64::try_from(slice.len()).unwrap_or(u64::MAX);
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(&path, e))?;

        Ok(FileOutcome::Saved {
            path,
            bytes: bytes_written,
        })
    }
}
