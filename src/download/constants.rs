//! Constants for the download module (timeouts, chunking, pacing).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Size of each slice written to disk between cancellation checks.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Pause after each file transfer to stay under the anonymous rate limit.
pub const DEFAULT_TRANSFER_DELAY: Duration = Duration::from_millis(500);

/// Maximum Retry-After value (1 hour) to prevent excessive delays.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);
