//! Constants for the download module (timeouts, pacing, payload limits).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default minimum spacing between two outbound requests (300ms).
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(300);

/// Warning threshold for cumulative pacing delay (30 seconds).
pub const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

/// Largest archive payload accepted from the catalog (80 MiB).
pub const MAX_ARCHIVE_BYTES: u64 = 80 * 1024 * 1024;

/// Default catalog origin.
pub const DEFAULT_BASE_URL: &str = "https://subscene.com";
