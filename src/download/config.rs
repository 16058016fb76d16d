//! Runtime configuration for catalog and archive fetching.

use std::time::Duration;

use super::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT, MAX_ARCHIVE_BYTES,
    READ_TIMEOUT_SECS,
};
use crate::user_agent;

/// Settings shared by every outbound request.
///
/// Built once from CLI arguments and handed to
/// [`HttpClient::from_config`](super::HttpClient::from_config) and
/// [`CatalogClient::new`](crate::catalog::CatalogClient::new).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Catalog origin, e.g. `https://subscene.com`.
    pub base_url: String,
    /// Minimum spacing between two requests; zero disables pacing.
    pub rate_limit: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub read_timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Largest accepted archive payload in bytes.
    pub max_archive_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            user_agent: user_agent::BROWSER_USER_AGENT.to_string(),
            max_archive_bytes: MAX_ARCHIVE_BYTES,
        }
    }
}
