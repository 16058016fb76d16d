//! Rate limited, retrying fetches and the concurrent download orchestrator.
//!
//! Every outbound request of the process goes through one [`HttpClient`],
//! which waits on a shared [`RateLimiter`] before each attempt and re-issues
//! the request while the catalog answers with [`RETRY_STATUS`].
//!
//! # Features
//!
//! - Global request pacing (300ms by default), shared across tasks
//! - Retry budget per logical request, no backoff beyond the pacing
//! - Archive payloads checked against a size ceiling before the body is read
//! - Filename suggestion from `Content-Disposition` headers
//! - Fan-out of per-record downloads with per-item outcome reporting
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use subscout_core::download::{HttpClient, RateLimiter, DEFAULT_MAX_RETRIES};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Arc::new(RateLimiter::default()))?;
//! let url = url::Url::parse("https://subscene.com/subtitle/download?mac=abc")?;
//! let payload = client.fetch_archive(&url, DEFAULT_MAX_RETRIES).await?;
//! println!("{} ({} bytes)", payload.suggested_filename, payload.bytes.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod constants;
mod error;
mod filename;
mod orchestrator;
pub mod rate_limiter;
mod retry;

pub use client::{ArchivePayload, FetchRequest, HttpClient};
pub use config::FetchConfig;
pub use constants::{DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT, MAX_ARCHIVE_BYTES};
pub use error::FetchError;
pub use orchestrator::{
    DEFAULT_CONCURRENCY, DownloadOrchestrator, DownloadSummary, ExtractionOutcome,
    OrchestratorError, SubtitleError,
};
pub use rate_limiter::RateLimiter;
pub use retry::{
    DEFAULT_MAX_RETRIES, RETRY_STATUS, RetryDecision, StatusClass, classify_status, should_retry,
};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, FetchError>` explicitly in function signatures.
