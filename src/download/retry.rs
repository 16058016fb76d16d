//! Response classification and retry decisions for catalog requests.
//!
//! The catalog answers bursts of traffic with one specific status
//! ([`RETRY_STATUS`], `409 Conflict`). That status is the only retryable
//! condition; every other non-success status is terminal. There is no
//! backoff of its own: the shared [`RateLimiter`](super::RateLimiter) spacing
//! between attempts is the backoff.
//!
//! # Example
//!
//! ```
//! use reqwest::StatusCode;
//! use subscout_core::download::{RetryDecision, StatusClass, classify_status, should_retry};
//!
//! assert_eq!(classify_status(StatusCode::OK), StatusClass::Success);
//! assert_eq!(classify_status(StatusCode::CONFLICT), StatusClass::Retryable);
//!
//! match should_retry(StatusClass::Retryable, 2) {
//!     RetryDecision::Retry { remaining } => assert_eq!(remaining, 1),
//!     other => panic!("unexpected decision: {other:?}"),
//! }
//! ```

use reqwest::StatusCode;
use tracing::instrument;

/// The sole status the catalog uses to ask clients to slow down.
pub const RETRY_STATUS: StatusCode = StatusCode::CONFLICT;

/// Default retry budget for archive downloads.
pub const DEFAULT_MAX_RETRIES: u32 = 20;

/// Classification of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx - pass the response through.
    Success,

    /// The retry signal - re-issue while budget remains.
    Retryable,

    /// Any other status - report as an error carrying the status text.
    Terminal,
}

/// Decision after classifying one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The response is usable.
    Accept,

    /// Issue another attempt with the given remaining budget.
    Retry {
        /// Budget left for the next attempt.
        remaining: u32,
    },

    /// The retry signal arrived with no budget left.
    Exhausted,

    /// A terminal status; do not retry.
    Fail,
}

/// Classifies an HTTP status into a [`StatusClass`].
#[must_use]
pub fn classify_status(status: StatusCode) -> StatusClass {
    if status == RETRY_STATUS {
        StatusClass::Retryable
    } else if status.is_success() {
        StatusClass::Success
    } else {
        StatusClass::Terminal
    }
}

/// Decides what to do after an attempt given the remaining retry budget.
#[must_use]
#[instrument(level = "trace")]
pub fn should_retry(class: StatusClass, budget: u32) -> RetryDecision {
    match class {
        StatusClass::Success => RetryDecision::Accept,
        StatusClass::Terminal => RetryDecision::Fail,
        StatusClass::Retryable if budget > 0 => RetryDecision::Retry {
            remaining: budget - 1,
        },
        StatusClass::Retryable => RetryDecision::Exhausted,
    }
}
