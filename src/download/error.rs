//! Error types for the download module.
//!
//! This module defines structured errors for every fetch operation,
//! providing context-rich error messages for debugging and user feedback.

use thiserror::Error;

/// Errors that can occur while fetching a catalog page or archive payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Terminal HTTP status (anything but success and the retry signal).
    #[error("{status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// Status line text, e.g. `404 Not Found`.
        status: String,
        /// The numeric status code.
        code: u16,
    },

    /// The retry signal persisted after the whole retry budget was spent.
    #[error("too many requests fetching {url} ({attempts} attempts)")]
    TooManyRequests {
        /// The URL that kept returning the retry signal.
        url: String,
        /// Number of attempts made, including the first.
        attempts: u32,
    },

    /// The response carried no usable `Content-Length`.
    #[error("missing or invalid content length fetching {url}")]
    MissingContentLength {
        /// The URL of the payload.
        url: String,
    },

    /// The declared payload size exceeds the accepted ceiling.
    #[error("body too large fetching {url}: {size} bytes exceeds limit of {limit}")]
    BodyTooLarge {
        /// The URL of the payload.
        url: String,
        /// Declared size in bytes.
        size: u64,
        /// Accepted ceiling in bytes.
        limit: u64,
    },

    /// The body ended before the declared length was received.
    #[error("truncated body fetching {url}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// The URL of the payload.
        url: String,
        /// Declared size in bytes.
        expected: u64,
        /// Received size in bytes.
        actual: u64,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a terminal HTTP status error.
    pub fn http_status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        let text = match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        };
        Self::HttpStatus {
            url: url.into(),
            status: text,
            code: status.as_u16(),
        }
    }

    /// Creates a retry-exhaustion error.
    pub fn too_many_requests(url: impl Into<String>, attempts: u32) -> Self {
        Self::TooManyRequests {
            url: url.into(),
            attempts,
        }
    }

    /// Creates a missing content length error.
    pub fn missing_content_length(url: impl Into<String>) -> Self {
        Self::MissingContentLength { url: url.into() }
    }

    /// Creates an oversized payload error.
    pub fn body_too_large(url: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::BodyTooLarge {
            url: url.into(),
            size,
            limit,
        }
    }

    /// Creates a truncated body error.
    pub fn truncated(url: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Truncated {
            url: url.into(),
            expected,
            actual,
        }
    }
}

// Context (url) is required by every variant, so there is no
// `From<reqwest::Error>`; use the helper constructors instead.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_http_status_carries_status_text() {
        let error = FetchError::http_status(
            "https://example.com/subtitles/x",
            reqwest::StatusCode::NOT_FOUND,
        );
        let msg = error.to_string();
        assert!(msg.contains("404 Not Found"), "Expected status text in: {msg}");
        assert!(msg.contains("https://example.com/subtitles/x"));
    }

    #[test]
    fn test_fetch_error_too_many_requests_display() {
        let error = FetchError::too_many_requests("https://example.com/a", 4);
        let msg = error.to_string();
        assert!(msg.starts_with("too many requests"), "got: {msg}");
        assert!(msg.contains("4 attempts"));
    }

    #[test]
    fn test_fetch_error_body_too_large_display() {
        let error = FetchError::body_too_large("https://example.com/a.zip", 100, 10);
        let msg = error.to_string();
        assert!(msg.contains("body too large"), "got: {msg}");
        assert!(msg.contains("100"));
    }
}
