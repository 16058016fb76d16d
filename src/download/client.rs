//! Rate limited, retrying HTTP client.
//!
//! This module provides the [`HttpClient`] struct through which every
//! outbound request of the process flows. Each attempt first passes the
//! shared [`RateLimiter`]; a response carrying the retry signal is re-issued
//! while the caller's retry budget lasts.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use subscout_core::download::{HttpClient, RateLimiter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Arc::new(RateLimiter::default()))?;
//! let url = url::Url::parse("https://subscene.com/subtitles/the-matrix")?;
//! let page = client.get_text(&url, 100).await?;
//! println!("{} bytes", page.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, instrument, warn};
use url::Url;

use super::config::FetchConfig;
use super::error::FetchError;
use super::filename::suggested_filename;
use super::rate_limiter::RateLimiter;
use super::retry::{RetryDecision, classify_status, should_retry};

/// One logical request; re-issued verbatim on retry.
#[derive(Debug, Clone)]
pub enum FetchRequest {
    /// Plain `GET`.
    Get(Url),
    /// `POST` with an `application/x-www-form-urlencoded` body.
    PostForm {
        /// Target URL.
        url: Url,
        /// Form fields in order.
        form: Vec<(String, String)>,
    },
}

impl FetchRequest {
    /// Returns the request's target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::Get(url) | Self::PostForm { url, .. } => url,
        }
    }
}

/// A fully buffered archive response.
#[derive(Debug, Clone)]
pub struct ArchivePayload {
    /// The URL the payload was fetched from.
    pub url: Url,
    /// Declared media type, lowercased, parameters stripped.
    pub content_type: String,
    /// Name suggested by `Content-Disposition` or the URL path.
    pub suggested_filename: String,
    /// The payload bytes (exactly the declared length).
    pub bytes: Vec<u8>,
}

/// HTTP client shared by every catalog call site.
///
/// Cheap to clone: the reqwest connection pool and the pacing gate are
/// shared between clones.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: Arc<RateLimiter>,
    max_archive_bytes: u64,
}

impl HttpClient {
    /// Creates a client with default timeouts around the given pacing gate.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the reqwest client cannot be built.
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Result<Self, FetchError> {
        let config = FetchConfig::default();
        let client = build_client(&config)?;
        Ok(Self::with_client(client, rate_limiter, config.max_archive_bytes))
    }

    /// Creates a client and its pacing gate from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the reqwest client cannot be built.
    #[instrument(level = "debug", skip_all, fields(rate_limit_ms = config.rate_limit.as_millis()))]
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = build_client(config)?;
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Ok(Self::with_client(
            client,
            rate_limiter,
            config.max_archive_bytes,
        ))
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, rate_limiter: Arc<RateLimiter>, max_archive_bytes: u64) -> Self {
        Self {
            client,
            rate_limiter,
            max_archive_bytes,
        }
    }

    /// Returns the shared pacing gate.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Returns the archive size ceiling in bytes.
    #[must_use]
    pub fn max_archive_bytes(&self) -> u64 {
        self.max_archive_bytes
    }

    /// Issues one logical request, re-issuing it on the retry signal.
    ///
    /// Every attempt, retries included, waits on the rate limiter first.
    /// With a budget of `k` and a server that always answers with the retry
    /// signal, exactly `k + 1` attempts are made.
    ///
    /// # Errors
    ///
    /// - [`FetchError::TooManyRequests`] when the budget is exhausted
    /// - [`FetchError::HttpStatus`] for any other non-success status
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] on transport failure
    #[instrument(skip(self, request), fields(url = %request.url()))]
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        retries: u32,
    ) -> Result<reqwest::Response, FetchError> {
        let url = request.url().as_str();
        let mut budget = retries;
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            self.rate_limiter.acquire().await;

            let response = self
                .build_request(request)
                .send()
                .await
                .map_err(|e| FetchError::network(url, e))?;
            let status = response.status();

            match should_retry(classify_status(status), budget) {
                RetryDecision::Accept => {
                    debug!(%status, attempts, "request succeeded");
                    return Ok(response);
                }
                RetryDecision::Retry { remaining } => {
                    debug!(%status, attempts, remaining, "retry signal received");
                    budget = remaining;
                }
                RetryDecision::Exhausted => {
                    warn!(%status, attempts, "retry budget exhausted");
                    return Err(FetchError::too_many_requests(url, attempts));
                }
                RetryDecision::Fail => {
                    debug!(%status, attempts, "terminal status");
                    return Err(FetchError::http_status(url, status));
                }
            }
        }
    }

    /// Fetches a page with `GET` and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`fetch`](Self::fetch), plus a network error if
    /// the body cannot be read.
    pub async fn get_text(&self, url: &Url, retries: u32) -> Result<String, FetchError> {
        let response = self.fetch(&FetchRequest::Get(url.clone()), retries).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))
    }

    /// Submits a form with `POST` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Same as [`get_text`](Self::get_text).
    pub async fn post_form_text(
        &self,
        url: &Url,
        form: Vec<(String, String)>,
        retries: u32,
    ) -> Result<String, FetchError> {
        let request = FetchRequest::PostForm {
            url: url.clone(),
            form,
        };
        let response = self.fetch(&request, retries).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))
    }

    /// Downloads an archive payload into memory.
    ///
    /// The declared `Content-Length` is checked against the size ceiling
    /// before any of the body is read; exactly that many bytes are then read.
    ///
    /// # Errors
    ///
    /// - [`FetchError::MissingContentLength`] when the length is absent or unparseable
    /// - [`FetchError::BodyTooLarge`] when the declared length exceeds the ceiling
    /// - [`FetchError::Truncated`] when the body ends early
    /// - the errors of [`fetch`](Self::fetch)
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_archive(&self, url: &Url, retries: u32) -> Result<ArchivePayload, FetchError> {
        let response = self.fetch(&FetchRequest::Get(url.clone()), retries).await?;
        let headers = response.headers();

        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| FetchError::missing_content_length(url.as_str()))?;
        if size > self.max_archive_bytes {
            return Err(FetchError::body_too_large(
                url.as_str(),
                size,
                self.max_archive_bytes,
            ));
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type_essence)
            .unwrap_or_default();
        let disposition = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let suggested_filename = suggested_filename(url, disposition.as_deref());

        let bytes = read_exact_body(response, url, size).await?;
        debug!(
            bytes = bytes.len(),
            content_type = %content_type,
            filename = %suggested_filename,
            "archive payload received"
        );

        Ok(ArchivePayload {
            url: url.clone(),
            content_type,
            suggested_filename,
            bytes,
        })
    }

    fn build_request(&self, request: &FetchRequest) -> reqwest::RequestBuilder {
        match request {
            FetchRequest::Get(url) => self.client.get(url.clone()),
            FetchRequest::PostForm { url, form } => {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(form.iter())
                    .finish();
                self.client
                    .post(url.clone())
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body)
            }
        }
    }
}

/// Reads exactly `size` bytes of body, ignoring anything beyond.
async fn read_exact_body(
    response: reqwest::Response,
    url: &Url,
    size: u64,
) -> Result<Vec<u8>, FetchError> {
    let capacity = usize::try_from(size).unwrap_or(0);
    let mut buffer = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::network(url.as_str(), e))?;
        let wanted = capacity - buffer.len();
        buffer.extend_from_slice(&chunk[..chunk.len().min(wanted)]);
        if buffer.len() == capacity {
            break;
        }
    }

    if buffer.len() != capacity {
        return Err(FetchError::truncated(
            url.as_str(),
            size,
            buffer.len() as u64,
        ));
    }
    Ok(buffer)
}

/// Strips parameters from a media type: `Application/Zip; q=1` -> `application/zip`.
fn media_type_essence(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn build_client(config: &FetchConfig) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.read_timeout.max(Duration::from_secs(1)))
        .gzip(true)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|source| FetchError::ClientBuild { source })
}
