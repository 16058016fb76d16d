//! Concurrent download orchestrator.
//!
//! Fans out one task per selected [`SubtitleRecord`]. Each task resolves the
//! record's detail page, fetches the archive, and extracts its subtitle
//! entries. Outcomes are collected on the calling task as tasks finish, so
//! the result callback never runs concurrently with itself.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use subscout_core::catalog::{CatalogClient, DOWNLOAD_RETRIES};
//! use subscout_core::download::{DEFAULT_CONCURRENCY, DownloadOrchestrator, FetchConfig};
//!
//! # async fn example(records: Vec<subscout_core::SubtitleRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = CatalogClient::from_config(&FetchConfig::default())?;
//! let orchestrator = DownloadOrchestrator::new(catalog, DEFAULT_CONCURRENCY)?;
//! let summary = orchestrator
//!     .get(records, Path::new("."), None, DOWNLOAD_RETRIES, |outcome| {
//!         println!("{}: {} entries", outcome.suggested_filename, outcome.extracted.len());
//!     })
//!     .await?;
//! println!("completed {}", summary.completed());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::ArchivePayload;
use super::error::FetchError;
use crate::archive::{
    ArchiveError, ExtractedFiles, ExtractionError, SUBTITLE_EXTENSION, is_subtitle_file,
    open_archive,
};
use crate::catalog::{CatalogClient, CatalogError, SubtitleRecord};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Why a single record failed.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// Detail page resolution failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The archive could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The archive could not be opened or extracted.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The task died before reporting.
    #[error("download task failed: {reason}")]
    TaskFailed {
        /// Panic or cancellation message.
        reason: String,
    },
}

/// Result of one orchestrated download, handed to the result callback.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Detail page the download started from.
    pub source_uri: Url,
    /// Resolved archive URL, when resolution got that far.
    pub archive_uri: Option<Url>,
    /// Archive name from `Content-Disposition` or the URL, when fetched.
    pub suggested_filename: String,
    /// Entry name -> written path (`None` = seen but not written).
    pub extracted: ExtractedFiles,
    /// Why the download failed, if it did.
    pub error: Option<Arc<SubtitleError>>,
}

impl ExtractionOutcome {
    fn pending(source_uri: Url) -> Self {
        Self {
            source_uri,
            archive_uri: None,
            suggested_filename: String::new(),
            extracted: ExtractedFiles::new(),
            error: None,
        }
    }

    fn fail(&mut self, error: impl Into<SubtitleError>) {
        self.error = Some(Arc::new(error.into()));
    }

    /// Returns `true` if the download and extraction completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Iterates over the paths actually written.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.extracted.values().filter_map(|path| path.as_deref())
    }
}

/// Counts from a fully successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    completed: usize,
    failed: usize,
}

impl DownloadSummary {
    /// Returns the number of records downloaded and extracted.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Returns the number of records that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the number of records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }
}

/// Errors from the orchestrator as a whole.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// At least one record failed; carries the last failure observed.
    #[error("{failed} of {total} downloads failed, last error: {last}")]
    Failed {
        /// Number of failed records.
        failed: usize,
        /// Number of records processed.
        total: usize,
        /// The most recently observed failure.
        #[source]
        last: Arc<SubtitleError>,
    },
}

/// Runs downloads for selected subtitle records concurrently.
///
/// Every record gets its own task. At most `concurrency` tasks do network
/// or extraction work at a time; all requests still pass through the
/// catalog's shared rate limiter.
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    catalog: CatalogClient,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl DownloadOrchestrator {
    /// Creates an orchestrator over a catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidConcurrency`] if the value is
    /// outside 1-100.
    #[instrument(level = "debug", skip(catalog))]
    pub fn new(catalog: CatalogClient, concurrency: usize) -> Result<Self, OrchestratorError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(OrchestratorError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            rate_limit_ms = catalog.http().rate_limiter().interval().as_millis(),
            "creating download orchestrator"
        );

        Ok(Self {
            catalog,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads and extracts every record, invoking `on_result` once per record.
    ///
    /// With `base_name` set, each record extracts its first subtitle into
    /// `<dest_dir>/<base_name>.srt`; otherwise every subtitle entry lands in
    /// `dest_dir` under its own name. A failing record never stops the
    /// others; the call returns once all records are done.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Failed`] carrying the last failure seen
    /// if any record failed. Every failure is also reported to `on_result`.
    #[instrument(skip(self, records, on_result), fields(records = records.len(), dest_dir = %dest_dir.display()))]
    pub async fn get<F>(
        &self,
        records: Vec<SubtitleRecord>,
        dest_dir: &Path,
        base_name: Option<&str>,
        retries: u32,
        mut on_result: F,
    ) -> Result<DownloadSummary, OrchestratorError>
    where
        F: FnMut(ExtractionOutcome),
    {
        let destination = match base_name {
            Some(name) => dest_dir.join(format!("{name}.{SUBTITLE_EXTENSION}")),
            None => dest_dir.to_path_buf(),
        };

        let mut tasks = JoinSet::new();
        let mut sources = std::collections::HashMap::new();
        for record in records {
            let catalog = self.catalog.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let destination = destination.clone();
            let source_uri = record.uri.clone();

            let handle = tasks.spawn(async move {
                // Closed only on drop; a closed semaphore means no limit.
                let _permit = semaphore.acquire_owned().await.ok();
                download_one(&catalog, &record, destination, retries).await
            });
            sources.insert(handle.id(), source_uri);
        }

        let mut summary = DownloadSummary::default();
        let mut last_error: Option<Arc<SubtitleError>> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, outcome)) => outcome,
                Err(join_error) => {
                    let source = sources.get(&join_error.id()).cloned();
                    warn!(error = %join_error, "download task did not complete");
                    let Some(source) = source else { continue };
                    let mut outcome = ExtractionOutcome::pending(source);
                    outcome.fail(SubtitleError::TaskFailed {
                        reason: join_error.to_string(),
                    });
                    outcome
                }
            };

            if let Some(error) = &outcome.error {
                summary.failed += 1;
                warn!(source = %outcome.source_uri, error = %error, "download failed");
                last_error = Some(Arc::clone(error));
            } else {
                summary.completed += 1;
                info!(
                    source = %outcome.source_uri,
                    written = outcome.written().count(),
                    "download completed"
                );
            }
            on_result(outcome);
        }

        match last_error {
            None => Ok(summary),
            Some(last) => Err(OrchestratorError::Failed {
                failed: summary.failed,
                total: summary.total(),
                last,
            }),
        }
    }
}

/// Runs one record to completion, folding every failure into the outcome.
async fn download_one(
    catalog: &CatalogClient,
    record: &SubtitleRecord,
    destination: PathBuf,
    retries: u32,
) -> ExtractionOutcome {
    let mut outcome = ExtractionOutcome::pending(record.uri.clone());

    let archive_uri = match catalog.download_uri(record, retries).await {
        Ok(uri) => uri,
        Err(e) => {
            outcome.fail(e);
            return outcome;
        }
    };
    outcome.archive_uri = Some(archive_uri.clone());

    let payload = match catalog.http().fetch_archive(&archive_uri, retries).await {
        Ok(payload) => payload,
        Err(e) => {
            outcome.fail(e);
            return outcome;
        }
    };
    outcome.suggested_filename.clone_from(&payload.suggested_filename);

    match tokio::task::spawn_blocking(move || extract_payload(payload, &destination)).await {
        Ok(Ok(files)) => outcome.extracted = files,
        Ok(Err(ExtractionError { files, source })) => {
            outcome.extracted = files;
            outcome.fail(source);
        }
        Err(join_error) => outcome.fail(SubtitleError::TaskFailed {
            reason: join_error.to_string(),
        }),
    }
    outcome
}

fn extract_payload(
    payload: ArchivePayload,
    destination: &Path,
) -> Result<ExtractedFiles, ExtractionError> {
    let mut archive = open_archive(&payload.content_type, payload.bytes).map_err(|source| {
        ExtractionError {
            files: ExtractedFiles::new(),
            source,
        }
    })?;
    archive.extract(destination, &is_subtitle_file)
}
