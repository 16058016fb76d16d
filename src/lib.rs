//! Subscout Core Library
//!
//! This library provides the core functionality for the subscout tool,
//! which finds subtitles for a media item in a remote catalog, ranks the
//! candidates against a free-text query, and fetches and unpacks the
//! chosen archives onto local disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`archive`] - Format-agnostic archive reader with safe, atomic extraction
//! - [`catalog`] - Catalog records, document record extraction, and the catalog client
//! - [`download`] - Rate limited, retrying HTTP fetcher and the concurrent download orchestrator
//! - [`fuzzy`] - Approximate (n-gram) ranking of candidate labels
//! - [`selection`] - Ordering heuristics applied to subtitle listings, and range parsing
//! - [`target`] - Mapping of a user supplied path to a query and an output destination

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod catalog;
pub mod download;
pub mod fuzzy;
pub mod selection;
pub mod target;

mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveError, ArchiveReader, ExtractedFiles, ExtractionError, open_archive};
pub use catalog::{
    CatalogClient, CatalogError, CatalogRecord, DocumentExtractor, HtmlExtractor, Language,
    SubtitleRecord,
};
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_RATE_LIMIT, DownloadOrchestrator, DownloadSummary,
    ExtractionOutcome, FetchConfig, FetchError, HttpClient, OrchestratorError, RateLimiter,
    SubtitleError,
};
pub use fuzzy::{Ranking, rank_by};
pub use selection::{order_subtitles, parse_ranges};
pub use target::OutputTarget;
