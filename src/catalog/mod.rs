//! Catalog records and the client that fetches them.
//!
//! The catalog is browsed in three steps, each one page fetch through the
//! shared [`HttpClient`](crate::download::HttpClient):
//!
//! 1. [`CatalogClient::search`] - title search, yields [`CatalogRecord`]s
//! 2. [`CatalogClient::subtitles`] - per-title listing, yields [`SubtitleRecord`]s
//! 3. [`CatalogClient::download_uri`] - detail page, yields the archive URL
//!
//! Markup is turned into records by a [`DocumentExtractor`]; the default is
//! the `scraper` based [`HtmlExtractor`].

mod client;
mod error;
mod extractor;
mod href;
mod language;

pub use client::{CatalogClient, DOWNLOAD_RETRIES, LISTING_RETRIES, SEARCH_RETRIES};
pub use error::CatalogError;
pub use extractor::{DocumentExtractor, HtmlExtractor};
pub use href::resolve_href;
pub use language::Language;

use serde::Serialize;
use url::Url;

/// One search result: a media title in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRecord {
    /// Canonical URI of the title's subtitle listing.
    pub uri: Url,
    /// Display title.
    pub title: String,
    /// Number of subtitles the catalog reports for the title.
    pub subtitle_count: u32,
}

impl std::fmt::Display for CatalogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// One entry in a title's subtitle listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleRecord {
    /// Subtitle language.
    pub language: Language,
    /// URI of the subtitle's detail page.
    pub uri: Url,
    /// Release name shown in the listing.
    pub title: String,
    /// Uploader.
    pub author: String,
    /// Uploader's comment.
    pub comment: String,
    /// Whether the subtitle is marked for the hearing impaired.
    pub hearing_impaired: bool,
}

impl std::fmt::Display for SubtitleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}
