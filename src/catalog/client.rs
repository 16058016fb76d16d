//! Catalog client: search, listing, and detail page resolution.
//!
//! # Example
//!
//! ```no_run
//! use subscout_core::catalog::{CatalogClient, LISTING_RETRIES, SEARCH_RETRIES};
//! use subscout_core::download::FetchConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = CatalogClient::from_config(&FetchConfig::default())?;
//! let results = catalog.search("the matrix", SEARCH_RETRIES).await?;
//! if let Some(first) = results.first() {
//!     let subtitles = catalog.subtitles(first, LISTING_RETRIES).await?;
//!     println!("{} subtitles for {first}", subtitles.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use super::error::CatalogError;
use super::extractor::{DocumentExtractor, HtmlExtractor};
use super::{CatalogRecord, SubtitleRecord};
use crate::download::{DEFAULT_MAX_RETRIES, FetchConfig, HttpClient};

/// Retry budget for title searches.
pub const SEARCH_RETRIES: u32 = 30;

/// Retry budget for subtitle listings.
pub const LISTING_RETRIES: u32 = 100;

/// Retry budget for detail pages and archive downloads.
pub const DOWNLOAD_RETRIES: u32 = DEFAULT_MAX_RETRIES;

/// Path of the title search form.
const SEARCH_PATH: &str = "/subtitles/searchbytitle";

/// Client for the subtitle catalog.
///
/// Cheap to clone; clones share the HTTP client, its pacing gate, and the
/// extractor.
#[derive(Clone)]
pub struct CatalogClient {
    http: HttpClient,
    base: Url,
    extractor: Arc<dyn DocumentExtractor>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Creates a client for the configured catalog origin using HTML extraction.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidUrl`] if `config.base_url` is not a URL.
    pub fn new(http: HttpClient, config: &FetchConfig) -> Result<Self, CatalogError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| CatalogError::invalid_url(&config.base_url, e))?;
        Ok(Self::with_extractor(http, base, Arc::new(HtmlExtractor::new())))
    }

    /// Builds the HTTP client and the catalog client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] if the HTTP client cannot be built, or
    /// [`CatalogError::InvalidUrl`] for a bad base URL.
    pub fn from_config(config: &FetchConfig) -> Result<Self, CatalogError> {
        let http = HttpClient::from_config(config)?;
        Self::new(http, config)
    }

    /// Creates a client with a custom document extractor.
    #[must_use]
    pub fn with_extractor(
        http: HttpClient,
        base: Url,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            http,
            base,
            extractor,
        }
    }

    /// Returns the catalog origin.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Searches the catalog by title.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] if the request fails or
    /// [`CatalogError::Document`] if the page is unusable.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn search(&self, query: &str, retries: u32) -> Result<Vec<CatalogRecord>, CatalogError> {
        let url = self.url_for(SEARCH_PATH)?;
        let form = vec![("query".to_string(), query.to_string())];
        let body = self.http.post_form_text(&url, form, retries).await?;

        let records = self.extractor.search_results(&self.base, &body)?;
        info!(results = records.len(), "catalog search complete");
        Ok(records)
    }

    /// Lists the subtitles of a search result.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn subtitles(
        &self,
        record: &CatalogRecord,
        retries: u32,
    ) -> Result<Vec<SubtitleRecord>, CatalogError> {
        self.listing(&record.uri, retries).await
    }

    /// Lists the subtitles under `/subtitles/<path>`.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn subtitle_page(
        &self,
        path: &str,
        retries: u32,
    ) -> Result<Vec<SubtitleRecord>, CatalogError> {
        let url = self.url_for(&format!("/subtitles/{}", path.trim_start_matches('/')))?;
        self.listing(&url, retries).await
    }

    /// Resolves a subtitle's detail page to its archive URL.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingDownloadLink`] if the page has no download link
    /// - [`CatalogError::Fetch`] / [`CatalogError::Document`] as for [`search`](Self::search)
    #[instrument(skip(self, record), fields(uri = %record.uri))]
    pub async fn download_uri(
        &self,
        record: &SubtitleRecord,
        retries: u32,
    ) -> Result<Url, CatalogError> {
        let body = self.http.get_text(&record.uri, retries).await?;
        let link = self
            .extractor
            .download_link(&self.base, &body)?
            .ok_or_else(|| CatalogError::missing_download_link(record.uri.as_str()))?;
        debug!(archive = %link, "resolved download link");
        Ok(link)
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn listing(&self, url: &Url, retries: u32) -> Result<Vec<SubtitleRecord>, CatalogError> {
        let body = self.http.get_text(url, retries).await?;
        let records = self.extractor.subtitle_listing(&self.base, &body)?;
        info!(subtitles = records.len(), "subtitle listing complete");
        Ok(records)
    }

    fn url_for(&self, path: &str) -> Result<Url, CatalogError> {
        self.base
            .join(path)
            .map_err(|e| CatalogError::invalid_url(path, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_client_rejects_bad_base_url() {
        let config = FetchConfig {
            base_url: "not a url".to_string(),
            ..FetchConfig::default()
        };
        let result = CatalogClient::from_config(&config);
        assert!(matches!(result, Err(CatalogError::InvalidUrl { .. })));
    }

    #[test]
    fn test_catalog_client_url_for_joins_base() {
        let catalog = CatalogClient::from_config(&FetchConfig::default()).unwrap();
        let url = catalog.url_for(SEARCH_PATH).unwrap();
        assert_eq!(url.as_str(), "https://subscene.com/subtitles/searchbytitle");
    }

    #[test]
    fn test_retry_budgets() {
        assert_eq!(SEARCH_RETRIES, 30);
        assert_eq!(LISTING_RETRIES, 100);
        assert_eq!(DOWNLOAD_RETRIES, 20);
    }
}
