//! Error types for the catalog module.

use thiserror::Error;

use crate::download::FetchError;

/// Errors raised while browsing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A URL could not be built from the configured base or a page link.
    #[error("invalid catalog URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The page could not be interpreted as the expected document.
    #[error("unparseable {document} page from {url}: {reason}")]
    Document {
        /// Which page kind was expected (`search`, `listing`, `detail`).
        document: &'static str,
        /// The page URL.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The detail page carried no download link.
    #[error("missing download link on {url}")]
    MissingDownloadLink {
        /// The detail page URL.
        url: String,
    },
}

impl CatalogError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a document error.
    pub fn document(document: &'static str, url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Document {
            document,
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a missing download link error.
    pub fn missing_download_link(url: impl Into<String>) -> Self {
        Self::MissingDownloadLink { url: url.into() }
    }
}
