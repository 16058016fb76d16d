//! Turning catalog pages into records.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::error::CatalogError;
use super::href::resolve_href;
use super::{CatalogRecord, Language, SubtitleRecord};

/// Converts fetched page bodies into structured records.
///
/// Rows that cannot be interpreted are skipped; an error is only returned
/// when the document as a whole is unusable. Links are resolved against
/// `base`, the catalog origin.
pub trait DocumentExtractor: Send + Sync {
    /// Extracts the rows of a title search results page.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Document`] if the page cannot be parsed at all.
    fn search_results(&self, base: &Url, body: &str) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Extracts the rows of a title's subtitle listing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Document`] if the page cannot be parsed at all.
    fn subtitle_listing(&self, base: &Url, body: &str)
    -> Result<Vec<SubtitleRecord>, CatalogError>;

    /// Extracts the archive link of a subtitle detail page, if present.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Document`] if the link is present but invalid.
    fn download_link(&self, base: &Url, body: &str) -> Result<Option<Url>, CatalogError>;
}

struct Selectors {
    search_row: Selector,
    search_title: Selector,
    search_count: Selector,
    listing_anchor: Selector,
    span: Selector,
    author: Selector,
    comment: Selector,
    hearing_impaired: Selector,
    download: Selector,
}

#[allow(clippy::expect_used)]
static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| {
    let parse = |css: &str| Selector::parse(css).expect("catalog selector is valid");
    Selectors {
        search_row: parse(".search-result li"),
        search_title: parse(".title a"),
        search_count: parse(".count"),
        listing_anchor: parse(".a1 a"),
        span: parse("span"),
        author: parse(".a5"),
        comment: parse(".a6"),
        hearing_impaired: parse(".a41"),
        download: parse(".download a"),
    }
});

#[allow(clippy::expect_used)]
static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("count regex is valid"));

/// [`DocumentExtractor`] for the catalog's HTML markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Creates the extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for HtmlExtractor {
    fn search_results(&self, base: &Url, body: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
        let document = Html::parse_document(body);
        let selectors = &*SELECTORS;
        let mut records = Vec::new();

        for row in document.select(&selectors.search_row) {
            let Some(anchor) = row.select(&selectors.search_title).next() else {
                trace!("search row without title link");
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(uri) = resolve_href(base, href) else {
                debug!(href, "skipping search row with invalid link");
                continue;
            };

            let title = text_of(anchor).trim().to_string();
            let subtitle_count = row
                .select(&selectors.search_count)
                .next()
                .map(text_of)
                .and_then(|text| {
                    COUNT_PATTERN
                        .find(&text)
                        .and_then(|m| m.as_str().parse().ok())
                })
                .unwrap_or(0);

            records.push(CatalogRecord {
                uri,
                title,
                subtitle_count,
            });
        }

        debug!(count = records.len(), "extracted search results");
        Ok(records)
    }

    fn subtitle_listing(
        &self,
        base: &Url,
        body: &str,
    ) -> Result<Vec<SubtitleRecord>, CatalogError> {
        let document = Html::parse_document(body);
        let selectors = &*SELECTORS;
        let mut records = Vec::new();

        for anchor in document.select(&selectors.listing_anchor) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(uri) = resolve_href(base, href) else {
                debug!(href, "skipping listing row with invalid link");
                continue;
            };

            let language = language_of(&uri);
            let title = anchor
                .select(&selectors.span)
                .last()
                .map(text_of)
                .unwrap_or_default()
                .trim()
                .to_string();

            // Metadata lives in the table row that holds the anchor's cell.
            let row = anchor
                .parent()
                .and_then(|cell| cell.parent())
                .and_then(ElementRef::wrap);
            let first_text = |selector: &Selector| {
                row.and_then(|row| row.select(selector).next())
                    .map(text_of)
                    .unwrap_or_default()
            };
            let author = first_text(&selectors.author);
            let comment = first_text(&selectors.comment);
            let hearing_impaired = row
                .is_some_and(|row| row.select(&selectors.hearing_impaired).next().is_some());

            records.push(SubtitleRecord {
                language,
                uri,
                title,
                author,
                comment,
                hearing_impaired,
            });
        }

        debug!(count = records.len(), "extracted subtitle listing");
        Ok(records)
    }

    fn download_link(&self, base: &Url, body: &str) -> Result<Option<Url>, CatalogError> {
        let document = Html::parse_document(body);
        let Some(href) = document
            .select(&SELECTORS.download)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        else {
            return Ok(None);
        };

        resolve_href(base, href)
            .map(Some)
            .map_err(|e| CatalogError::document("detail", base.as_str(), e))
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Language slug taken from the parent segment of a subtitle URI
/// (`/subtitles/<title>/<language>/<id>`).
fn language_of(uri: &Url) -> Language {
    let segments: Vec<&str> = uri
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let slug = segments
        .len()
        .checked_sub(2)
        .and_then(|index| segments.get(index))
        .copied()
        .unwrap_or_default();
    let Ok(language) = slug.parse::<Language>();
    language
}
