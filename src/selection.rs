//! Ordering of subtitle listings and parsing of numeric selections.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{Language, SubtitleRecord};
use crate::fuzzy::Ranking;

/// Episode (`s02e04`), season (`season 2`), and year (`1999`) markers.
#[allow(clippy::expect_used)]
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)s[0-9]{2,}e[0-9]{2,}|season [0-9]+|(?:19|20)[0-9]{2}")
        .expect("heading regex is valid")
});

/// Errors from [`parse_ranges`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A part is not a number or an ascending `a-b` range.
    #[error("invalid selection '{part}'")]
    InvalidPart {
        /// The offending part.
        part: String,
    },
}

/// Label shown for a subtitle: a hearing-impaired marker column, then the title.
#[must_use]
pub fn subtitle_label(record: &SubtitleRecord) -> String {
    let marker = if record.hearing_impaired { "HI" } else { "" };
    format!("{marker:>2} {:<60}", record.title)
}

/// Filters and orders a subtitle listing for presentation.
///
/// 1. Only records in `language` are kept.
/// 2. With a non-empty `file_query`, records are fuzzy-ranked by it, then
///    records whose label contains an episode, season, or year marker found
///    in the query are moved to the front, marker by marker.
/// 3. Records whose hearing-impaired flag equals `prefer_hi` come first.
///
/// Every step preserves relative order where it does not reorder.
#[must_use]
pub fn order_subtitles(
    records: Vec<SubtitleRecord>,
    language: &Language,
    file_query: &str,
    prefer_hi: bool,
) -> Vec<SubtitleRecord> {
    let mut records: Vec<SubtitleRecord> = records
        .into_iter()
        .filter(|record| &record.language == language)
        .collect();
    debug!(%language, kept = records.len(), "filtered listing by language");

    if !file_query.trim().is_empty() {
        let labels: Vec<String> = records.iter().map(subtitle_label).collect();
        Ranking::compute(file_query, &labels).apply(&mut records);
        records = promote_headings(records, file_query);
    }

    let (mut preferred, rest): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.hearing_impaired == prefer_hi);
    preferred.extend(rest);
    preferred
}

/// Moves records matching the query's heading markers to the front.
fn promote_headings(records: Vec<SubtitleRecord>, file_query: &str) -> Vec<SubtitleRecord> {
    let mut head = Vec::new();
    let mut rest = records;

    for marker in HEADING_PATTERN.find_iter(file_query) {
        let marker = marker.as_str().to_lowercase();
        let (matched, unmatched): (Vec<_>, Vec<_>) = rest
            .into_iter()
            .partition(|record| subtitle_label(record).to_lowercase().contains(&marker));
        debug!(marker, promoted = matched.len(), "promoting heading matches");
        head.extend(matched);
        rest = unmatched;
    }

    head.extend(rest);
    head
}

/// Parses a selection such as `"1-3, 5"` into `[1, 2, 3, 5]`.
///
/// # Errors
///
/// Returns [`SelectionError::InvalidPart`] for empty or non-numeric parts
/// and for descending ranges.
///
/// ```
/// use subscout_core::selection::parse_ranges;
///
/// assert_eq!(parse_ranges("1-3, 5").unwrap(), vec![1, 2, 3, 5]);
/// assert!(parse_ranges("3-1").is_err());
/// ```
pub fn parse_ranges(input: &str) -> Result<Vec<usize>, SelectionError> {
    let mut selected = Vec::new();

    for part in input.split(',') {
        let invalid = || SelectionError::InvalidPart {
            part: part.trim().to_string(),
        };
        let parse = |value: &str| value.trim().parse::<usize>().map_err(|_| invalid());

        match part.split_once('-') {
            None => selected.push(parse(part)?),
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if end < start {
                    return Err(invalid());
                }
                selected.extend(start..=end);
            }
        }
    }

    Ok(selected)
}
