//! Per-item result lines printed while downloads complete.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use subscout_core::ExtractionOutcome;

/// JSON shape of one [`ExtractionOutcome`].
#[derive(Debug, Serialize)]
struct OutcomeReport<'a> {
    source: &'a str,
    archive: Option<&'a str>,
    filename: &'a str,
    extracted: BTreeMap<&'a str, Option<String>>,
    error: Option<String>,
}

impl<'a> From<&'a ExtractionOutcome> for OutcomeReport<'a> {
    fn from(outcome: &'a ExtractionOutcome) -> Self {
        Self {
            source: outcome.source_uri.as_str(),
            archive: outcome.archive_uri.as_ref().map(url::Url::as_str),
            filename: &outcome.suggested_filename,
            extracted: outcome
                .extracted
                .iter()
                .map(|(entry, path)| {
                    (
                        entry.as_str(),
                        path.as_ref().map(|p| p.display().to_string()),
                    )
                })
                .collect(),
            error: outcome.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Writes one outcome as human readable lines.
pub fn write_text<W: Write>(out: &mut W, outcome: &ExtractionOutcome) -> std::io::Result<()> {
    if let Some(error) = &outcome.error {
        let uri = outcome
            .archive_uri
            .as_ref()
            .unwrap_or(&outcome.source_uri);
        writeln!(out, "Fail {error}")?;
        writeln!(out, "{uri}")?;
        writeln!(out, "{}", outcome.suggested_filename)?;
        return writeln!(out);
    }

    writeln!(out, "Downloaded {}", outcome.suggested_filename)?;
    for (entry, path) in &outcome.extracted {
        match path {
            Some(path) => writeln!(out, "    - {entry} -> {}", path.display())?,
            None => writeln!(out, "    - {entry} -> skipped")?,
        }
    }
    writeln!(out)
}

/// Writes one outcome as a single JSON line.
pub fn write_json<W: Write>(out: &mut W, outcome: &ExtractionOutcome) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, &OutcomeReport::from(outcome))?;
    writeln!(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use subscout_core::{CatalogError, SubtitleError};
    use url::Url;

    use super::*;

    fn succeeded() -> ExtractionOutcome {
        let mut outcome = failed();
        outcome.error = None;
        outcome.suggested_filename = "the-matrix.zip".to_string();
        outcome
            .extracted
            .insert("The.Matrix.srt".to_string(), Some(PathBuf::from("/subs/The.Matrix.srt")));
        outcome.extracted.insert("extra.srt".to_string(), None);
        outcome
    }

    fn failed() -> ExtractionOutcome {
        ExtractionOutcome {
            source_uri: Url::parse("https://subscene.com/subtitles/the-matrix/english/1").unwrap(),
            archive_uri: None,
            suggested_filename: String::new(),
            extracted: BTreeMap::new(),
            error: Some(Arc::new(SubtitleError::Catalog(
                CatalogError::missing_download_link("https://subscene.com/subtitles/the-matrix/english/1"),
            ))),
        }
    }

    #[test]
    fn test_write_text_success_lists_entries() {
        let mut out = Vec::new();
        write_text(&mut out, &succeeded()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Downloaded the-matrix.zip\n"));
        assert!(text.contains("    - The.Matrix.srt -> /subs/The.Matrix.srt\n"));
        assert!(text.contains("    - extra.srt -> skipped\n"));
    }

    #[test]
    fn test_write_text_failure_names_error_and_uri() {
        let mut out = Vec::new();
        write_text(&mut out, &failed()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Fail missing download link"), "got: {text}");
        assert!(text.contains("https://subscene.com/subtitles/the-matrix/english/1\n"));
    }

    #[test]
    fn test_write_json_single_line() {
        let mut out = Vec::new();
        write_json(&mut out, &succeeded()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["filename"], "the-matrix.zip");
        assert_eq!(value["extracted"]["extra.srt"], serde_json::Value::Null);
        assert_eq!(value["error"], serde_json::Value::Null);
    }
}
