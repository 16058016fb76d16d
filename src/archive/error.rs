//! Error types for the archive module.

use std::path::PathBuf;

use thiserror::Error;

use super::ExtractedFiles;

/// Errors raised while opening or extracting an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The payload's declared media type is not one of the supported formats.
    #[error("mimetype '{content_type}' not supported")]
    UnsupportedContentType {
        /// The rejected media type.
        content_type: String,
    },

    /// The payload is not a valid archive of its declared format.
    #[error("malformed {format} archive: {reason}")]
    Malformed {
        /// Format name (`zip`, `rar`).
        format: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// File system error while writing an entry.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Creates an unsupported content type error.
    pub fn unsupported(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Creates a malformed archive error.
    pub fn malformed(format: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            format,
            reason: reason.to_string(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// An extraction that stopped early, with everything done before the failure.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ExtractionError {
    /// Entries seen and written before the failure.
    pub files: ExtractedFiles,
    /// What went wrong.
    #[source]
    pub source: ArchiveError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_unsupported_names_type() {
        let msg = ArchiveError::unsupported("text/html").to_string();
        assert_eq!(msg, "mimetype 'text/html' not supported");
    }

    #[test]
    fn test_extraction_error_displays_source() {
        let error = ExtractionError {
            files: ExtractedFiles::new(),
            source: ArchiveError::malformed("zip", "bad header"),
        };
        assert_eq!(error.to_string(), "malformed zip archive: bad header");
    }
}
