//! Mapping the user's path argument to a query and an output destination.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Quality tags that carry no information about the release itself.
#[allow(clippy::expect_used)]
static QUALITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1080p|720p|1080|720|4k").expect("quality regex is valid"));

/// Where subtitles go and what they should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Free-text query used to rank subtitle listings (may be empty).
    pub file_query: String,
    /// Directory subtitles are written into.
    pub directory: PathBuf,
    /// Name (without extension) for a single subtitle file, if one was implied.
    pub base_name: Option<String>,
}

impl OutputTarget {
    /// Resolves a path argument.
    ///
    /// - existing directory: subtitles are unpacked into it
    /// - existing file: one subtitle is written next to it, named after it
    /// - anything else: subtitles are unpacked into the current directory
    ///
    /// In every case the path's stem, stripped of quality tags, is the
    /// file query.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_query = QUALITY_PATTERN.replace_all(&stem, "").into_owned();

        let (directory, base_name) = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => (path.clone(), None),
            Ok(_) => (
                path.parent()
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
                Some(stem),
            ),
            Err(_) => (PathBuf::from("."), None),
        };

        debug!(
            file_query,
            directory = %directory.display(),
            base_name = base_name.as_deref(),
            "resolved output target"
        );

        Self {
            file_query,
            directory,
            base_name,
        }
    }
}
