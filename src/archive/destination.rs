//! Extraction destination and its mode.

use std::path::{Path, PathBuf};

/// Where extracted entries go.
///
/// The mode is fixed when the destination is resolved: an existing directory
/// receives every accepted entry under its own name; any other path is a
/// single file that receives the first accepted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    path: PathBuf,
    is_dir: bool,
}

impl Destination {
    /// Resolves the mode of `path` by inspecting the filesystem once.
    #[must_use]
    pub fn resolve(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            is_dir: path.is_dir(),
        }
    }

    /// Returns `true` when at most one entry may be written.
    #[must_use]
    pub fn is_single_file(&self) -> bool {
        !self.is_dir
    }

    /// Returns the path this destination was resolved from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the target path for an entry with the given sanitized base name.
    #[must_use]
    pub fn target_for(&self, sanitized_name: &str) -> PathBuf {
        if self.is_dir {
            self.path.join(sanitized_name)
        } else {
            self.path.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_destination_existing_directory_is_directory_mode() {
        let dir = TempDir::new().unwrap();
        let destination = Destination::resolve(dir.path());

        assert!(!destination.is_single_file());
        assert_eq!(destination.target_for("a.srt"), dir.path().join("a.srt"));
    }

    #[test]
    fn test_destination_missing_path_is_single_file_mode() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("movie.srt");
        let destination = Destination::resolve(&file);

        assert!(destination.is_single_file());
        assert_eq!(destination.target_for("other.srt"), file);
    }

    #[test]
    fn test_destination_mode_fixed_at_resolution() {
        let dir = TempDir::new().unwrap();
        let later_dir = dir.path().join("later");
        let destination = Destination::resolve(&later_dir);
        std::fs::create_dir(&later_dir).unwrap();

        assert!(destination.is_single_file());
    }
}
