//! Indexed (zip) archive variant.

use std::io::Cursor;
use std::path::Path;

use tracing::{debug, instrument};

use super::{ArchiveError, ArchiveReader, ExtractedFiles, ExtractionError, ExtractionRun, Flow};

/// A zip payload held fully in memory.
pub struct IndexedArchive {
    archive: ::zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl IndexedArchive {
    /// Parses the zip central directory of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Malformed`] if the payload is not a zip archive.
    pub fn new(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let archive = ::zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ArchiveError::malformed("zip", e))?;
        debug!(entries = archive.len(), "opened zip archive");
        Ok(Self { archive })
    }

    /// Returns the number of entries, directories included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    fn extract_into(&mut self, run: &mut ExtractionRun<'_>) -> Result<(), ArchiveError> {
        // The central directory is available up front, so every file entry
        // is recorded before anything is written.
        let names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(ToString::to_string)
            .collect();
        for name in &names {
            run.record(name);
        }

        for index in 0..self.archive.len() {
            let mut entry = self
                .archive
                .by_index(index)
                .map_err(|e| ArchiveError::malformed("zip", e))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let Some(sanitized) = run.admit(&name) else {
                continue;
            };

            if run.write(&name, &sanitized, &mut entry)? == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl ArchiveReader for IndexedArchive {
    #[instrument(skip(self, filter), fields(destination = %destination.display()))]
    fn extract(
        &mut self,
        destination: &Path,
        filter: &dyn Fn(&str) -> bool,
    ) -> Result<ExtractedFiles, ExtractionError> {
        let mut run = ExtractionRun::new(destination, filter);
        match self.extract_into(&mut run) {
            Ok(()) => Ok(run.finish()),
            Err(e) => Err(run.fail(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use ::zip::write::FileOptions;
    use tempfile::TempDir;

    use super::*;
    use crate::archive::is_subtitle_file;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_indexed_archive_rejects_garbage() {
        let result = IndexedArchive::new(b"not a zip".to_vec());
        assert!(matches!(result, Err(ArchiveError::Malformed { format: "zip", .. })));
    }

    #[test]
    fn test_indexed_archive_directory_mode_writes_all_subtitles() {
        let bytes = build_zip(&[
            ("subs/", ""),
            ("subs/a.srt", "A"),
            ("subs/b.srt", "B"),
            ("readme.nfo", "info"),
        ]);
        let dir = TempDir::new().unwrap();
        let mut archive = IndexedArchive::new(bytes).unwrap();
        assert_eq!(archive.len(), 4);

        let files = archive.extract(dir.path(), &is_subtitle_file).unwrap();

        assert_eq!(files.len(), 3, "directory entries are not recorded: {files:?}");
        assert_eq!(files["subs/a.srt"], Some(dir.path().join("a.srt")));
        assert_eq!(files["subs/b.srt"], Some(dir.path().join("b.srt")));
        assert_eq!(files["readme.nfo"], None);
        assert_eq!(std::fs::read_to_string(dir.path().join("b.srt")).unwrap(), "B");
        assert!(!dir.path().join("readme.nfo").exists());
    }

    #[test]
    fn test_indexed_archive_single_file_mode_stops_after_first() {
        let bytes = build_zip(&[("one.srt", "1"), ("two.srt", "2"), ("three.srt", "3")]);
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("movie.srt");
        let mut archive = IndexedArchive::new(bytes).unwrap();

        let files = archive.extract(&target, &is_subtitle_file).unwrap();

        assert_eq!(files["one.srt"], Some(target.clone()));
        assert_eq!(files["two.srt"], None);
        assert_eq!(files["three.srt"], None);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_indexed_archive_traversal_entry_lands_in_destination() {
        let bytes = build_zip(&[("../../evil.srt", "x")]);
        let root = TempDir::new().unwrap();
        let dest = root.path().join("a").join("b");
        std::fs::create_dir_all(&dest).unwrap();
        let mut archive = IndexedArchive::new(bytes).unwrap();

        let files = archive.extract(&dest, &is_subtitle_file).unwrap();

        assert_eq!(files["../../evil.srt"], Some(dest.join("evil.srt")));
        assert!(!root.path().join("evil.srt").exists());
    }
}
