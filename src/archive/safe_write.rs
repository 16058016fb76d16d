//! Atomic single-file writes (temporary sibling + rename).

use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::{debug, trace};

/// Result of a single write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Contents were written to the path.
    Written(PathBuf),
    /// Something already exists at the path; nothing was written.
    Skipped(PathBuf),
}

/// Writes `contents` to `target` without ever overwriting an existing file.
///
/// Data goes to a uniquely named hidden sibling of `target` and is moved into
/// place once fully written, refusing to replace anything that appeared at
/// `target` in the meantime. Concurrent writers of the same target never
/// share a temporary file: exactly one of them lands, the rest are skipped.
///
/// # Errors
///
/// Returns the underlying I/O error if the temporary file cannot be created,
/// written, or moved into place. The temporary file is removed on failure.
pub fn write_atomic(target: &Path, contents: &mut dyn Read) -> io::Result<WriteOutcome> {
    if target.symlink_metadata().is_ok() {
        debug!(path = %target.display(), "target exists, skipping");
        return Ok(WriteOutcome::Skipped(target.to_path_buf()));
    }

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = Builder::new()
        .prefix(".subscout-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    trace!(tmp = %tmp.path().display(), "writing temporary file");

    // Dropping `tmp` on any early return removes it.
    let mut writer = BufWriter::new(tmp.as_file_mut());
    io::copy(contents, &mut writer)?;
    writer.flush()?;
    drop(writer);

    match tmp.persist_noclobber(target) {
        Ok(_) => Ok(WriteOutcome::Written(target.to_path_buf())),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %target.display(), "target appeared while writing, skipping");
            Ok(WriteOutcome::Skipped(target.to_path_buf()))
        }
        Err(e) => Err(e.error),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::thread;

    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("stream broke"))
        }
    }

    #[test]
    fn test_write_atomic_writes_new_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("movie.srt");

        let outcome = write_atomic(&target, &mut "1\n00:00:01,000".as_bytes()).unwrap();

        assert_eq!(outcome, WriteOutcome::Written(target.clone()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "1\n00:00:01,000");
        assert_eq!(entries(dir.path()), 1);
    }

    #[test]
    fn test_write_atomic_skips_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("movie.srt");
        fs::write(&target, "original").unwrap();

        let outcome = write_atomic(&target, &mut "replacement".as_bytes()).unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped(target.clone()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn test_write_atomic_removes_temporary_on_read_failure() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("movie.srt");

        let result = write_atomic(&target, &mut FailingReader);

        assert!(result.is_err());
        assert!(!target.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_write_atomic_missing_parent_errors() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("movie.srt");

        assert!(write_atomic(&target, &mut "x".as_bytes()).is_err());
    }

    #[test]
    fn test_write_atomic_concurrent_writers_never_interleave() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("movie.srt");
        let size = 256 * 1024;

        let outcomes: Vec<WriteOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = (b'a'..=b'h')
                .map(|fill| {
                    let target = &target;
                    scope.spawn(move || {
                        let contents = vec![fill; size];
                        write_atomic(target, &mut contents.as_slice()).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let written = outcomes
            .iter()
            .filter(|o| matches!(o, WriteOutcome::Written(_)))
            .count();
        assert_eq!(written, 1, "exactly one writer lands: {outcomes:?}");

        let bytes = fs::read(&target).unwrap();
        assert_eq!(bytes.len(), size);
        assert!(
            bytes.iter().all(|&b| b == bytes[0]),
            "contents come from a single writer"
        );
        assert_eq!(entries(dir.path()), 1, "no temporary files left behind");
    }
}
