//! Streamed (rar) archive variant.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::{ArchiveError, ArchiveReader, ExtractedFiles, ExtractionError, ExtractionRun, Flow};

/// A rar payload spooled to a temporary file.
///
/// The rar decoder reads from a path, so the buffered payload is written to
/// disk once and visited entry by entry. The spool file is removed on drop.
pub struct StreamedArchive {
    spool: NamedTempFile,
}

impl StreamedArchive {
    /// Spools `bytes` to disk and checks that they open as a rar archive.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::Io`] if the spool file cannot be written
    /// - [`ArchiveError::Malformed`] if the payload is not a rar archive
    pub fn new(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let mut spool = NamedTempFile::new().map_err(|e| ArchiveError::io(".", e))?;
        spool
            .write_all(&bytes)
            .and_then(|()| spool.flush())
            .map_err(|e| ArchiveError::io(spool.path(), e))?;

        unrar::Archive::new(spool.path())
            .open_for_listing()
            .map_err(|e| ArchiveError::malformed("rar", e))?;
        debug!(size = bytes.len(), spool = %spool.path().display(), "opened rar archive");

        Ok(Self { spool })
    }

    fn extract_into(&self, run: &mut ExtractionRun<'_>) -> Result<(), ArchiveError> {
        let mut cursor = unrar::Archive::new(self.spool.path())
            .open_for_processing()
            .map_err(|e| ArchiveError::malformed("rar", e))?;

        // Entries are only known as they are reached.
        while let Some(header) = cursor
            .read_header()
            .map_err(|e| ArchiveError::malformed("rar", e))?
        {
            let entry = header.entry();
            if entry.is_directory() {
                cursor = header
                    .skip()
                    .map_err(|e| ArchiveError::malformed("rar", e))?;
                continue;
            }

            let name = entry.filename.to_string_lossy().into_owned();
            let Some(sanitized) = run.admit(&name) else {
                cursor = header
                    .skip()
                    .map_err(|e| ArchiveError::malformed("rar", e))?;
                continue;
            };

            let (contents, next) = header
                .read()
                .map_err(|e| ArchiveError::malformed("rar", e))?;
            cursor = next;

            if run.write(&name, &sanitized, &mut contents.as_slice())? == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl ArchiveReader for StreamedArchive {
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
