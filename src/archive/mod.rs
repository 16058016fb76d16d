//! Format-agnostic archive reading with safe extraction.
//!
//! Subtitle payloads arrive as one of two container formats, selected by the
//! response's declared media type:
//!
//! - [`IndexedArchive`] - zip; fully buffered, entries addressable by index
//! - [`StreamedArchive`] - rar; entries visited once, in sequence
//!
//! Both expose [`ArchiveReader::extract`], which writes the entries accepted
//! by a name filter into a [`Destination`] through [`write_atomic`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use subscout_core::archive::{is_subtitle_file, open_archive};
//!
//! # fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut archive = open_archive("application/x-zip-compressed", bytes)?;
//! let files = archive.extract(Path::new("./subs"), &is_subtitle_file)?;
//! for (entry, written) in &files {
//!     println!("{entry} -> {written:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod destination;
mod error;
mod indexed;
mod safe_write;
mod streamed;

pub use destination::Destination;
pub use error::{ArchiveError, ExtractionError};
pub use indexed::IndexedArchive;
pub use safe_write::{WriteOutcome, write_atomic};
pub use streamed::StreamedArchive;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// Media type of indexed (zip) payloads.
pub const ZIP_CONTENT_TYPE: &str = "application/x-zip-compressed";

/// Media type of streamed (rar) payloads.
pub const RAR_CONTENT_TYPE: &str = "application/x-rar-compressed";

/// Extension written for subtitle files.
pub const SUBTITLE_EXTENSION: &str = "srt";

/// Original entry name -> written path, or `None` when seen but not written.
pub type ExtractedFiles = BTreeMap<String, Option<PathBuf>>;

/// A readable archive.
pub trait ArchiveReader: Send {
    /// Extracts the entries whose sanitized base name passes `filter`.
    ///
    /// Every file entry is recorded in the returned map; directory entries
    /// are not. An entry is written only when the filter accepts it and
    /// nothing exists at its target path. In single-file mode extraction
    /// stops after the first written entry.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] carrying the entries handled before
    /// a malformed entry or a failed write.
    fn extract(
        &mut self,
        destination: &Path,
        filter: &dyn Fn(&str) -> bool,
    ) -> Result<ExtractedFiles, ExtractionError>;
}

/// The two supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Zip - central directory, random access.
    Indexed,
    /// Rar - sequential access.
    Streamed,
}

impl ArchiveKind {
    /// Maps a declared media type to an archive kind.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            ZIP_CONTENT_TYPE => Some(Self::Indexed),
            RAR_CONTENT_TYPE => Some(Self::Streamed),
            _ => None,
        }
    }
}

/// Opens an archive payload according to its declared media type.
///
/// # Errors
///
/// - [`ArchiveError::UnsupportedContentType`] for any other media type;
///   the payload is not inspected
/// - [`ArchiveError::Malformed`] if the payload cannot be parsed
#[instrument(skip(bytes), fields(size = bytes.len()))]
pub fn open_archive(
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<Box<dyn ArchiveReader>, ArchiveError> {
    match ArchiveKind::from_content_type(content_type) {
        Some(ArchiveKind::Indexed) => Ok(Box::new(IndexedArchive::new(bytes)?)),
        Some(ArchiveKind::Streamed) => Ok(Box::new(StreamedArchive::new(bytes)?)),
        None => Err(ArchiveError::unsupported(content_type)),
    }
}

/// Reduces an entry name to a safe base name.
///
/// `.` and `..` segments are resolved lexically and only the last remaining
/// component is kept, so the result never contains a separator. Returns `"."`
/// when nothing remains (e.g. `"a/.."`).
///
/// ```
/// use subscout_core::archive::sanitize_entry_name;
///
/// assert_eq!(sanitize_entry_name("../../evil"), "evil");
/// assert_eq!(sanitize_entry_name("Season 1\\ep01.srt"), "ep01.srt");
/// ```
#[must_use]
pub fn sanitize_entry_name(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
        .last()
        .map_or_else(|| ".".to_string(), |last| (*last).to_string())
}

/// Name filter accepting subtitle files (`*.srt`, case-insensitive).
#[must_use]
pub fn is_subtitle_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SUBTITLE_EXTENSION))
}

/// Whether extraction continues after an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Bookkeeping shared by both archive variants for one `extract` call.
struct ExtractionRun<'a> {
    destination: Destination,
    filter: &'a dyn Fn(&str) -> bool,
    files: ExtractedFiles,
}

impl<'a> ExtractionRun<'a> {
    fn new(destination: &Path, filter: &'a dyn Fn(&str) -> bool) -> Self {
        let destination = Destination::resolve(destination);
        debug!(
            destination = %destination.path().display(),
            single_file = destination.is_single_file(),
            "starting extraction"
        );
        Self {
            destination,
            filter,
            files: ExtractedFiles::new(),
        }
    }

    /// Records a file entry as seen.
    fn record(&mut self, name: &str) {
        self.files.entry(name.to_string()).or_insert(None);
    }

    /// Records a file entry and returns its sanitized name if it should be written.
    fn admit(&mut self, name: &str) -> Option<String> {
        self.record(name);
        let sanitized = sanitize_entry_name(name);
        (self.filter)(&sanitized).then_some(sanitized)
    }

    /// Writes an admitted entry.
    fn write(
        &mut self,
        name: &str,
        sanitized: &str,
        contents: &mut dyn Read,
    ) -> Result<Flow, ArchiveError> {
        let target = self.destination.target_for(sanitized);
        match write_atomic(&target, contents).map_err(|e| ArchiveError::io(&target, e))? {
            WriteOutcome::Written(path) => {
                debug!(entry = name, path = %path.display(), "entry extracted");
                self.files.insert(name.to_string(), Some(path));
                if self.destination.is_single_file() {
                    return Ok(Flow::Stop);
                }
                Ok(Flow::Continue)
            }
            WriteOutcome::Skipped(_) => Ok(Flow::Continue),
        }
    }

    fn finish(self) -> ExtractedFiles {
        self.files
    }

    fn fail(self, source: ArchiveError) -> ExtractionError {
        ExtractionError {
            files: self.files,
            source,
        }
    }
}
