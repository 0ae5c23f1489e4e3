//! Archive entry metadata.
//!
//! An [`ArchiveEntry`] describes one logical file to be framed into the
//! archive: its name, its declared size, its kind, and its modification
//! time. The entry is handed to
//! [`ZipWriter::begin_entry`](crate::write::ZipWriter::begin_entry), which
//! owns it until the archive is finalized or aborted.
//!
//! # Entry Names
//!
//! Names are reduced to their final path component before framing, so
//! `"/tmp/report.txt"` and `"report.txt"` produce the same entry. A name
//! that is empty after reduction, or that contains a NUL byte, is rejected
//! with [`Error::InvalidEntryName`]. Directory components never leak into
//! the archive.

use std::time::SystemTime;

use crate::{Error, Result};

/// The declared size of an entry's data.
///
/// When the total size is not known until streaming completes, use
/// [`Unknown`][Self::Unknown]: the writer frames placeholder size fields
/// and patches the true values at finalize time (which requires a seekable
/// sink).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredSize {
    /// The exact number of plaintext bytes that will be written.
    Known(u64),
    /// Size unknown until streaming completes; patched at finalize.
    Unknown,
}

/// The kind of an archive entry.
///
/// Only regular files are supported; the variant exists so the header
/// framing has an explicit file-type input rather than an assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum EntryKind {
    /// A regular file.
    #[default]
    File,
}

/// Metadata for one logical file within the archive.
///
/// # Example
///
/// ```rust
/// use zipseal::{ArchiveEntry, DeclaredSize};
///
/// let entry = ArchiveEntry::file("/data/report.txt", DeclaredSize::Known(12))?;
/// assert_eq!(entry.name(), "report.txt");
/// # Ok::<(), zipseal::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    name: String,
    size: DeclaredSize,
    kind: EntryKind,
    mtime: SystemTime,
}

impl ArchiveEntry {
    /// Creates a regular-file entry with the given name and declared size.
    ///
    /// The name is reduced to its final path component. The modification
    /// time defaults to now; override it with [`mtime`][Self::mtime].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if the name is empty after
    /// reduction or contains a NUL byte.
    pub fn file(name: &str, size: DeclaredSize) -> Result<Self> {
        Ok(Self {
            name: sanitize_name(name)?,
            size,
            kind: EntryKind::File,
            mtime: SystemTime::now(),
        })
    }

    /// Sets the entry's modification time.
    #[must_use]
    pub fn mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = mtime;
        self
    }

    /// The entry name as it will appear in the archive.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared data size.
    pub fn declared_size(&self) -> DeclaredSize {
        self.size
    }

    /// The entry kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The modification time.
    pub fn modified(&self) -> SystemTime {
        self.mtime
    }
}

/// Reduces a caller-supplied name to its final path component.
///
/// Both `/` and `\` are treated as separators. `.` and `..` components are
/// not meaningful entry names and are rejected along with empty results.
fn sanitize_name(raw: &str) -> Result<String> {
    let invalid = || Error::InvalidEntryName {
        name: raw.to_string(),
    };

    if raw.contains('\0') {
        return Err(invalid());
    }

    let base = raw
        .rsplit(['/', '\\'])
        .find(|component| !component.is_empty())
        .unwrap_or("");

    match base {
        "" | "." | ".." => Err(invalid()),
        _ => Ok(base.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let entry = ArchiveEntry::file("report.txt", DeclaredSize::Known(12)).unwrap();
        assert_eq!(entry.name(), "report.txt");
        assert_eq!(entry.declared_size(), DeclaredSize::Known(12));
        assert_eq!(entry.kind(), EntryKind::File);
    }

    #[test]
    fn test_path_reduced_to_basename() {
        for raw in ["/tmp/data/report.txt", "data\\report.txt", "report.txt/"] {
            let entry = ArchiveEntry::file(raw, DeclaredSize::Unknown).unwrap();
            assert_eq!(entry.name(), "report.txt", "from {raw:?}");
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        for raw in ["", "/", "///", ".", "..", "a/.."] {
            let err = ArchiveEntry::file(raw, DeclaredSize::Unknown).unwrap_err();
            assert!(matches!(err, Error::InvalidEntryName { .. }), "for {raw:?}");
        }
    }

    #[test]
    fn test_nul_rejected() {
        let err = ArchiveEntry::file("re\0port", DeclaredSize::Unknown).unwrap_err();
        assert!(matches!(err, Error::InvalidEntryName { .. }));
    }

    #[test]
    fn test_mtime_override() {
        let t = SystemTime::UNIX_EPOCH;
        let entry = ArchiveEntry::file("a.txt", DeclaredSize::Unknown)
            .unwrap()
            .mtime(t);
        assert_eq!(entry.modified(), t);
    }
}
