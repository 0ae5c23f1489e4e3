//! Error types for archive writing operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when producing an encrypted ZIP archive, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use zipseal::{ArchiveEntry, DeclaredSize, Result, WriteOptions, ZipWriter};
//! use zipseal::sink::VecSink;
//!
//! fn write_archive(data: &[u8]) -> Result<Vec<u8>> {
//!     let mut writer = ZipWriter::new(VecSink::new(), WriteOptions::new());
//!     writer.begin_entry(ArchiveEntry::file("data.bin", DeclaredSize::Unknown)?)?;
//!     writer.write(data)?;
//!     writer.finalize()?;
//!     Ok(writer.into_sink().into_vec())
//! }
//! ```
//!
//! # Failure Policy
//!
//! Errors are never swallowed: every failure is returned to the immediate
//! caller. Unrecoverable failures (sink I/O errors, cipher counter
//! exhaustion, oversized entries) additionally transition the writer into
//! its `Failed` state so that later misuse is caught structurally instead
//! of silently corrupting output. Contract violations (wrong state, empty
//! block, bad entry name) are rejected without damaging the writer.

use std::io;

/// The main error type for archive writing operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`SinkWrite`][Self::SinkWrite] | File system / sink failures |
/// | Contract | [`InvalidEntryName`][Self::InvalidEntryName], [`InvalidState`][Self::InvalidState] | API misuse |
/// | Format | [`UnseekableSink`][Self::UnseekableSink], [`EntryTooLarge`][Self::EntryTooLarge] | Container limits |
/// | Crypto | [`CounterExhausted`][Self::CounterExhausted], [`KeyDerivationFailure`][Self::KeyDerivationFailure] | Cipher stream |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred outside the sink write path.
    ///
    /// This wraps [`std::io::Error`] for operations such as opening the
    /// destination file of a [`FileSink`](crate::sink::FileSink).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The underlying sink rejected a write or a seek.
    ///
    /// The writer transitions to `Failed` when this is returned: whatever
    /// the sink holds is partial output and must be discarded by the
    /// caller. The archive is never presented as complete.
    #[error("sink write failed: {0}")]
    SinkWrite(#[source] io::Error),

    /// The entry name is empty or not usable as an archive entry name.
    ///
    /// Entry names are reduced to their final path component before
    /// framing; a name that is empty after that reduction (for example
    /// `""`, `"/"` or `".."`), or that contains a NUL byte, is
    /// rejected.
    #[error("invalid entry name: {name:?}")]
    InvalidEntryName {
        /// The offending name, as supplied by the caller.
        name: String,
    },

    /// The operation is not valid in the writer's current state.
    ///
    /// The writer is a strict state machine: entries are framed once,
    /// data may only be pushed after the header is written, and nothing
    /// may follow finalization. See
    /// [`WriterState`](crate::write::WriterState) for the transitions.
    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the writer was in.
        state: &'static str,
    },

    /// Finalize needed to patch header fields but the sink cannot seek.
    ///
    /// When an entry is framed with an unknown size (or the actual sizes
    /// turn out to differ from the declared ones), the true values must be
    /// patched into the local file header at finalize time. On a sink
    /// without seek support the writer refuses with this error rather
    /// than emitting a header with wrong sizes.
    #[error("cannot patch entry header: sink is not seekable")]
    UnseekableSink,

    /// The cipher block counter would exceed its safe range.
    ///
    /// The CTR keystream counter must increment monotonically for every
    /// 16-byte block; reusing a counter value would reuse keystream. The
    /// writer fails loudly at the 2^32-block mark (64 GiB of ciphertext
    /// per entry) instead of relying on the counter width.
    #[error("cipher block counter exhausted")]
    CounterExhausted,

    /// Deriving key material from the password failed.
    ///
    /// This covers failures of the system random source while generating
    /// the per-archive salt as well as internal KDF failures.
    #[error("key derivation failed: {0}")]
    KeyDerivationFailure(String),

    /// The entry's sizes no longer fit the 32-bit ZIP header fields.
    ///
    /// ZIP64 is not supported; entries must stay below 4 GiB both before
    /// and after encoding.
    #[error("entry size {size} exceeds the 32-bit ZIP limit")]
    EntryTooLarge {
        /// The size that overflowed the field.
        size: u64,
    },
}

/// A specialized `Result` type for archive writing operations.
pub type Result<T> = std::result::Result<T, Error>;
