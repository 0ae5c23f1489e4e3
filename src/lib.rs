//! # zipseal
//!
//! A pure-Rust streaming ZIP writer with AES-256 (WinZip AE-2) encryption.
//!
//! This crate implements the write side of an encrypted ZIP pipeline: it
//! frames a file entry into a local file header, passes its bytes through
//! a compression codec (store or deflate), encrypts the result with an
//! authenticated AES-CTR stream, and finalizes the container with a
//! central directory, all while streaming blocks of any size through a
//! pluggable output [`Sink`](sink::Sink).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zipseal::{ArchiveEntry, DeclaredSize, Result, WriteOptions, ZipWriter};
//!
//! fn main() -> Result<()> {
//!     let options = WriteOptions::new().password("secret");
//!     let mut writer = ZipWriter::create_path("report.zip", options)?;
//!
//!     writer.begin_entry(ArchiveEntry::file("report.txt", DeclaredSize::Known(12))?)?;
//!     writer.write(b"hello world!")?;
//!     writer.finalize()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming to Arbitrary Sinks
//!
//! The writer owns no I/O policy: it emits through the
//! [`Sink`](sink::Sink) capability, which makes seekability explicit.
//! Entries framed with [`DeclaredSize::Unknown`] have their true sizes
//! patched into the header at finalize time, which requires a seekable
//! sink. On a non-seekable sink the writer refuses with
//! [`Error::UnseekableSink`] instead of emitting wrong sizes.
//!
//! ```rust
//! use zipseal::{ArchiveEntry, DeclaredSize, WriteOptions, ZipWriter};
//! use zipseal::sink::VecSink;
//!
//! let mut writer = ZipWriter::new(VecSink::new(), WriteOptions::new());
//! writer.begin_entry(ArchiveEntry::file("data.bin", DeclaredSize::Unknown)?)?;
//! writer.write(&[0u8; 1024])?;
//! let result = writer.finalize()?;
//! assert_eq!(result.plain_bytes, 1024);
//! # Ok::<(), zipseal::Error>(())
//! ```
//!
//! ## Output Format
//!
//! Encrypted entries follow the WinZip AES (AE-2) layout and are readable
//! by standard tools: PBKDF2-HMAC-SHA1 key derivation with a fresh random
//! salt per archive, AES-CTR with a little-endian counter, and a 10-byte
//! HMAC-SHA1 authentication code after the ciphertext. Without a password
//! the writer produces plain ZIP entries with real CRC-32 checksums.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `aes` | Yes | AES (WinZip AE-2) entry encryption |
//! | `deflate` | Yes | Deflate compression |
//!
//! ## Concurrency Model
//!
//! One writer, one sink, strictly sequential: a writer instance frames a
//! single streamed entry and shares no mutable state with other writers.
//! Producing several archives concurrently (for example, a benchmark
//! sweeping block sizes) means constructing independent writers, each
//! with its own salt and sink.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod entry;
pub mod error;
pub mod sink;
pub mod timestamp;
pub mod write;

#[cfg(feature = "aes")]
#[cfg_attr(docsrs, doc(cfg(feature = "aes")))]
pub mod crypto;

pub use error::{Error, Result};

pub use entry::{ArchiveEntry, DeclaredSize, EntryKind};

pub use codec::CompressionMethod;

pub use write::{WriteOptions, WriteResult, WriterState, ZipWriter};

#[cfg(feature = "aes")]
pub use crypto::{AesStrength, CipherStream, Password};
