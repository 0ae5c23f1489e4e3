//! Archive writing API.
//!
//! [`ZipWriter`] orchestrates the full pipeline for one streamed entry:
//! entry framing, codec encoding, cipher encryption, and sink output,
//! while tracking running size and checksum accumulators.
//!
//! # State Machine
//!
//! ```text
//! Initialized --begin_entry--> HeaderWritten --first write--> Streaming
//! Streaming --write(block)--> Streaming
//! HeaderWritten|Streaming --finalize--> Finalized
//! any state --unrecoverable error--> Failed
//! ```
//!
//! Data may be pushed only while streaming; finalize is valid once the
//! header is written; a `Failed` or `Finalized` writer accepts no further
//! writes. Unrecoverable errors (sink I/O, cipher counter exhaustion,
//! oversized entries) poison the writer to `Failed` and release the
//! cipher and codec immediately.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "aes")] {
//! use zipseal::{ArchiveEntry, DeclaredSize, WriteOptions, ZipWriter};
//! use zipseal::sink::VecSink;
//!
//! let options = WriteOptions::new().password("secret");
//! let mut writer = ZipWriter::new(VecSink::new(), options);
//!
//! writer.begin_entry(ArchiveEntry::file("report.txt", DeclaredSize::Known(12))?)?;
//! writer.write(b"hello world!")?;
//! let result = writer.finalize()?;
//! assert_eq!(result.plain_bytes, 12);
//! # }
//! # Ok::<(), zipseal::Error>(())
//! ```

mod header;
mod options;

pub use options::{WriteOptions, WriteResult};

use crate::codec::{CompressionMethod, Encoder, build_encoder};
use crate::entry::{ArchiveEntry, DeclaredSize};
use crate::sink::{FileSink, Sink};
use crate::timestamp::DosDateTime;
use crate::{Error, Result};

use header::{
    AesExtra, EntryRecord, FLAG_ENCRYPTED, FLAG_UTF8, LOCAL_HEADER_SIZES_OFFSET, METHOD_AES,
    encode_central_directory, encode_local_header, encode_sizes_patch,
};

#[cfg(feature = "aes")]
use crate::crypto::CipherStream;

/// Sentinel written into 32-bit size fields that will be patched later.
const SIZE_PLACEHOLDER: u32 = 0xFFFF_FFFF;

/// The writer's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// No entry has been framed yet.
    Initialized,
    /// The local file header has been emitted; no data yet.
    HeaderWritten,
    /// Entry data is being streamed.
    Streaming,
    /// The archive is complete; the trailer has been written.
    Finalized,
    /// An unrecoverable error occurred; the output is partial.
    Failed,
}

impl WriterState {
    fn name(self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::HeaderWritten => "HeaderWritten",
            Self::Streaming => "Streaming",
            Self::Finalized => "Finalized",
            Self::Failed => "Failed",
        }
    }
}

/// Per-entry pipeline state, owned by the writer while an entry is open.
///
/// Dropping this (on finalize, abort, or failure) releases the codec and
/// zeroizes the cipher's key material.
struct ActiveEntry {
    record: EntryRecord,
    encoder: Box<dyn Encoder>,
    #[cfg(feature = "aes")]
    cipher: Option<CipherStream>,
    crc: crc32fast::Hasher,
    declared: DeclaredSize,
    /// Plaintext bytes accepted so far.
    plain_bytes: u64,
    /// Entry payload bytes emitted so far (salt, verifier, coded data, tag).
    payload_bytes: u64,
}

impl ActiveEntry {
    fn encrypting(&self) -> bool {
        #[cfg(feature = "aes")]
        {
            self.cipher.is_some()
        }
        #[cfg(not(feature = "aes"))]
        {
            false
        }
    }
}

/// A streaming ZIP archive writer.
///
/// One writer frames exactly one entry into one sink, then finalizes the
/// container. Writers share no state: producing several archives
/// concurrently means constructing several writers, each with its own
/// salt and sink.
pub struct ZipWriter<S> {
    sink: S,
    options: WriteOptions,
    state: WriterState,
    active: Option<ActiveEntry>,
    /// Absolute sink offset; also the archive length so far.
    offset: u64,
    /// Reusable encryption buffer.
    scratch: Vec<u8>,
    result: Option<WriteResult>,
}

impl ZipWriter<FileSink> {
    /// Creates a writer producing the archive at `path`.
    pub fn create_path<P: AsRef<std::path::Path>>(path: P, options: WriteOptions) -> Result<Self> {
        Ok(Self::new(FileSink::create(path)?, options))
    }
}

impl<S: Sink> ZipWriter<S> {
    /// Creates a writer over the given sink.
    pub fn new(sink: S, options: WriteOptions) -> Self {
        Self {
            sink,
            options,
            state: WriterState::Initialized,
            active: None,
            offset: 0,
            scratch: Vec::new(),
            result: None,
        }
    }

    /// The writer's current state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Consumes the writer and returns the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Frames an entry: serializes its local file header into the sink.
    ///
    /// For encrypted archives this also emits the salt and password
    /// verifier, so the sink receives the complete entry prologue before
    /// any data block.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] unless the writer is `Initialized`.
    /// - [`Error::EntryTooLarge`] if the declared size cannot be framed
    ///   in 32-bit fields.
    /// - [`Error::KeyDerivationFailure`] if cipher setup fails (the
    ///   writer transitions to `Failed`).
    /// - [`Error::SinkWrite`] if the sink rejects the header (the writer
    ///   transitions to `Failed`).
    pub fn begin_entry(&mut self, entry: ArchiveEntry) -> Result<()> {
        if self.state != WriterState::Initialized {
            return Err(Error::InvalidState {
                operation: "begin_entry",
                state: self.state.name(),
            });
        }

        let encrypting = self.options.encrypting();
        let overhead = self.entry_overhead();

        // Validate declared sizes against the 32-bit fields up front,
        // before anything reaches the sink.
        if let DeclaredSize::Known(size) = entry.declared_size() {
            let framed = size.saturating_add(overhead);
            if size >= u64::from(SIZE_PLACEHOLDER) || framed >= u64::from(SIZE_PLACEHOLDER) {
                return Err(Error::EntryTooLarge { size });
            }
        }

        match self.begin_inner(entry, encrypting, overhead) {
            Ok(()) => {
                self.state = WriterState::HeaderWritten;
                Ok(())
            }
            Err(e) => {
                self.state = WriterState::Failed;
                self.active = None;
                Err(e)
            }
        }
    }

    /// Pushes one block of entry data through codec, cipher, and sink.
    ///
    /// The first call transitions the writer from `HeaderWritten` to
    /// `Streaming`. The whole block is accepted or the operation fails;
    /// partial writes are not modeled. Returns the number of plaintext
    /// bytes accepted, which on success always equals `block.len()`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] outside `HeaderWritten`/`Streaming`, or
    ///   for an empty block.
    /// - [`Error::SinkWrite`], [`Error::CounterExhausted`],
    ///   [`Error::EntryTooLarge`] on pipeline failures; each poisons the
    ///   writer to `Failed`.
    pub fn write(&mut self, block: &[u8]) -> Result<usize> {
        match self.state {
            WriterState::HeaderWritten | WriterState::Streaming => {}
            state => {
                return Err(Error::InvalidState {
                    operation: "write",
                    state: state.name(),
                });
            }
        }
        if block.is_empty() {
            return Err(Error::InvalidState {
                operation: "write of an empty block",
                state: self.state.name(),
            });
        }

        let Some(mut active) = self.active.take() else {
            return Err(Error::InvalidState {
                operation: "write",
                state: self.state.name(),
            });
        };

        match self.write_inner(&mut active, block) {
            Ok(()) => {
                self.active = Some(active);
                self.state = WriterState::Streaming;
                Ok(block.len())
            }
            Err(e) => {
                // Dropping the active entry releases codec and cipher.
                self.state = WriterState::Failed;
                Err(e)
            }
        }
    }

    /// Completes the entry and the archive.
    ///
    /// Flushes the codec, writes the authentication code, patches the
    /// entry's true sizes into the header when they were unknown or
    /// mis-declared, and emits the central directory and
    /// end-of-central-directory records. Idempotent: calling again after
    /// success returns the same [`WriteResult`] without touching the sink.
    ///
    /// Unencrypted entries always patch their CRC-32 (it is only known
    /// once the data has streamed) and therefore need a seekable sink.
    /// Encrypted store-mode entries with an exact declared size finalize
    /// without patching and work on any sink.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] from `Initialized` or `Failed`.
    /// - [`Error::UnseekableSink`] if header patching is required but the
    ///   sink cannot seek.
    /// - [`Error::SinkWrite`], [`Error::EntryTooLarge`] on pipeline
    ///   failures; each poisons the writer to `Failed`.
    pub fn finalize(&mut self) -> Result<WriteResult> {
        match self.state {
            WriterState::HeaderWritten | WriterState::Streaming => {}
            WriterState::Finalized => {
                if let Some(result) = self.result {
                    return Ok(result);
                }
                return Err(Error::InvalidState {
                    operation: "finalize",
                    state: self.state.name(),
                });
            }
            state => {
                return Err(Error::InvalidState {
                    operation: "finalize",
                    state: state.name(),
                });
            }
        }

        let Some(active) = self.active.take() else {
            return Err(Error::InvalidState {
                operation: "finalize",
                state: self.state.name(),
            });
        };

        match self.finalize_inner(active) {
            Ok(result) => {
                self.state = WriterState::Finalized;
                self.result = Some(result);
                Ok(result)
            }
            Err(e) => {
                self.state = WriterState::Failed;
                Err(e)
            }
        }
    }

    /// Abandons the archive: transitions to `Failed` and releases the
    /// cipher and codec.
    ///
    /// Whatever the sink already holds is partial output; discarding it
    /// is the caller's responsibility.
    pub fn abort(&mut self) {
        if self.state != WriterState::Finalized {
            log::warn!("archive writer aborted in state {}", self.state.name());
            self.state = WriterState::Failed;
        }
        self.active = None;
    }

    /// Salt + verifier + auth code bytes added around encrypted data.
    fn entry_overhead(&self) -> u64 {
        #[cfg(feature = "aes")]
        if self.options.encrypting() {
            return (self.options.strength.salt_len()
                + crate::crypto::VERIFIER_LEN
                + crate::crypto::AUTH_CODE_LEN) as u64;
        }
        0
    }

    fn emit(sink: &mut S, offset: &mut u64, buf: &[u8]) -> Result<()> {
        sink.write(buf).map_err(Error::SinkWrite)?;
        *offset += buf.len() as u64;
        Ok(())
    }

    fn begin_inner(&mut self, entry: ArchiveEntry, encrypting: bool, overhead: u64) -> Result<()> {
        #[cfg(feature = "aes")]
        let cipher = match (&self.options.password, encrypting) {
            (Some(password), true) => {
                Some(CipherStream::new(password, self.options.strength)?)
            }
            _ => None,
        };

        let mut flags = 0u16;
        if encrypting {
            flags |= FLAG_ENCRYPTED;
        }
        if !entry.name().is_ascii() {
            flags |= FLAG_UTF8;
        }

        let method = if encrypting {
            METHOD_AES
        } else {
            self.options.method.zip_id()
        };

        #[cfg(feature = "aes")]
        let aes = encrypting.then(|| AesExtra {
            strength: self.options.strength.marker(),
            actual_method: self.options.method.zip_id(),
        });
        #[cfg(not(feature = "aes"))]
        let aes: Option<AesExtra> = None;

        // Sizes: prefill what is already exact, placeholder the rest.
        // Compressed size is only predictable for store mode.
        let declared = entry.declared_size();
        let (uncompressed, compressed) = match declared {
            DeclaredSize::Known(size) if self.options.method == CompressionMethod::Store => {
                (size, size + overhead)
            }
            DeclaredSize::Known(size) => (size, u64::from(SIZE_PLACEHOLDER)),
            DeclaredSize::Unknown => {
                (u64::from(SIZE_PLACEHOLDER), u64::from(SIZE_PLACEHOLDER))
            }
        };

        let record = EntryRecord {
            name: entry.name().to_string(),
            flags,
            method,
            crc32: 0,
            compressed_size: compressed,
            uncompressed_size: uncompressed,
            header_offset: self.offset,
            dos: DosDateTime::from_system_time(entry.modified()),
            aes,
        };

        let header = encode_local_header(&record);
        Self::emit(&mut self.sink, &mut self.offset, &header)?;

        #[cfg(feature = "aes")]
        let payload_bytes = match &cipher {
            Some(cipher) => {
                Self::emit(&mut self.sink, &mut self.offset, cipher.salt())?;
                Self::emit(&mut self.sink, &mut self.offset, &cipher.verifier())?;
                (cipher.salt().len() + crate::crypto::VERIFIER_LEN) as u64
            }
            None => 0,
        };
        #[cfg(not(feature = "aes"))]
        let payload_bytes = 0u64;

        self.active = Some(ActiveEntry {
            record,
            encoder: build_encoder(self.options.method),
            #[cfg(feature = "aes")]
            cipher,
            crc: crc32fast::Hasher::new(),
            declared,
            plain_bytes: 0,
            payload_bytes,
        });
        Ok(())
    }

    fn write_inner(&mut self, active: &mut ActiveEntry, block: &[u8]) -> Result<()> {
        active.crc.update(block);
        active.plain_bytes += block.len() as u64;
        if active.plain_bytes >= u64::from(SIZE_PLACEHOLDER) {
            return Err(Error::EntryTooLarge {
                size: active.plain_bytes,
            });
        }

        let coded = active.encoder.encode(block)?;
        if coded.is_empty() {
            return Ok(());
        }

        #[cfg(feature = "aes")]
        if let Some(cipher) = &mut active.cipher {
            self.scratch.clear();
            self.scratch.extend_from_slice(&coded);
            cipher.encrypt_block(&mut self.scratch)?;
            Self::emit(&mut self.sink, &mut self.offset, &self.scratch)?;
            active.payload_bytes += self.scratch.len() as u64;
            return Ok(());
        }

        Self::emit(&mut self.sink, &mut self.offset, &coded)?;
        active.payload_bytes += coded.len() as u64;
        Ok(())
    }

    fn finalize_inner(&mut self, mut active: ActiveEntry) -> Result<WriteResult> {
        // Drain the codec; its tail is entry data like any other block.
        let tail = active.encoder.finish()?;
        if !tail.is_empty() {
            #[cfg(feature = "aes")]
            if let Some(cipher) = &mut active.cipher {
                self.scratch.clear();
                self.scratch.extend_from_slice(&tail);
                cipher.encrypt_block(&mut self.scratch)?;
                Self::emit(&mut self.sink, &mut self.offset, &self.scratch)?;
                active.payload_bytes += self.scratch.len() as u64;
            }
            if !active.encrypting() {
                Self::emit(&mut self.sink, &mut self.offset, &tail)?;
                active.payload_bytes += tail.len() as u64;
            }
        }

        let encrypted = active.encrypting();

        #[cfg(feature = "aes")]
        if let Some(cipher) = active.cipher.take() {
            let auth_code = cipher.finalize();
            Self::emit(&mut self.sink, &mut self.offset, &auth_code)?;
            active.payload_bytes += auth_code.len() as u64;
        }

        let uncompressed = active.plain_bytes;
        let compressed = active.payload_bytes;
        if compressed >= u64::from(SIZE_PLACEHOLDER) {
            return Err(Error::EntryTooLarge { size: compressed });
        }

        // AE-2 zeroes the CRC field; plaintext CRCs would leak content.
        let crc32 = if encrypted { 0 } else { active.crc.finalize() };

        let mut record = active.record;
        let needs_patch = record.crc32 != crc32
            || record.compressed_size != compressed
            || record.uncompressed_size != uncompressed;

        record.crc32 = crc32;
        record.compressed_size = compressed;
        record.uncompressed_size = uncompressed;

        if needs_patch {
            if !self.sink.is_seekable() {
                return Err(Error::UnseekableSink);
            }
            if let DeclaredSize::Known(declared) = active.declared {
                if declared != uncompressed {
                    log::warn!(
                        "entry '{}' declared {} bytes but received {}",
                        record.name,
                        declared,
                        uncompressed
                    );
                }
            }

            let end = self.offset;
            let patch = encode_sizes_patch(&record);
            self.sink
                .seek_to(record.header_offset + LOCAL_HEADER_SIZES_OFFSET)
                .map_err(Error::SinkWrite)?;
            self.sink.write(&patch).map_err(Error::SinkWrite)?;
            self.sink.seek_to(end).map_err(Error::SinkWrite)?;
        }

        let directory = encode_central_directory(std::slice::from_ref(&record), self.offset);
        Self::emit(&mut self.sink, &mut self.offset, &directory)?;
        self.sink.flush().map_err(Error::SinkWrite)?;

        Ok(WriteResult {
            entries_written: 1,
            plain_bytes: uncompressed,
            archive_bytes: self.offset,
        })
    }
}
