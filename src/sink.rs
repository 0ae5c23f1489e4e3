//! Output sink capability for archive writing.
//!
//! The writer emits bytes through the [`Sink`] trait rather than a concrete
//! `Write` type so that destinations without seek support are first-class:
//! seekability is discoverable via [`Sink::is_seekable`], and the writer
//! refuses header patching on sinks that cannot seek instead of emitting
//! wrong sizes.
//!
//! Provided sinks:
//!
//! - [`FileSink`]: a file on disk, seekable.
//! - [`VecSink`]: an in-memory buffer, seekable.
//! - [`StreamSink`]: wraps any [`Write`], not seekable.
//! - [`DiscardSink`]: counts and drops all bytes; used by throughput
//!   measurements so I/O overhead does not skew results.
//!
//! The writer never closes a sink: the sink is a capability passed in by
//! the caller, and its lifetime belongs to the caller.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::Result;

/// A destination accepting a sequence of byte writes and optional seeks.
pub trait Sink {
    /// Writes the entire buffer to the destination.
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flushes buffered data to the destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Returns true if [`seek_to`][Self::seek_to] is supported.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Repositions the write cursor to an absolute byte offset.
    ///
    /// Sinks that report `is_seekable() == false` return an error.
    fn seek_to(&mut self, _offset: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "sink does not support seeking",
        ))
    }
}

/// A seekable file sink.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Creates (or truncates) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Wraps an already-open file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }

    /// Returns the underlying file.
    pub fn into_file(self) -> File {
        self.file
    }
}

impl Sink for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }
}

/// A seekable in-memory sink.
///
/// Writing past the current end extends the buffer; seeking back and
/// writing overwrites in place (this is how header patching works on
/// in-memory archives).
#[derive(Debug, Default)]
pub struct VecSink {
    data: Vec<u8>,
    pos: usize,
}

impl VecSink {
    /// Creates an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory sink with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Returns the bytes written so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the sink and returns the collected bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Sink for VecSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        if offset > self.data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek past end of buffer",
            ));
        }
        self.pos = offset as usize;
        Ok(())
    }
}

/// A non-seekable sink wrapping any [`Write`] implementation.
///
/// Use this for pipes, sockets, or any stream where the archive must be
/// produced strictly front-to-back. Entries with unknown sizes cannot be
/// finalized through this sink.
#[derive(Debug)]
pub struct StreamSink<W> {
    inner: W,
}

impl<W: Write> StreamSink<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Consumes the sink and returns the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A sink that discards all bytes while counting them.
///
/// Equivalent to the no-op write callback a throughput harness hands to
/// the writer: every write "succeeds" instantly, so measurements capture
/// the framing/codec/cipher pipeline rather than disk speed.
#[derive(Debug, Default)]
pub struct DiscardSink {
    bytes_discarded: u64,
}

impl DiscardSink {
    /// Creates a new discard sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes discarded.
    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }
}

impl Sink for DiscardSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bytes_discarded += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_append() {
        let mut sink = VecSink::new();
        sink.write(&[1, 2, 3]).unwrap();
        sink.write(&[4, 5]).unwrap();
        assert_eq!(sink.data(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_vec_sink_patch_in_place() {
        let mut sink = VecSink::new();
        sink.write(&[0; 8]).unwrap();
        sink.seek_to(2).unwrap();
        sink.write(&[9, 9]).unwrap();
        sink.seek_to(8).unwrap();
        sink.write(&[7]).unwrap();
        assert_eq!(sink.data(), &[0, 0, 9, 9, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn test_vec_sink_seek_past_end() {
        let mut sink = VecSink::new();
        sink.write(&[1]).unwrap();
        assert!(sink.seek_to(10).is_err());
    }

    #[test]
    fn test_stream_sink_not_seekable() {
        let mut sink = StreamSink::new(Vec::new());
        assert!(!sink.is_seekable());
        assert!(sink.seek_to(0).is_err());
        sink.write(&[1, 2]).unwrap();
        assert_eq!(sink.into_inner(), vec![1, 2]);
    }

    #[test]
    fn test_discard_sink_counts() {
        let mut sink = DiscardSink::new();
        sink.write(&[0u8; 1000]).unwrap();
        sink.write(&[0u8; 24]).unwrap();
        assert_eq!(sink.bytes_discarded(), 1024);
        assert!(!sink.is_seekable());
    }

    #[test]
    fn test_file_sink_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        {
            let mut sink = FileSink::create(&path).unwrap();
            sink.write(b"hello").unwrap();
            sink.seek_to(0).unwrap();
            sink.write(b"H").unwrap();
            sink.flush().unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"Hello");
    }
}
