//! Deflate codec.

use std::borrow::Cow;
use std::io::Write;
use std::mem;

use flate2::Compression;

use super::{CompressionMethod, Encoder};
use crate::Result;

/// A streaming raw-deflate encoder.
///
/// ZIP stores raw deflate streams (no zlib wrapper). Output produced for
/// each input block is drained eagerly so the writer can pipe it straight
/// into the cipher; whatever the compressor still buffers comes out of
/// [`finish`](Encoder::finish).
pub struct DeflateEncoder {
    inner: flate2::write::DeflateEncoder<Vec<u8>>,
}

impl DeflateEncoder {
    /// Creates an encoder at the default compression level.
    pub fn new() -> Self {
        Self::with_level(6)
    }

    /// Creates an encoder at the given level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            inner: flate2::write::DeflateEncoder::new(Vec::new(), Compression::new(level.min(9))),
        }
    }
}

impl Default for DeflateEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for DeflateEncoder {
    fn encode<'a>(&mut self, block: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        self.inner.write_all(block).map_err(crate::Error::Io)?;
        Ok(Cow::Owned(mem::take(self.inner.get_mut())))
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        self.inner.try_finish().map_err(crate::Error::Io)?;
        Ok(mem::take(self.inner.get_mut()))
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::Deflate
    }
}
