//! Compression codecs for entry data.
//!
//! Entry bytes pass through an [`Encoder`] before encryption. Store mode
//! is the identity transform and always available; Deflate is provided
//! behind the `deflate` feature. The writer's state machine is codec
//! agnostic: adding a method here requires no writer changes.

mod store;

#[cfg(feature = "deflate")]
#[cfg_attr(docsrs, doc(cfg(feature = "deflate")))]
mod deflate;

use std::borrow::Cow;

use crate::Result;

pub use store::StoreEncoder;

#[cfg(feature = "deflate")]
pub use deflate::DeflateEncoder;

/// The compression method applied to entry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum CompressionMethod {
    /// No compression; bytes pass through unchanged.
    #[default]
    Store,
    /// Deflate compression.
    #[cfg(feature = "deflate")]
    Deflate,
}

impl CompressionMethod {
    /// The ZIP compression method id for this codec.
    pub(crate) fn zip_id(self) -> u16 {
        match self {
            Self::Store => 0,
            #[cfg(feature = "deflate")]
            Self::Deflate => 8,
        }
    }
}

/// A streaming block encoder.
///
/// Blocks are fed through [`encode`][Self::encode]; the final
/// [`finish`][Self::finish] call drains whatever the codec still buffers.
/// Codecs are single-use: the writer constructs one per entry and drops it
/// at finalize or abort.
pub trait Encoder {
    /// Encodes one block, returning the coded bytes.
    ///
    /// Store mode returns the input borrowed; compressing codecs may
    /// return an empty buffer while they accumulate input.
    fn encode<'a>(&mut self, block: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    /// Flushes the codec, returning any final coded bytes.
    fn finish(&mut self) -> Result<Vec<u8>>;

    /// The method this encoder implements.
    fn method(&self) -> CompressionMethod;
}

/// Builds the encoder for a compression method.
pub(crate) fn build_encoder(method: CompressionMethod) -> Box<dyn Encoder> {
    match method {
        CompressionMethod::Store => Box::new(StoreEncoder::new()),
        #[cfg(feature = "deflate")]
        CompressionMethod::Deflate => Box::new(DeflateEncoder::new()),
    }
}
