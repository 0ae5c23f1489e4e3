//! Store codec (no compression).

use std::borrow::Cow;

use super::{CompressionMethod, Encoder};
use crate::Result;

/// An encoder that passes data through unchanged.
#[derive(Debug, Default)]
pub struct StoreEncoder;

impl StoreEncoder {
    /// Creates a new store encoder.
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for StoreEncoder {
    fn encode<'a>(&mut self, block: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(block))
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::Store
    }
}
