//! Write options and result statistics.

use crate::codec::CompressionMethod;

#[cfg(feature = "aes")]
use crate::crypto::{AesStrength, Password};

/// Configuration for a [`ZipWriter`](super::ZipWriter).
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "aes")] {
/// use zipseal::{CompressionMethod, Password, WriteOptions};
///
/// let options = WriteOptions::new()
///     .method(CompressionMethod::Store)
///     .password(Password::new("secret"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub(crate) method: CompressionMethod,
    #[cfg(feature = "aes")]
    pub(crate) password: Option<Password>,
    #[cfg(feature = "aes")]
    pub(crate) strength: AesStrength,
}

impl WriteOptions {
    /// Creates options with defaults: store mode, no encryption.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method applied before encryption.
    #[must_use]
    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Enables encryption with the given password.
    ///
    /// A fresh random salt is generated when the entry begins; two
    /// archives written with the same password never share keystream.
    #[cfg(feature = "aes")]
    #[cfg_attr(docsrs, doc(cfg(feature = "aes")))]
    #[must_use]
    pub fn password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the AES key strength (default AES-256).
    #[cfg(feature = "aes")]
    #[cfg_attr(docsrs, doc(cfg(feature = "aes")))]
    #[must_use]
    pub fn strength(mut self, strength: AesStrength) -> Self {
        self.strength = strength;
        self
    }

    pub(crate) fn encrypting(&self) -> bool {
        #[cfg(feature = "aes")]
        {
            self.password.is_some()
        }
        #[cfg(not(feature = "aes"))]
        {
            false
        }
    }
}

/// Statistics from a finalized archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of entries written.
    pub entries_written: usize,
    /// Total plaintext bytes accepted by `write`.
    pub plain_bytes: u64,
    /// Total bytes emitted to the sink, headers and trailer included.
    pub archive_bytes: u64,
}
