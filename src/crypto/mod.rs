//! WinZip AES (AE-2) encryption support.
//!
//! This module implements the cipher stream the writer wraps around entry
//! data:
//!
//! - PBKDF2-HMAC-SHA1 key derivation from the password with a fresh
//!   per-archive random salt
//! - AES in CTR mode with a 128-bit little-endian block counter starting
//!   at 1
//! - A running HMAC-SHA1 over the ciphertext, truncated to a 10-byte
//!   authentication code at finalize
//!
//! The derived key buffer is `cipher key || HMAC key || 2-byte password
//! verifier`; the verifier is stored in the archive ahead of the
//! ciphertext so readers can reject a wrong password before decrypting.
//!
//! # Salt Discipline
//!
//! A [`CipherStream`] owns exactly one salt, generated from the system
//! random source at construction. Two streams built from the same password
//! therefore produce different keystreams; salts are never shared or
//! reused across archives. Key material is zeroized on drop.

mod password;

use aes::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::{Error, Result};

pub use password::Password;

type HmacSha1 = Hmac<Sha1>;
type Aes128Ctr = ctr::Ctr128LE<aes::Aes128>;
type Aes192Ctr = ctr::Ctr128LE<aes::Aes192>;
type Aes256Ctr = ctr::Ctr128LE<aes::Aes256>;

/// PBKDF2 iteration count fixed by the WinZip AES specification.
pub const KDF_ITERATIONS: u32 = 1000;

/// Length of the authentication code stored after the ciphertext.
pub const AUTH_CODE_LEN: usize = 10;

/// Length of the password verifier stored after the salt.
pub const VERIFIER_LEN: usize = 2;

/// AES block size in bytes.
const AES_BLOCK_SIZE: u64 = 16;

/// Maximum number of AES blocks one cipher stream may encrypt.
///
/// The CTR counter is 128 bits wide and cannot realistically wrap, but a
/// stream refuses to pass this mark (64 GiB of data) with
/// [`Error::CounterExhausted`] instead of relying on that width.
pub const MAX_CTR_BLOCKS: u64 = 1 << 32;

/// AES key strength for encrypted entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum AesStrength {
    /// AES-128: 16-byte key, 8-byte salt.
    Aes128,
    /// AES-192: 24-byte key, 12-byte salt.
    Aes192,
    /// AES-256: 32-byte key, 16-byte salt.
    #[default]
    Aes256,
}

impl AesStrength {
    /// Salt length in bytes (half the key length).
    pub fn salt_len(self) -> usize {
        self.key_len() / 2
    }

    /// Cipher key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// The strength marker stored in the AES extra field (1, 2, or 3).
    pub(crate) fn marker(self) -> u8 {
        match self {
            Self::Aes128 => 1,
            Self::Aes192 => 2,
            Self::Aes256 => 3,
        }
    }
}

/// Key material derived from a password and salt.
///
/// Holds the cipher key, the HMAC key, and the 2-byte password verifier.
/// All key bytes are zeroized when the material is dropped.
pub struct KeyMaterial {
    cipher_key: Zeroizing<Vec<u8>>,
    hmac_key: Zeroizing<Vec<u8>>,
    verifier: [u8; VERIFIER_LEN],
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("cipher_key", &"<redacted>")
            .field("hmac_key", &"<redacted>")
            .field("verifier", &"<redacted>")
            .finish()
    }
}

impl KeyMaterial {
    /// The AES cipher key.
    pub fn cipher_key(&self) -> &[u8] {
        &self.cipher_key
    }

    /// The HMAC-SHA1 authentication key.
    pub fn hmac_key(&self) -> &[u8] {
        &self.hmac_key
    }

    /// The password verifier stored in the archive.
    pub fn verifier(&self) -> [u8; VERIFIER_LEN] {
        self.verifier
    }
}

/// Derives WinZip AES key material from a password and salt.
///
/// Runs PBKDF2-HMAC-SHA1 with [`KDF_ITERATIONS`] rounds, producing
/// `2 * key_len + 2` bytes split into cipher key, HMAC key, and verifier.
///
/// # Errors
///
/// Returns [`Error::KeyDerivationFailure`] if the salt length does not
/// match the strength's required length.
pub fn derive_key_material(
    password: &Password,
    salt: &[u8],
    strength: AesStrength,
) -> Result<KeyMaterial> {
    if salt.len() != strength.salt_len() {
        return Err(Error::KeyDerivationFailure(format!(
            "salt must be {} bytes for {:?}, got {}",
            strength.salt_len(),
            strength,
            salt.len()
        )));
    }

    let key_len = strength.key_len();
    let mut derived = Zeroizing::new(vec![0u8; 2 * key_len + VERIFIER_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, KDF_ITERATIONS, &mut derived);

    let mut verifier = [0u8; VERIFIER_LEN];
    verifier.copy_from_slice(&derived[2 * key_len..]);

    Ok(KeyMaterial {
        cipher_key: Zeroizing::new(derived[..key_len].to_vec()),
        hmac_key: Zeroizing::new(derived[key_len..2 * key_len].to_vec()),
        verifier,
    })
}

/// CTR-mode cipher over the selected key strength.
enum CtrCipher {
    Aes128(Box<Aes128Ctr>),
    Aes192(Box<Aes192Ctr>),
    Aes256(Box<Aes256Ctr>),
}

impl CtrCipher {
    fn init(key: &[u8], strength: AesStrength) -> Result<Self> {
        // WinZip's counter is little-endian and starts at 1.
        let mut iv = [0u8; 16];
        iv[0] = 1;

        let invalid =
            |e: aes::cipher::InvalidLength| Error::KeyDerivationFailure(e.to_string());

        Ok(match strength {
            AesStrength::Aes128 => {
                Self::Aes128(Box::new(Aes128Ctr::new_from_slices(key, &iv).map_err(invalid)?))
            }
            AesStrength::Aes192 => {
                Self::Aes192(Box::new(Aes192Ctr::new_from_slices(key, &iv).map_err(invalid)?))
            }
            AesStrength::Aes256 => {
                Self::Aes256(Box::new(Aes256Ctr::new_from_slices(key, &iv).map_err(invalid)?))
            }
        })
    }

    fn apply_keystream(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.apply_keystream(buf),
            Self::Aes192(c) => c.apply_keystream(buf),
            Self::Aes256(c) => c.apply_keystream(buf),
        }
    }
}

/// An authenticated encryption stream for one archive entry.
///
/// Created by the writer when an entry begins; fed plaintext block by
/// block; consumed by [`finalize`][Self::finalize], which yields the
/// authentication code. The keystream position carries across calls, so
/// callers may submit blocks of any size.
pub struct CipherStream {
    cipher: CtrCipher,
    hmac: HmacSha1,
    salt: Vec<u8>,
    verifier: [u8; VERIFIER_LEN],
    strength: AesStrength,
    bytes_processed: u64,
}

impl CipherStream {
    /// Creates a cipher stream with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyDerivationFailure`] if the system random
    /// source fails.
    pub fn new(password: &Password, strength: AesStrength) -> Result<Self> {
        let mut salt = vec![0u8; strength.salt_len()];
        getrandom::getrandom(&mut salt)
            .map_err(|e| Error::KeyDerivationFailure(format!("random salt: {e}")))?;
        Self::with_salt(password, strength, &salt)
    }

    /// Creates a cipher stream with an explicit salt.
    ///
    /// Reusing a salt across archives reuses keystream; this constructor
    /// exists for deterministic tests and for companion readers, not for
    /// production writing.
    pub fn with_salt(password: &Password, strength: AesStrength, salt: &[u8]) -> Result<Self> {
        let material = derive_key_material(password, salt, strength)?;
        let cipher = CtrCipher::init(material.cipher_key(), strength)?;
        let hmac = HmacSha1::new_from_slice(material.hmac_key())
            .map_err(|e| Error::KeyDerivationFailure(e.to_string()))?;

        Ok(Self {
            cipher,
            hmac,
            salt: salt.to_vec(),
            verifier: material.verifier(),
            strength,
            bytes_processed: 0,
        })
    }

    /// The per-stream salt, stored in the archive before the ciphertext.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// The 2-byte password verifier.
    pub fn verifier(&self) -> [u8; VERIFIER_LEN] {
        self.verifier
    }

    /// The key strength of this stream.
    pub fn strength(&self) -> AesStrength {
        self.strength
    }

    /// Encrypts one block in place and feeds it to the authentication tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterExhausted`] if encrypting the block would
    /// push the stream past [`MAX_CTR_BLOCKS`]; the buffer is untouched in
    /// that case.
    pub fn encrypt_block(&mut self, buf: &mut [u8]) -> Result<()> {
        let total = self
            .bytes_processed
            .checked_add(buf.len() as u64)
            .ok_or(Error::CounterExhausted)?;
        if total.div_ceil(AES_BLOCK_SIZE) > MAX_CTR_BLOCKS {
            return Err(Error::CounterExhausted);
        }

        self.cipher.apply_keystream(buf);
        self.hmac.update(buf);
        self.bytes_processed = total;
        Ok(())
    }

    /// Consumes the stream and returns the truncated authentication code.
    pub fn finalize(self) -> [u8; AUTH_CODE_LEN] {
        let full = self.hmac.finalize().into_bytes();
        let mut code = [0u8; AUTH_CODE_LEN];
        code.copy_from_slice(&full[..AUTH_CODE_LEN]);
        code
    }
}
