//! Minimal ZIP / WinZip-AES reader used by the integration tests.
//!
//! Reading archives is not part of the crate's public surface, so this
//! harness implements just enough parsing and decryption to prove that
//! written archives round-trip: local file header parsing, end-of-central-
//! directory lookup, and AES-256 (AE-2) payload decryption with password
//! verifier and authentication code checks.

#![allow(dead_code)]

use aes::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;
type Aes256Ctr = ctr::Ctr128LE<aes::Aes256>;

pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

const AES_SALT_LEN: usize = 16;
const AES_VERIFIER_LEN: usize = 2;
const AES_AUTH_CODE_LEN: usize = 10;
const AES_KEY_LEN: usize = 32;

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// A parsed local file header plus the payload that follows it.
#[derive(Debug)]
pub struct LocalEntry {
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: String,
    pub aes: Option<AesExtraField>,
    /// Raw payload bytes (`compressed_size` of them).
    pub payload: Vec<u8>,
    /// Archive offset just past the payload.
    pub end_offset: usize,
}

/// The WinZip AES extra field (id 0x9901).
#[derive(Debug, Clone, Copy)]
pub struct AesExtraField {
    pub vendor_version: u16,
    pub strength: u8,
    pub actual_method: u16,
}

/// Parses the local file header at `offset` and slices out its payload.
pub fn parse_local_entry(archive: &[u8], offset: usize) -> LocalEntry {
    let h = &archive[offset..];
    assert_eq!(u32_at(h, 0), LOCAL_FILE_HEADER_SIG, "bad local header signature");

    let name_len = u16_at(h, 26) as usize;
    let extra_len = u16_at(h, 28) as usize;
    let name = String::from_utf8(h[30..30 + name_len].to_vec()).expect("entry name not UTF-8");

    let mut aes = None;
    let extra = &h[30 + name_len..30 + name_len + extra_len];
    let mut pos = 0;
    while pos + 4 <= extra.len() {
        let id = u16_at(extra, pos);
        let size = u16_at(extra, pos + 2) as usize;
        if id == 0x9901 {
            assert_eq!(size, 7, "AES extra field data size");
            aes = Some(AesExtraField {
                vendor_version: u16_at(extra, pos + 4),
                strength: extra[pos + 8],
                actual_method: u16_at(extra, pos + 9),
            });
            assert_eq!(&extra[pos + 6..pos + 8], b"AE");
        }
        pos += 4 + size;
    }

    let compressed_size = u32_at(h, 18);
    let data_start = offset + 30 + name_len + extra_len;
    let data_end = data_start + compressed_size as usize;

    LocalEntry {
        version_needed: u16_at(h, 4),
        flags: u16_at(h, 6),
        method: u16_at(h, 8),
        crc32: u32_at(h, 14),
        compressed_size,
        uncompressed_size: u32_at(h, 22),
        name,
        aes,
        payload: archive[data_start..data_end].to_vec(),
        end_offset: data_end,
    }
}

/// The end-of-central-directory record.
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub entries_total: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
}

/// Locates and parses the end-of-central-directory record.
pub fn parse_eocd(archive: &[u8]) -> EndOfCentralDirectory {
    // No archive comment is ever written, so the record is the last 22 bytes.
    let e = &archive[archive.len() - 22..];
    assert_eq!(u32_at(e, 0), END_OF_CENTRAL_DIR_SIG, "bad EOCD signature");
    EndOfCentralDirectory {
        entries_total: u16_at(e, 10),
        directory_size: u32_at(e, 12),
        directory_offset: u32_at(e, 16),
    }
}

/// Returns the entry name recorded in the first central directory header.
pub fn central_directory_name(archive: &[u8]) -> String {
    let eocd = parse_eocd(archive);
    let cd = &archive[eocd.directory_offset as usize..];
    assert_eq!(u32_at(cd, 0), CENTRAL_DIR_HEADER_SIG, "bad central header signature");
    let name_len = u16_at(cd, 28) as usize;
    String::from_utf8(cd[46..46 + name_len].to_vec()).unwrap()
}

/// Decrypts an AES-256 (AE-2) entry payload.
///
/// Checks the password verifier first and the authentication code before
/// returning plaintext; a wrong password or tampered ciphertext yields an
/// error, never silent garbage.
pub fn decrypt_aes256(entry: &LocalEntry, password: &str) -> Result<Vec<u8>, String> {
    let aes = entry.aes.as_ref().ok_or("entry is not AES encrypted")?;
    assert_eq!(aes.strength, 3, "test reader only supports AES-256");

    let payload = &entry.payload;
    if payload.len() < AES_SALT_LEN + AES_VERIFIER_LEN + AES_AUTH_CODE_LEN {
        return Err("payload too short".into());
    }

    let salt = &payload[..AES_SALT_LEN];
    let verifier = &payload[AES_SALT_LEN..AES_SALT_LEN + AES_VERIFIER_LEN];
    let ciphertext = &payload[AES_SALT_LEN + AES_VERIFIER_LEN..payload.len() - AES_AUTH_CODE_LEN];
    let auth_code = &payload[payload.len() - AES_AUTH_CODE_LEN..];

    let mut derived = [0u8; 2 * AES_KEY_LEN + AES_VERIFIER_LEN];
    pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, 1000, &mut derived);

    if &derived[2 * AES_KEY_LEN..] != verifier {
        return Err("password verifier mismatch".into());
    }

    let mut hmac = <HmacSha1 as Mac>::new_from_slice(&derived[AES_KEY_LEN..2 * AES_KEY_LEN])
        .expect("hmac key");
    hmac.update(ciphertext);
    let tag = hmac.finalize().into_bytes();
    if &tag[..AES_AUTH_CODE_LEN] != auth_code {
        return Err("authentication code mismatch".into());
    }

    let mut iv = [0u8; 16];
    iv[0] = 1;
    let mut cipher =
        Aes256Ctr::new_from_slices(&derived[..AES_KEY_LEN], &iv).expect("cipher init");
    let mut plain = ciphertext.to_vec();
    cipher.apply_keystream(&mut plain);
    Ok(plain)
}

/// Decrypts and, when the actual method is deflate, decompresses.
pub fn extract_aes256(entry: &LocalEntry, password: &str) -> Result<Vec<u8>, String> {
    let data = decrypt_aes256(entry, password)?;
    match entry.aes.map(|aes| aes.actual_method) {
        Some(8) => inflate(&data).map_err(|e| e.to_string()),
        _ => Ok(data),
    }
}

/// Inflates a raw deflate stream.
pub fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}
