//! ZIP container record encoding.
//!
//! Byte-level encoding of the three record types the writer emits: local
//! file headers, central directory headers, and the end-of-central-directory
//! record. All multi-byte fields are little-endian per APPNOTE.TXT.
//! Encrypted entries follow the WinZip AES layout: compression method 99,
//! the 0x9901 extra field carrying the real method, and (for AE-2) a zeroed
//! CRC-32 field.

use crate::timestamp::DosDateTime;

pub(crate) const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;
pub(crate) const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;
pub(crate) const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// General-purpose flag bit 0: entry is encrypted.
pub(crate) const FLAG_ENCRYPTED: u16 = 0x0001;
/// General-purpose flag bit 11: name is UTF-8.
pub(crate) const FLAG_UTF8: u16 = 0x0800;

/// Compression method id marking a WinZip AES entry.
pub(crate) const METHOD_AES: u16 = 99;

/// Extra field id of the WinZip AES header.
pub(crate) const AES_EXTRA_ID: u16 = 0x9901;
/// AE-2: header CRC-32 is zeroed.
pub(crate) const AES_VENDOR_VERSION: u16 = 2;
pub(crate) const AES_VENDOR_ID: [u8; 2] = *b"AE";

pub(crate) const VERSION_NEEDED_DEFAULT: u16 = 20;
pub(crate) const VERSION_NEEDED_AES: u16 = 51;
/// Unix host system, format spec 6.3.
pub(crate) const VERSION_MADE_BY: u16 = (3 << 8) | 63;

/// rw-r--r-- regular file, encoded in the Unix half of external attributes.
const UNIX_FILE_MODE: u32 = 0o100644;

/// Byte offset of the CRC-32 field within a local file header.
///
/// The CRC-32, compressed size, and uncompressed size fields are
/// contiguous, so one 12-byte patch at this offset rewrites all three.
pub(crate) const LOCAL_HEADER_SIZES_OFFSET: u64 = 14;

/// Everything needed to frame one entry and later index it from the
/// central directory.
#[derive(Debug, Clone)]
pub(crate) struct EntryRecord {
    pub name: String,
    pub flags: u16,
    /// Method id written in the headers (99 for encrypted entries).
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Offset of the local file header within the archive.
    pub header_offset: u64,
    pub dos: DosDateTime,
    pub aes: Option<AesExtra>,
}

/// Contents of the WinZip AES extra field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AesExtra {
    /// Strength marker: 1 = AES-128, 2 = AES-192, 3 = AES-256.
    pub strength: u8,
    /// The compression method applied before encryption.
    pub actual_method: u16,
}

impl AesExtra {
    /// Encoded length including the extra-field header.
    const ENCODED_LEN: u16 = 11;

    fn encode_into(&self, out: &mut Vec<u8>) {
        put_u16(out, AES_EXTRA_ID);
        put_u16(out, 7); // data size
        put_u16(out, AES_VENDOR_VERSION);
        out.extend_from_slice(&AES_VENDOR_ID);
        out.push(self.strength);
        put_u16(out, self.actual_method);
    }
}

impl EntryRecord {
    fn version_needed(&self) -> u16 {
        if self.aes.is_some() {
            VERSION_NEEDED_AES
        } else {
            VERSION_NEEDED_DEFAULT
        }
    }

    fn extra_len(&self) -> u16 {
        if self.aes.is_some() {
            AesExtra::ENCODED_LEN
        } else {
            0
        }
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Encodes the local file header for an entry.
///
/// Sizes must already fit 32 bits; unknown sizes are framed as
/// `0xFFFF_FFFF` placeholders by the caller and patched at finalize.
pub(crate) fn encode_local_header(record: &EntryRecord) -> Vec<u8> {
    let name = record.name.as_bytes();
    let mut out = Vec::with_capacity(30 + name.len() + record.extra_len() as usize);

    put_u32(&mut out, LOCAL_FILE_HEADER_SIG);
    put_u16(&mut out, record.version_needed());
    put_u16(&mut out, record.flags);
    put_u16(&mut out, record.method);
    put_u16(&mut out, record.dos.time());
    put_u16(&mut out, record.dos.date());
    put_u32(&mut out, record.crc32);
    put_u32(&mut out, record.compressed_size as u32);
    put_u32(&mut out, record.uncompressed_size as u32);
    put_u16(&mut out, name.len() as u16);
    put_u16(&mut out, record.extra_len());
    out.extend_from_slice(name);
    if let Some(aes) = &record.aes {
        aes.encode_into(&mut out);
    }

    out
}

/// Encodes the 12-byte CRC/compressed/uncompressed patch written back at
/// [`LOCAL_HEADER_SIZES_OFFSET`] when finalize learns the true values.
pub(crate) fn encode_sizes_patch(record: &EntryRecord) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[..4].copy_from_slice(&record.crc32.to_le_bytes());
    out[4..8].copy_from_slice(&(record.compressed_size as u32).to_le_bytes());
    out[8..].copy_from_slice(&(record.uncompressed_size as u32).to_le_bytes());
    out
}

/// Encodes the central directory for the given entries followed by the
/// end-of-central-directory record.
///
/// `directory_offset` is the archive offset at which this blob will be
/// written.
pub(crate) fn encode_central_directory(entries: &[EntryRecord], directory_offset: u64) -> Vec<u8> {
    let mut out = Vec::new();

    for record in entries {
        let name = record.name.as_bytes();
        put_u32(&mut out, CENTRAL_DIR_HEADER_SIG);
        put_u16(&mut out, VERSION_MADE_BY);
        put_u16(&mut out, record.version_needed());
        put_u16(&mut out, record.flags);
        put_u16(&mut out, record.method);
        put_u16(&mut out, record.dos.time());
        put_u16(&mut out, record.dos.date());
        put_u32(&mut out, record.crc32);
        put_u32(&mut out, record.compressed_size as u32);
        put_u32(&mut out, record.uncompressed_size as u32);
        put_u16(&mut out, name.len() as u16);
        put_u16(&mut out, record.extra_len());
        put_u16(&mut out, 0); // comment length
        put_u16(&mut out, 0); // disk number start
        put_u16(&mut out, 0); // internal attributes
        put_u32(&mut out, UNIX_FILE_MODE << 16);
        put_u32(&mut out, record.header_offset as u32);
        out.extend_from_slice(name);
        if let Some(aes) = &record.aes {
            aes.encode_into(&mut out);
        }
    }

    let directory_size = out.len() as u32;
    put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut out, 0); // disk number
    put_u16(&mut out, 0); // directory start disk
    put_u16(&mut out, entries.len() as u16);
    put_u16(&mut out, entries.len() as u16);
    put_u32(&mut out, directory_size);
    put_u32(&mut out, directory_offset as u32);
    put_u16(&mut out, 0); // comment length

    out
}
