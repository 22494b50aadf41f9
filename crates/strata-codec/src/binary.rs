//! Framed binary container for [`Record`].
//!
//! ```text
//! 0..4    magic  b"STRG"
//! 4..8    format version (u32 LE)
//! 8..12   CRC32 of the body (u32 LE)
//! 12..16  body length (u32 LE)
//! 16..    postcard-encoded Record
//! ```

use crate::encoded::Record;

pub const MAGIC: [u8; 4] = *b"STRG";
pub const VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("container truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("not a Strata record (magic {0:02x?})")]
    BadMagic([u8; 4]),

    #[error("unsupported format version {0} (expected {VERSION})")]
    UnsupportedVersion(u32),

    #[error("checksum mismatch: header {expected:#010x}, body {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("body too large for the container ({0} bytes)")]
    TooLarge(usize),

    #[error("postcard: {0}")]
    Postcard(#[from] postcard::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    magic: [u8; 4],
    version: u32,
    checksum: u32,
    body_len: u32,
}

impl Header {
    fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let word =
            |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: word(4),
            checksum: word(8),
            body_len: word(12),
        }
    }

    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.body_len.to_le_bytes());
        bytes
    }
}

impl Record {
    pub fn to_binary(&self) -> Result<Vec<u8>, FormatError> {
        let body = postcard::to_allocvec(self)?;
        let body_len = u32::try_from(body.len()).map_err(|_| FormatError::TooLarge(body.len()))?;
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            checksum: crc32fast::hash(&body),
            body_len,
        };

        let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, FormatError> {
        let Some((head, body)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(FormatError::Truncated {
                expected: HEADER_SIZE,
                found: bytes.len(),
            });
        };
        let header = Header::from_bytes(head);

        if header.magic != MAGIC {
            return Err(FormatError::BadMagic(header.magic));
        }
        if header.version != VERSION {
            return Err(FormatError::UnsupportedVersion(header.version));
        }
        let body_len = header.body_len as usize;
        let Some(body) = body.get(..body_len) else {
            return Err(FormatError::Truncated {
                expected: HEADER_SIZE + body_len,
                found: bytes.len(),
            });
        };
        let actual = crc32fast::hash(body);
        if actual != header.checksum {
            return Err(FormatError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok(postcard::from_bytes(body)?)
    }
}
