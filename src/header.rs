//! The ustar header record.
//!
//! Every entry in a ustar archive starts with a 512-byte header block:
//!
//! | Offset | Size | Field     | Interpreted |
//! |--------|------|-----------|-------------|
//! | 0      | 100  | name      | yes         |
//! | 100    | 8    | mode      | no          |
//! | 108    | 8    | uid       | no          |
//! | 116    | 8    | gid       | no          |
//! | 124    | 12   | size      | yes         |
//! | 136    | 12   | mtime     | no          |
//! | 148    | 8    | checksum  | no          |
//! | 156    | 1    | typeflag  | no          |
//! | 157    | 100  | linkname  | no          |
//! | 257    | 6    | magic     | no          |
//! | 263    | 2    | version   | no          |
//! | 265    | 32   | uname     | no          |
//! | 297    | 32   | gname     | no          |
//! | 329    | 8    | devmajor  | no          |
//! | 337    | 8    | devminor  | no          |
//! | 345    | 155  | prefix    | no          |
//!
//! Only the name and the content size matter for extraction.  The other
//! fields are carried in the struct so that the layout is spelled out in one
//! place rather than in scattered offset arithmetic.

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a tar header block (and of every block in the archive).
pub const HEADER_SIZE: usize = 512;

/// Length of the name field.
pub const NAME_SIZE: usize = 100;

/// Errors from decoding individual header fields.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// An octal field is empty, contains characters other than digits 0-7, or overflows.
    #[error("invalid octal field: {:?}", String::from_utf8_lossy(.0))]
    InvalidOctal(Vec<u8>),
}

/// A ustar header block with named fields.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct UstarHeader {
    /// Entry path (null-terminated if shorter than 100 bytes).
    pub name: [u8; 100],
    pub mode: [u8; 8],
    pub uid: [u8; 8],
    pub gid: [u8; 8],
    /// Content length in octal ASCII.
    pub size: [u8; 12],
    pub mtime: [u8; 12],
    pub checksum: [u8; 8],
    pub typeflag: u8,
    pub linkname: [u8; 100],
    pub magic: [u8; 6],
    pub version: [u8; 2],
    pub uname: [u8; 32],
    pub gname: [u8; 32],
    pub devmajor: [u8; 8],
    pub devminor: [u8; 8],
    pub prefix: [u8; 155],
    pub pad: [u8; 12],
}

impl UstarHeader {
    /// Views the first [`HEADER_SIZE`] bytes of `bytes` as a header.
    ///
    /// Returns `None` if the slice is too short.
    pub fn from_prefix(bytes: &[u8]) -> Option<&UstarHeader> {
        UstarHeader::ref_from_prefix(bytes)
            .ok()
            .map(|(header, _rest)| header)
    }

    /// The entry name with NUL padding and trailing whitespace removed.
    pub fn name_bytes(&self) -> &[u8] {
        trim_name(&self.name)
    }

    /// True if this header marks the end of the archive.
    pub fn is_end_of_archive(&self) -> bool {
        is_sentinel_name(&self.name)
    }

    /// The content length declared by the size field.
    pub fn entry_size(&self) -> Result<u64, HeaderError> {
        parse_octal(&self.size)
    }
}

impl fmt::Debug for UstarHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UstarHeader")
            .field("name", &String::from_utf8_lossy(self.name_bytes()))
            .field("size", &self.entry_size().ok())
            .field("typeflag", &self.typeflag)
            .finish_non_exhaustive()
    }
}

/// Parse an octal ASCII field into a u64.
///
/// NULs and ASCII whitespace are trimmed from both ends, so both
/// `"0000644\0"` and `"     123 "` are accepted.  What remains must be a
/// non-empty run of octal digits.
pub fn parse_octal(bytes: &[u8]) -> Result<u64, HeaderError> {
    let is_padding = |b: &u8| *b == b'\0' || b.is_ascii_whitespace();
    let start = bytes
        .iter()
        .position(|b| !is_padding(b))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !is_padding(b))
        .map_or(start, |i| i + 1);

    let digits = &bytes[start..end];
    if digits.is_empty() {
        return Err(HeaderError::InvalidOctal(bytes.to_vec()));
    }

    let mut value: u64 = 0;
    for &byte in digits {
        if !(b'0'..=b'7').contains(&byte) {
            return Err(HeaderError::InvalidOctal(bytes.to_vec()));
        }
        value = value
            .checked_mul(8)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or_else(|| HeaderError::InvalidOctal(bytes.to_vec()))?;
    }

    Ok(value)
}

/// Truncate a byte slice at the first null byte.
pub(crate) fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

/// Trims a raw name field: NUL padding, then trailing whitespace.
pub(crate) fn trim_name(field: &[u8]) -> &[u8] {
    truncate_null(field).trim_ascii_end()
}

/// An empty or all-whitespace name field ends the archive.
///
/// `field` may be shorter than [`NAME_SIZE`] when the stream is truncated.
pub(crate) fn is_sentinel_name(field: &[u8]) -> bool {
    trim_name(field).trim_ascii().is_empty()
}
