//! Forward-only cursor over a decompressed tar buffer.

use std::{borrow::Cow, fmt};

use crate::{
    error::{Error, Result},
    header::{is_sentinel_name, UstarHeader, HEADER_SIZE, NAME_SIZE},
};

/// One archive entry: its header fields and a borrow of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Entry name, trimmed of NUL padding and trailing whitespace.
    pub name: &'a [u8],
    /// Declared content length.
    pub size: u64,
    /// Position of the header block in the archive.
    pub offset: u64,
    /// The `size` content bytes following the header; empty for directories.
    pub content: &'a [u8],
}

impl Entry<'_> {
    /// A trailing `/` marks a directory entry.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with(b"/")
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name)
    }
}

/// One listing line: the size right-aligned, then the name.
impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12} {}", self.size, self.name_lossy())
    }
}

/// Number of bytes needed to advance `position` to the next block boundary.
///
/// A position that is already aligned needs no padding.
pub fn padding_for(position: u64) -> u64 {
    let block = HEADER_SIZE as u64;
    match block - position % block {
        padding if padding == block => 0,
        padding => padding,
    }
}

/// Walks the entries of a ustar archive held in memory.
///
/// The reader never moves backwards.  It stops at the first header whose
/// name field is empty, or when the buffer ends on a header boundary; the
/// formal pair of zero blocks is not required.
#[derive(Debug)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            done: false,
        }
    }

    /// Current position in the archive.
    pub fn offset(&self) -> u64 {
        self.pos as u64
    }

    /// Reads the next header and its content, then skips to the next block.
    ///
    /// Returns `Ok(None)` at the end of the archive.
    pub fn next_entry(&mut self) -> Result<Option<Entry<'a>>> {
        if self.done {
            return Ok(None);
        }

        let data = self.data;
        let rest = &data[self.pos..];
        if is_sentinel_name(&rest[..rest.len().min(NAME_SIZE)]) {
            self.done = true;
            return Ok(None);
        }

        let offset = self.offset();
        let header = UstarHeader::from_prefix(rest).ok_or(Error::UnexpectedEof {
            pos: data.len() as u64,
        })?;
        let size = header
            .entry_size()
            .map_err(|source| Error::Parse { offset, source })?;

        // Directory entries carry no content, whatever their size field says.
        let name = header.name_bytes();
        let start = self.pos + HEADER_SIZE;
        let end = if name.ends_with(b"/") {
            start
        } else {
            usize::try_from(size)
                .ok()
                .and_then(|len| start.checked_add(len))
                .filter(|&end| end <= data.len())
                .ok_or(Error::UnexpectedEof {
                    pos: data.len() as u64,
                })?
        };

        let entry = Entry {
            name,
            size,
            offset,
            content: &data[start..end],
        };

        // Padding may be cut short at the very end; the next read then sees
        // a clean end of stream.
        let padding = padding_for(end as u64) as usize;
        self.pos = end.saturating_add(padding).min(data.len());

        Ok(Some(entry))
    }
}

impl<'a> Iterator for ArchiveReader<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next_entry();
        if next.is_err() {
            self.done = true;
        }
        next.transpose()
    }
}
