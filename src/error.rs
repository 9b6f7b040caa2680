//! Error types for archive extraction.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::header::HeaderError;

/// Errors that can occur while unpacking an archive.
///
/// Every error is terminal for the archive being processed.  Entries written
/// before the failure stay on disk.
#[derive(Debug, Error)]
pub enum Error {
    /// The source archive could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The gzip stream is malformed or could not be read.
    #[error("gzip decompression failed: {0}")]
    Decompression(#[source] std::io::Error),

    /// A header field could not be decoded.
    #[error("bad header at offset {offset}: {source}")]
    Parse { offset: u64, source: HeaderError },

    /// The archive ended inside a header or an entry's content.
    #[error("unexpected end of archive at offset {pos}")]
    UnexpectedEof { pos: u64 },

    /// An entry name would place its target outside the output directory.
    #[error("refusing to unpack {0:?} outside of the output directory")]
    UnsafePath(String),

    /// A filesystem operation on an output path failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the path being operated on to an I/O error.
pub(crate) trait IoContext<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
