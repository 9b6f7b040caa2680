//! Extraction of gzip-compressed ustar archives.
//!
//! Unpacking happens in two phases: the gzip stream is decoded completely into
//! memory ([`decompress`]), then the buffer is walked entry by entry and each
//! entry is written below the output directory ([`extract`]).  The tar layer
//! is hand-written and understands only what extraction needs: the entry name
//! and the octal size field of each 512-byte header block.
//!
//! ```no_run
//! # async fn run() -> untargz::Result<()> {
//! use std::path::Path;
//! use indicatif::ProgressBar;
//! use untargz::{unpack, ExtractOptions};
//!
//! let summary = unpack(
//!     Path::new("site.tar.gz"),
//!     Path::new("/srv/www"),
//!     &ExtractOptions::default(),
//!     &ProgressBar::hidden(),
//! )
//! .await?;
//! println!("{} files", summary.files);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod decompress;
pub mod error;
pub mod extract;
pub mod header;
pub mod reader;


use std::path::Path;

use indicatif::ProgressBar;
use log::info;

pub use batch::{unpack_all, BatchReport, OnError};
pub use decompress::{decompress, decompress_file};
pub use error::{Error, Result};
pub use extract::{extract, ExtractOptions, ExtractSummary};
pub use reader::{ArchiveReader, Entry};

/// Decompresses the `.tar.gz` at `source` and unpacks it into `output`.
pub async fn unpack(
    source: &Path,
    output: &Path,
    options: &ExtractOptions,
    progress: &ProgressBar,
) -> Result<ExtractSummary> {
    let archive = decompress_file(source, progress).await?;
    let summary = extract(&archive, output, options)?;
    info!(
        "{}: {} files, {} directories, {} bytes",
        source.display(),
        summary.files,
        summary.directories,
        summary.bytes
    );
    Ok(summary)
}
