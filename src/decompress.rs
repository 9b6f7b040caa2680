//! Buffering gzip decompression.
//!
//! The tar reader works on a complete in-memory buffer, so the gzip stream is
//! decoded to the end before any entry is looked at.

use std::path::Path;

use async_compression::tokio::bufread::GzipDecoder;
use indicatif::ProgressBar;
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};

use crate::error::{Error, Result};

/// Decodes an entire gzip stream into memory.
///
/// Concatenated gzip members are decoded back to back, as `gunzip` does.
pub async fn decompress(reader: impl AsyncBufRead + Unpin) -> Result<Vec<u8>> {
    let mut decoder = GzipDecoder::new(reader);
    decoder.multiple_members(true);

    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .await
        .map_err(Error::Decompression)?;
    Ok(data)
}

/// Opens `path` and decodes it into memory, reporting compressed bytes read
/// on `progress`.
pub async fn decompress_file(path: &Path, progress: &ProgressBar) -> Result<Vec<u8>> {
    let source_not_found = |source: std::io::Error| Error::SourceNotFound {
        path: path.to_path_buf(),
        source,
    };
    let file = tokio::fs::File::open(path)
        .await
        .map_err(source_not_found)?;
    let len = file.metadata().await.map_err(source_not_found)?.len();

    progress.set_length(len);
    progress.set_position(0);
    let data = decompress(BufReader::new(progress.wrap_async_read(file))).await?;
    progress.finish();
    Ok(data)
}
