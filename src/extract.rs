//! Materializing archive entries on disk.

use std::{
    ffi::OsStr,
    fs::{create_dir_all, write},
    os::unix::ffi::OsStrExt,
    path::{Component, Path},
};

use log::{debug, warn};

use crate::{
    error::{Error, IoContext, Result},
    reader::{ArchiveReader, Entry},
};

/// Options controlling how entries are written.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Join entry names onto the output directory verbatim, even when they
    /// contain `..` or start at the filesystem root.
    pub allow_unsafe_paths: bool,
}

/// What a successful extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    /// Total content bytes written to regular files.
    pub bytes: u64,
}

impl std::ops::AddAssign for ExtractSummary {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.directories += other.directories;
        self.bytes += other.bytes;
    }
}

/// Unpacks a decompressed ustar archive into `output`.
///
/// Entries are written in archive order.  Parent directories are created as
/// needed and existing files are truncated and overwritten.  The first error
/// aborts the extraction; whatever was written before it stays in place.
pub fn extract(
    archive: &[u8],
    output: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let output = output.as_ref();
    let mut summary = ExtractSummary::default();

    for entry in ArchiveReader::new(archive) {
        let entry = entry?;
        let target = output.join(entry_path(&entry, options)?);

        if entry.is_dir() {
            if entry.size != 0 {
                warn!(
                    "directory entry {:?} declares {} content bytes, ignoring them",
                    entry.name_lossy(),
                    entry.size
                );
            }
            debug!("mkdir {}", target.display());
            create_dir_all(&target).at_path(&target)?;
            summary.directories += 1;
        } else {
            if let Some(parent) = target.parent() {
                create_dir_all(parent).at_path(parent)?;
            }
            debug!("{} ({} bytes)", target.display(), entry.size);
            write(&target, entry.content).at_path(&target)?;
            summary.files += 1;
            summary.bytes += entry.size;
        }
    }

    Ok(summary)
}

fn entry_path<'a>(entry: &Entry<'a>, options: &ExtractOptions) -> Result<&'a Path> {
    let path = Path::new(OsStr::from_bytes(entry.name));
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes && !options.allow_unsafe_paths {
        return Err(Error::UnsafePath(entry.name_lossy().into_owned()));
    }
    Ok(path)
}
