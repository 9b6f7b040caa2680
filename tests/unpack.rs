use std::{
    collections::BTreeMap,
    fs::{create_dir_all, read, read_dir, write},
    path::{Path, PathBuf},
};

use async_compression::tokio::write::GzipEncoder;
use indicatif::ProgressBar;
use similar_asserts::assert_eq;
use tempfile::tempdir;
use tokio::io::AsyncWriteExt;

use untargz::{decompress, unpack, ArchiveReader, Error, ExtractOptions};

/// Relative path → contents (`None` for directories) of everything below `root`.
fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                walk(root, &path, out);
            } else {
                out.insert(rel, Some(read(&path).unwrap()));
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

/// Packs `root` into a ustar archive, directories first and with a trailing
/// slash so that they are recognised by name alone.
fn pack_tree(root: &Path) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let mut builder = tar::Builder::new(&mut data);
        for (rel, contents) in snapshot_tree(root) {
            let mut header = tar::Header::new_ustar();
            let name = rel.to_str().unwrap();
            match contents {
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder
                        .append_data(&mut header, format!("{name}/"), std::io::empty())
                        .unwrap();
                }
                Some(contents) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_mode(0o644);
                    header.set_size(contents.len() as u64);
                    builder
                        .append_data(&mut header, name, &contents[..])
                        .unwrap();
                }
            }
        }
        builder.finish().unwrap();
    }
    data
}

// Same as the crate's unit-test helper, which is not visible from here.
async fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzipEncoder::new(Vec::new());
    encoder.write_all(data).await.unwrap();
    encoder.shutdown().await.unwrap();
    encoder.into_inner()
}

fn populate(root: &Path) {
    create_dir_all(root.join("dir/sub")).unwrap();
    create_dir_all(root.join("dir/empty")).unwrap();
    write(root.join("a.txt"), b"alpha\n").unwrap();
    write(root.join("dir/sub/file.txt"), b"nested file").unwrap();
    write(root.join("dir/exact.bin"), vec![0xaa_u8; 1024]).unwrap();
    write(root.join("zero"), b"").unwrap();
    let big: Vec<u8> = (0..100_000u32).map(|i| (i * 7 % 251) as u8).collect();
    write(root.join("dir/big.bin"), big).unwrap();
}

async fn unpack_default(source: &Path, output: &Path) -> untargz::Result<untargz::ExtractSummary> {
    unpack(
        source,
        output,
        &ExtractOptions::default(),
        &ProgressBar::hidden(),
    )
    .await
}

#[tokio::test]
async fn test_round_trip() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    populate(&src);
    let archive = tmp.path().join("tree.tar.gz");
    write(&archive, gzip(&pack_tree(&src)).await).unwrap();

    let out = tmp.path().join("out");
    let summary = unpack_default(&archive, &out).await.unwrap();

    assert_eq!(summary.files, 5);
    assert_eq!(summary.directories, 3);
    assert_eq!(summary.bytes, 6 + 11 + 1024 + 100_000);
    assert_eq!(snapshot_tree(&out), snapshot_tree(&src));
}

#[tokio::test]
async fn test_idempotent() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    populate(&src);
    let archive = tmp.path().join("tree.tar.gz");
    write(&archive, gzip(&pack_tree(&src)).await).unwrap();
    let out = tmp.path().join("out");

    unpack_default(&archive, &out).await.unwrap();
    let first = snapshot_tree(&out);
    unpack_default(&archive, &out).await.unwrap();
    assert_eq!(snapshot_tree(&out), first);
}

#[tokio::test]
async fn test_missing_source() {
    let tmp = tempdir().unwrap();
    let err = unpack_default(&tmp.path().join("nope.tar.gz"), tmp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SourceNotFound { .. }), "{err}");
}

#[tokio::test]
async fn test_corrupt_gzip() {
    let tmp = tempdir().unwrap();
    let archive = tmp.path().join("broken.tar.gz");
    let mut compressed = gzip(&pack_tree(tmp.path())).await;
    compressed[0] ^= 0xff;
    write(&archive, compressed).unwrap();

    let err = unpack_default(&archive, &tmp.path().join("out"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decompression(_)), "{err}");
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn test_listing() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    populate(&src);
    let compressed = gzip(&pack_tree(&src)).await;

    let data = decompress(&compressed[..]).await.unwrap();
    let listing: Vec<String> = ArchiveReader::new(&data)
        .map(|entry| entry.unwrap().to_string())
        .collect();

    assert_eq!(
        listing,
        vec![
            "           6 a.txt",
            "           0 dir/",
            "      100000 dir/big.bin",
            "           0 dir/empty/",
            "        1024 dir/exact.bin",
            "           0 dir/sub/",
            "          11 dir/sub/file.txt",
            "           0 zero",
        ]
    );
}
