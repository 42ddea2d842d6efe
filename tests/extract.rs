//! Archive extraction across compression formats.

mod common;

use common::*;
use gig::error::AcquireError;
use gig::extract::{ExtractSummary, extract, unpack_source};
use gig::layout::StorageLayout;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_directory_and_file_with_mode() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("d.tar.gz");
    std::fs::write(
        &archive,
        tar_gz(&[Member::Dir("d/"), Member::File("d/f.txt", 0o644, b"hi")]),
    )
    .unwrap();

    let dest = temp.path().join("out");
    let summary = extract(&archive, &dest).unwrap();
    assert_eq!(
        summary,
        ExtractSummary {
            directories: 1,
            files: 1,
            skipped: 0
        }
    );
    assert!(dest.join("d").is_dir());
    assert_eq!(std::fs::read_to_string(dest.join("d/f.txt")).unwrap(), "hi");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(dest.join("d/f.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

#[test]
fn test_each_compression_format() {
    let data = [9u8; 5000];
    let members = [Member::File("pkg/data.bin", 0o600, &data[..])];
    let plain = tar(&members);

    let xz = {
        let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
        enc.write_all(&plain).unwrap();
        enc.finish().unwrap()
    };
    let bz2 = {
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(&plain).unwrap();
        enc.finish().unwrap()
    };
    let zst = zstd::encode_all(&plain[..], 0).unwrap();

    let temp = TempDir::new().unwrap();
    let cases = [
        ("p.tar", plain.clone()),
        ("p.tgz", tar_gz(&members)),
        ("p.tar.xz", xz),
        ("p.tar.bz2", bz2),
        ("p.tar.zst", zst),
    ];
    for (name, bytes) in cases {
        let archive = temp.path().join(name);
        std::fs::write(&archive, bytes).unwrap();
        let dest = temp.path().join(format!("out-{}", name));
        let summary = extract(&archive, &dest).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert_eq!(summary.files, 1, "{}", name);
        assert_eq!(
            std::fs::read(dest.join("pkg/data.bin")).unwrap(),
            vec![9u8; 5000],
            "{}",
            name
        );
    }
}

#[test]
fn test_wrong_suffix_is_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("mislabeled.tar.xz");
    std::fs::write(&archive, tar_gz(&[Member::File("a", 0o644, b"a")])).unwrap();

    let err = extract(&archive, &temp.path().join("out")).unwrap_err();
    assert!(matches!(err, AcquireError::UnsupportedFormat { .. }));
}

#[test]
fn test_corrupt_gzip_body_is_extraction_error() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.tar.gz");
    let body = noise(200_000);
    let mut bytes = tar_gz(&[
        Member::File("a", 0o644, b"first entry"),
        Member::File("b", 0o644, &body[..]),
    ]);
    // The first entry decodes; the stream breaks inside the second.
    bytes.truncate(bytes.len() * 7 / 10);
    std::fs::write(&archive, bytes).unwrap();

    let dest = temp.path().join("out");
    let err = extract(&archive, &dest).unwrap_err();
    assert!(matches!(err, AcquireError::Extraction { .. }), "{:?}", err);
    assert_eq!(std::fs::read(dest.join("a")).unwrap(), b"first entry");
}

#[test]
fn test_corrupt_gzip_before_first_entry_is_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.tar.gz");
    let zeros = [0u8; 10_000];
    let mut bytes = tar_gz(&[Member::File("a", 0o644, &zeros[..])]);
    // Keep the gzip header and two bytes of deflate data.
    bytes.truncate(12);
    std::fs::write(&archive, bytes).unwrap();

    let err = extract(&archive, &temp.path().join("out")).unwrap_err();
    assert!(matches!(err, AcquireError::UnsupportedFormat { .. }), "{:?}", err);
}

/// Bytes gzip cannot shrink.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

#[test]
fn test_unpack_source_uses_archive_stem() {
    let temp = TempDir::new().unwrap();
    let layout = StorageLayout::with_dirs(temp.path(), "cache", "sources");
    std::fs::create_dir_all(layout.archives_dir()).unwrap();
    let archive = layout.archives_dir().join("hello-2.12.tar.gz");
    std::fs::write(
        &archive,
        tar_gz(&[Member::File("hello-2.12/configure", 0o755, b"#!/bin/sh\n")]),
    )
    .unwrap();

    let dir = unpack_source(&archive, &layout, false).unwrap();
    assert_eq!(dir, temp.path().join("sources/hello-2.12"));
    assert!(dir.join("hello-2.12/configure").is_file());
}
