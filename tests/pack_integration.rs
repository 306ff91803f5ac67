//! End-to-end packing tests
//!
//! Packs fixture trees with both layouts and checks the archive bytes with
//! an independent parser.

mod common;

use common::{extract_all, parse_archive, read_u64, write_tree};
use jvfs_rs::{
    pack, uncompressed_header_size, ArchiveLayout, CompressionLevel, EntryNaming, JvfsError,
    PackOptions, Packer,
};
use std::fs;
use tempfile::TempDir;

fn options(layout: ArchiveLayout) -> PackOptions {
    PackOptions {
        layout,
        ..Default::default()
    }
}

#[test]
fn test_v0_two_file_scenario() {
    let root = TempDir::new().unwrap();
    write_tree(root.path(), &[("a.txt", b"hello"), ("sub/b.bin", b"")]);
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("out.pkg");

    let report = pack(root.path(), &archive_path, &options(ArchiveLayout::V0)).unwrap();
    let bytes = fs::read(&archive_path).unwrap();
    let archive = parse_archive(&bytes);

    assert_eq!(&bytes[..9], b"JVFS0100\0");
    assert_eq!(read_u64(&bytes, 9), 2);
    assert_eq!(archive.entries.len(), 2);
    assert_eq!(archive.entries[0].name, "a.txt");
    assert_eq!(archive.entries[0].size, 5);
    assert_eq!(archive.entries[1].name, "sub/b.bin");
    assert_eq!(archive.entries[1].size, 0);

    assert_eq!(report.entry_count, 2);
    assert_eq!(report.original_size, 5);
    assert_eq!(report.archive_size, bytes.len() as u64);
    assert_eq!(report.header_size, archive.header_end);

    let extracted = extract_all(&bytes, &archive);
    assert_eq!(extracted[0].1, b"hello");
    assert!(extracted[1].1.is_empty());
}

#[test]
fn test_v1_offset_and_catalog() {
    let root = TempDir::new().unwrap();
    write_tree(
        root.path(),
        &[
            ("one.txt", b"first file"),
            ("dir/two.txt", b"second file"),
            ("dir/deeper/three.txt", b"third file"),
        ],
    );
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("out.pkg");

    let report = pack(root.path(), &archive_path, &options(ArchiveLayout::V1)).unwrap();
    let bytes = fs::read(&archive_path).unwrap();
    let archive = parse_archive(&bytes);

    assert_eq!(&bytes[..9], b"JVFS0101\0");
    let header_offset = read_u64(&bytes, 9);
    let last = archive.entries.last().unwrap();
    assert!(last.addr < header_offset);
    assert_eq!(archive.entries[0].addr, 17);

    let names: Vec<&str> = archive.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(read_u64(&bytes, header_offset as usize), uncompressed_header_size(&names, None));
    assert_eq!(report.header_size, archive.catalog_blob.len() as u64);
    assert!(report.compressed_header_size.is_some());

    for (name, content) in extract_all(&bytes, &archive) {
        assert_eq!(content, fs::read(root.path().join(&name)).unwrap());
    }
}

#[test]
fn test_offsets_strictly_increase() {
    let root = TempDir::new().unwrap();
    let files: Vec<(String, Vec<u8>)> = (0..25)
        .map(|i| (format!("d{}/f{}.dat", i % 5, i), vec![i as u8; i * 37]))
        .collect();
    let refs: Vec<(&str, &[u8])> = files.iter().map(|(n, c)| (n.as_str(), c.as_slice())).collect();
    write_tree(root.path(), &refs);
    let out = TempDir::new().unwrap();

    for layout in [ArchiveLayout::V0, ArchiveLayout::V1] {
        let archive_path = out.path().join(format!("{}.pkg", layout));
        pack(root.path(), &archive_path, &options(layout)).unwrap();
        let bytes = fs::read(&archive_path).unwrap();
        let archive = parse_archive(&bytes);

        assert_eq!(archive.entries.len(), 25);
        if layout == ArchiveLayout::V0 {
            assert!(archive.header_end <= archive.entries[0].addr);
        }
        for pair in archive.entries.windows(2) {
            assert!(pair[0].addr < pair[1].addr);
        }
        assert!(archive.entries.last().unwrap().addr < archive.bodies_end);
    }
}

#[test]
fn test_round_trip_large_and_binary_content() {
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let random: Vec<u8> = (0..100_000).map(|_| rng.gen()).collect();
    let text = b"lorem ipsum dolor sit amet ".repeat(10_000);

    let root = TempDir::new().unwrap();
    write_tree(
        root.path(),
        &[("random.bin", &random), ("text.txt", &text), ("empty", b"")],
    );
    let out = TempDir::new().unwrap();

    for layout in [ArchiveLayout::V0, ArchiveLayout::V1] {
        for level in [CompressionLevel::Default, CompressionLevel::Best] {
            let archive_path = out.path().join("rt.pkg");
            let opts = PackOptions {
                layout,
                level,
                ..Default::default()
            };
            pack(root.path(), &archive_path, &opts).unwrap();

            let bytes = fs::read(&archive_path).unwrap();
            let archive = parse_archive(&bytes);
            for ((name, content), entry) in extract_all(&bytes, &archive).iter().zip(&archive.entries) {
                let original = fs::read(root.path().join(name)).unwrap();
                assert_eq!(content.len() as u64, entry.size);
                assert_eq!(content, &original);
            }
        }
    }
}

#[test]
fn test_empty_root_fails_without_output() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("nothing-here")).unwrap();
    write_tree(root.path(), &[(".hidden", b"ignored")]);
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("out.pkg");

    let result = pack(root.path(), &archive_path, &PackOptions::default());
    assert!(matches!(result, Err(JvfsError::EmptyInput { .. })));
    assert!(!archive_path.exists());
}

#[test]
fn test_missing_root_is_traversal_failure() {
    let out = TempDir::new().unwrap();
    let result = pack(out.path().join("missing"), out.path().join("out.pkg"), &PackOptions::default());
    assert!(matches!(result, Err(JvfsError::Traversal { .. })));
}

#[test]
fn test_packing_is_deterministic() {
    let root = TempDir::new().unwrap();
    write_tree(
        root.path(),
        &[("b.txt", b"bbb"), ("a.txt", b"aaa"), ("z/y.txt", b"yyy"), ("m/n.txt", b"nnn")],
    );
    let out = TempDir::new().unwrap();

    for layout in [ArchiveLayout::V0, ArchiveLayout::V1] {
        let first = out.path().join("first.pkg");
        let second = out.path().join("second.pkg");
        pack(root.path(), &first, &options(layout)).unwrap();
        pack(root.path(), &second, &options(layout)).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }
}

#[test]
fn test_discovery_order_is_preserved() {
    let root = TempDir::new().unwrap();
    write_tree(
        root.path(),
        &[("x/1", b"1"), ("y/2", b"2"), ("top", b"t"), ("y/z/3", b"3")],
    );
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("order.pkg");

    pack(root.path(), &archive_path, &PackOptions::default()).unwrap();
    let archive = parse_archive(&fs::read(&archive_path).unwrap());
    let names: Vec<&str> = archive.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["top", "y/2", "y/z/3", "x/1"]);
}

#[test]
fn test_unicode_and_long_names() {
    let long = "n".repeat(200);
    let root = TempDir::new().unwrap();
    write_tree(
        root.path(),
        &[("日本語.txt", b"jp"), ("café/menu.md", b"menu"), (long.as_str(), b"long")],
    );
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("names.pkg");

    let report = pack(root.path(), &archive_path, &PackOptions::default()).unwrap();
    let bytes = fs::read(&archive_path).unwrap();
    let archive = parse_archive(&bytes);

    let names: Vec<&str> = archive.entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"日本語.txt"));
    assert!(names.contains(&"café/menu.md"));
    assert!(names.contains(&long.as_str()));
    assert_eq!(report.header_size, uncompressed_header_size(&names, Some(ArchiveLayout::V0)));
}

#[test]
fn test_root_prefixed_naming() {
    let root = TempDir::new().unwrap();
    write_tree(root.path(), &[("a.txt", b"hello")]);
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("prefixed.pkg");

    Packer::new(root.path(), &archive_path)
        .naming(EntryNaming::RootPrefixed)
        .pack()
        .unwrap();

    let archive = parse_archive(&fs::read(&archive_path).unwrap());
    let expected = format!("{}/a.txt", root.path().to_str().unwrap().trim_end_matches('/'));
    assert_eq!(archive.entries[0].name, expected);
}

#[test]
fn test_atomic_output_replaces_existing_file() {
    let root = TempDir::new().unwrap();
    write_tree(root.path(), &[("a.txt", b"hello")]);
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("atomic.pkg");
    fs::write(&archive_path, b"previous contents").unwrap();

    Packer::new(root.path(), &archive_path)
        .layout(ArchiveLayout::V1)
        .atomic(true)
        .pack()
        .unwrap();

    let bytes = fs::read(&archive_path).unwrap();
    assert_eq!(&bytes[..9], b"JVFS0101\0");
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
}

#[test]
fn test_atomic_failure_keeps_existing_file() {
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("keep.pkg");
    fs::write(&archive_path, b"previous contents").unwrap();
    let empty_root = TempDir::new().unwrap();

    let result = Packer::new(empty_root.path(), &archive_path).atomic(true).pack();
    assert!(result.is_err());
    assert_eq!(fs::read(&archive_path).unwrap(), b"previous contents");
}

#[test]
fn test_output_inside_root_is_not_archived() {
    let root = TempDir::new().unwrap();
    write_tree(root.path(), &[("a.txt", b"hello")]);
    let archive_path = root.path().join("self.pkg");

    pack(root.path(), &archive_path, &PackOptions::default()).unwrap();
    // Second run sees the first archive under the root
    pack(root.path(), &archive_path, &PackOptions::default()).unwrap();

    let archive = parse_archive(&fs::read(&archive_path).unwrap());
    let names: Vec<&str> = archive.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a.txt"]);
}

#[test]
fn test_multi_chunk_files_round_trip() {
    let big: Vec<u8> = (0..jvfs_rs::CHUNK_SIZE * 4 + 1).map(|i| (i % 97) as u8).collect();
    let root = TempDir::new().unwrap();
    write_tree(root.path(), &[("big.bin", &big), ("small.txt", b"s")]);
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("chunks.pkg");

    pack(root.path(), &archive_path, &options(ArchiveLayout::V1)).unwrap();
    let bytes = fs::read(&archive_path).unwrap();
    let archive = parse_archive(&bytes);
    let extracted = extract_all(&bytes, &archive);
    assert_eq!(extracted[0].0, "big.bin");
    assert_eq!(extracted[0].1, big);
}
