//! Test helpers: fixture trees and a minimal archive parser

#![allow(dead_code)]

use flate2::read::ZlibDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub addr: u64,
    pub size: u64,
    pub name: String,
}

#[derive(Debug)]
pub struct ParsedArchive {
    pub magic: Vec<u8>,
    pub entries: Vec<ParsedEntry>,
    /// v0: end of the header; v1: header offset stored after the signature
    pub header_end: u64,
    /// First byte after the last body
    pub bodies_end: u64,
    /// Raw (uncompressed) catalog bytes without signature
    pub catalog_blob: Vec<u8>,
}

pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

pub fn read_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(bytes[at..at + 8].try_into().unwrap())
}

pub fn inflate(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes).read_to_end(&mut out).unwrap();
    out
}

/// Parse `[count][(addr)(size)(name\0)]*`, returning entries and bytes consumed
pub fn parse_catalog(blob: &[u8]) -> (Vec<ParsedEntry>, usize) {
    let count = read_u64(blob, 0);
    let mut pos = 8;
    let mut entries = Vec::new();
    for _ in 0..count {
        let addr = read_u64(blob, pos);
        let size = read_u64(blob, pos + 8);
        pos += 16;
        let nul = blob[pos..].iter().position(|&b| b == 0).unwrap();
        let name = String::from_utf8(blob[pos..pos + nul].to_vec()).unwrap();
        pos += nul + 1;
        entries.push(ParsedEntry { addr, size, name });
    }
    (entries, pos)
}

pub fn parse_archive(bytes: &[u8]) -> ParsedArchive {
    let magic = bytes[..9].to_vec();
    match &bytes[..9] {
        b"JVFS0100\0" => {
            let (entries, used) = parse_catalog(&bytes[9..]);
            ParsedArchive {
                magic,
                catalog_blob: bytes[9..9 + used].to_vec(),
                entries,
                header_end: (9 + used) as u64,
                bodies_end: bytes.len() as u64,
            }
        }
        b"JVFS0101\0" => {
            let header_offset = read_u64(bytes, 9) as usize;
            let catalog_size = read_u64(bytes, header_offset);
            let catalog_blob = inflate(&bytes[header_offset + 8..]);
            assert_eq!(catalog_blob.len() as u64, catalog_size);
            let (entries, used) = parse_catalog(&catalog_blob);
            assert_eq!(used, catalog_blob.len());
            ParsedArchive {
                magic,
                entries,
                header_end: header_offset as u64,
                bodies_end: header_offset as u64,
                catalog_blob,
            }
        }
        other => panic!("unknown signature {:?}", other),
    }
}

/// Inflate every entry using the next entry's offset as its boundary
pub fn extract_all(bytes: &[u8], archive: &ParsedArchive) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    for (i, entry) in archive.entries.iter().enumerate() {
        let end = archive
            .entries
            .get(i + 1)
            .map(|next| next.addr)
            .unwrap_or(archive.bodies_end);
        let body = inflate(&bytes[entry.addr as usize..end as usize]);
        out.push((entry.name.clone(), body));
    }
    out
}
