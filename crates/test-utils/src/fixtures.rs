#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assetpipe::transform::fonts::Sfnt;
use assetpipe::transform::fonts::sfnt::SfntTable;

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Set the modification time of `path` to `now + offset_secs` (may be negative).
pub fn set_mtime(path: &Path, offset_secs: i64) {
    let now = SystemTime::now();
    let time = if offset_secs >= 0 {
        now + Duration::from_secs(offset_secs as u64)
    } else {
        now - Duration::from_secs(offset_secs.unsigned_abs())
    };
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// A 1x1 RGBA PNG with a solid colour.
pub fn tiny_png() -> Vec<u8> {
    let mut out = Vec::new();
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 30, 30, 255]));
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// A structurally valid TrueType font with `head`, `name`, `OS/2`, `maxp`,
/// `glyf` and `loca` tables.
pub fn tiny_ttf() -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    head[18..20].copy_from_slice(&1000u16.to_be_bytes());

    let mut os2 = vec![0u8; 96];
    os2[0..2].copy_from_slice(&4u16.to_be_bytes());
    os2[4..6].copy_from_slice(&400u16.to_be_bytes());
    os2[8..10].copy_from_slice(&0u16.to_be_bytes());
    os2[32..42].copy_from_slice(&[2, 11, 6, 3, 3, 5, 4, 2, 2, 4]);
    os2[42..46].copy_from_slice(&1u32.to_be_bytes());

    let mut maxp = Vec::new();
    maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp.extend_from_slice(&1u16.to_be_bytes());

    let tables = vec![
        SfntTable { tag: *b"head", data: head },
        SfntTable { tag: *b"OS/2", data: os2 },
        SfntTable { tag: *b"maxp", data: maxp },
        SfntTable { tag: *b"name", data: name_table(&[(1, "Tiny"), (2, "Regular"), (4, "Tiny Regular"), (5, "Version 1.0")]) },
        SfntTable { tag: *b"glyf", data: vec![0u8; 12] },
        SfntTable { tag: *b"loca", data: vec![0, 0, 0, 6] },
    ];
    Sfnt { flavor: 0x0001_0000, tables }.to_bytes()
}

/// A TrueType font shaped like a real one: the usual required tables, three
/// glyphs with short `loca` offsets, a `glyf` table long enough for multi-byte
/// WOFF2 lengths and a `DSIG` table outside the WOFF2 known-tag list.
pub fn multi_table_ttf() -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    head[18..20].copy_from_slice(&2048u16.to_be_bytes());

    let mut hhea = vec![0u8; 36];
    hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea[4..6].copy_from_slice(&1900u16.to_be_bytes());
    hhea[34..36].copy_from_slice(&3u16.to_be_bytes());

    let mut hmtx = Vec::new();
    for advance in [1000u16, 1200, 600] {
        hmtx.extend_from_slice(&advance.to_be_bytes());
        hmtx.extend_from_slice(&50u16.to_be_bytes());
    }

    let mut maxp = Vec::new();
    maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp.extend_from_slice(&3u16.to_be_bytes());

    let mut os2 = vec![0u8; 96];
    os2[0..2].copy_from_slice(&4u16.to_be_bytes());
    os2[4..6].copy_from_slice(&700u16.to_be_bytes());

    let mut post = vec![0u8; 32];
    post[0..4].copy_from_slice(&0x0003_0000u32.to_be_bytes());

    // Format 4 cmap with only the terminating 0xFFFF segment.
    let mut cmap = Vec::new();
    for field in [0u16, 1, 3, 1] {
        cmap.extend_from_slice(&field.to_be_bytes());
    }
    cmap.extend_from_slice(&12u32.to_be_bytes());
    for field in [4u16, 24, 0, 2, 2, 0, 0, 0xFFFF, 0, 0xFFFF, 1, 0] {
        cmap.extend_from_slice(&field.to_be_bytes());
    }

    let glyf: Vec<u8> = (0..420u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut loca = Vec::new();
    for half_offset in [0u16, 70, 140, 210] {
        loca.extend_from_slice(&half_offset.to_be_bytes());
    }

    let dsig = vec![0, 0, 0, 1, 0, 0, 0, 0];

    let tables = vec![
        SfntTable { tag: *b"cmap", data: cmap },
        SfntTable { tag: *b"head", data: head },
        SfntTable { tag: *b"hhea", data: hhea },
        SfntTable { tag: *b"hmtx", data: hmtx },
        SfntTable { tag: *b"maxp", data: maxp },
        SfntTable { tag: *b"name", data: name_table(&[(1, "Sample"), (2, "Bold"), (4, "Sample Bold"), (5, "Version 2.001")]) },
        SfntTable { tag: *b"OS/2", data: os2 },
        SfntTable { tag: *b"post", data: post },
        SfntTable { tag: *b"glyf", data: glyf },
        SfntTable { tag: *b"loca", data: loca },
        SfntTable { tag: *b"DSIG", data: dsig },
    ];
    Sfnt { flavor: 0x0001_0000, tables }.to_bytes()
}

fn name_table(entries: &[(u16, &str)]) -> Vec<u8> {
    let mut storage = Vec::new();
    let mut records = Vec::new();
    for (id, value) in entries {
        let encoded: Vec<u8> = value.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        for field in [3u16, 1, 0x409, *id, encoded.len() as u16, storage.len() as u16] {
            records.extend_from_slice(&field.to_be_bytes());
        }
        storage.extend_from_slice(&encoded);
    }
    let mut table = Vec::new();
    table.extend_from_slice(&0u16.to_be_bytes());
    table.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    table.extend_from_slice(&(6 + records.len() as u16).to_be_bytes());
    table.extend_from_slice(&records);
    table.extend_from_slice(&storage);
    table
}
