// src/transform/fonts/eot.rs

//! Embedded OpenType (version 0x00020001) wrapper around an sfnt.

use anyhow::Result;

use super::sfnt::{Sfnt, read_u16, read_u32, slice};

const VERSION: u32 = 0x0002_0001;
const MAGIC: u16 = 0x504C;
const DEFAULT_CHARSET: u8 = 1;

const NAME_FAMILY: u16 = 1;
const NAME_STYLE: u16 = 2;
const NAME_FULL: u16 = 4;
const NAME_VERSION: u16 = 5;

/// Wrap the serialized font `sfnt_bytes` (parsed as `font`) in an EOT header.
///
/// Fields come from `OS/2`, `head` and `name`; a missing or short table
/// leaves its fields zeroed.
pub fn encode(font: &Sfnt, sfnt_bytes: &[u8]) -> Result<Vec<u8>> {
    let os2 = font.table(b"OS/2").unwrap_or(&[]);
    let head = font.table(b"head").unwrap_or(&[]);
    let names = font.table(b"name").map(read_names).unwrap_or_default();

    let mut out = Vec::with_capacity(sfnt_bytes.len() + 256);
    // EOTSize is patched once the header is complete.
    put_u32(&mut out, 0);
    put_u32(&mut out, sfnt_bytes.len() as u32);
    put_u32(&mut out, VERSION);
    put_u32(&mut out, 0);
    out.extend_from_slice(slice(os2, 32, 10).unwrap_or(&[0u8; 10]));
    out.push(DEFAULT_CHARSET);
    let fs_selection = read_u16(os2, 62).unwrap_or(0);
    out.push(u8::from(fs_selection & 1 == 1));
    put_u32(&mut out, u32::from(read_u16(os2, 4).unwrap_or(0)));
    put_u16(&mut out, read_u16(os2, 8).unwrap_or(0));
    put_u16(&mut out, MAGIC);
    for offset in [42, 46, 50, 54] {
        put_u32(&mut out, read_u32(os2, offset).unwrap_or(0));
    }
    for offset in [78, 82] {
        put_u32(&mut out, read_u32(os2, offset).unwrap_or(0));
    }
    put_u32(&mut out, read_u32(head, 8).unwrap_or(0));
    for _ in 0..4 {
        put_u32(&mut out, 0);
    }
    put_u16(&mut out, 0);

    for id in [NAME_FAMILY, NAME_STYLE, NAME_VERSION, NAME_FULL] {
        let value = names
            .iter()
            .find(|(name_id, _)| *name_id == id)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[]);
        put_u16(&mut out, value.len() as u16);
        out.extend_from_slice(value);
        put_u16(&mut out, 0);
    }
    // RootStringSize
    put_u16(&mut out, 0);

    out.extend_from_slice(sfnt_bytes);
    let eot_size = out.len() as u32;
    out[0..4].copy_from_slice(&eot_size.to_le_bytes());
    Ok(out)
}

/// Name records as UTF-16LE, preferring Windows (platform 3) entries.
fn read_names(table: &[u8]) -> Vec<(u16, Vec<u8>)> {
    let (Ok(count), Ok(storage)) = (read_u16(table, 2), read_u16(table, 4)) else {
        return Vec::new();
    };

    let mut windows = Vec::new();
    let mut mac = Vec::new();
    for i in 0..count as usize {
        let record = 6 + i * 12;
        let (Ok(platform), Ok(name_id), Ok(len), Ok(offset)) = (
            read_u16(table, record),
            read_u16(table, record + 6),
            read_u16(table, record + 8),
            read_u16(table, record + 10),
        ) else {
            break;
        };
        let Ok(raw) = slice(table, storage as usize + offset as usize, len as usize) else {
            continue;
        };
        match platform {
            3 => windows.push((name_id, raw.chunks(2).flat_map(swap_pair).collect())),
            1 => mac.push((name_id, raw.iter().flat_map(|b| [*b, 0]).collect())),
            _ => {}
        }
    }

    for (id, value) in mac {
        if !windows.iter().any(|(w, _)| *w == id) {
            windows.push((id, value));
        }
    }
    windows
}

fn swap_pair(pair: &[u8]) -> Vec<u8> {
    match pair {
        [hi, lo] => vec![*lo, *hi],
        _ => Vec::new(),
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
