// src/transform/fonts/woff.rs

//! WOFF 1.0: sfnt tables individually zlib-compressed.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail, ensure};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::sfnt::{Sfnt, SfntTable, checksum, pad4, read_tag, read_u16, read_u32, slice};

const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;

pub fn encode(font: &Sfnt) -> Result<Vec<u8>> {
    // Round-trip through the sfnt writer so `head` carries a valid adjustment.
    let font = Sfnt::parse(&font.to_bytes())?;
    let tables = font.sorted_tables();

    let mut entries = Vec::with_capacity(tables.len());
    for table in &tables {
        let compressed = compress(&table.data)
            .with_context(|| format!("compressing table {}", super::sfnt::tag_str(&table.tag)))?;
        let stored = if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.clone()
        };
        entries.push((table, stored));
    }

    let mut body = Vec::new();
    let mut directory = Vec::with_capacity(ENTRY_LEN * entries.len());
    let data_start = HEADER_LEN + ENTRY_LEN * entries.len();
    for (table, stored) in &entries {
        let offset = data_start + body.len();
        directory.extend_from_slice(&table.tag);
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&checksum(&table.data).to_be_bytes());
        body.extend_from_slice(stored);
        body.resize(pad4(body.len()), 0);
    }

    let total_len = data_start + body.len();
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(font.total_size() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // No metadata or private blocks.
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<Sfnt> {
    ensure!(bytes.len() >= HEADER_LEN, "WOFF file is truncated");
    if &read_tag(bytes, 0)? != SIGNATURE {
        bail!("not a WOFF file");
    }
    let flavor = read_u32(bytes, 4)?;
    let num_tables = read_u16(bytes, 12)? as usize;

    let mut tables = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let entry = HEADER_LEN + i * ENTRY_LEN;
        let tag = read_tag(bytes, entry)?;
        let offset = read_u32(bytes, entry + 4)? as usize;
        let comp_len = read_u32(bytes, entry + 8)? as usize;
        let orig_len = read_u32(bytes, entry + 12)? as usize;
        let stored = slice(bytes, offset, comp_len)?;

        let data = if comp_len < orig_len {
            let mut data = Vec::with_capacity(orig_len);
            ZlibDecoder::new(stored)
                .read_to_end(&mut data)
                .with_context(|| format!("inflating table {}", super::sfnt::tag_str(&tag)))?;
            ensure!(
                data.len() == orig_len,
                "table {} inflated to {} bytes, expected {orig_len}",
                super::sfnt::tag_str(&tag),
                data.len()
            );
            data
        } else {
            stored.to_vec()
        };
        tables.push(SfntTable { tag, data });
    }

    Ok(Sfnt { flavor, tables })
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
