// src/transform/fonts/sfnt.rs

//! Minimal sfnt (TrueType/OpenType) container reader and writer.
//!
//! Only the table directory is interpreted; table contents are opaque bytes.

use anyhow::{Result, bail, ensure};

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntTable {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfnt {
    /// `0x00010000` for TrueType outlines, `OTTO` for CFF.
    pub flavor: u32,
    pub tables: Vec<SfntTable>,
}

impl Sfnt {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(bytes.len() >= HEADER_LEN, "font is truncated ({} bytes)", bytes.len());

        let flavor = read_u32(bytes, 0)?;
        match &flavor.to_be_bytes() {
            b"wOFF" | b"wOF2" => bail!("expected an sfnt font, found a WOFF container"),
            [0, 1, 0, 0] | b"OTTO" | b"true" => {}
            other => bail!("unrecognised font signature {other:02x?}"),
        }

        let num_tables = read_u16(bytes, 4)? as usize;
        let mut tables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let record = HEADER_LEN + i * RECORD_LEN;
            let tag = read_tag(bytes, record)?;
            let offset = read_u32(bytes, record + 8)? as usize;
            let length = read_u32(bytes, record + 12)? as usize;
            let data = slice(bytes, offset, length)
                .map_err(|e| e.context(format!("table {}", tag_str(&tag))))?;
            tables.push(SfntTable {
                tag,
                data: data.to_vec(),
            });
        }

        Ok(Self { flavor, tables })
    }

    pub fn table(&self, tag: &[u8; 4]) -> Option<&[u8]> {
        self.tables
            .iter()
            .find(|t| &t.tag == tag)
            .map(|t| t.data.as_slice())
    }

    /// Tables ordered by tag, as the directory requires.
    pub fn sorted_tables(&self) -> Vec<&SfntTable> {
        let mut tables: Vec<&SfntTable> = self.tables.iter().collect();
        tables.sort_by(|a, b| a.tag.cmp(&b.tag));
        tables
    }

    /// Size of the serialized font: header, directory and padded tables.
    pub fn total_size(&self) -> usize {
        HEADER_LEN
            + RECORD_LEN * self.tables.len()
            + self.tables.iter().map(|t| pad4(t.data.len())).sum::<usize>()
    }

    /// Serialize with recomputed table checksums and `head.checkSumAdjustment`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tables = self.sorted_tables();
        let num_tables = tables.len();
        let (search_range, entry_selector, range_shift) = search_params(num_tables as u16, 16);

        let mut out = Vec::with_capacity(self.total_size());
        out.extend_from_slice(&self.flavor.to_be_bytes());
        out.extend_from_slice(&(num_tables as u16).to_be_bytes());
        out.extend_from_slice(&search_range.to_be_bytes());
        out.extend_from_slice(&entry_selector.to_be_bytes());
        out.extend_from_slice(&range_shift.to_be_bytes());

        let mut offset = HEADER_LEN + RECORD_LEN * num_tables;
        let mut head_offset = None;
        let mut bodies = Vec::with_capacity(num_tables);
        for table in &tables {
            let mut data = table.data.clone();
            if &table.tag == b"head" && data.len() >= 12 {
                data[8..12].fill(0);
                head_offset = Some(offset);
            }
            out.extend_from_slice(&table.tag);
            out.extend_from_slice(&checksum(&data).to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += pad4(data.len());
            bodies.push(data);
        }
        for body in bodies {
            let padded = pad4(body.len());
            out.extend_from_slice(&body);
            out.resize(out.len() + padded - body.len(), 0);
        }

        if let Some(head) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
            out[head + 8..head + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        out
    }
}

/// Sum of big-endian u32 words, zero-padding the tail.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

pub fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// `searchRange`, `entrySelector`, `rangeShift` for `count` entries of `unit` bytes.
pub fn search_params(count: u16, unit: u16) -> (u16, u16, u16) {
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector) * unit;
    (search_range, entry_selector, count * unit - search_range)
}

pub fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

pub(crate) fn slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= bytes.len() => Ok(&bytes[offset..end]),
        _ => bail!("range {offset}+{len} is outside the {}-byte font", bytes.len()),
    }
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    let b = slice(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let b = slice(bytes, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_tag(bytes: &[u8], offset: usize) -> Result<[u8; 4]> {
    let b = slice(bytes, offset, 4)?;
    Ok([b[0], b[1], b[2], b[3]])
}
