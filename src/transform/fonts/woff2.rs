// src/transform/fonts/woff2.rs

//! WOFF 2.0 writer using null table transforms and one brotli stream.

use std::io::Write;

use anyhow::Result;

use super::sfnt::{Sfnt, pad4};

const SIGNATURE: &[u8; 4] = b"wOF2";
const HEADER_LEN: usize = 48;

/// Tags with a one-byte directory encoding, by index.
pub const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];
pub const ARBITRARY_TAG: u8 = 0x3F;

/// `glyf`/`loca` use transform version 3 for "no transform"; every other
/// table uses version 0.
const NULL_GLYF_TRANSFORM: u8 = 0xC0;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

pub fn encode(font: &Sfnt) -> Result<Vec<u8>> {
    let font = Sfnt::parse(&font.to_bytes())?;
    let tables = font.sorted_tables();

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &tables {
        let index = KNOWN_TAGS
            .iter()
            .position(|known| *known == &table.tag)
            .map(|i| i as u8);
        let transform = if &table.tag == b"glyf" || &table.tag == b"loca" {
            NULL_GLYF_TRANSFORM
        } else {
            0
        };
        match index {
            Some(i) => directory.push(i | transform),
            None => {
                directory.push(ARBITRARY_TAG | transform);
                directory.extend_from_slice(&table.tag);
            }
        }
        write_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(&table.data);
    }

    let compressed = compress(&stream)?;
    let total_len = pad4(HEADER_LEN + directory.len() + compressed.len());

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(font.total_size() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // No metadata or private blocks.
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total_len, 0);
    Ok(out)
}

/// UIntBase128: big-endian groups of 7 bits, high bit set on all but the last.
pub fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_LG_WINDOW);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(writer.into_inner())
}
