// src/transform/fonts/mod.rs

//! Web-font conversion: TrueType/WOFF inputs fan out into every format a
//! `@font-face` rule may reference.

use std::fmt;

use anyhow::Result;

use super::{Asset, Transform};

pub mod eot;
pub mod sfnt;
pub mod woff;
pub mod woff2;

pub use sfnt::Sfnt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    Ttf,
    Woff,
    Eot,
}

impl FontFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Ttf => "ttf",
            FontFormat::Woff => "woff",
            FontFormat::Eot => "eot",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Convert `ttf`/`woff` inputs into each of `formats`.
///
/// Inputs that cannot be converted (`eot`, `woff2`, `svg`) pass through
/// unchanged.
pub struct ConvertFont {
    formats: Vec<FontFormat>,
}

impl ConvertFont {
    pub fn new(formats: impl Into<Vec<FontFormat>>) -> Self {
        Self {
            formats: formats.into(),
        }
    }
}

impl Transform for ConvertFont {
    fn name(&self) -> &'static str {
        "fonter"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        let font = match asset.extension().as_deref() {
            Some("ttf") => Sfnt::parse(&asset.contents)?,
            Some("woff") => woff::decode(&asset.contents)?,
            _ => return Ok(vec![asset]),
        };
        let sfnt_bytes = font.to_bytes();

        let mut out = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let contents = match format {
                FontFormat::Ttf => sfnt_bytes.clone(),
                FontFormat::Woff => woff::encode(&font)?,
                FontFormat::Eot => eot::encode(&font, &sfnt_bytes)?,
            };
            let rel_path = asset.rel_path.with_extension(format.extension());
            out.push(asset.clone().with_contents(contents).with_rel_path(rel_path));
        }
        Ok(out)
    }
}

/// Derive a WOFF2 file from each TrueType asset; everything else is dropped.
pub struct Woff2FromTtf;

impl Transform for Woff2FromTtf {
    fn name(&self) -> &'static str {
        "ttf2woff2"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        if asset.extension().as_deref() != Some("ttf") {
            return Ok(Vec::new());
        }
        let font = Sfnt::parse(&asset.contents)?;
        let contents = woff2::encode(&font)?;
        let rel_path = asset.rel_path.with_extension("woff2");
        Ok(vec![asset.with_contents(contents).with_rel_path(rel_path)])
    }
}
