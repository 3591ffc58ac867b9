// src/transform/images.rs

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::svg::clean_document;
use super::{Asset, Transform};

const JPEG_QUALITY: u8 = 80;

/// Encode PNG and JPEG inputs as lossless WebP next to the original.
///
/// Other formats produce no output from this stage.
pub struct ConvertToWebp;

impl Transform for ConvertToWebp {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        if !matches!(asset.extension().as_deref(), Some("png" | "jpg" | "jpeg")) {
            return Ok(Vec::new());
        }

        let decoded = image::load_from_memory(&asset.contents)
            .with_context(|| format!("decoding {}", asset.rel_path.display()))?;
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(decoded.to_rgba8())
            .write_to(&mut Cursor::new(&mut out), ImageFormat::WebP)
            .with_context(|| format!("encoding {} as WebP", asset.rel_path.display()))?;

        let rel_path = asset.rel_path.with_extension("webp");
        Ok(vec![asset.with_contents(out).with_rel_path(rel_path)])
    }
}

/// Shrink an image in its own format, keeping the original bytes unless the
/// optimised result is smaller.
pub struct OptimizeImage {
    png: oxipng::Options,
}

impl OptimizeImage {
    pub fn new() -> Self {
        Self {
            png: oxipng::Options::from_preset(2),
        }
    }

    fn optimize(&self, asset: &Asset) -> Result<Option<Vec<u8>>> {
        let optimized = match asset.extension().as_deref() {
            Some("png") => oxipng::optimize_from_memory(&asset.contents, &self.png)
                .with_context(|| format!("optimising {}", asset.rel_path.display()))?,
            Some("jpg" | "jpeg") => {
                let decoded = image::load_from_memory(&asset.contents)
                    .with_context(|| format!("decoding {}", asset.rel_path.display()))?;
                let mut out = Vec::new();
                DynamicImage::ImageRgb8(decoded.to_rgb8())
                    .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
                    .with_context(|| format!("re-encoding {}", asset.rel_path.display()))?;
                out
            }
            Some("svg") => clean_document(asset.text()?).into_bytes(),
            _ => return Ok(None),
        };
        Ok(Some(optimized))
    }
}

impl Default for OptimizeImage {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for OptimizeImage {
    fn name(&self) -> &'static str {
        "imagemin"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        match self.optimize(&asset)? {
            Some(smaller) if smaller.len() < asset.contents.len() => {
                Ok(vec![asset.with_contents(smaller)])
            }
            _ => Ok(vec![asset]),
        }
    }
}
