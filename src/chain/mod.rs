// src/chain/mod.rs

//! Category processor chains.
//!
//! Each category owns a declarative [`ProcessorChain`]: an ordered list of
//! [`ChainStep`]s run for every matched source file (or once over all of them,
//! for the sprite). [`ChainExecutor`] runs a chain against a filesystem and
//! produces a [`CategoryReport`].

use std::fmt;
use std::sync::Arc;

use crate::transform::fonts::{ConvertFont, FontFormat, Woff2FromTtf};
use crate::transform::images::{ConvertToWebp, OptimizeImage};
use crate::transform::markup::MinifyHtml;
use crate::transform::scripts::MinifyJs;
use crate::transform::styles::{Autoprefix, CompileScss, GroupMediaQueries, MinifyCss};
use crate::transform::svg::SvgSymbolSprite;
use crate::types::AssetCategory;

pub mod executor;
pub mod report;
pub mod steps;

pub use executor::ChainExecutor;
pub use report::{CategoryReport, FileOutcome, FileStatus, SkipReason};
pub use steps::{ChainStep, FreshnessTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    /// Every source file runs through the chain independently.
    PerFile,
    /// All source files are folded into one output by a `Combine` step.
    Combined,
}

/// The steps one category applies to its sources.
///
/// A chain has one or more branches; every source file runs through each
/// branch independently (raster images produce a WebP copy and an optimised
/// original from two branches).
#[derive(Clone)]
pub struct ProcessorChain {
    pub category: AssetCategory,
    pub mode: ChainMode,
    pub branches: Vec<Vec<ChainStep>>,
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorChain")
            .field("category", &self.category)
            .field("mode", &self.mode)
            .field("branches", &self.branches)
            .finish()
    }
}

/// The processor chain declared for `category`.
pub fn chain_for(category: AssetCategory) -> ProcessorChain {
    use ChainStep::*;

    let (mode, branches) = match category {
        AssetCategory::Markup => (
            ChainMode::PerFile,
            vec![vec![
                Transform(Arc::new(MinifyHtml::collapse_whitespace())),
                Write { source_map: false },
            ]],
        ),
        AssetCategory::Styles => (
            ChainMode::PerFile,
            vec![vec![
                InitSourceMap,
                Transform(Arc::new(CompileScss)),
                Transform(Arc::new(Autoprefix)),
                Transform(Arc::new(GroupMediaQueries)),
                Write { source_map: true },
                Transform(Arc::new(MinifyCss)),
                Rename {
                    suffix: ".min",
                    extname: Some("css"),
                },
                Write { source_map: true },
            ]],
        ),
        AssetCategory::Scripts => (
            ChainMode::PerFile,
            vec![vec![
                InitSourceMap,
                Transform(Arc::new(MinifyJs)),
                Rename {
                    suffix: ".min",
                    extname: Some("js"),
                },
                Write { source_map: true },
            ]],
        ),
        AssetCategory::RasterImages => (
            ChainMode::PerFile,
            vec![
                vec![
                    SkipIfNewer(FreshnessTarget::Extension("webp")),
                    Transform(Arc::new(ConvertToWebp)),
                    Write { source_map: false },
                ],
                vec![
                    SkipIfNewer(FreshnessTarget::SamePath),
                    Transform(Arc::new(OptimizeImage::new())),
                    Write { source_map: false },
                ],
            ],
        ),
        AssetCategory::VectorSprite => {
            let sprite = SvgSymbolSprite::new();
            (
                ChainMode::Combined,
                vec![vec![
                    SkipIfNewer(FreshnessTarget::Fixed(sprite.output().to_path_buf())),
                    Combine(Arc::new(sprite)),
                    Write { source_map: false },
                ]],
            )
        }
        AssetCategory::Fonts => (
            ChainMode::PerFile,
            vec![vec![
                SkipIfNewer(FreshnessTarget::SamePath),
                Transform(Arc::new(ConvertFont::new([
                    FontFormat::Woff,
                    FontFormat::Ttf,
                    FontFormat::Eot,
                ]))),
                Write { source_map: false },
                Transform(Arc::new(Woff2FromTtf)),
                Write { source_map: false },
            ]],
        ),
    };

    ProcessorChain {
        category,
        mode,
        branches,
    }
}
