// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The six asset kinds the pipeline knows how to build.
///
/// The set is closed: categories are fixed at configuration time and every
/// category owns exactly one processor chain and one watch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum AssetCategory {
    #[serde(rename = "html")]
    Markup,
    #[serde(rename = "css")]
    Styles,
    #[serde(rename = "js")]
    Scripts,
    #[serde(rename = "images")]
    RasterImages,
    #[serde(rename = "svgsprite")]
    VectorSprite,
    #[serde(rename = "fonts")]
    Fonts,
}

impl AssetCategory {
    /// Every category, in command-surface order.
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Markup,
        AssetCategory::Styles,
        AssetCategory::Scripts,
        AssetCategory::RasterImages,
        AssetCategory::VectorSprite,
        AssetCategory::Fonts,
    ];

    /// Name used on the command line and as the `[category.<name>]` key.
    pub fn name(self) -> &'static str {
        match self {
            AssetCategory::Markup => "html",
            AssetCategory::Styles => "css",
            AssetCategory::Scripts => "js",
            AssetCategory::RasterImages => "images",
            AssetCategory::VectorSprite => "svgsprite",
            AssetCategory::Fonts => "fonts",
        }
    }

    /// Title attached to error notifications raised by this category.
    pub fn error_title(self) -> &'static str {
        match self {
            AssetCategory::Markup => "HTML Error",
            AssetCategory::Styles => "CSS Error",
            AssetCategory::Scripts => "JS Error",
            AssetCategory::RasterImages => "IMAGES Error",
            AssetCategory::VectorSprite => "SVG Error",
            AssetCategory::Fonts => "FONTS Error",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AssetCategory::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown asset category: {wanted} (expected one of html, css, js, images, svgsprite, fonts)"
                )
            })
    }
}

/// Why a category run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Explicit invocation from the command surface or a full build.
    Manual,
    /// A watched file was created, modified or removed.
    FileWatch,
}
