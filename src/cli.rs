// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::AssetCategory;

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Build static site assets and serve them with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory; when that
    /// file does not exist the stock `src/` -> `dist/` layout is used.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// What to run; `watch` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Minify HTML pages.
    Html,
    /// Compile, prefix and minify stylesheets.
    Css,
    /// Minify scripts.
    Js,
    /// Optimise images and add WebP copies.
    Images,
    /// Combine sprite icons into one SVG.
    Svgsprite,
    /// Convert fonts to web formats.
    Fonts,
    /// Remove the destination directory.
    Clean,
    /// Clean, then build every category.
    Build,
    /// Build, then rebuild on change while serving with live reload.
    Watch,
    /// Print the resolved path table and build stages without running anything.
    Paths,
}

impl Command {
    /// The single category a category command runs.
    pub fn category(self) -> Option<AssetCategory> {
        match self {
            Command::Html => Some(AssetCategory::Markup),
            Command::Css => Some(AssetCategory::Styles),
            Command::Js => Some(AssetCategory::Scripts),
            Command::Images => Some(AssetCategory::RasterImages),
            Command::Svgsprite => Some(AssetCategory::VectorSprite),
            Command::Fonts => Some(AssetCategory::Fonts),
            Command::Clean | Command::Build | Command::Watch | Command::Paths => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
