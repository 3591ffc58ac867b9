// src/transform/styles.rs

//! Stylesheet stages: SCSS compilation, vendor prefixing, media-query
//! grouping and minification.

use std::path::Path;

use anyhow::{Result, anyhow};
use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;

use super::{Asset, Transform};

/// Compile an SCSS entry file to CSS.
///
/// `@use`/`@import` resolve relative to the entry file's directory. Partials
/// (`_name.scss`) are only ever imported, so they produce no output.
pub struct CompileScss;

impl Transform for CompileScss {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        if asset.file_name().starts_with('_') {
            return Ok(Vec::new());
        }

        let input = asset.text()?.to_string();
        let load_dir = asset.origin.parent().unwrap_or(Path::new(".")).to_path_buf();
        let options = grass::Options::default()
            .style(grass::OutputStyle::Expanded)
            .load_path(&load_dir);
        let css = grass::from_string(input, &options).map_err(|e| anyhow!("{e}"))?;

        let rel_path = asset.rel_path.with_extension("css");
        Ok(vec![asset.with_contents(css).with_rel_path(rel_path)])
    }
}

/// Add vendor prefixes for the supported browser set, keeping the output
/// readable.
pub struct Autoprefix;

impl Transform for Autoprefix {
    fn name(&self) -> &'static str {
        "autoprefixer"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        let code = {
            let mut sheet = parse(asset.text()?, &asset.file_name())?;
            sheet
                .minify(MinifyOptions {
                    targets: browser_targets(),
                    ..MinifyOptions::default()
                })
                .map_err(|e| anyhow!("{e}"))?;
            print(&sheet, false)?
        };
        Ok(vec![asset.with_contents(code)])
    }
}

/// Move every `@media` block to the end of the sheet, merging blocks with an
/// identical query in first-appearance order.
pub struct GroupMediaQueries;

impl Transform for GroupMediaQueries {
    fn name(&self) -> &'static str {
        "group-css-media-queries"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        let code = {
            let mut sheet = parse(asset.text()?, &asset.file_name())?;
            let rules = std::mem::take(&mut sheet.rules.0);

            let mut kept = Vec::with_capacity(rules.len());
            let mut groups: Vec<(String, MediaRule<'_, _>)> = Vec::new();
            for rule in rules {
                match rule {
                    CssRule::Media(media) => {
                        let key = media
                            .query
                            .to_css_string(PrinterOptions::default())
                            .map_err(|e| anyhow!("{e}"))?;
                        match groups.iter_mut().find(|(k, _)| *k == key) {
                            Some((_, group)) => group.rules.0.extend(media.rules.0),
                            None => groups.push((key, media)),
                        }
                    }
                    other => kept.push(other),
                }
            }
            kept.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
            sheet.rules.0 = kept;

            print(&sheet, false)?
        };
        Ok(vec![asset.with_contents(code)])
    }
}

/// Minify CSS, dropping every comment including `/*! ... */` ones.
pub struct MinifyCss;

impl Transform for MinifyCss {
    fn name(&self) -> &'static str {
        "clean-css"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        let code = {
            let mut sheet = parse(asset.text()?, &asset.file_name())?;
            sheet.license_comments.clear();
            sheet
                .minify(MinifyOptions::default())
                .map_err(|e| anyhow!("{e}"))?;
            print(&sheet, true)?
        };
        Ok(vec![asset.with_contents(code)])
    }
}

fn parse<'i>(css: &'i str, filename: &str) -> Result<StyleSheet<'i>> {
    StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))
}

fn print(sheet: &StyleSheet<'_>, minify: bool) -> Result<String> {
    let out = sheet
        .to_css(PrinterOptions {
            minify,
            targets: browser_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(out.code)
}

/// Roughly the "defaults" browser query: current evergreen browsers plus the
/// Firefox ESR and the last two Safari majors.
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        android: Some(version(100, 0)),
        chrome: Some(version(100, 0)),
        edge: Some(version(100, 0)),
        firefox: Some(version(91, 0)),
        ios_saf: Some(version(14, 0)),
        opera: Some(version(86, 0)),
        safari: Some(version(14, 0)),
        samsung: Some(version(16, 0)),
        ..Browsers::default()
    })
}

fn version(major: u32, minor: u32) -> u32 {
    (major << 16) | (minor << 8)
}
