// src/transform/svg.rs

//! Regex-level SVG cleanup and the `<symbol>` sprite builder.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Result, anyhow, bail};
use regex::{Captures, Regex};

use super::{Asset, Combine};

/// Editor namespaces whose elements and attributes are dropped.
const EDITOR_PREFIXES: &[&str] = &["sodipodi", "inkscape", "sketch", "serif", "rdf", "cc", "dc"];

static XML_DECL: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)<\?xml.*?\?>"));
static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)<!DOCTYPE[^>]*>"));
static COMMENT: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)<!--.*?-->"));
static META_ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["metadata", "title", "desc"]
        .iter()
        .map(|tag| re(&format!(r"(?s)<{tag}\b[^>]*/>|<{tag}\b[^>]*>.*?</{tag}\s*>")))
        .collect()
});
static NS_ELEMENT_EMPTY: LazyLock<Regex> =
    LazyLock::new(|| re(r"<([A-Za-z][\w.-]*):[\w.-]+\b[^>]*/>"));
static NS_ELEMENT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?s)<([A-Za-z][\w.-]*):([\w.-]+)\b[^>]*>.*?</[A-Za-z][\w.-]*:[\w.-]+\s*>"));
static NS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"\s+([A-Za-z][\w.-]*):([\w.-]+)\s*=\s*(?:"[^"]*"|'[^']*')"#)
});
static EMPTY_ATTR: LazyLock<Regex> = LazyLock::new(|| re(r#"\s+[\w:.-]+\s*=\s*(?:""|'')"#));
static PRESENTATION_ATTR: LazyLock<Regex> =
    LazyLock::new(|| re(r#"\s+(?:fill|stroke|style)\s*=\s*(?:"[^"]*"|'[^']*')"#));
static EMPTY_TEXT: LazyLock<Regex> = LazyLock::new(|| re(r"<text\b[^>]*>\s*</text\s*>"));
static SVG_ROOT: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)<svg\b([^>]*)>(.*)</svg\s*>"));
static ATTR: LazyLock<Regex> =
    LazyLock::new(|| re(r#"([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| re(r"\n\s*\n"));

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// Remove processing instructions, comments, metadata, editor-specific
/// markup and empty attributes. Presentation attributes are kept.
pub fn clean_document(svg: &str) -> String {
    let mut out = XML_DECL.replace_all(svg, "").into_owned();
    out = DOCTYPE.replace_all(&out, "").into_owned();
    out = strip_common(&out);
    BLANK_LINES.replace_all(out.trim(), "\n").into_owned()
}

fn strip_common(svg: &str) -> String {
    let mut out = COMMENT.replace_all(svg, "").into_owned();
    for meta in META_ELEMENTS.iter() {
        out = meta.replace_all(&out, "").into_owned();
    }
    out = NS_ELEMENT_EMPTY
        .replace_all(&out, |caps: &Captures| keep_unless_editor(caps, &caps[1]))
        .into_owned();
    out = NS_ELEMENT_PAIR
        .replace_all(&out, |caps: &Captures| keep_unless_editor(caps, &caps[1]))
        .into_owned();
    out = NS_ATTR
        .replace_all(&out, |caps: &Captures| {
            let prefix = &caps[1];
            if prefix == "xmlns" {
                keep_unless_editor(caps, &caps[2])
            } else {
                keep_unless_editor(caps, prefix)
            }
        })
        .into_owned();
    EMPTY_ATTR.replace_all(&out, "").into_owned()
}

fn keep_unless_editor(caps: &Captures, prefix: &str) -> String {
    if EDITOR_PREFIXES.contains(&prefix) {
        String::new()
    } else {
        caps[0].to_string()
    }
}

/// One `<symbol>` extracted from a standalone icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSymbol {
    pub id: String,
    pub view_box: Option<String>,
    pub body: String,
}

impl SpriteSymbol {
    pub fn from_svg(id: &str, svg: &str) -> Result<Self> {
        let cleaned = strip_common(svg);
        let caps = SVG_ROOT
            .captures(&cleaned)
            .ok_or_else(|| anyhow!("{id}: no <svg> root element"))?;
        let root_attrs = &caps[1];
        let view_box = attr(root_attrs, "viewBox").or_else(|| {
            let width = dimension(&attr(root_attrs, "width")?)?;
            let height = dimension(&attr(root_attrs, "height")?)?;
            Some(format!("0 0 {width} {height}"))
        });

        let body = PRESENTATION_ATTR.replace_all(&caps[2], "");
        let body = EMPTY_TEXT.replace_all(&body, "");
        let body = BLANK_LINES.replace_all(body.trim(), "\n").into_owned();

        Ok(Self {
            id: id.to_string(),
            view_box,
            body,
        })
    }

    fn render(&self) -> String {
        match &self.view_box {
            Some(vb) => format!(r#"<symbol id="{}" viewBox="{vb}">{}</symbol>"#, self.id, self.body),
            None => format!(r#"<symbol id="{}">{}</symbol>"#, self.id, self.body),
        }
    }
}

fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR.captures_iter(attrs)
        .find(|c| &c[1] == name)
        .and_then(|c| c.get(2).or_else(|| c.get(3)))
        .map(|m| m.as_str().trim().to_string())
}

/// `"24px"` -> `"24"`; percentages and other units do not size a viewBox.
fn dimension(raw: &str) -> Option<String> {
    let number = raw.trim().trim_end_matches("px");
    number.parse::<f64>().ok().map(|_| number.to_string())
}

/// `"arrow left.svg"` -> `"arrow-left"`.
pub fn symbol_id(rel_path: &std::path::Path) -> String {
    let stem = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

/// Fold every input SVG into a single `sprite/sprite.svg` of `<symbol>`s,
/// sorted by id.
pub struct SvgSymbolSprite {
    output: PathBuf,
}

impl SvgSymbolSprite {
    pub fn new() -> Self {
        Self {
            output: PathBuf::from("sprite/sprite.svg"),
        }
    }

    pub fn output(&self) -> &std::path::Path {
        &self.output
    }
}

impl Default for SvgSymbolSprite {
    fn default() -> Self {
        Self::new()
    }
}

impl Combine for SvgSymbolSprite {
    fn name(&self) -> &'static str {
        "svg-sprite"
    }

    fn combine(&self, assets: Vec<Asset>) -> Result<Asset> {
        let Some(first) = assets.first() else {
            bail!("no icons to combine");
        };
        let origin = first.origin.parent().map(PathBuf::from).unwrap_or_default();

        let mut symbols = Vec::with_capacity(assets.len());
        for asset in &assets {
            symbols.push(SpriteSymbol::from_svg(&symbol_id(&asset.rel_path), asset.text()?)?);
        }
        symbols.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = symbols.windows(2).find(|w| w[0].id == w[1].id) {
            bail!("duplicate sprite symbol id {:?}", pair[0].id);
        }

        let mut sprite = String::from(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
        );
        for symbol in &symbols {
            sprite.push_str(&symbol.render());
        }
        sprite.push_str("</svg>\n");

        Ok(Asset::new(self.output.clone(), origin, sprite.into_bytes()))
    }
}
