mod common;

use std::io::Read;
use std::path::{Path, PathBuf};

use assetpipe::transform::fonts::woff2::{ARBITRARY_TAG, KNOWN_TAGS, write_base128};
use assetpipe::transform::fonts::sfnt::SfntTable;
use assetpipe::transform::fonts::{ConvertFont, FontFormat, Sfnt, Woff2FromTtf, woff, woff2};
use assetpipe::transform::markup::MinifyHtml;
use assetpipe::transform::scripts::MinifyJs;
use assetpipe::transform::sourcemap::reference_comment;
use assetpipe::transform::styles::{CompileScss, MinifyCss};
use assetpipe::transform::svg::{SpriteSymbol, SvgSymbolSprite, clean_document, symbol_id};
use assetpipe::transform::{Asset, Combine, Transform};
use common::{multi_table_ttf, tiny_ttf};
use minify_js::TopLevelMode;

fn asset(rel: &str, contents: impl Into<Vec<u8>>) -> Asset {
    Asset::new(rel, PathBuf::from("/proj/src").join(rel), contents.into())
}

#[test]
fn clean_document_strips_editor_noise_but_keeps_paint() {
    let svg = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" inkscape:version="1.2" class="">
  <!-- Generator: Sketch -->
  <title>logo</title>
  <metadata><rdf:RDF></rdf:RDF></metadata>
  <path d="M0 0h10v10z" fill="#c00"/>
</svg>"##;
    let cleaned = clean_document(svg);

    assert!(cleaned.starts_with("<svg"), "{cleaned}");
    for gone in ["<?xml", "DOCTYPE", "Generator", "<title", "metadata", "inkscape", "class="] {
        assert!(!cleaned.contains(gone), "{gone} survived: {cleaned}");
    }
    assert!(cleaned.contains(r##"fill="#c00""##));
    assert!(cleaned.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
}

#[test]
fn symbol_without_sizing_has_no_view_box() {
    let symbol = SpriteSymbol::from_svg("dot", r#"<svg><circle r="1"/></svg>"#).unwrap();
    assert_eq!(symbol.view_box, None);
    assert_eq!(symbol.body, r#"<circle r="1"/>"#);
}

#[test]
fn symbol_requires_an_svg_root() {
    let err = SpriteSymbol::from_svg("broken", "<g></g>").unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn symbol_ids_come_from_file_stems() {
    assert_eq!(symbol_id(Path::new("arrow left.svg")), "arrow-left");
    assert_eq!(symbol_id(Path::new("icons/close_x.svg")), "close_x");
}

#[test]
fn sprite_rejects_duplicate_ids() {
    let sprite = SvgSymbolSprite::new();
    let err = sprite
        .combine(vec![
            asset("a/icon.svg", "<svg></svg>"),
            asset("b/icon.svg", "<svg></svg>"),
        ])
        .unwrap_err();
    assert!(err.to_string().contains("icon"));
}

#[test]
fn sprite_output_has_fixed_name() {
    let sprite = SvgSymbolSprite::new();
    let out = sprite
        .combine(vec![asset("b.svg", "<svg></svg>"), asset("a.svg", "<svg></svg>")])
        .unwrap();
    assert_eq!(out.rel_path, PathBuf::from("sprite/sprite.svg"));
    let text = out.text().unwrap();
    assert!(text.find(r#"id="a""#).unwrap() < text.find(r#"id="b""#).unwrap());
}

#[test]
fn scss_partials_produce_nothing() {
    assert!(CompileScss.apply(asset("_mixins.scss", "$x: 1;")).unwrap().is_empty());

    let out = CompileScss
        .apply(asset("site.scss", "$c: red; a { b { color: $c; } }"))
        .unwrap();
    assert_eq!(out[0].rel_path, PathBuf::from("site.css"));
    assert!(out[0].text().unwrap().contains("a b"));
}

#[test]
fn minified_css_drops_license_comments() {
    let out = MinifyCss
        .apply(asset("a.css", "/*! keep me? */\n.a {\n  color: #ff0000;\n}\n"))
        .unwrap();
    let css = out[0].text().unwrap();
    assert!(!css.contains("keep me"), "{css}");
    assert_eq!(css.trim(), ".a{color:red}");
}

#[test]
fn map_trailers_only_for_css_and_js() {
    assert_eq!(
        reference_comment("js", "app.min.js.map").as_deref(),
        Some("\n//# sourceMappingURL=app.min.js.map\n")
    );
    assert!(reference_comment("html", "x.map").is_none());
}

#[test]
fn asset_extensions_are_lower_cased() {
    assert_eq!(asset("Photo.JPG", "").extension().as_deref(), Some("jpg"));
    assert_eq!(asset("README", "").extension(), None);
}

#[test]
fn sfnt_rejects_woff_and_truncated_input() {
    let ttf = tiny_ttf();
    let font = Sfnt::parse(&ttf).unwrap();
    let woff_bytes = woff::encode(&font).unwrap();

    assert!(Sfnt::parse(&woff_bytes).is_err());
    assert!(Sfnt::parse(&ttf[..8]).is_err());
    assert!(Sfnt::parse(&ttf[..40]).is_err());
}

#[test]
fn serialized_font_has_valid_whole_file_checksum() {
    let bytes = tiny_ttf();
    let sum = bytes.chunks(4).fold(0u32, |acc, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        acc.wrapping_add(u32::from_be_bytes(word))
    });
    assert_eq!(sum, 0xB1B0_AFBA);
}

#[test]
fn woff2_directory_uses_known_tag_indices() {
    let font = Sfnt::parse(&tiny_ttf()).unwrap();
    let bytes = woff2::encode(&font).unwrap();

    assert_eq!(&bytes[0..4], b"wOF2");
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize, bytes.len());
    // `OS/2` sorts first: index 6, then its 96-byte length.
    assert_eq!(&bytes[48..50], &[0x06, 0x60]);
    // `glyf` follows with the null transform bits set.
    assert_eq!(bytes[50], 0x0A | 0xC0);
}

fn read_base128(bytes: &[u8], at: &mut usize) -> u32 {
    let mut value = 0u32;
    loop {
        let byte = bytes[*at];
        *at += 1;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return value;
        }
    }
}

/// Read back a WOFF2 file whose tables all use the null transform.
fn decode_null_woff2(bytes: &[u8]) -> Sfnt {
    let be16 = |at: usize| u16::from_be_bytes(bytes[at..at + 2].try_into().unwrap());
    let be32 = |at: usize| u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap());

    assert_eq!(&bytes[0..4], b"wOF2");
    let flavor = be32(4);
    let num_tables = be16(12) as usize;
    assert_eq!(be16(14), 0, "reserved");
    let compressed_len = be32(20) as usize;
    assert_eq!(&bytes[28..48], &[0u8; 20], "metadata and private blocks");

    let mut at = 48;
    let mut directory = Vec::new();
    for _ in 0..num_tables {
        let flags = bytes[at];
        at += 1;
        let tag: [u8; 4] = if flags & 0x3F == ARBITRARY_TAG {
            let tag = bytes[at..at + 4].try_into().unwrap();
            at += 4;
            tag
        } else {
            *KNOWN_TAGS[(flags & 0x3F) as usize]
        };
        let version = flags >> 6;
        if &tag == b"glyf" || &tag == b"loca" {
            assert_eq!(version, 3, "{tag:?} must carry the null transform");
        } else {
            assert_eq!(version, 0, "{tag:?}");
        }
        directory.push((tag, read_base128(bytes, &mut at) as usize));
    }

    let mut stream = Vec::new();
    brotli::Decompressor::new(&bytes[at..at + compressed_len], 4096)
        .read_to_end(&mut stream)
        .unwrap();
    assert!(bytes[at + compressed_len..].iter().all(|b| *b == 0), "only padding after the stream");

    let mut offset = 0;
    let tables = directory
        .into_iter()
        .map(|(tag, len)| {
            let data = stream[offset..offset + len].to_vec();
            offset += len;
            SfntTable { tag, data }
        })
        .collect();
    assert_eq!(offset, stream.len());
    Sfnt { flavor, tables }
}

#[test]
fn woff2_restores_every_table_of_a_full_font() {
    let ttf = multi_table_ttf();
    let font = Sfnt::parse(&ttf).unwrap();
    let bytes = woff2::encode(&font).unwrap();

    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize, bytes.len());
    assert_eq!(
        u32::from_be_bytes(bytes[16..20].try_into().unwrap()) as usize,
        ttf.len(),
        "totalSfntSize"
    );
    assert_eq!(u16::from_be_bytes(bytes[24..26].try_into().unwrap()), 1, "major version");

    let decoded = decode_null_woff2(&bytes);
    assert_eq!(decoded.tables.len(), 11);
    assert_eq!(decoded, font);
    assert_eq!(decoded.to_bytes(), ttf);
    assert_eq!(decoded.table(b"glyf").map(<[u8]>::len), Some(420));
    assert_eq!(decoded.table(b"DSIG"), Some(&[0u8, 0, 0, 1, 0, 0, 0, 0][..]));
}

#[test]
fn base128_groups_seven_bits() {
    let encode = |value| {
        let mut out = Vec::new();
        write_base128(&mut out, value);
        out
    };
    assert_eq!(encode(0), vec![0x00]);
    assert_eq!(encode(127), vec![0x7F]);
    assert_eq!(encode(128), vec![0x81, 0x00]);
    assert_eq!(encode(16_384), vec![0x81, 0x80, 0x00]);
}

#[test]
fn font_conversion_passes_through_unhandled_inputs() {
    let convert = ConvertFont::new([FontFormat::Woff]);
    let svg = asset("icons.svg", "<svg/>");
    let out = convert.apply(svg).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].rel_path, PathBuf::from("icons.svg"));

    assert!(Woff2FromTtf.apply(asset("a.woff", vec![0u8; 4])).unwrap().is_empty());
}

#[test]
fn woff_input_converts_back_to_truetype() {
    let ttf = tiny_ttf();
    let woff_bytes = woff::encode(&Sfnt::parse(&ttf).unwrap()).unwrap();

    let out = ConvertFont::new([FontFormat::Ttf])
        .apply(asset("fonts/Inter.woff", woff_bytes))
        .unwrap();
    assert_eq!(out[0].rel_path, PathBuf::from("fonts/Inter.ttf"));
    assert_eq!(out[0].contents, ttf);
}

#[test]
fn scripts_with_imports_or_exports_parse_as_modules() {
    let module = b"import { helper } from './util.js';\nexport function render(x) { return helper(x); }\n";
    let export_only = b"const a = 1;\n  export const b = a;\n";
    let script = b"var exported = 1;\nfunction importData() { return exported; }\nimportData();\nimport('./lazy.js');\n";

    assert_eq!(MinifyJs::top_level_mode(module), TopLevelMode::Module);
    assert_eq!(MinifyJs::top_level_mode(export_only), TopLevelMode::Module);
    assert_eq!(MinifyJs::top_level_mode(script), TopLevelMode::Global);
}

#[test]
fn module_exports_survive_minification() {
    let source = "import { helper } from \"./util.js\";\n\nexport const VERSION = \"1\";\n\nexport function render(items) {\n    return items.map((item) => helper(item));\n}\n";
    let out = MinifyJs.apply(asset("mod.js", source)).unwrap();
    let js = String::from_utf8(out[0].contents.clone()).unwrap();

    assert!(js.contains("from\"./util.js\""), "{js}");
    assert!(js.contains("as render"), "{js}");
    assert!(js.contains("as VERSION"), "{js}");
    assert!(js.len() < source.len());
}

#[test]
fn markup_only_collapses_whitespace() {
    let html = r#"<!DOCTYPE html>
<html>
<head>
  <title>Hi</title>
</head>
<body>
  <!-- nav -->
  <p   class="a b"   id="x">  {{ user.name }}  </p>
  <input type="text" name="q">
</body>
</html>
"#;
    let out = MinifyHtml::collapse_whitespace().apply(asset("index.html", html)).unwrap();
    let out = String::from_utf8(out[0].contents.clone()).unwrap();

    assert!(out.starts_with("<!DOCTYPE html>"), "{out}");
    assert!(out.contains("<html>") && out.contains("<head>"), "{out}");
    assert!(out.contains("</p>") && out.contains("</body>"), "{out}");
    assert!(out.contains("<!-- nav -->"), "{out}");
    assert!(out.contains("{{ user.name }}"), "{out}");
    assert!(out.contains("a b"), "{out}");
    assert!(out.contains(" id="), "{out}");
    assert!(out.contains("type=text") || out.contains(r#"type="text""#), "{out}");
    assert!(!out.contains("  "), "{out}");
    assert!(out.len() < html.len());
}
