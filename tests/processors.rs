mod common;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetpipe::alerts::notifier_for;
use assetpipe::chain::{
    ChainExecutor, ChainMode, ChainStep, FileStatus, ProcessorChain, SkipReason,
};
use assetpipe::config::ConfigFile;
use assetpipe::fs::RealFileSystem;
use assetpipe::server::{NullSink, ReloadEvent};
use assetpipe::transform::fonts::{Sfnt, woff};
use assetpipe::transform::scripts::MinifyJs;
use assetpipe::transform::{Asset, Transform};
use assetpipe::types::AssetCategory;
use common::{
    ConfigBuilder, Project, RecordingNotifier, RecordingReloadSink, set_mtime, tiny_png, tiny_ttf,
    with_timeout,
};

const VARS: &str = "$accent: #ff0000;\n";

const MAIN_SCSS: &str = r#"@import "vars";

.header {
  color: $accent;
  .title { font-weight: bold; }
}

@media (max-width: 600px) {
  .header { color: black; }
}

.footer { color: blue; }

@media (max-width: 600px) {
  .footer { color: green; }
}
"#;

fn status_of<'a>(
    report: &'a assetpipe::chain::CategoryReport,
    file_name: &str,
) -> &'a FileStatus {
    &report
        .outcomes
        .iter()
        .find(|o| o.source.ends_with(file_name))
        .unwrap_or_else(|| panic!("no outcome for {file_name}"))
        .status
}

#[tokio::test]
async fn styles_compile_group_media_and_write_maps() {
    let project = Project::new();
    project.write("src/assets/scss/_vars.scss", VARS);
    project.write("src/assets/scss/main.scss", MAIN_SCSS);

    let sink = RecordingReloadSink::new();
    let pipeline = project
        .pipeline(ConfigFile::stock())
        .with_reload_sink(Arc::new(sink.clone()));
    let report = with_timeout(pipeline.run_category(AssetCategory::Styles)).await;

    assert!(report.is_success(), "{:?}", report.failure_messages());
    assert_eq!(report.written(), 1);
    assert_eq!(
        status_of(&report, "_vars.scss"),
        &FileStatus::Skipped(SkipReason::NoOutput)
    );
    assert!(!project.exists("dist/assets/css/_vars.css"));

    let css = project.read("dist/assets/css/main.css");
    assert!(css.contains(".header .title"), "{css}");
    assert!(css.contains("red") || css.contains("#f00"), "{css}");
    assert!(css.trim_end().ends_with("/*# sourceMappingURL=main.css.map */"), "{css}");
    assert_eq!(css.matches("@media").count(), 1, "{css}");

    let min = project.read("dist/assets/css/main.min.css");
    assert_eq!(min.matches("@media").count(), 1, "{min}");
    assert!(min.trim_end().ends_with("/*# sourceMappingURL=main.min.css.map */"));
    assert!(min.len() < css.len());

    let map: serde_json::Value =
        serde_json::from_str(&project.read("dist/assets/css/main.css.map")).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "main.css");
    assert_eq!(map["sources"][0], "main.scss");
    assert!(project.exists("dist/assets/css/main.min.css.map"));

    let events = sink.events();
    assert!(events.contains(&ReloadEvent::Inject {
        path: "assets/css/main.css".to_string()
    }));
    assert!(events.contains(&ReloadEvent::Inject {
        path: "assets/css/main.min.css".to_string()
    }));
}

#[tokio::test]
async fn scripts_are_minified_with_map_reference() {
    let project = Project::new();
    project.write(
        "src/assets/js/app.js",
        "function add(first, second) {\n    return first + second;\n}\n\nconsole.log(add(1, 2));\n",
    );
    project.write("src/assets/js/vendor/lib.js", "var unused = 1;\n");

    let pipeline = project.pipeline(ConfigFile::stock());
    let report = with_timeout(pipeline.run_category(AssetCategory::Scripts)).await;

    assert!(report.is_success(), "{:?}", report.failure_messages());
    assert_eq!(report.outcomes.len(), 1);
    assert!(!project.exists("dist/assets/js/app.js"));
    assert!(!project.exists("dist/assets/js/vendor/lib.min.js"));

    let js = project.read("dist/assets/js/app.min.js");
    assert!(js.contains("//# sourceMappingURL=app.min.js.map"), "{js}");
    assert!(!js.contains("    return"), "{js}");
    assert!(project.exists("dist/assets/js/app.min.js.map"));
}

const MODERN_JS: &str = r#"const defaults = { retries: 1 };

async function load(url, options) {
    const { retries, ...rest } = options ?? defaults;
    const response = await fetch(url, { ...rest, retries });
    return response?.ok ?? false;
}

load("/api/items", { cache: "no-store" });
"#;

const MODULE_JS: &str = r#"import { helper } from "./util.js";

export function render(items) {
    return items.map((item) => helper(item));
}
"#;

#[tokio::test]
async fn modern_scripts_and_modules_are_minified() {
    let project = Project::new();
    project.write("src/assets/js/modern.js", MODERN_JS);
    project.write("src/assets/js/mod.js", MODULE_JS);

    let pipeline = project.pipeline(ConfigFile::stock());
    let report = with_timeout(pipeline.run_category(AssetCategory::Scripts)).await;

    assert!(report.is_success(), "{:?}", report.failure_messages());
    assert_eq!(report.written(), 2);

    let modern = project.read("dist/assets/js/modern.min.js");
    assert!(modern.contains("async function"), "{modern}");
    assert!(modern.contains("??"), "{modern}");
    assert!(!modern.contains("    const"), "{modern}");

    let module = project.read("dist/assets/js/mod.min.js");
    assert!(module.contains("from\"./util.js\""), "{module}");
    assert!(module.contains("as render"), "{module}");
}

/// Passes assets through unchanged, except `target`, on which it panics.
struct PanicsOn(&'static str);

impl Transform for PanicsOn {
    fn name(&self) -> &'static str {
        "fragile"
    }

    fn apply(&self, asset: Asset) -> anyhow::Result<Vec<Asset>> {
        if asset.file_name() == self.0 {
            panic!("cannot handle {}", self.0);
        }
        Ok(vec![asset])
    }
}

#[test]
fn a_panicking_step_fails_only_its_own_file() {
    let project = Project::new();
    project.write("src/assets/js/broken.js", "var a = 1;\n");
    project.write("src/assets/js/app.js", "function add(a, b) {\n    return a + b;\n}\n");

    let cfg = ConfigFile::stock();
    let chain = ProcessorChain {
        category: AssetCategory::Scripts,
        mode: ChainMode::PerFile,
        branches: vec![vec![
            ChainStep::Transform(Arc::new(PanicsOn("broken.js"))),
            ChainStep::Transform(Arc::new(MinifyJs)),
            ChainStep::Write { source_map: false },
        ]],
    };
    let executor = ChainExecutor::new(
        &RealFileSystem,
        project.root(),
        cfg.table().dist_root(),
        cfg.table().get(AssetCategory::Scripts),
        &NullSink,
    );
    let report = executor.run(&chain);

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.fatal.is_none());
    assert!(matches!(
        status_of(&report, "broken.js"),
        FileStatus::Failed { step, message }
            if step == "fragile" && message.contains("cannot handle broken.js")
    ));
    assert!(matches!(status_of(&report, "app.js"), FileStatus::Written(_)));
    assert!(project.exists("dist/assets/js/app.js"));
    assert!(!project.exists("dist/assets/js/broken.js"));
}

#[tokio::test]
async fn markup_collapses_whitespace_and_requests_reload() {
    let project = Project::new();
    project.write(
        "src/index.html",
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Home</title>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>\n",
    );
    project.write("src/partials/footer.html", "<footer></footer>");

    let sink = RecordingReloadSink::new();
    let pipeline = project
        .pipeline(ConfigFile::stock())
        .with_reload_sink(Arc::new(sink.clone()));
    let report = with_timeout(pipeline.run_category(AssetCategory::Markup)).await;

    assert_eq!(report.written(), 1);
    let html = project.read("dist/index.html");
    assert!(html.contains("<p>Hello</p>"), "{html}");
    assert!(!html.contains("\n    <p>"), "{html}");
    assert!(!project.exists("dist/partials/footer.html"));
    assert_eq!(
        sink.events(),
        vec![ReloadEvent::Reload {
            path: "index.html".to_string()
        }]
    );
}

#[tokio::test]
async fn sprite_folds_icons_into_symbols() {
    let project = Project::new();
    let arrow = project.write(
        "src/assets/images/sprite/arrow.svg",
        r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:sodipodi="http://sodipodi.sourceforge.net" viewBox="0 0 24 24">
  <!-- exported -->
  <sodipodi:namedview id="base"/>
  <path d="M0 12h24" fill="#000" stroke="red"/>
</svg>"##,
    );
    let close = project.write(
        "src/assets/images/sprite/close.svg",
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="16px" height="16">
  <path d="M0 0l16 16" style="fill:red"/>
  <text x="0"> </text>
</svg>"#,
    );
    set_mtime(&arrow, -60);
    set_mtime(&close, -60);

    let pipeline = project.pipeline(ConfigFile::stock());
    let report = with_timeout(pipeline.run_category(AssetCategory::VectorSprite)).await;
    assert!(report.is_success(), "{:?}", report.failure_messages());
    assert_eq!(report.outcomes.len(), 1);

    let sprite = project.read("dist/assets/images/sprite/sprite.svg");
    let arrow_at = sprite.find(r#"<symbol id="arrow" viewBox="0 0 24 24">"#);
    let close_at = sprite.find(r#"<symbol id="close" viewBox="0 0 16 16">"#);
    assert!(arrow_at.is_some() && close_at.is_some(), "{sprite}");
    assert!(arrow_at < close_at);
    assert!(!sprite.contains("fill="), "{sprite}");
    assert!(!sprite.contains("stroke="), "{sprite}");
    assert!(!sprite.contains("style="), "{sprite}");
    assert!(!sprite.contains("sodipodi"), "{sprite}");
    assert!(!sprite.contains("<text"), "{sprite}");

    // The raster category never sees sprite icons.
    let images = with_timeout(pipeline.run_category(AssetCategory::RasterImages)).await;
    assert!(images.outcomes.is_empty());

    let again = with_timeout(pipeline.run_category(AssetCategory::VectorSprite)).await;
    assert_eq!(
        again.outcomes[0].status,
        FileStatus::Skipped(SkipReason::UpToDate)
    );
}

#[tokio::test]
async fn only_stale_images_are_reprocessed() {
    let project = Project::new();
    let fresh = project.write("src/assets/images/logo.png", tiny_png());
    let old = project.write("src/assets/images/icons/old.png", tiny_png());
    set_mtime(&fresh, -100);
    set_mtime(&old, -100);

    let kept_webp = project.write("dist/assets/images/icons/old.webp", "keep");
    let kept_png = project.write("dist/assets/images/icons/old.png", "keep");
    set_mtime(&kept_webp, -10);
    set_mtime(&kept_png, -10);

    let pipeline = project.pipeline(ConfigFile::stock());
    let report = with_timeout(pipeline.run_category(AssetCategory::RasterImages)).await;

    assert!(report.is_success(), "{:?}", report.failure_messages());
    assert!(matches!(status_of(&report, "logo.png"), FileStatus::Written(_)));
    assert_eq!(
        status_of(&report, "old.png"),
        &FileStatus::Skipped(SkipReason::UpToDate)
    );

    let webp = std::fs::read(project.root().join("dist/assets/images/logo.webp")).unwrap();
    assert_eq!(&webp[0..4], b"RIFF");
    assert_eq!(&webp[8..12], b"WEBP");
    let png = std::fs::read(project.root().join("dist/assets/images/logo.png")).unwrap();
    assert!(image::load_from_memory(&png).is_ok());

    assert_eq!(project.read("dist/assets/images/icons/old.webp"), "keep");
    assert_eq!(project.read("dist/assets/images/icons/old.png"), "keep");
}

#[tokio::test]
async fn fonts_fan_out_into_every_web_format() {
    let project = Project::new();
    let ttf = tiny_ttf();
    project.write("src/assets/fonts/tiny.ttf", &ttf);
    project.write("src/assets/fonts/legacy.eot", "opaque eot");

    let pipeline = project.pipeline(ConfigFile::stock());
    let report = with_timeout(pipeline.run_category(AssetCategory::Fonts)).await;
    assert!(report.is_success(), "{:?}", report.failure_messages());

    let out = |name: &str| std::fs::read(project.root().join("dist/assets/fonts").join(name)).unwrap();

    let written_ttf = out("tiny.ttf");
    assert_eq!(Sfnt::parse(&written_ttf).unwrap(), Sfnt::parse(&ttf).unwrap());

    let woff_bytes = out("tiny.woff");
    assert_eq!(&woff_bytes[0..4], b"wOFF");
    assert_eq!(woff::decode(&woff_bytes).unwrap(), Sfnt::parse(&ttf).unwrap());

    let woff2_bytes = out("tiny.woff2");
    assert_eq!(&woff2_bytes[0..4], b"wOF2");

    let eot = out("tiny.eot");
    assert_eq!(u32::from_le_bytes(eot[0..4].try_into().unwrap()) as usize, eot.len());
    assert_eq!(&eot[34..36], &[0x4C, 0x50]);
    assert!(eot.ends_with(&written_ttf));

    assert_eq!(out("legacy.eot"), b"opaque eot");
}

#[tokio::test]
async fn fonts_are_skipped_once_converted() {
    let project = Project::new();
    let source = project.write("src/assets/fonts/tiny.ttf", tiny_ttf());
    set_mtime(&source, -100);

    let pipeline = project.pipeline(ConfigFile::stock());
    let first = with_timeout(pipeline.run_category(AssetCategory::Fonts)).await;
    assert!(matches!(status_of(&first, "tiny.ttf"), FileStatus::Written(paths) if paths.len() == 4));

    let second = with_timeout(pipeline.run_category(AssetCategory::Fonts)).await;
    assert_eq!(
        status_of(&second, "tiny.ttf"),
        &FileStatus::Skipped(SkipReason::UpToDate)
    );
    assert_eq!(second.written(), 0);
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

#[tokio::test]
async fn rebuilding_unchanged_sources_is_byte_identical() {
    let project = Project::new();
    project.write("src/index.html", "<html>\n  <body>\n    <p>hello</p>\n  </body>\n</html>\n");
    project.write("src/assets/scss/_vars.scss", VARS);
    project.write("src/assets/scss/main.scss", MAIN_SCSS);
    project.write("src/assets/js/app.js", "function add(a, b) {\n    return a + b;\n}\n");
    project.write("src/assets/images/logo.png", tiny_png());
    project.write(
        "src/assets/images/sprite/star.svg",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M5 0l5 10H0z"/></svg>"#,
    );
    project.write("src/assets/fonts/tiny.ttf", tiny_ttf());

    let pipeline = project.pipeline(ConfigFile::stock());
    let first = with_timeout(pipeline.build()).await.unwrap();
    assert!(first.is_success());
    let before = snapshot(&project.root().join("dist"));

    let second = with_timeout(pipeline.build()).await.unwrap();
    assert!(second.is_success());
    let after = snapshot(&project.root().join("dist"));

    assert_eq!(before.len(), 14, "{:?}", before.keys().collect::<Vec<_>>());
    assert_eq!(
        before.keys().collect::<Vec<_>>(),
        after.keys().collect::<Vec<_>>()
    );
    for (path, bytes) in &before {
        assert!(after[path] == *bytes, "{} changed between builds", path.display());
    }
}

#[tokio::test]
async fn one_broken_stylesheet_does_not_stop_the_others() {
    let project = Project::new();
    project.write("src/assets/scss/broken.scss", ".a { color: $undefined; }\n");
    project.write("src/assets/scss/good.scss", ".b { color: blue; }\n");

    let notifier = RecordingNotifier::new();
    let pipeline = project
        .pipeline(ConfigFile::stock())
        .with_notifier(Arc::new(notifier.clone()));
    let report = with_timeout(pipeline.run_category(AssetCategory::Styles)).await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.written(), 1);
    assert!(matches!(
        status_of(&report, "broken.scss"),
        FileStatus::Failed { step, .. } if step == "sass"
    ));
    assert!(project.exists("dist/assets/css/good.min.css"));
    assert!(!project.exists("dist/assets/css/broken.css"));

    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "CSS Error");
    assert!(alerts[0].message.starts_with("Error: "), "{}", alerts[0].message);
    assert!(alerts[0].message.contains("broken.scss"));
}

#[tokio::test]
async fn build_errors_reach_the_browser_when_enabled() {
    let project = Project::new();
    project.write("src/assets/js/bad.js", "function (");

    let sink = Arc::new(RecordingReloadSink::new());
    let cfg = ConfigBuilder::new().build();
    let pipeline = project
        .pipeline(cfg.clone())
        .with_reload_sink(sink.clone())
        .with_notifier(notifier_for(cfg.features(), sink.clone()));
    let report = with_timeout(pipeline.build()).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed(), 1);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        ReloadEvent::Error { title, .. } if title == "JS Error"
    )));
}

#[tokio::test]
async fn build_errors_stay_in_the_log_when_disabled() {
    let project = Project::new();
    project.write("src/assets/js/bad.js", "function (");

    let sink = Arc::new(RecordingReloadSink::new());
    let cfg = ConfigBuilder::new().error_notifications(false).build();
    let pipeline = project
        .pipeline(cfg.clone())
        .with_reload_sink(sink.clone())
        .with_notifier(notifier_for(cfg.features(), sink.clone()));
    let report = with_timeout(pipeline.build()).await.unwrap();

    assert_eq!(report.failed(), 1);
    assert!(sink.events().iter().all(|e| !matches!(e, ReloadEvent::Error { .. })));
}

#[tokio::test]
async fn disabled_category_produces_an_empty_report() {
    let project = Project::new();
    project.write("src/index.html", "<p>hi</p>");

    let pipeline = project.pipeline(ConfigBuilder::new().disable("html").build());
    let report = with_timeout(pipeline.run_category(AssetCategory::Markup)).await;

    assert!(report.outcomes.is_empty());
    assert!(!project.exists("dist/index.html"));
}
