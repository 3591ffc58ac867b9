// src/lib.rs

pub mod alerts;
pub mod chain;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod server;
pub mod transform;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::alerts::notifier_for;
use crate::chain::CategoryReport;
use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, default_config_path, load_or_stock};
use crate::dag::BuildGraph;
use crate::engine::{Pipeline, watch_and_serve};
use crate::errors::PipelineError;
use crate::fs::RealFileSystem;
use crate::server::{LiveReloadHub, ReloadSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or the stock layout)
/// - the pipeline with its reload sink and error notifier
/// - the chosen command: one category, clean, build, watch or a dry run
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, explicit) = match &args.config {
        Some(path) => (PathBuf::from(path), true),
        None => (default_config_path(), false),
    };
    let cfg = load_or_stock(&config_path, explicit)?;
    let root = config_root_dir(&config_path);
    let command = args.command.unwrap_or(Command::Watch);
    debug!(?command, root = %root.display(), "resolved command");

    let hub = LiveReloadHub::default();
    let sink: Arc<dyn ReloadSink> = Arc::new(hub.clone());
    let pipeline = Pipeline::new(root, cfg.clone(), Arc::new(RealFileSystem))
        .with_reload_sink(Arc::clone(&sink))
        .with_notifier(notifier_for(cfg.features(), sink));

    match command {
        Command::Paths => print_paths(&cfg)?,
        Command::Clean => pipeline.clean().await?,
        Command::Build => {
            let report = pipeline.build().await?;
            print_summary(&report.categories);
        }
        Command::Watch => watch_and_serve(pipeline, hub).await?,
        Command::Html
        | Command::Css
        | Command::Js
        | Command::Images
        | Command::Svgsprite
        | Command::Fonts => {
            let report = run_single(&pipeline, command).await?;
            print_summary(&[report]);
        }
    }
    Ok(())
}

async fn run_single(pipeline: &Pipeline, command: Command) -> Result<CategoryReport> {
    let category = command.category().ok_or_else(|| {
        PipelineError::ConfigError(format!("{command:?} is not a category command"))
    })?;
    if !pipeline.config().table().get(category).enabled {
        return Err(PipelineError::ConfigError(format!(
            "category {category} is disabled in the configuration"
        ))
        .into());
    }
    Ok(pipeline.run_category(category).await)
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Assetpipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Assetpipe.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_summary(reports: &[CategoryReport]) {
    for report in reports {
        println!(
            "{:<10} {} written, {} skipped, {} failed",
            report.category,
            report.written(),
            report.skipped(),
            report.failed()
        );
        for message in report.failure_messages() {
            println!("  ! {message}");
        }
    }
}

/// Dry run: print the resolved path table and the build stages.
fn print_paths(cfg: &ConfigFile) -> Result<()> {
    let table = cfg.table();
    println!("assetpipe paths");
    println!("  src  = {}", table.src_root().display());
    println!("  dist = {}", table.dist_root().display());
    println!();

    for spec in table.specs() {
        let state = if spec.enabled { "" } else { " (disabled)" };
        println!("  {}{state}", spec.category);
        println!("      src:   {:?}", spec.sources);
        if !spec.exclude.is_empty() {
            println!("      excl:  {:?}", spec.exclude);
        }
        println!("      base:  {}", spec.base.display());
        println!("      dest:  {}", spec.dest.display());
        println!("      watch: {:?}", spec.watch);
        if spec.use_hash {
            println!("      use_hash: true");
        }
    }
    println!();

    let graph = BuildGraph::full(&table.enabled_categories());
    println!("build stages:");
    for (i, stage) in graph.stages()?.iter().enumerate() {
        let names: Vec<String> = stage.iter().map(ToString::to_string).collect();
        println!("  {}. {}", i + 1, names.join(", "));
    }

    println!();
    println!(
        "server: http://127.0.0.1:{} (notify on connect: {})",
        cfg.server().port,
        cfg.server().notify
    );
    debug!("dry-run complete (no execution)");
    Ok(())
}
