use assetpipe::cli::{CliArgs, Command};
use assetpipe::types::AssetCategory;
use clap::Parser;

#[test]
fn bare_invocation_means_watch() {
    let args = CliArgs::try_parse_from(["assetpipe"]).unwrap();
    assert_eq!(args.command, None);
    assert!(args.config.is_none());
}

#[test]
fn category_commands_map_to_categories() {
    let cases = [
        ("html", AssetCategory::Markup),
        ("css", AssetCategory::Styles),
        ("js", AssetCategory::Scripts),
        ("images", AssetCategory::RasterImages),
        ("svgsprite", AssetCategory::VectorSprite),
        ("fonts", AssetCategory::Fonts),
    ];
    for (name, category) in cases {
        let args = CliArgs::try_parse_from(["assetpipe", name]).unwrap();
        assert_eq!(args.command.and_then(Command::category), Some(category), "{name}");
        assert_eq!(name.parse::<AssetCategory>().unwrap(), category);
    }
}

#[test]
fn composite_commands_have_no_category() {
    for name in ["clean", "build", "watch", "paths"] {
        let args = CliArgs::try_parse_from(["assetpipe", name]).unwrap();
        assert_eq!(args.command.and_then(Command::category), None, "{name}");
    }
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let args =
        CliArgs::try_parse_from(["assetpipe", "build", "--config", "site/Assetpipe.toml", "--log-level", "debug"])
            .unwrap();
    assert_eq!(args.command, Some(Command::Build));
    assert_eq!(args.config.as_deref(), Some("site/Assetpipe.toml"));
    assert!(args.log_level.is_some());
}

#[test]
fn unknown_command_is_rejected() {
    assert!(CliArgs::try_parse_from(["assetpipe", "sass"]).is_err());
    assert!("sass".parse::<AssetCategory>().is_err());
}
