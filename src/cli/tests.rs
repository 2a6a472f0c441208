//! Unit tests for CLI commands

use crate::app::{App, AppOptions};
use crate::cli::{route_listing, Cli, Commands};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_serve_command_with_flags() {
    let cli = Cli::try_parse_from([
        "brrtpets",
        "serve",
        "--addr",
        "0.0.0.0:9090",
        "--ui-dir",
        "ui",
        "--seed",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            addr,
            config,
            ui_dir,
            seed,
        } => {
            assert_eq!(addr.as_deref(), Some("0.0.0.0:9090"));
            assert!(config.is_none());
            assert_eq!(ui_dir, Some(PathBuf::from("ui")));
            assert!(seed);
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_serve_config_short_flag() {
    let cli = Cli::try_parse_from(["brrtpets", "serve", "-c", "pets.yaml"]).unwrap();
    match cli.command {
        Commands::Serve { config, seed, .. } => {
            assert_eq!(config, Some(PathBuf::from("pets.yaml")));
            assert!(!seed);
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_routes_and_docs_parse() {
    assert!(matches!(
        Cli::try_parse_from(["brrtpets", "routes"]).unwrap().command,
        Commands::Routes
    ));
    assert!(matches!(
        Cli::try_parse_from(["brrtpets", "docs"]).unwrap().command,
        Commands::Docs
    ));
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["brrtpets", "generate"]).is_err());
}

#[test]
fn test_route_listing() {
    let app = App::build(&AppOptions::default()).unwrap();
    let lines = route_listing(&app);
    assert!(lines
        .iter()
        .any(|l| l.starts_with("PATCH") && l.contains("/pet/:id") && l.ends_with("patch_pet")));
    assert_eq!(lines.len(), app.router.routes().len());
}
