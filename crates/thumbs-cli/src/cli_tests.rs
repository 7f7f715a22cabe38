use super::{Cli, run};
use crate::commands::{Commands, ConfigCommands};
use crate::handlers;
use clap::Parser;
use std::path::Path;
use thumbs_core::ThumbsConfig;

#[test]
fn test_parse_render() {
    let cli = Cli::try_parse_from([
        "thumbs", "render", "thumbnail", "100x50", "a/b.png", "--out", "/tmp/x.png",
    ])
    .unwrap();

    match cli.command {
        Commands::Render {
            action,
            geometry,
            source,
            out,
        } => {
            assert_eq!(action, "thumbnail");
            assert_eq!(geometry, "100x50");
            assert_eq!(source, "a/b.png");
            assert_eq!(out.as_deref(), Some(Path::new("/tmp/x.png")));
        }
        _ => panic!("expected render"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["thumbs", "config", "show", "--json", "-c", "t.yaml"]).unwrap();
    assert!(cli.json);
    assert_eq!(cli.config.as_deref(), Some(Path::new("t.yaml")));
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Show
        }
    ));
}

#[test]
fn test_parse_rejects_missing_args() {
    assert!(Cli::try_parse_from(["thumbs", "url", "a.png"]).is_err());
}

#[test]
fn test_resolve_attrs_with_dimensions() {
    let config = ThumbsConfig::default();
    let attrs = handlers::resolve_attrs(&config, "a.jpg", "thumbnail", "100", Some(400), Some(200));

    assert_eq!(attrs.src, "/lt_cache/thumbnail/100/a.jpg");
    assert_eq!(attrs.width, Some(100));
    assert_eq!(attrs.height, Some(50));
}

#[test]
fn test_resolve_attrs_external_url() {
    let config = ThumbsConfig::default();
    let attrs = handlers::resolve_attrs(
        &config,
        "https://cdn.example.com/a.jpg",
        "thumbnail",
        "100",
        None,
        None,
    );

    assert_eq!(attrs.src, "https://cdn.example.com/a.jpg");
    assert_eq!(attrs.width, None);
}

#[test]
fn test_stored_path_is_sharded() {
    let config = ThumbsConfig {
        storage_root: "/srv/rendered".into(),
        ..ThumbsConfig::default()
    };
    let path = handlers::stored_path(&config, "resize", "10", "a.png").unwrap();
    let rel = path.strip_prefix("/srv/rendered").unwrap();
    assert_eq!(rel.components().count(), 3);

    let same = handlers::stored_path(&config, "resize", "10x10", "a.png").unwrap();
    assert_eq!(path, same);
}

#[test]
fn test_explicit_config_path_wins() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("thumbs.yaml");
    assert_eq!(
        handlers::effective_config_path(Some(&file)),
        Some(file.clone())
    );
}

#[tokio::test]
async fn test_config_path_does_not_need_a_readable_config() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    let missing = missing.to_str().unwrap();

    let cli = Cli::try_parse_from(["thumbs", "--config", missing, "config", "path"]).unwrap();
    assert!(run(cli).await.is_ok());

    let cli = Cli::try_parse_from(["thumbs", "--config", missing, "config", "show"]).unwrap();
    assert!(run(cli).await.is_err());
}
