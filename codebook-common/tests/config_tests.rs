//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests cover:
//! - Missing config files SHALL NOT stop the pipeline
//! - Priority order: command line > environment > user config dir > defaults
//! - Malformed config files are reported, not silently ignored
//! - Atomic config write-back
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate CODEBOOK_CONFIG are marked with #[serial].

use codebook_common::config::{
    load_toml_config, write_toml_config, ConfigResolver, LexiconConfig, TomlConfig, CONFIG_ENV_VAR,
};
use codebook_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let dir = TempDir::new().unwrap();
    let cli_path = dir.path().join("cli.toml");
    env::set_var(CONFIG_ENV_VAR, dir.path().join("env.toml"));

    let resolver = ConfigResolver::new(Some(cli_path.clone()));
    assert_eq!(resolver.resolve_path(), Some(cli_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join("env.toml");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.resolve_path(), Some(env_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let resolver = ConfigResolver::new(Some(missing));
    let config = resolver.load().expect("missing config must not be fatal");
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_load_lexicon_overrides_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"

[lexicon]
extend = true
positive_words = ["content"]
negators = ["not", "hardly"]
"#,
    )
    .unwrap();

    let config = ConfigResolver::new(Some(path)).load().unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(config.lexicon.extend);
    assert_eq!(config.lexicon.positive_words, Some(vec!["content".to_string()]));
    assert_eq!(
        config.lexicon.negators,
        Some(vec!["not".to_string(), "hardly".to_string()])
    );
    assert!(config.lexicon.na_patterns.is_none());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[lexicon\npositive_words = ").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_write_then_load_preserves_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.export.default_missing_codes = vec![-1, 97, 98, 99];
    config.lexicon = LexiconConfig {
        negative_words: Some(vec!["unhappy".to_string()]),
        ..Default::default()
    };

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}
