//! Configuration layering: defaults < TOML file < environment < CLI flags.

use clap::Parser;
use dupehash::cli::{Cli, OutputFormat};
use dupehash::config::{Config, ConfigError, ConfigOverrides};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all DUPEHASH_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPEHASH_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_load_defaults_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let config: Config = Config::figment(None, &ConfigOverrides::default())
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
path = "/srv/media"
min_bytes = 4096
threads = 16
thorough = true
list_collisions = true
output = "json"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.path, PathBuf::from("/srv/media"));
    assert_eq!(config.min_bytes, 4096);
    assert_eq!(config.threads, 16);
    assert!(config.thorough);
    assert!(config.list_collisions);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threads = 16\nmin_bytes = 100\n").unwrap();

    std::env::set_var("DUPEHASH_THREADS", "3");
    let config = Config::load(Some(&path), &ConfigOverrides::default());
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.threads, 3);
    assert_eq!(config.min_bytes, 100);
}

#[test]
fn test_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var("DUPEHASH_THREADS", "3");
    std::env::set_var("DUPEHASH_MIN_BYTES", "10");
    let cli = Cli::parse_from(["dupehash", "-j", "5", "-L"]);
    let config = Config::figment(None, &cli.overrides()).extract::<Config>();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.threads, 5);
    assert_eq!(config.min_bytes, 10);
    assert!(config.list_collisions);
    assert!(!config.thorough);
}

#[test]
fn test_malformed_file_is_config_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threads = \"many\"\n").unwrap();

    let result = Config::load(Some(&path), &ConfigOverrides::default());
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_zero_threads_fatal_before_scan() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let cli = Cli::parse_from([
        "dupehash",
        "--threads",
        "0",
        "--path",
        dir.path().to_str().unwrap(),
    ]);
    let config = Config::figment(None, &cli.overrides())
        .extract::<Config>()
        .unwrap();

    match config.validate() {
        Err(ConfigError::InvalidWorkerCount(n)) => assert_eq!(n, 0),
        other => panic!("Expected InvalidWorkerCount, got {:?}", other),
    }
}

#[test]
fn test_negative_min_bytes_clamped() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let cli = Cli::parse_from([
        "dupehash",
        "-b",
        "-20",
        "-p",
        dir.path().to_str().unwrap(),
    ]);
    let scan = Config::figment(None, &cli.overrides())
        .extract::<Config>()
        .unwrap()
        .validate()
        .unwrap();

    assert_eq!(scan.min_bytes, 0);
    assert_eq!(scan.root, dir.path());
}
