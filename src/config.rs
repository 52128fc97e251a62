//! Layered configuration.
//!
//! Settings are merged with figment in increasing priority:
//! built-in defaults < TOML config file < `DUPEHASH_*` environment variables
//! < command-line flags. The merged [`Config`] is then validated into a
//! [`ScanConfig`], which is what the pipeline actually consumes.
//!
//! # Example config file
//!
//! ```toml
//! path = "/srv/media"
//! min_bytes = 4096
//! threads = 16
//! thorough = true
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPEHASH_";

/// Default minimum file size in bytes.
pub const DEFAULT_MIN_BYTES: i64 = 256;

/// Default number of hashing workers.
pub const DEFAULT_THREADS: i64 = 9;

/// Raw configuration as merged from all layers, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Top-level of the crawl.
    pub path: PathBuf,
    /// Minimum size (bytes) a file must have to be compared.
    pub min_bytes: i64,
    /// How many hashing workers to run concurrently.
    pub threads: i64,
    /// Append MD5 sums to SHA-512 sums.
    pub thorough: bool,
    /// Present a listing of all collision groups.
    pub list_collisions: bool,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            min_bytes: DEFAULT_MIN_BYTES,
            threads: DEFAULT_THREADS,
            thorough: false,
            list_collisions: false,
            output: OutputFormat::Text,
        }
    }
}

/// Values given explicitly on the command line.
///
/// Unset fields are skipped during serialization so they never mask a lower
/// layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thorough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_collisions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
}

/// Validated settings for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root directory of the traversal.
    pub root: PathBuf,
    /// Files smaller than this are not hashed.
    pub min_bytes: u64,
    /// Number of hashing workers, always at least 1.
    pub workers: usize,
    /// Extend fingerprints with a secondary digest.
    pub thorough: bool,
    /// Whether the report lists each collision group.
    pub list_collisions: bool,
    /// Report format.
    pub output: OutputFormat,
}

impl ScanConfig {
    /// Settings for scanning `root` with all other values at their defaults.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Config {
            path: root.into(),
            ..Config::default()
        }
        .into_scan_config()
    }

    #[must_use]
    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_thorough(mut self, thorough: bool) -> Self {
        self.thorough = thorough;
        self
    }
}

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal and occur before any scanning begins.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The worker count is below 1.
    #[error("--threads/-j must be >= 1 (got {0})")]
    InvalidWorkerCount(i64),

    /// The root path to scan does not exist.
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    /// A config layer could not be parsed.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl Config {
    /// Load configuration from the default file location, the environment and
    /// the given CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if any layer holds a malformed value.
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);
        Self::figment(file.as_deref(), overrides)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Build the layered figment without extracting it.
    #[must_use]
    pub fn figment(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            log::debug!("Reading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    /// Platform-specific config file location, e.g. `~/.config/dupehash/config.toml`.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupehash").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check the merged settings and convert them into a [`ScanConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidWorkerCount`] if `threads < 1`
    /// - [`ConfigError::RootNotFound`] if the root path does not exist
    pub fn validate(self) -> Result<ScanConfig, ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::InvalidWorkerCount(self.threads));
        }
        if !self.path.exists() {
            return Err(ConfigError::RootNotFound(self.path));
        }

        Ok(self.into_scan_config())
    }

    /// Negative sizes clamp to 0 and worker counts to 1.
    fn into_scan_config(self) -> ScanConfig {
        ScanConfig {
            root: self.path,
            min_bytes: u64::try_from(self.min_bytes).unwrap_or(0),
            workers: usize::try_from(self.threads).unwrap_or(1).max(1),
            thorough: self.thorough,
            list_collisions: self.list_collisions,
            output: self.output,
        }
    }
}
