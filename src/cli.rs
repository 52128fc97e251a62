//! Command-line interface definitions for dupehash.
//!
//! This module defines the CLI arguments using the clap derive API. Every
//! value flag is optional here so that an absent flag falls through to the
//! config file and environment layers (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory and print the summary
//! dupehash
//!
//! # Scan a tree with 16 workers and list every collision group
//! dupehash --path ~/Downloads -j 16 -L
//!
//! # Strengthen fingerprints with a second digest
//! dupehash -p ~/Photos --thorough --min-bytes 4096
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Find duplicate files by size and content digest.
///
/// Files are fingerprinted with SHA-512 (plus MD5 in thorough mode) by a pool
/// of concurrent workers and grouped by identical fingerprint.
#[derive(Debug, Parser)]
#[command(name = "dupehash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to recurse over [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Minimum size (bytes) for a file to be considered [default: 256]
    ///
    /// Negative values are treated as 0.
    #[arg(short = 'b', long, value_name = "N", allow_negative_numbers = true)]
    pub min_bytes: Option<i64>,

    /// Number of concurrent hashing workers [default: 9]
    #[arg(short = 'j', long, value_name = "N", allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Append an MD5 digest to the SHA-512 digest of every file
    #[arg(short = 'T', long)]
    pub thorough: bool,

    /// List the files for which matches were found
    #[arg(short = 'L', long)]
    pub list_collisions: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Path to a TOML configuration file
    ///
    /// If not specified, the platform-specific config directory is checked.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Collect the flags that were actually given, for the top config layer.
    ///
    /// Boolean switches only override when set, so `thorough = true` in a
    /// config file cannot be turned off from the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            path: self.path.clone(),
            min_bytes: self.min_bytes,
            threads: self.threads,
            thorough: self.thorough.then_some(true),
            list_collisions: self.list_collisions.then_some(true),
            output: self.output,
        }
    }
}

/// Report format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text summary and collision listing
    #[default]
    Text,
    /// Machine-readable JSON document
    Json,
}
