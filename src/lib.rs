//! dupehash - concurrent duplicate file finder
//!
//! Walks a directory tree, fingerprints every file above a minimum size with
//! a pool of hashing workers, and groups files whose size and digest match.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::Pipeline;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};

/// Run the application with parsed CLI arguments.
///
/// Logging must already be initialized by the caller.
///
/// # Errors
///
/// Returns an error if configuration is invalid (before anything is
/// scanned), if a pipeline stage cannot run, or if the report cannot be
/// written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref(), &cli.overrides())?;
    log::debug!("Effective configuration: {:?}", config);
    let scan = config.validate()?;

    let list_collisions = scan.list_collisions;
    let format = scan.output;
    let report = Pipeline::new(scan).run().context("Duplicate scan failed")?;

    let stdout = std::io::stdout().lock();
    let written = match format {
        OutputFormat::Text => TextOutput::new(&report, list_collisions).write_to(stdout),
        OutputFormat::Json => {
            JsonOutput::new(&report, list_collisions, ExitCode::Success).write_to(stdout)
        }
    };
    written.context("Failed to write report")?;

    Ok(ExitCode::Success)
}
