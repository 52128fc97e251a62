//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "collisions": [
//!     {
//!       "fingerprint": "0000000000001024.ab12...",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "undersized_files": 20,
//!     "hashing_files": 80,
//!     "access_errors": 0,
//!     "read_errors": 0,
//!     "singles": 70,
//!     "collision_groups": 4,
//!     "colliding_files": 10,
//!     "duplicates": 6,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DH000"
//!   }
//! }
//! ```
//!
//! `collisions` is left empty unless listing was requested.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::duplicates::{ScanReport, ScanSummary};
use crate::error::ExitCode;

/// A single collision group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCollisionGroup {
    /// Composite fingerprint shared by every file in the group
    pub fingerprint: String,
    /// File size in bytes, taken from the fingerprint prefix
    pub size: u64,
    /// Paths in arrival order
    pub files: Vec<String>,
}

impl JsonCollisionGroup {
    fn new(fingerprint: &str, paths: &[PathBuf]) -> Self {
        Self {
            fingerprint: fingerprint.to_string(),
            size: fingerprint_size(fingerprint),
            files: paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Parse the zero-padded size prefix of a fingerprint.
fn fingerprint_size(fingerprint: &str) -> u64 {
    fingerprint
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: u64,
    pub undersized_files: u64,
    pub hashing_files: u64,
    pub access_errors: u64,
    pub read_errors: u64,
    pub singles: usize,
    pub collision_groups: usize,
    pub colliding_files: usize,
    pub duplicates: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DH000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            undersized_files: summary.undersized_files,
            hashing_files: summary.hashing_files,
            access_errors: summary.access_errors,
            read_errors: summary.read_errors,
            singles: summary.singles,
            collision_groups: summary.collision_groups,
            colliding_files: summary.colliding_files,
            duplicates: summary.duplicates,
            scan_duration_ms: u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Collision groups, empty unless listing was requested
    pub collisions: Vec<JsonCollisionGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for a finished report.
    ///
    /// # Example
    ///
    /// ```
    /// use dupehash::duplicates::ScanReport;
    /// use dupehash::error::ExitCode;
    /// use dupehash::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanReport::default(), true, ExitCode::Success);
    /// assert!(output.collisions.is_empty());
    /// assert!(output.to_json_pretty().unwrap().contains("DH000"));
    /// ```
    #[must_use]
    pub fn new(report: &ScanReport, list_collisions: bool, exit_code: ExitCode) -> Self {
        let collisions = if list_collisions {
            report
                .collisions
                .iter()
                .map(|(fingerprint, paths)| JsonCollisionGroup::new(fingerprint, paths))
                .collect()
        } else {
            Vec::new()
        };
        Self {
            collisions,
            summary: JsonSummary::from_scan_summary(&report.summary, exit_code),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}
