//! Plain text report.
//!
//! The summary is a single line. When listing is enabled each collision group
//! follows on its own line, every path quoted with Rust string escaping and
//! separated by a space:
//!
//! ```text
//! "photos/a.jpg" "backup/a.jpg"
//! ```
//!
//! Group order follows the table's iteration order and is not stable across runs.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::duplicates::{CollisionTable, ScanReport, ScanSummary};

/// Text formatter borrowing a finished report.
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    list_collisions: bool,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(report: &'a ScanReport, list_collisions: bool) -> Self {
        Self {
            report,
            list_collisions,
        }
    }

    /// Write the summary and, if enabled, the collision listing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{}", summary_line(&self.report.summary))?;
        if self.list_collisions {
            write_collisions(&mut writer, &self.report.collisions)?;
        }
        writer.flush()
    }
}

/// One-line rendering of the scan counters.
#[must_use]
pub fn summary_line(summary: &ScanSummary) -> String {
    format!(
        "Files: {}, Undersized: {}, Hashed: {}, Unreadable: {}, Unique: {}, Groups: {}, Duplicates: {}",
        summary.total_files,
        summary.undersized_files,
        summary.hashing_files,
        summary.access_errors + summary.read_errors,
        summary.singles,
        summary.collision_groups,
        summary.duplicates
    )
}

/// Render one collision group as quoted, space-separated paths.
#[must_use]
pub fn group_line(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("{:?}", path.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_collisions<W: Write>(writer: &mut W, collisions: &CollisionTable) -> io::Result<()> {
    for (_, paths) in collisions.iter() {
        writeln!(writer, "{}", group_line(paths))?;
    }
    Ok(())
}
