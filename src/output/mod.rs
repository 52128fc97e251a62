//! Output formatters for scan results.
//!
//! - [`text`]: summary line plus one quoted, space-separated line per collision group
//! - [`json`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupehash::config::ScanConfig;
//! use dupehash::duplicates::Pipeline;
//! use dupehash::output::TextOutput;
//!
//! let report = Pipeline::new(ScanConfig::new(".")).run().unwrap();
//! TextOutput::new(&report, true).write_to(std::io::stdout().lock()).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
