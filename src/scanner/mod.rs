//! Scanner module: directory traversal and file fingerprinting.
//!
//! - [`walker`]: pre-order traversal that turns eligible files into hash requests
//! - [`digest`]: streaming SHA-512 / MD5 digests and fingerprint composition
//! - [`pool`]: fixed-size pool of hashing workers between two bounded queues
//!
//! # Example
//!
//! ```no_run
//! use dupehash::scanner::{Algorithm, digest_file};
//! use std::path::Path;
//!
//! let hex = digest_file(Path::new("Cargo.toml"), Algorithm::Sha512).unwrap();
//! assert_eq!(hex.len(), 128);
//! ```

pub mod digest;
pub mod pool;
pub mod walker;

use std::path::PathBuf;

pub use digest::{digest_file, Algorithm, Fingerprinter};
pub use pool::{HashPool, PoolStats};
pub use walker::{WalkStats, Walker};

/// A request for, and once populated the result of, hashing one file.
///
/// The walker creates it with an empty fingerprint; a worker fills in the
/// normalized path and fingerprint and passes ownership on to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash {
    /// Path of the file, forward-slash separated once hashed.
    pub path: PathBuf,
    /// Size of the file in bytes, always > 0.
    pub size: u64,
    /// `size.digest[.digest2]`, empty until hashed.
    pub fingerprint: String,
}

impl FileHash {
    /// Create an unhashed request.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            fingerprint: String::new(),
        }
    }

    /// Whether a worker has populated the fingerprint.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        !self.fingerprint.is_empty()
    }
}

/// Errors for individual walk entries. Never fatal to the scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished or is a broken symlink.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Any other I/O error while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors while reading a file for hashing. The file is dropped from the scan.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was removed after it was enumerated.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while opening or reading `path`.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => Self::NotFound(path),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
