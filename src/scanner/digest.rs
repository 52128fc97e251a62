//! Streaming file digests and fingerprint composition.
//!
//! A fingerprint is `SSSSSSSSSSSSSSSS.<sha512>[.<md5>]`: the file size
//! zero-padded to 16 decimal digits, the SHA-512 of the contents, and in
//! thorough mode the MD5 of the contents. Leading with the size keeps equal
//! sized files adjacent when fingerprints are sorted or eyeballed.

use md5::Md5;
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use super::HashError;

/// Width of the zero-padded size prefix.
pub const SIZE_WIDTH: usize = 16;

/// Read buffer size used while streaming file contents.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithms a fingerprint can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Primary digest.
    Sha512,
    /// Secondary digest appended in thorough mode.
    Md5,
}

impl Algorithm {
    /// Length of the lowercase hex encoding of this digest.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha512 => 128,
            Self::Md5 => 32,
        }
    }
}

/// Stream the contents of `path` through `algorithm` and return the lowercase hex digest.
///
/// The file handle is dropped on every return path, including a read that
/// fails partway through.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read.
pub fn digest_file(path: &Path, algorithm: Algorithm) -> Result<String, HashError> {
    match algorithm {
        Algorithm::Sha512 => {
            let mut hasher = Sha512::new();
            stream_into(path, &mut hasher)?;
            Ok(format!("{:x}", hasher.finalize()))
        }
        Algorithm::Md5 => {
            let mut hasher = Md5::new();
            stream_into(path, &mut hasher)?;
            Ok(format!("{:x}", hasher.finalize()))
        }
    }
}

/// Copy the file at `path` into `hasher` through a [`CHUNK_SIZE`] buffer.
fn stream_into<W: io::Write>(path: &Path, hasher: &mut W) -> Result<(), HashError> {
    let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    io::copy(&mut reader, hasher).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
    Ok(())
}

/// Builds fingerprints for hash requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fingerprinter {
    thorough: bool,
}

impl Fingerprinter {
    #[must_use]
    pub fn new(thorough: bool) -> Self {
        Self { thorough }
    }

    /// Fingerprint the file at `path` whose walk-time size was `size`.
    ///
    /// In thorough mode the file is read a second time for the MD5 digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if either read fails; no partial fingerprint is produced.
    pub fn fingerprint(&self, path: &Path, size: u64) -> Result<String, HashError> {
        let mut fingerprint = format!(
            "{:0width$}.{}",
            size,
            digest_file(path, Algorithm::Sha512)?,
            width = SIZE_WIDTH
        );
        if self.thorough {
            fingerprint.push('.');
            fingerprint.push_str(&digest_file(path, Algorithm::Md5)?);
        }
        Ok(fingerprint)
    }
}
