//! Directory walker that feeds the hashing pipeline.
//!
//! The walker does a pre-order traversal with [`walkdir`], classifies every
//! entry, and pushes one [`FileHash`] request per eligible file into the
//! request queue. It owns the queue's only [`Sender`]: when [`Walker::walk`]
//! returns, the sender is dropped, which is how the worker pool learns that
//! no more requests will arrive.
//!
//! Classification of each entry:
//! - directories (and symlinks to directories) are skipped without being counted,
//!   including directories whose contents cannot be listed
//! - entries that cannot be accessed count as files and as access errors
//! - files of size 0 or below the minimum count as undersized
//! - everything else counts as hashing and is enqueued

use crossbeam_channel::Sender;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FileHash, ScanError};

/// Per-traversal counters, returned once the walk has finished.
///
/// `total_files == undersized_files + hashing_files + access_errors` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Every non-directory entry seen, including inaccessible ones.
    pub total_files: u64,
    /// Files skipped for being empty or below the minimum size.
    pub undersized_files: u64,
    /// Files handed to the worker pool.
    pub hashing_files: u64,
    /// Entries skipped because they could not be accessed.
    pub access_errors: u64,
}

/// Outcome of classifying one traversal entry.
enum Entry {
    Directory,
    Inaccessible(ScanError),
    Undersized(u64),
    Eligible(u64),
}

/// Pre-order directory walker producing hash requests.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    min_bytes: u64,
}

impl Walker {
    /// Create a walker for `root` that skips files smaller than `min_bytes`.
    #[must_use]
    pub fn new(root: &Path, min_bytes: u64) -> Self {
        Self {
            root: root.to_path_buf(),
            min_bytes,
        }
    }

    /// Traverse the tree, sending a request for every eligible file.
    ///
    /// Blocks whenever the request queue is full. Consumes `requests` so the
    /// queue is closed on return, whether the tree was fully walked or every
    /// receiver went away.
    pub fn walk(&self, requests: Sender<FileHash>) -> WalkStats {
        let mut stats = WalkStats::default();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let (path, class) = match entry {
                Ok(entry) => {
                    let class = if entry.file_type().is_dir() {
                        Entry::Directory
                    } else {
                        self.classify(entry.path())
                    };
                    (entry.into_path(), class)
                }
                Err(e) => {
                    let path = e.path().map_or_else(|| self.root.clone(), Path::to_path_buf);
                    if is_directory(&path) {
                        log::debug!("Skipping unlistable directory: {}", e);
                        continue;
                    }
                    let error = match e.into_io_error() {
                        Some(io) => scan_error(&path, io),
                        None => ScanError::Io {
                            path: path.clone(),
                            source: std::io::Error::other("filesystem loop"),
                        },
                    };
                    (path, Entry::Inaccessible(error))
                }
            };

            match class {
                Entry::Directory => continue,
                Entry::Inaccessible(error) => {
                    stats.total_files += 1;
                    stats.access_errors += 1;
                    log::debug!("Skipping inaccessible entry: {}", error);
                }
                Entry::Undersized(size) => {
                    stats.total_files += 1;
                    stats.undersized_files += 1;
                    log::trace!("Skipping undersized file ({} bytes): {}", size, path.display());
                }
                Entry::Eligible(size) => {
                    stats.total_files += 1;
                    stats.hashing_files += 1;
                    if requests.send(FileHash::new(path, size)).is_err() {
                        log::error!("Request queue closed by the worker pool; stopping walk");
                        break;
                    }
                }
            }
        }

        log::info!(
            "Total Files: {}, Undersized: {}, Hashing: {}, Inaccessible: {}",
            stats.total_files,
            stats.undersized_files,
            stats.hashing_files,
            stats.access_errors
        );

        stats
    }

    /// Classify a non-directory entry by the metadata of what it points at.
    fn classify(&self, path: &Path) -> Entry {
        // Follow symlinks: a link to a file is hashed as that file, a broken
        // link is an access error.
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Entry::Directory,
            Ok(metadata) => self.classify_file(&metadata),
            Err(e) => Entry::Inaccessible(scan_error(path, e)),
        }
    }

    fn classify_file(&self, metadata: &Metadata) -> Entry {
        let size = metadata.len();
        // Special files (fifos, sockets, devices) have no content to hash.
        if size == 0 || size < self.min_bytes || !metadata.is_file() {
            Entry::Undersized(size)
        } else {
            Entry::Eligible(size)
        }
    }
}

/// Whether `path` itself is a directory, without following a final symlink.
fn is_directory(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}

fn scan_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
