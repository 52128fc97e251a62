//! Fixed-size pool of hashing workers.
//!
//! ```text
//! request queue ──┬── hasher-0 ──┐
//!                 ├── hasher-1 ──┼── reply queue
//!                 └── hasher-N ──┘
//! ```
//!
//! Each worker pulls requests until the request queue is empty and closed,
//! fingerprints the file, and pushes the populated [`FileHash`] to the reply
//! queue. A supervisor thread joins every worker before dropping the last
//! reply [`Sender`], so the reply queue closes exactly once and only after
//! the final result has been sent.

use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use super::{FileHash, Fingerprinter};

/// Counters gathered from all workers once they have exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Results pushed to the reply queue.
    pub hashed: u64,
    /// Requests dropped because the file could not be read.
    pub read_errors: u64,
}

impl std::ops::AddAssign for PoolStats {
    fn add_assign(&mut self, other: Self) {
        self.hashed += other.hashed;
        self.read_errors += other.read_errors;
    }
}

/// Pool of `workers` hashing threads.
#[derive(Debug, Clone, Copy)]
pub struct HashPool {
    workers: usize,
    fingerprinter: Fingerprinter,
}

impl HashPool {
    /// Create a pool description. `workers` is raised to 1 if given as 0.
    #[must_use]
    pub fn new(workers: usize, fingerprinter: Fingerprinter) -> Self {
        Self {
            workers: workers.max(1),
            fingerprinter,
        }
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start the workers and the supervisor that closes `replies`.
    ///
    /// The returned handle yields the combined [`PoolStats`] after the reply
    /// queue has been closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system refuses to spawn a thread.
    pub fn spawn(
        &self,
        requests: Receiver<FileHash>,
        replies: Sender<FileHash>,
    ) -> std::io::Result<JoinHandle<PoolStats>> {
        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let requests = requests.clone();
            let replies = replies.clone();
            let fingerprinter = self.fingerprinter;
            let handle = thread::Builder::new()
                .name(format!("hasher-{}", id))
                .spawn(move || worker_loop(&fingerprinter, &requests, &replies))?;
            handles.push(handle);
        }

        thread::Builder::new()
            .name("hasher-supervisor".to_string())
            .spawn(move || {
                let mut stats = PoolStats::default();
                for handle in handles {
                    match handle.join() {
                        Ok(worker_stats) => stats += worker_stats,
                        Err(_) => log::error!("A hashing worker panicked"),
                    }
                }
                // Every worker's clone is gone; dropping ours closes the queue.
                drop(replies);
                log::debug!(
                    "Hashing workers finished: {} hashed, {} unreadable",
                    stats.hashed,
                    stats.read_errors
                );
                stats
            })
    }
}

/// Pull requests until the queue is drained and closed.
fn worker_loop(
    fingerprinter: &Fingerprinter,
    requests: &Receiver<FileHash>,
    replies: &Sender<FileHash>,
) -> PoolStats {
    let mut stats = PoolStats::default();

    for request in requests.iter() {
        match hash_request(fingerprinter, request) {
            Some(reply) => {
                if replies.send(reply).is_err() {
                    log::error!("Reply queue closed by the aggregator; worker exiting");
                    break;
                }
                stats.hashed += 1;
            }
            None => stats.read_errors += 1,
        }
    }

    stats
}

/// Populate a request's normalized path and fingerprint.
///
/// Returns `None` if the file could not be read; the failure is logged and
/// the file takes no further part in the scan.
fn hash_request(fingerprinter: &Fingerprinter, mut request: FileHash) -> Option<FileHash> {
    let path = normalize_separators(request.path);
    match fingerprinter.fingerprint(&path, request.size) {
        Ok(fingerprint) => {
            request.path = path;
            request.fingerprint = fingerprint;
            Some(request)
        }
        Err(e) => {
            log::warn!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}

/// Rewrite `\` separators to `/` on platforms where `\` is a separator.
#[must_use]
pub fn normalize_separators(path: PathBuf) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(path.to_string_lossy().replace('\\', "/"))
    } else {
        path
    }
}
