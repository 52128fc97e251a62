//! Online bucketing of hash results into collision groups.
//!
//! The [`Aggregator`] keeps two maps keyed by fingerprint: `singles` for
//! fingerprints seen exactly once, and `collisions` for fingerprints seen two
//! or more times. A fingerprint moves from `singles` to `collisions` on its
//! second arrival, so the [`CollisionTable`] never holds a bucket with fewer
//! than two paths. Each result costs O(1) amortized and the stream is never
//! buffered.
//!
//! # Example
//!
//! ```
//! use dupehash::duplicates::Aggregator;
//! use dupehash::scanner::FileHash;
//!
//! let mut aggregator = Aggregator::new();
//! for path in ["a", "b", "c"] {
//!     let mut result = FileHash::new(path, 300);
//!     result.fingerprint = if path == "c" { "x".into() } else { "y".into() };
//!     aggregator.insert(result);
//! }
//!
//! let (table, stats) = aggregator.finish();
//! assert_eq!(table.len(), 1);
//! assert_eq!(stats.singles, 1);
//! assert_eq!(stats.duplicates, 1);
//! ```

use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::FileHash;

/// Fingerprint to paths, where every bucket holds at least two paths.
///
/// Paths within a bucket are in arrival order; bucket iteration order is
/// unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionTable {
    buckets: HashMap<String, Vec<PathBuf>>,
}

impl CollisionTable {
    /// Number of collision groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Paths sharing `fingerprint`, if it collided.
    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<&[PathBuf]> {
        self.buckets.get(fingerprint).map(Vec::as_slice)
    }

    /// Iterate over `(fingerprint, paths)` buckets.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.buckets
            .iter()
            .map(|(fingerprint, paths)| (fingerprint.as_str(), paths.as_slice()))
    }

    /// Total number of paths across all buckets.
    #[must_use]
    pub fn colliding_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Files beyond the first in each bucket.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.colliding_files() - self.len()
    }
}

impl<'a> IntoIterator for &'a CollisionTable {
    type Item = (&'a String, &'a Vec<PathBuf>);
    type IntoIter = std::collections::hash_map::Iter<'a, String, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Counters computed when aggregation finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Results received from the reply queue.
    pub results: usize,
    /// Fingerprints seen exactly once.
    pub singles: usize,
    /// Number of collision groups.
    pub collision_groups: usize,
    /// Paths inside collision groups.
    pub colliding_files: usize,
    /// `colliding_files - collision_groups`.
    pub duplicates: usize,
}

/// Single consumer that buckets hash results by fingerprint.
#[derive(Debug, Default)]
pub struct Aggregator {
    singles: HashMap<String, PathBuf>,
    collisions: HashMap<String, Vec<PathBuf>>,
    results: usize,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket one result.
    ///
    /// 1. An existing collision bucket gets the path appended.
    /// 2. A fingerprint waiting in `singles` is promoted to a new bucket
    ///    holding the earlier path and this one.
    /// 3. Otherwise the path waits in `singles`.
    pub fn insert(&mut self, result: FileHash) {
        self.results += 1;
        let FileHash {
            path, fingerprint, ..
        } = result;

        if let Some(bucket) = self.collisions.get_mut(&fingerprint) {
            bucket.push(path);
            return;
        }

        match self.singles.remove(&fingerprint) {
            Some(first) => {
                log::trace!("Collision on {}: {}", fingerprint, path.display());
                self.collisions.insert(fingerprint, vec![first, path]);
            }
            None => {
                self.singles.insert(fingerprint, path);
            }
        }
    }

    /// Consume results until the reply queue is closed.
    pub fn consume(&mut self, replies: &Receiver<FileHash>) {
        for result in replies.iter() {
            self.insert(result);
        }
    }

    /// Whether `path` is currently waiting alone under `fingerprint`.
    #[must_use]
    pub fn is_single(&self, fingerprint: &str, path: &Path) -> bool {
        self.singles.get(fingerprint).is_some_and(|p| p == path)
    }

    /// Number of collision groups so far.
    #[must_use]
    pub fn collision_groups(&self) -> usize {
        self.collisions.len()
    }

    /// Discard the singles and return the final table.
    #[must_use]
    pub fn finish(self) -> (CollisionTable, AggregateStats) {
        let table = CollisionTable {
            buckets: self.collisions,
        };
        let colliding_files = table.colliding_files();
        let stats = AggregateStats {
            results: self.results,
            singles: self.singles.len(),
            collision_groups: table.len(),
            colliding_files,
            duplicates: colliding_files - table.len(),
        };

        log::info!(
            "Misses: {}, Collisions: {}, Hashes: {}, Dupes: {}",
            stats.singles,
            stats.colliding_files,
            stats.collision_groups,
            stats.duplicates
        );

        (table, stats)
    }
}

impl Extend<FileHash> for Aggregator {
    fn extend<I: IntoIterator<Item = FileHash>>(&mut self, iter: I) {
        for result in iter {
            self.insert(result);
        }
    }
}

/// Build a table directly from a finished list of results.
impl FromIterator<FileHash> for CollisionTable {
    fn from_iter<I: IntoIterator<Item = FileHash>>(iter: I) -> Self {
        let mut aggregator = Aggregator::new();
        aggregator.extend(iter);
        aggregator.finish().0
    }
}
