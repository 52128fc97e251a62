//! Pipeline coordinator: walker -> worker pool -> aggregator.
//!
//! ```text
//! walker thread ──requests (bounded 65536)──> hasher-0..N ──replies (bounded 2N)──> aggregator
//! ```
//!
//! Termination runs front to back. The walker drops the request sender when
//! the traversal ends; each worker exits once the request queue is drained
//! and closed; the pool supervisor closes the reply queue after joining every
//! worker; the aggregator, running on the calling thread, returns when the
//! reply queue is closed. Full queues block their producers, so memory stays
//! bounded by the two capacities.
//!
//! # Example
//!
//! ```no_run
//! use dupehash::config::ScanConfig;
//! use dupehash::duplicates::Pipeline;
//!
//! let report = Pipeline::new(ScanConfig::new(".").with_workers(4)).run().unwrap();
//! println!("{} duplicate files", report.summary.duplicates);
//! ```

use crossbeam_channel::bounded;
use std::thread;
use std::time::{Duration, Instant};

use super::aggregator::{AggregateStats, Aggregator, CollisionTable};
use crate::config::ScanConfig;
use crate::scanner::{FileHash, Fingerprinter, HashPool, PoolStats, WalkStats, Walker};

/// Capacity of the request queue between the walker and the workers.
pub const REQUEST_QUEUE_CAPACITY: usize = 65_536;

/// Reply queue slots per worker.
pub const REPLY_SLOTS_PER_WORKER: usize = 2;

/// Statistics for a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Every non-directory entry seen by the walker.
    pub total_files: u64,
    /// Files skipped for being empty or below the minimum size.
    pub undersized_files: u64,
    /// Files handed to the worker pool.
    pub hashing_files: u64,
    /// Entries skipped because they could not be accessed.
    pub access_errors: u64,
    /// Files dropped because they could not be read for hashing.
    pub read_errors: u64,
    /// Fingerprints seen exactly once.
    pub singles: usize,
    /// Number of collision groups.
    pub collision_groups: usize,
    /// Files inside collision groups.
    pub colliding_files: usize,
    /// Files inside collision groups minus one per group.
    pub duplicates: usize,
    /// Wall-clock duration of the scan.
    pub duration: Duration,
}

impl ScanSummary {
    fn new(
        walk: WalkStats,
        pool: PoolStats,
        aggregate: AggregateStats,
        duration: Duration,
    ) -> Self {
        Self {
            total_files: walk.total_files,
            undersized_files: walk.undersized_files,
            hashing_files: walk.hashing_files,
            access_errors: walk.access_errors,
            read_errors: pool.read_errors,
            singles: aggregate.singles,
            collision_groups: aggregate.collision_groups,
            colliding_files: aggregate.colliding_files,
            duplicates: aggregate.duplicates,
            duration,
        }
    }
}

/// Final output of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Collision groups, read-only from here on.
    pub collisions: CollisionTable,
    /// Counters from every stage.
    pub summary: ScanSummary,
}

/// Errors that stop the pipeline itself. Per-file problems never do.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A stage thread could not be started.
    #[error("Failed to start {stage} thread: {source}")]
    Spawn {
        /// Which stage failed to start
        stage: &'static str,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stage thread panicked before reporting its statistics.
    #[error("The {0} stage panicked")]
    StagePanicked(&'static str),
}

/// Owns the queues and the lifecycle of one scan.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScanConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Run the scan to completion on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only if a stage thread cannot be started or
    /// panics. Unreadable entries and files are skipped and counted.
    pub fn run(&self) -> Result<ScanReport, PipelineError> {
        let start = Instant::now();
        let workers = self.config.workers.max(1);
        log::info!(
            "Scanning {} with {} workers (min {} bytes{})",
            self.config.root.display(),
            workers,
            self.config.min_bytes,
            if self.config.thorough { ", thorough" } else { "" }
        );

        let (request_tx, request_rx) = bounded::<FileHash>(REQUEST_QUEUE_CAPACITY);
        let (reply_tx, reply_rx) = bounded::<FileHash>(workers * REPLY_SLOTS_PER_WORKER);

        let walker = Walker::new(&self.config.root, self.config.min_bytes);
        let walk_handle = thread::Builder::new()
            .name("walker".to_string())
            .spawn(move || walker.walk(request_tx))
            .map_err(|source| PipelineError::Spawn {
                stage: "walker",
                source,
            })?;

        let pool = HashPool::new(workers, Fingerprinter::new(self.config.thorough));
        let pool_handle = pool
            .spawn(request_rx, reply_tx)
            .map_err(|source| PipelineError::Spawn {
                stage: "hashing",
                source,
            })?;

        let mut aggregator = Aggregator::new();
        aggregator.consume(&reply_rx);
        let (collisions, aggregate) = aggregator.finish();

        let walk = walk_handle
            .join()
            .map_err(|_| PipelineError::StagePanicked("walker"))?;
        let pool = pool_handle
            .join()
            .map_err(|_| PipelineError::StagePanicked("hashing"))?;

        if pool.read_errors > 0 {
            log::warn!("{} files could not be read and were skipped", pool.read_errors);
        }

        Ok(ScanReport {
            collisions,
            summary: ScanSummary::new(walk, pool, aggregate, start.elapsed()),
        })
    }
}
