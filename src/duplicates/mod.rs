//! Duplicate detection: aggregation of hash results and pipeline coordination.

pub mod aggregator;
pub mod pipeline;

pub use aggregator::{AggregateStats, Aggregator, CollisionTable};
pub use pipeline::{Pipeline, PipelineError, ScanReport, ScanSummary};
