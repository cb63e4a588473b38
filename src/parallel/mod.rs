//! # Parallel row mapping
//!
//! Bulk operations over a [`SampleCollection`](crate::collection::SampleCollection)
//! apply one function to every row. [`map_rows`] does that with a dedicated
//! pool of worker threads:
//!
//! ```text
//! rows ──partition_bounds──▶ [p0][p1][p2]...   contiguous, near-equal
//!                              │   │   │
//!                           worker per partition (rows moved, not shared)
//!                              │   │   │
//!                              ▼   ▼   ▼
//!                          concatenate in partition order
//! ```
//!
//! Whether parallelism is used at all is an explicit [`ParallelConfig`],
//! resolved against [`ParallelSupport::host`] into an [`ExecutionStrategy`].

mod config;
mod error;
mod row_map;
mod support;


pub use config::{ExecutionStrategy, ParallelConfig, ParallelMode};
pub use error::RowMapError;
pub use row_map::{map_rows, map_rows_sequential, partition_bounds};
pub use support::ParallelSupport;
