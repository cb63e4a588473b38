use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use super::row_map::{map_rows, map_rows_sequential};
use super::support::ParallelSupport;
use super::RowMapError;

/// When bulk operations may run in parallel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelMode {
    /// Parallel when the host supports it
    #[default]
    Auto,
    /// Always parallel
    Enabled,
    /// Always sequential
    Disabled,
}

/// Parallel execution settings for bulk operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// When to run in parallel
    #[serde(default)]
    pub mode: ParallelMode,
    /// Worker count; defaults to the host's hardware threads
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ParallelConfig {
    /// Always sequential
    pub fn sequential() -> Self {
        Self {
            mode: ParallelMode::Disabled,
            workers: None,
        }
    }

    /// Always parallel with `workers` workers
    pub fn with_workers(workers: usize) -> Self {
        Self {
            mode: ParallelMode::Enabled,
            workers: Some(workers),
        }
    }

    /// Resolve against this host's capabilities
    pub fn resolve(&self) -> ExecutionStrategy {
        self.resolve_with(ParallelSupport::host())
    }

    /// Resolve against the given capabilities
    pub fn resolve_with(&self, support: ParallelSupport) -> ExecutionStrategy {
        let workers = self
            .workers
            .unwrap_or_else(|| support.hardware_threads())
            .max(1);

        match self.mode {
            ParallelMode::Disabled => ExecutionStrategy::Sequential,
            ParallelMode::Auto if support.is_supported() => ExecutionStrategy::Parallel { workers },
            ParallelMode::Auto => ExecutionStrategy::Sequential,
            ParallelMode::Enabled if !cfg!(feature = "parallel") => {
                warn!("Parallel execution requested but not compiled in; running sequentially");
                ExecutionStrategy::Sequential
            }
            ParallelMode::Enabled => {
                if !support.is_supported() {
                    warn!(
                        "Parallel execution forced on a host reporting {} hardware thread(s)",
                        support.hardware_threads()
                    );
                }
                ExecutionStrategy::Parallel { workers }
            }
        }
    }
}

/// How a bulk operation visits rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One row after another on the calling thread
    Sequential,
    /// Contiguous partitions on a pool of `workers` threads
    Parallel {
        /// Number of workers
        workers: usize,
    },
}

impl ExecutionStrategy {
    /// Apply `f` to every row, preserving order
    pub fn apply<R, E, F>(&self, rows: Vec<R>, f: F) -> Result<Vec<R>, RowMapError<E>>
    where
        R: Send,
        E: Send,
        F: Fn(R) -> Result<R, E> + Sync,
    {
        match self {
            ExecutionStrategy::Sequential => map_rows_sequential(rows, f),
            ExecutionStrategy::Parallel { workers } => map_rows(rows, f, *workers),
        }
    }

    /// Whether rows are processed in parallel
    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionStrategy::Parallel { .. })
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStrategy::Sequential => f.write_str("sequential"),
            ExecutionStrategy::Parallel { workers } => write!(f, "parallel ({} workers)", workers),
        }
    }
}
