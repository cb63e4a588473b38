use std::sync::OnceLock;

use log::debug;

/// What the host offers for parallel row mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelSupport {
    hardware_threads: usize,
}

static HOST_SUPPORT: OnceLock<ParallelSupport> = OnceLock::new();

impl ParallelSupport {
    /// Capabilities of this host, detected on first use and cached for the
    /// life of the process
    pub fn host() -> ParallelSupport {
        *HOST_SUPPORT.get_or_init(|| {
            let hardware_threads = std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1);
            let support = ParallelSupport::new(hardware_threads);
            debug!(
                "Host parallelism: {} hardware threads, parallel row mapping {}",
                hardware_threads,
                if support.is_supported() { "supported" } else { "unsupported" }
            );
            support
        })
    }

    /// Capabilities of a host with `hardware_threads` threads
    pub fn new(hardware_threads: usize) -> Self {
        Self { hardware_threads }
    }

    /// Threads the host can run at once
    pub fn hardware_threads(&self) -> usize {
        self.hardware_threads
    }

    /// Whether parallel execution is worthwhile and compiled in
    pub fn is_supported(&self) -> bool {
        cfg!(feature = "parallel") && self.hardware_threads > 1
    }
}
