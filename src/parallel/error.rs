/// Errors raised by [`map_rows`](super::map_rows)
#[derive(Debug, thiserror::Error)]
pub enum RowMapError<E> {
    /// A worker count of zero was requested
    #[error("At least one worker is required")]
    NoWorkers,

    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    Pool(String),

    /// The row function failed; the whole call fails with it
    #[error("Row {row} failed: {error}")]
    Row {
        /// Position of the failing row in the input
        row: usize,
        /// Error returned by the row function
        #[source]
        error: E,
    },
}

impl<E> RowMapError<E> {
    /// The row function's error, if that is what failed
    pub fn into_row_error(self) -> Option<E> {
        match self {
            RowMapError::Row { error, .. } => Some(error),
            _ => None,
        }
    }
}
