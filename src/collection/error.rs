use std::convert::Infallible;

use crate::metadata::MetadataError;
use crate::parallel::RowMapError;
use crate::run::RunError;

/// Errors raised by [`SampleCollection`](super::SampleCollection)
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// A bulk operation failed for one sample
    #[error("{operation} failed for sample {sample}: {source}")]
    Run {
        /// Bulk operation name
        operation: &'static str,
        /// Sample name of the first failing row
        sample: String,
        /// Underlying run failure
        #[source]
        source: RunError,
    },

    /// The worker pool could not run the rows
    #[error("Worker failure: {0}")]
    Workers(#[from] RowMapError<Infallible>),

    /// Building or saving the metadata snapshot failed
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
}
