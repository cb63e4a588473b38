/// Errors raised by [`ContentStore`](super::ContentStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File could not be opened, written, or persisted
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bzip2 stream is corrupt or truncated
    #[error("Decompression error: {0}")]
    Decompress(#[source] std::io::Error),

    /// Decompressed content is not a valid snapshot of the requested type
    #[error("Invalid snapshot format: {0}")]
    Format(String),

    /// The value could not be encoded
    #[error("Serialization error: {0}")]
    Encode(#[from] bincode::Error),
}
