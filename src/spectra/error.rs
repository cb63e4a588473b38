/// Errors raised while reading a raw instrument file into a payload
#[derive(Debug, thiserror::Error)]
pub enum RawReadError {
    /// I/O error opening the raw file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mzML document could not be parsed
    #[cfg(feature = "mzml")]
    #[error("mzML error: {0}")]
    MzML(#[from] crate::mzml::MzMLError),

    /// No reader for this raw format was compiled in
    #[error("No raw reader available for {0}")]
    Unsupported(String),
}
