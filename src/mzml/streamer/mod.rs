//! Streaming mzML parser using quick-xml
//!
//! Pull-based: file metadata is read up to `<spectrumList>`, then spectra are
//! decoded one at a time, so memory use is bounded by the largest spectrum.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::events::BytesStart;
use quick_xml::Reader;

use super::models::MzMLFileMetadata;

pub use error::MzMLError;
pub use iterators::SpectrumIterator;

mod error;
mod iterators;
mod metadata;
mod spectrum;

#[cfg(test)]
mod tests;

/// Default input buffer size for mzML parsing (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    metadata: MzMLFileMetadata,
    metadata_read: bool,
    in_spectrum_list: bool,
    current_spectrum_index: i64,
}

impl MzMLStreamer<BufReader<File>> {
    /// Open an mzML file for streaming
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file))
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            metadata: MzMLFileMetadata::default(),
            metadata_read: false,
            in_spectrum_list: false,
            current_spectrum_index: 0,
        })
    }

    /// Get the file metadata read so far
    pub fn metadata(&self) -> &MzMLFileMetadata {
        &self.metadata
    }

    /// Iterate over all spectra
    pub fn spectra(self) -> SpectrumIterator<R> {
        SpectrumIterator { streamer: self }
    }
}

/// Unescaped value of attribute `name`
pub(super) fn attribute(
    e: &BytesStart,
    name: &str,
    decoder: Decoder,
) -> Result<Option<String>, MzMLError> {
    match e.try_get_attribute(name).map_err(quick_xml::Error::from)? {
        Some(attr) => Ok(Some(attr.decode_and_unescape_value(decoder)?.into_owned())),
        None => Ok(None),
    }
}
