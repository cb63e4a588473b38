use std::io::BufRead;

use quick_xml::events::Event;

use super::{attribute, MzMLError, MzMLStreamer};
use crate::mzml::models::MzMLFileMetadata;

impl<R: BufRead> MzMLStreamer<R> {
    /// Read file-level metadata (everything before `spectrumList`).
    ///
    /// Idempotent: the document is only scanned on the first call.
    pub fn read_metadata(&mut self) -> Result<&MzMLFileMetadata, MzMLError> {
        if self.metadata_read {
            return Ok(&self.metadata);
        }
        self.metadata_read = true;

        let decoder = self.reader.decoder();
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"mzML" => {
                        self.metadata.version = attribute(e, "version", decoder)?;
                    }
                    b"run" => {
                        self.metadata.run_id = attribute(e, "id", decoder)?;
                        self.metadata.run_start_time = attribute(e, "startTimeStamp", decoder)?;
                    }
                    b"spectrumList" => {
                        self.in_spectrum_list = true;
                        self.metadata.spectrum_count =
                            attribute(e, "count", decoder)?.and_then(|s| s.parse().ok());
                        break;
                    }
                    // Chromatograms follow spectra; reaching them means there are none
                    b"chromatogramList" => break,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"spectrumList" {
                        self.metadata.spectrum_count = Some(0);
                        break;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(&self.metadata)
    }
}
