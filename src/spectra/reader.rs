use std::path::Path;
use std::sync::Arc;

use super::error::RawReadError;
use super::payload::SpectralPayload;

/// Turns a raw instrument file into a [`SpectralPayload`].
///
/// Implementations are shared across bulk-operation workers, so they must be
/// `Send + Sync` and must not keep per-file state between calls.
pub trait RawReader: Send + Sync {
    /// Short format name used in log messages
    fn format_name(&self) -> &str;

    /// Parse the file at `path`
    fn read(&self, path: &Path) -> Result<SpectralPayload, RawReadError>;
}

/// Reader used when none is configured explicitly
pub fn default_reader() -> Arc<dyn RawReader> {
    #[cfg(feature = "mzml")]
    {
        Arc::new(MzMLReader)
    }
    #[cfg(not(feature = "mzml"))]
    {
        Arc::new(UnavailableReader)
    }
}

/// Placeholder that rejects every file when no raw format is compiled in
#[cfg(not(feature = "mzml"))]
struct UnavailableReader;

#[cfg(not(feature = "mzml"))]
impl RawReader for UnavailableReader {
    fn format_name(&self) -> &str {
        "none"
    }

    fn read(&self, path: &Path) -> Result<SpectralPayload, RawReadError> {
        Err(RawReadError::Unsupported(path.display().to_string()))
    }
}

#[cfg(feature = "mzml")]
pub use mzml_reader::MzMLReader;

#[cfg(feature = "mzml")]
mod mzml_reader {
    use std::path::Path;

    use chrono::DateTime;
    use log::{debug, warn};

    use super::RawReader;
    use crate::mzml::{MzMLSpectrum, MzMLStreamer};
    use crate::spectra::builder::{PayloadBuilder, Scan};
    use crate::spectra::error::RawReadError;
    use crate::spectra::payload::SpectralPayload;

    /// Streaming mzML reader
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MzMLReader;

    impl RawReader for MzMLReader {
        fn format_name(&self) -> &str {
            "mzML"
        }

        fn read(&self, path: &Path) -> Result<SpectralPayload, RawReadError> {
            let mut streamer = MzMLStreamer::open(path)?;
            let header = streamer.read_metadata()?.clone();

            let run_date = header.run_start_time.as_deref().and_then(|ts| {
                DateTime::parse_from_rfc3339(ts)
                    .map_err(|e| warn!("Ignoring run start time {:?} in {}: {}", ts, path.display(), e))
                    .ok()
            });

            let mut builder = PayloadBuilder::new()
                .run_id(header.run_id)
                .run_date(run_date)
                .format_version(header.version);

            for spectrum in streamer.spectra() {
                builder.push(to_scan(spectrum?));
            }

            let payload = builder.build();
            debug!(
                "Read {} spectra / {} peaks from {}",
                payload.spectrum_count(),
                payload.peak_count(),
                path.display()
            );
            Ok(payload)
        }
    }

    fn to_scan(spectrum: MzMLSpectrum) -> Scan {
        Scan {
            spectrum_id: spectrum
                .scan_number()
                .unwrap_or(spectrum.index + 1),
            retention_time: spectrum.retention_time.unwrap_or(0.0) / 60.0,
            ms_level: spectrum.ms_level,
            total_ion_current: spectrum.total_ion_current,
            filter_string: spectrum.filter_string,
            mz: spectrum.mz_array,
            intensity: spectrum.intensity_array,
        }
    }
}
