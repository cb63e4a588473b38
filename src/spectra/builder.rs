use chrono::{DateTime, FixedOffset};

use super::payload::{PeakRow, SpectralPayload, SpectrumRow};

/// One decoded scan, ready to be appended to a payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    /// Spectrum identifier
    pub spectrum_id: i64,
    /// Retention time in minutes
    pub retention_time: f64,
    /// MS level
    pub ms_level: i16,
    /// TIC reported by the instrument; summed from intensities when absent
    pub total_ion_current: Option<f64>,
    /// Vendor filter string
    pub filter_string: Option<String>,
    /// m/z values
    pub mz: Vec<f64>,
    /// Intensities, parallel to `mz`
    pub intensity: Vec<f64>,
}

/// Builder for a single [`Scan`]
pub struct ScanBuilder {
    scan: Scan,
}

impl ScanBuilder {
    /// Start a scan with the given identifier (MS1, retention time 0)
    pub fn new(spectrum_id: i64) -> Self {
        Self {
            scan: Scan {
                spectrum_id,
                ms_level: 1,
                ..Default::default()
            },
        }
    }

    /// Set the MS level
    pub fn ms_level(mut self, level: i16) -> Self {
        self.scan.ms_level = level;
        self
    }

    /// Set the retention time in minutes
    pub fn retention_time(mut self, minutes: f64) -> Self {
        self.scan.retention_time = minutes;
        self
    }

    /// Set the reported total ion current
    pub fn total_ion_current(mut self, tic: f64) -> Self {
        self.scan.total_ion_current = Some(tic);
        self
    }

    /// Set the vendor filter string
    pub fn filter_string(mut self, filter: impl Into<String>) -> Self {
        self.scan.filter_string = Some(filter.into());
        self
    }

    /// Append one peak
    pub fn add_peak(mut self, mz: f64, intensity: f64) -> Self {
        self.scan.mz.push(mz);
        self.scan.intensity.push(intensity);
        self
    }

    /// Replace all peaks
    pub fn peaks(mut self, mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        self.scan.mz = mz;
        self.scan.intensity = intensity;
        self
    }

    /// Finish the scan
    pub fn build(self) -> Scan {
        self.scan
    }
}

/// Accumulates scans into a [`SpectralPayload`]
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    payload: SpectralPayload,
}

impl PayloadBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run identifier
    pub fn run_id(mut self, run_id: Option<String>) -> Self {
        self.payload.run_id = run_id;
        self
    }

    /// Set the acquisition start time
    pub fn run_date(mut self, run_date: Option<DateTime<FixedOffset>>) -> Self {
        self.payload.run_date = run_date;
        self
    }

    /// Set the source format version
    pub fn format_version(mut self, version: Option<String>) -> Self {
        self.payload.format_version = version;
        self
    }

    /// Append a scan to both tables.
    ///
    /// Peaks beyond the shorter of the two arrays are dropped.
    pub fn push(&mut self, scan: Scan) {
        let tic = scan
            .total_ion_current
            .unwrap_or_else(|| scan.intensity.iter().sum());
        let peak_count = scan.mz.len().min(scan.intensity.len());

        self.payload.peaks.reserve(peak_count);
        for (peak_index, (mz, intensity)) in scan.mz.iter().zip(&scan.intensity).enumerate() {
            self.payload.peaks.push(PeakRow {
                spectrum_id: scan.spectrum_id,
                peak_index: peak_index as u32,
                retention_time: scan.retention_time,
                mz: round_mz(*mz),
                intensity: *intensity,
            });
        }

        self.payload.tic_sum += tic;
        self.payload.spectra.push(SpectrumRow {
            spectrum_id: scan.spectrum_id,
            retention_time: scan.retention_time,
            peak_count,
            tic,
            ms_level: scan.ms_level,
            filter_string: scan.filter_string,
        });
    }

    /// Builder-style [`push`](Self::push)
    pub fn add_scan(mut self, scan: Scan) -> Self {
        self.push(scan);
        self
    }

    /// Finish the payload
    pub fn build(self) -> SpectralPayload {
        self.payload
    }
}

/// Round an m/z value to 5 decimals
pub(crate) fn round_mz(mz: f64) -> f64 {
    (mz * 1e5).round() / 1e5
}
