use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::timing::Shaped;

/// Summary row for one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRow {
    /// Spectrum identifier (native scan number)
    pub spectrum_id: i64,
    /// Retention time in minutes
    pub retention_time: f64,
    /// Number of peaks
    pub peak_count: usize,
    /// Total ion current
    pub tic: f64,
    /// MS level
    pub ms_level: i16,
    /// Vendor filter string, when present
    pub filter_string: Option<String>,
}

/// One (m/z, intensity) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakRow {
    /// Owning spectrum
    pub spectrum_id: i64,
    /// Position of the peak within its spectrum
    pub peak_index: u32,
    /// Retention time of the owning spectrum in minutes
    pub retention_time: f64,
    /// m/z, rounded to 5 decimals
    pub mz: f64,
    /// Intensity
    pub intensity: f64,
}

/// Materialized spectral content of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralPayload {
    pub(crate) run_id: Option<String>,
    pub(crate) run_date: Option<DateTime<FixedOffset>>,
    pub(crate) format_version: Option<String>,
    pub(crate) tic_sum: f64,
    pub(crate) spectra: Vec<SpectrumRow>,
    pub(crate) peaks: Vec<PeakRow>,
}

impl SpectralPayload {
    /// Run identifier from the source file
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Acquisition start time
    pub fn run_date(&self) -> Option<DateTime<FixedOffset>> {
        self.run_date
    }

    /// Version of the source file format
    pub fn format_version(&self) -> Option<&str> {
        self.format_version.as_deref()
    }

    /// Number of spectra
    pub fn spectrum_count(&self) -> usize {
        self.spectra.len()
    }

    /// Number of peaks across all spectra
    pub fn peak_count(&self) -> usize {
        self.peaks.len()
    }

    /// Sum of the per-spectrum TIC values
    pub fn tic_sum(&self) -> f64 {
        self.tic_sum
    }

    /// Per-spectrum summary table
    pub fn spectra(&self) -> &[SpectrumRow] {
        &self.spectra
    }

    /// Per-peak table
    pub fn peaks(&self) -> &[PeakRow] {
        &self.peaks
    }

    /// Peaks of a single spectrum
    pub fn peaks_of(&self, spectrum_id: i64) -> impl Iterator<Item = &PeakRow> {
        self.peaks
            .iter()
            .filter(move |peak| peak.spectrum_id == spectrum_id)
    }
}

impl Shaped for SpectralPayload {
    fn shape(&self) -> (usize, usize) {
        (self.spectrum_count(), 6)
    }
}
