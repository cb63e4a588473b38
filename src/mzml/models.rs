//! Data models for parsed mzML content

/// One spectrum decoded from an mzML file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzMLSpectrum {
    /// Spectrum index (0-based)
    pub index: i64,

    /// Native spectrum ID from the file
    pub id: String,

    /// Default array length (number of peaks)
    pub default_array_length: usize,

    /// MS level (1 for MS1, 2 for MS2, etc.)
    pub ms_level: i16,

    /// Retention time in seconds
    pub retention_time: Option<f64>,

    /// Total ion current as reported by the file
    pub total_ion_current: Option<f64>,

    /// Filter string (vendor-specific)
    pub filter_string: Option<String>,

    /// m/z array (decoded)
    pub mz_array: Vec<f64>,

    /// Intensity array (decoded)
    pub intensity_array: Vec<f64>,
}

impl MzMLSpectrum {
    /// Get the scan number from the native ID
    pub fn scan_number(&self) -> Option<i64> {
        // "scan=12345", "controllerType=0 controllerNumber=1 scan=12345", "S12345"
        if let Some(pos) = self.id.find("scan=") {
            let start = pos + 5;
            let end = self.id[start..]
                .find(|c: char| !c.is_ascii_digit())
                .map(|i| start + i)
                .unwrap_or(self.id.len());
            self.id[start..end].parse().ok()
        } else if let Some(rest) = self.id.strip_prefix('S') {
            rest.parse().ok()
        } else {
            Some(self.index + 1)
        }
    }

    /// Get the number of peaks
    pub fn peak_count(&self) -> usize {
        self.mz_array.len()
    }

    /// Total ion current, summing intensities when the file does not report it
    pub fn tic(&self) -> f64 {
        self.total_ion_current
            .unwrap_or_else(|| self.intensity_array.iter().sum())
    }
}

/// File-level metadata read before the spectrum list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzMLFileMetadata {
    /// mzML schema version
    pub version: Option<String>,

    /// `run/@id`
    pub run_id: Option<String>,

    /// `run/@startTimeStamp`
    pub run_start_time: Option<String>,

    /// `spectrumList/@count`
    pub spectrum_count: Option<usize>,
}
