//! Controlled vocabulary (CV) parameters used by the mzML reader
//!
//! Only the PSI-MS accessions that feed a [`SpectralPayload`](crate::spectra::SpectralPayload)
//! are listed; every other cvParam is parsed and ignored.

/// A controlled vocabulary parameter from mzML
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvParam {
    /// Accession number (e.g., "MS:1000511")
    pub accession: String,

    /// Human-readable name
    pub name: String,

    /// Optional value
    pub value: Option<String>,

    /// Unit accession
    pub unit_accession: Option<String>,
}

impl CvParam {
    /// Get the value as f64 if possible
    pub fn value_as_f64(&self) -> Option<f64> {
        self.value.as_ref()?.trim().parse().ok()
    }

    /// Get the value as i64 if possible
    pub fn value_as_i64(&self) -> Option<i64> {
        self.value.as_ref()?.trim().parse().ok()
    }
}

/// PSI-MS accessions read by the spectrum parser
#[allow(non_snake_case)]
pub mod MS_CV_ACCESSIONS {
    /// MS level
    pub const MS_LEVEL: &str = "MS:1000511";

    /// Scan start time
    pub const SCAN_START_TIME: &str = "MS:1000016";

    /// Total ion current
    pub const TOTAL_ION_CURRENT: &str = "MS:1000285";

    /// Filter string
    pub const FILTER_STRING: &str = "MS:1000512";

    /// 32-bit float
    pub const FLOAT_32_BIT: &str = "MS:1000521";

    /// 64-bit float
    pub const FLOAT_64_BIT: &str = "MS:1000523";

    /// zlib compression
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";

    /// No compression
    pub const NO_COMPRESSION: &str = "MS:1000576";

    /// MS-Numpress linear prediction
    pub const NUMPRESS_LINEAR: &str = "MS:1002312";

    /// MS-Numpress positive integer
    pub const NUMPRESS_PIC: &str = "MS:1002313";

    /// MS-Numpress short logged float
    pub const NUMPRESS_SLOF: &str = "MS:1002314";

    /// m/z array
    pub const MZ_ARRAY: &str = "MS:1000514";

    /// Intensity array
    pub const INTENSITY_ARRAY: &str = "MS:1000515";

    /// Second (unit ontology)
    pub const UNIT_SECOND: &str = "UO:0000010";

    /// Minute (unit ontology)
    pub const UNIT_MINUTE: &str = "UO:0000031";

    /// Millisecond (unit ontology)
    pub const UNIT_MILLISECOND: &str = "UO:0000028";
}

/// Convert retention time to seconds based on unit
pub fn normalize_retention_time(value: f64, unit_accession: Option<&str>) -> f64 {
    match unit_accession {
        Some(MS_CV_ACCESSIONS::UNIT_MINUTE) => value * 60.0,
        Some(MS_CV_ACCESSIONS::UNIT_MILLISECOND) => value / 1000.0,
        _ => value,
    }
}
