use std::io::BufRead;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use super::{attribute, MzMLError, MzMLStreamer};
use crate::mzml::binary::{ArrayDescriptor, ArrayKind, BinaryDecoder};
use crate::mzml::cv_params::{normalize_retention_time, CvParam, MS_CV_ACCESSIONS};
use crate::mzml::models::MzMLSpectrum;

/// Where in a `<spectrum>` element the parser currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Spectrum,
    ScanList,
    PrecursorList,
    BinaryArray,
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Read the next spectrum from the stream
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        if !self.in_spectrum_list {
            self.read_metadata()?;
            if !self.in_spectrum_list {
                return Ok(None);
            }
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"spectrum" {
                        let spectrum = self.parse_spectrum(&e)?;
                        self.current_spectrum_index += 1;
                        return Ok(Some(spectrum));
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"spectrumList" {
                        self.in_spectrum_list = false;
                        return Ok(None);
                    }
                }
                Ok(Event::Eof) => {
                    self.in_spectrum_list = false;
                    return Ok(None);
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Parse a single spectrum element
    fn parse_spectrum(&mut self, start_event: &BytesStart) -> Result<MzMLSpectrum, MzMLError> {
        let decoder = self.reader.decoder();
        let mut spectrum = MzMLSpectrum {
            index: attribute(start_event, "index", decoder)?
                .and_then(|s| s.parse().ok())
                .unwrap_or(self.current_spectrum_index),
            id: attribute(start_event, "id", decoder)?.unwrap_or_default(),
            default_array_length: attribute(start_event, "defaultArrayLength", decoder)?
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            ms_level: 1,
            ..Default::default()
        };

        let mut depth = 1;
        let mut section = Section::Spectrum;
        let mut array_cv_params: Vec<CvParam> = Vec::new();
        let mut array_base64 = String::new();
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"cvParam" => {
                            let cv = cv_param(e, decoder)?;
                            Self::apply_cv_param(&mut spectrum, section, cv, &mut array_cv_params);
                        }
                        b"scanList" => section = Section::ScanList,
                        b"precursorList" => section = Section::PrecursorList,
                        b"binaryDataArray" => {
                            section = Section::BinaryArray;
                            array_cv_params.clear();
                            array_base64.clear();
                        }
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"cvParam" {
                        let cv = cv_param(e, decoder)?;
                        Self::apply_cv_param(&mut spectrum, section, cv, &mut array_cv_params);
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if section == Section::BinaryArray {
                        // Base64 may be split across several text events
                        array_base64.push_str(&t.unescape()?);
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"spectrum" if depth == 0 => break,
                        b"scanList" | b"precursorList" => section = Section::Spectrum,
                        b"binaryDataArray" => {
                            Self::decode_binary_array(&mut spectrum, &array_cv_params, &array_base64)?;
                            section = Section::Spectrum;
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in spectrum".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(spectrum)
    }

    /// Route a cvParam to the spectrum, the scan, or the current binary array
    fn apply_cv_param(
        spectrum: &mut MzMLSpectrum,
        section: Section,
        cv: CvParam,
        array_cv_params: &mut Vec<CvParam>,
    ) {
        match section {
            Section::BinaryArray => array_cv_params.push(cv),
            // Precursor selection details are not part of the payload
            Section::PrecursorList => {}
            Section::ScanList if cv.accession == MS_CV_ACCESSIONS::SCAN_START_TIME => {
                if let Some(val) = cv.value_as_f64() {
                    spectrum.retention_time =
                        Some(normalize_retention_time(val, cv.unit_accession.as_deref()));
                }
            }
            Section::ScanList | Section::Spectrum => match cv.accession.as_str() {
                MS_CV_ACCESSIONS::MS_LEVEL => {
                    spectrum.ms_level = cv.value_as_i64().unwrap_or(1) as i16;
                }
                MS_CV_ACCESSIONS::TOTAL_ION_CURRENT => {
                    spectrum.total_ion_current = cv.value_as_f64();
                }
                MS_CV_ACCESSIONS::FILTER_STRING => {
                    spectrum.filter_string = cv.value;
                }
                _ => {}
            },
        }
    }

    /// Decode binary array and add to spectrum
    fn decode_binary_array(
        spectrum: &mut MzMLSpectrum,
        cv_params: &[CvParam],
        base64_data: &str,
    ) -> Result<(), MzMLError> {
        let descriptor = ArrayDescriptor::from_cv_params(cv_params);
        if descriptor.kind == ArrayKind::Other {
            return Ok(());
        }

        let values = BinaryDecoder::decode(
            base64_data,
            &descriptor,
            Some(spectrum.default_array_length),
        )
        .map_err(|source| MzMLError::BinaryError {
            id: spectrum.id.clone(),
            source,
        })?;

        match descriptor.kind {
            ArrayKind::Mz => spectrum.mz_array = values,
            ArrayKind::Intensity => spectrum.intensity_array = values,
            ArrayKind::Other => {}
        }

        Ok(())
    }
}

fn cv_param(e: &BytesStart, decoder: Decoder) -> Result<CvParam, MzMLError> {
    Ok(CvParam {
        accession: attribute(e, "accession", decoder)?.unwrap_or_default(),
        name: attribute(e, "name", decoder)?.unwrap_or_default(),
        value: attribute(e, "value", decoder)?,
        unit_accession: attribute(e, "unitAccession", decoder)?,
    })
}
