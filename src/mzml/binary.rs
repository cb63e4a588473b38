//! Binary data array decoding for mzML
//!
//! Peak arrays are stored as Base64 text, optionally zlib-compressed, holding
//! little-endian 32- or 64-bit floats. Decoding runs the three steps in order:
//! Base64, decompression, float conversion.

use std::io::Read;

use base64::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

use super::cv_params::{CvParam, MS_CV_ACCESSIONS};

/// Compression applied to a binary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayCompression {
    /// Raw little-endian bytes
    #[default]
    None,
    /// zlib (MS:1000574)
    Zlib,
    /// Any MS-Numpress flavour; recognised but not decoded
    Numpress,
}

/// Float width of a binary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// 32-bit float (MS:1000521)
    Float32,
    /// 64-bit float (MS:1000523)
    #[default]
    Float64,
}

impl BinaryEncoding {
    /// Bytes per value
    pub fn byte_size(&self) -> usize {
        match self {
            BinaryEncoding::Float32 => 4,
            BinaryEncoding::Float64 => 8,
        }
    }
}

/// Which spectrum array a `binaryDataArray` carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// m/z values
    Mz,
    /// Intensity values
    Intensity,
    /// Any other array (ion mobility, noise, ...), skipped
    Other,
}

/// Encoding description collected from the cvParams of one `binaryDataArray`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Float width
    pub encoding: BinaryEncoding,
    /// Compression
    pub compression: ArrayCompression,
    /// Array role
    pub kind: ArrayKind,
}

impl ArrayDescriptor {
    /// Build a descriptor from the array's cvParams
    pub fn from_cv_params(cv_params: &[CvParam]) -> Self {
        let mut descriptor = Self {
            encoding: BinaryEncoding::Float64,
            compression: ArrayCompression::None,
            kind: ArrayKind::Other,
        };

        for cv in cv_params {
            match cv.accession.as_str() {
                MS_CV_ACCESSIONS::FLOAT_32_BIT => descriptor.encoding = BinaryEncoding::Float32,
                MS_CV_ACCESSIONS::FLOAT_64_BIT => descriptor.encoding = BinaryEncoding::Float64,
                MS_CV_ACCESSIONS::ZLIB_COMPRESSION => descriptor.compression = ArrayCompression::Zlib,
                MS_CV_ACCESSIONS::NO_COMPRESSION => descriptor.compression = ArrayCompression::None,
                MS_CV_ACCESSIONS::NUMPRESS_LINEAR
                | MS_CV_ACCESSIONS::NUMPRESS_PIC
                | MS_CV_ACCESSIONS::NUMPRESS_SLOF => {
                    descriptor.compression = ArrayCompression::Numpress
                }
                MS_CV_ACCESSIONS::MZ_ARRAY => descriptor.kind = ArrayKind::Mz,
                MS_CV_ACCESSIONS::INTENSITY_ARRAY => descriptor.kind = ArrayKind::Intensity,
                _ => {}
            }
        }

        descriptor
    }
}

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// Malformed Base64 text
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// zlib stream or byte conversion failed
    #[error("Decompression error: {0}")]
    DecompressionError(#[from] std::io::Error),

    /// Decoded value count disagrees with `defaultArrayLength`
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected value (or byte) count
        expected: usize,
        /// Actual value (or byte) count
        actual: usize,
    },

    /// Compression scheme this reader does not decode
    #[error("Unsupported compression: {0:?}")]
    UnsupportedCompression(ArrayCompression),
}

/// Decoder for mzML binary data arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode a Base64-encoded array into `f64` values.
    ///
    /// `expected_length` is the spectrum's `defaultArrayLength`; when given, the
    /// decoded value count must match it.
    pub fn decode(
        base64_data: &str,
        descriptor: &ArrayDescriptor,
        expected_length: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let decoded_bytes = BASE64_STANDARD.decode(trimmed)?;

        let uncompressed = match descriptor.compression {
            ArrayCompression::None => decoded_bytes,
            ArrayCompression::Zlib => {
                let mut decoder = ZlibDecoder::new(&decoded_bytes[..]);
                let mut uncompressed = Vec::new();
                decoder.read_to_end(&mut uncompressed)?;
                uncompressed
            }
            ArrayCompression::Numpress => {
                return Err(BinaryDecodeError::UnsupportedCompression(descriptor.compression));
            }
        };

        let values = Self::bytes_to_floats(&uncompressed, descriptor.encoding)?;

        if let Some(expected) = expected_length {
            if values.len() != expected {
                return Err(BinaryDecodeError::InvalidLength {
                    expected,
                    actual: values.len(),
                });
            }
        }

        Ok(values)
    }

    fn bytes_to_floats(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let byte_size = encoding.byte_size();

        if bytes.len() % byte_size != 0 {
            return Err(BinaryDecodeError::InvalidLength {
                expected: bytes.len() / byte_size * byte_size,
                actual: bytes.len(),
            });
        }

        let count = bytes.len() / byte_size;
        let mut values = Vec::with_capacity(count);
        let mut cursor = std::io::Cursor::new(bytes);

        match encoding {
            BinaryEncoding::Float32 => {
                for _ in 0..count {
                    values.push(cursor.read_f32::<LittleEndian>()? as f64);
                }
            }
            BinaryEncoding::Float64 => {
                for _ in 0..count {
                    values.push(cursor.read_f64::<LittleEndian>()?);
                }
            }
        }

        Ok(values)
    }
}
