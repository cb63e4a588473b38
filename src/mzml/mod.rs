//! # mzML Reader
//!
//! Streaming reader for mzML, the XML-based community standard for mass
//! spectrometry data defined by HUPO-PSI. Only what a run payload needs is
//! extracted: run header attributes, per-spectrum scan parameters, and the
//! m/z and intensity arrays.
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     ├── cvList, fileDescription, softwareList, ...
//!     └── run
//!         ├── spectrumList
//!         │   └── spectrum* (many)
//!         │       ├── cvParam*
//!         │       ├── scanList
//!         │       ├── precursorList (for MS2+)
//!         │       └── binaryDataArrayList
//!         │           └── binaryDataArray*
//!         │               ├── cvParam* (encoding info)
//!         │               └── binary (base64 data)
//!         └── chromatogramList (optional, ignored)
//! ```

mod binary;
mod cv_params;
mod models;
mod streamer;

pub use binary::{
    ArrayCompression, ArrayDescriptor, ArrayKind, BinaryDecodeError, BinaryDecoder,
    BinaryEncoding,
};
pub use cv_params::{normalize_retention_time, CvParam, MS_CV_ACCESSIONS};
pub use models::{MzMLFileMetadata, MzMLSpectrum};
pub use streamer::{MzMLError, MzMLStreamer, SpectrumIterator, DEFAULT_INPUT_BUFFER_SIZE};
