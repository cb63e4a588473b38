//! # Content-addressed snapshot store
//!
//! [`ContentStore`] persists serializable values as compressed snapshot files
//! and identifies each file by the SHA-256 digest of its bytes on disk. The
//! digest is returned from [`ContentStore::save`], recorded by the caller (the
//! `cache_hash` metadata column), and checked again on load.
//!
//! ## File layout
//!
//! ```text
//! bzip2(
//!     b"MSAI"            magic
//!     u16 LE             format version
//!     u64 LE             body length
//!     [u8; length]       bincode body
//! )
//! ```
//!
//! A digest mismatch is never an error: [`Loaded::verified`] reports it and the
//! caller decides what to do.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use bincode::Options;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

mod error;

#[cfg(test)]
mod tests;

pub use error::StoreError;

/// Leading bytes of every decompressed snapshot
pub const MAGIC: &[u8; 4] = b"MSAI";

/// Current snapshot layout version
pub const FORMAT_VERSION: u16 = 1;

/// Block size used when hashing files (64 KiB)
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// A value read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// The deserialized value
    pub value: T,
    /// `Some(matched)` when a digest was supplied, `None` otherwise
    pub verified: Option<bool>,
}

/// Compressed, hash-verified snapshot files
pub struct ContentStore;

impl ContentStore {
    /// Serialize `value` to `path` and return the SHA-256 hex digest of the
    /// written file.
    ///
    /// The snapshot is written to a temporary file next to `path` and moved
    /// into place once complete, so a failed save never leaves a partial file.
    pub fn save<T, P>(value: &T, path: P) -> Result<String, StoreError>
    where
        T: Serialize + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let body = bincode_options().serialize(value)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(dir)?;
        {
            let mut encoder = BzEncoder::new(
                BufWriter::new(temp_file.as_file_mut()),
                Compression::best(),
            );
            encoder.write_all(MAGIC)?;
            encoder.write_u16::<LittleEndian>(FORMAT_VERSION)?;
            encoder.write_u64::<LittleEndian>(body.len() as u64)?;
            encoder.write_all(&body)?;
            encoder.finish()?.flush()?;
        }
        temp_file.persist(path).map_err(|e| StoreError::Io(e.error))?;

        let hash = Self::hash_of(path)?;
        debug!("Saved {} ({} body bytes, sha256 {})", path.display(), body.len(), hash);
        Ok(hash)
    }

    /// SHA-256 hex digest of the file at `path`, read in [`HASH_BLOCK_SIZE`] blocks
    pub fn hash_of<P: AsRef<Path>>(path: P) -> Result<String, StoreError> {
        let file = File::open(path.as_ref())?;
        Self::hash_reader(BufReader::with_capacity(HASH_BLOCK_SIZE, file))
    }

    fn hash_reader<R: Read>(mut reader: R) -> Result<String, StoreError> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Whether the file at `path` hashes to `expected`
    pub fn verify<P: AsRef<Path>>(path: P, expected: &str) -> Result<bool, StoreError> {
        Ok(Self::hash_of(path)? == expected)
    }

    /// Load a snapshot, checking it against `expected` first when given
    pub fn load<T, P>(path: P, expected: Option<&str>) -> Result<Loaded<T>, StoreError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let verified = match expected {
            Some(hash) => Some(Self::verify(path, hash)?),
            None => None,
        };

        let file = File::open(path)?;
        let mut decoded = Vec::new();
        BzDecoder::new(BufReader::new(file))
            .read_to_end(&mut decoded)
            .map_err(StoreError::Decompress)?;

        let value = decode_frame(&decoded)?;
        Ok(Loaded { value, verified })
    }
}

fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    let truncated = |_| StoreError::Format("truncated header".to_string());
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if &magic != MAGIC {
        return Err(StoreError::Format(format!("bad magic {:?}", magic)));
    }

    let version = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
    if version != FORMAT_VERSION {
        return Err(StoreError::Format(format!(
            "unsupported version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let length = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
    let body = &bytes[cursor.position() as usize..];
    if body.len() as u64 != length {
        return Err(StoreError::Format(format!(
            "body length {} does not match header length {}",
            body.len(),
            length
        )));
    }

    bincode_options()
        .deserialize(body)
        .map_err(|e| StoreError::Format(e.to_string()))
}

/// Deterministic bincode settings shared by save and load
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_little_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}
