use super::*;
use crate::spectra::{PayloadBuilder, ScanBuilder, SpectralPayload};

fn sample_payload() -> SpectralPayload {
    PayloadBuilder::new()
        .run_id(Some("store_run".to_string()))
        .add_scan(
            ScanBuilder::new(1)
                .retention_time(0.25)
                .add_peak(301.14159, 1200.0)
                .add_peak(445.12003, 88.5)
                .build(),
        )
        .add_scan(
            ScanBuilder::new(2)
                .ms_level(2)
                .retention_time(0.3)
                .filter_string("ITMS + c NSI d")
                .add_peak(120.08, 5.0)
                .build(),
        )
        .build()
}

#[test]
fn test_save_then_load_with_hash() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.msAIr");
    let payload = sample_payload();

    let hash = ContentStore::save(&payload, &path).unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let loaded: Loaded<SpectralPayload> = ContentStore::load(&path, Some(&hash)).unwrap();
    assert_eq!(loaded.verified, Some(true));
    assert_eq!(loaded.value, payload);
}

#[test]
fn test_load_without_hash_makes_no_claim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.msAIr");
    ContentStore::save(&sample_payload(), &path).unwrap();

    let loaded: Loaded<SpectralPayload> = ContentStore::load(&path, None).unwrap();
    assert_eq!(loaded.verified, None);
}

#[test]
fn test_hash_of_matches_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.msAIm");

    let hash = ContentStore::save(&vec![1u32, 2, 3], &path).unwrap();
    assert_eq!(ContentStore::hash_of(&path).unwrap(), hash);
    assert!(ContentStore::verify(&path, &hash).unwrap());
    assert!(!ContentStore::verify(&path, &"0".repeat(64)).unwrap());
}

#[test]
fn test_hash_of_known_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc.bin");
    std::fs::write(&path, b"abc").unwrap();

    assert_eq!(
        ContentStore::hash_of(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_hash_spans_multiple_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.bin");
    let data: Vec<u8> = (0..HASH_BLOCK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &data).unwrap();

    let expected = format!("{:x}", Sha256::digest(&data));
    assert_eq!(ContentStore::hash_of(&path).unwrap(), expected);
}

/// Reader that is interrupted before every chunk it delivers
struct Interrupting<'a> {
    data: &'a [u8],
    interrupt: bool,
}

impl Read for Interrupting<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt && !self.data.is_empty() {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = buf.len().min(self.data.len()).min(7);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn test_hash_retries_interrupted_reads() {
    let data = b"interrupted reads are retried until end of input";
    let reader = Interrupting {
        data,
        interrupt: false,
    };

    let expected = format!("{:x}", Sha256::digest(data));
    assert_eq!(ContentStore::hash_reader(reader).unwrap(), expected);
}

#[test]
fn test_tampered_file_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.msAIr");
    let hash = ContentStore::save(&sample_payload(), &path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(!ContentStore::verify(&path, &hash).unwrap());
    match ContentStore::load::<SpectralPayload, _>(&path, Some(&hash)) {
        Ok(loaded) => assert_eq!(loaded.verified, Some(false)),
        Err(StoreError::Decompress(_)) | Err(StoreError::Format(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ContentStore::load::<SpectralPayload, _>(dir.path().join("nope.msAIr"), None);
    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_non_bzip2_file_is_decompress_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.msAIr");
    std::fs::write(&path, b"definitely not bzip2 data").unwrap();

    let result = ContentStore::load::<SpectralPayload, _>(&path, None);
    assert!(matches!(result, Err(StoreError::Decompress(_))));
}

#[test]
fn test_wrong_magic_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.msAIr");
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"NOPE\x01\x00").unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let result = ContentStore::load::<SpectralPayload, _>(&path, None);
    assert!(matches!(result, Err(StoreError::Format(_))));
}

#[test]
fn test_wrong_type_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text.msAIm");
    ContentStore::save("just a string", &path).unwrap();

    let result = ContentStore::load::<SpectralPayload, _>(&path, None);
    assert!(matches!(result, Err(StoreError::Format(_))));
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.msAIr");

    let first = ContentStore::save(&1u64, &path).unwrap();
    let second = ContentStore::save(&2u64, &path).unwrap();
    assert_ne!(first, second);

    let loaded: Loaded<u64> = ContentStore::load(&path, Some(&second)).unwrap();
    assert_eq!(loaded.value, 2);
    assert_eq!(loaded.verified, Some(true));
    // No temporary files left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
