//! Integration tests for msai
//!
//! These tests run the full pipeline on real mzML files: catalog, metadata
//! join, initialization, caching, snapshot reload and verification.

#![cfg(feature = "mzml")]

use msai::prelude::*;
use msai::metadata::CACHE_HASH_COLUMN;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Minimal mzML with two spectra; m/z [100, 200] and intensity [100, 200] on the first
fn mzml(run_id: &str, start_seconds: f64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="{run_id}" startTimeStamp="2020-06-01T08:30:00Z">
    <spectrumList count="2">
      <spectrum index="0" id="scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{start_seconds}" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
      <spectrum index="1" id="scan=2" defaultArrayLength="0">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <cvParam cvRef="MS" accession="MS:1000285" name="total ion current" value="42.0"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="2.0" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="0"/>
      </spectrum>
    </spectrumList>
  </run>
</mzML>"#
    )
}

fn write_runs(dir: &Path, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        let content = mzml(name, 30.0 * (i + 1) as f64);
        fs::write(dir.join(format!("{}.mzML", name)), content).unwrap();
    }
}

/// Metadata for A and C; `sample` is the only uniquely identifying column
fn write_metadata(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("samples.csv");
    fs::write(&path, "sample,group,batch\nA,ctrl,1\nC,ctrl,1\n").unwrap();
    path
}

fn sequential() -> CollectionOptions {
    CollectionOptions {
        inner_join: false,
        parallel: ParallelConfig::sequential(),
    }
}

/// Build the example collection: {A, B, C}.mzML with metadata for A and C
#[test]
fn test_left_join_then_save_all() {
    let runs = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_runs(runs.path(), &["A", "B", "C"]);
    let meta_path = write_metadata(runs.path());

    let table = MetadataTable::import(&meta_path, true).unwrap();
    assert_eq!(table.index(), &TableIndex::Column("sample".to_string()));

    let catalog = FileCatalog::build(runs.path(), TypeFilter::All, true).unwrap();
    assert_eq!(catalog.len(), 3);

    let mut collection = SampleCollection::build(catalog, &[table], sequential()).unwrap();
    assert_eq!(collection.len(), 3);
    assert_eq!(collection.metadata_columns(), &["group".to_string(), "batch".to_string()]);
    assert!(collection.get("B").unwrap().metadata.is_empty());
    assert_eq!(
        collection.get("C").unwrap().metadata.get("group"),
        Some(&Value::from("ctrl"))
    );

    collection.initialize_all().unwrap();
    let payload = collection.get("A").unwrap().run.payload().unwrap();
    assert_eq!(payload.run_id(), Some("A"));
    assert_eq!(payload.spectrum_count(), 2);
    assert_eq!(payload.peak_count(), 2);
    assert!((payload.spectra()[0].retention_time - 0.5).abs() < 1e-9);
    assert!((payload.spectra()[1].retention_time - 2.0).abs() < 1e-9);
    assert!((payload.tic_sum() - 342.0).abs() < 1e-6);

    collection.save_all(cache.path()).unwrap();

    let cached: Vec<_> = fs::read_dir(cache.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "msAIr"))
        .collect();
    assert_eq!(cached.len(), 3);

    for row in collection.rows() {
        let hash = row.metadata.get(CACHE_HASH_COLUMN).and_then(Value::as_str).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_inner_join_drops_unmatched_runs() {
    let runs = tempdir().unwrap();
    write_runs(runs.path(), &["A", "B", "C"]);
    let table = MetadataTable::import(write_metadata(runs.path()), true).unwrap();

    let catalog = FileCatalog::build(runs.path(), TypeFilter::Raw, false).unwrap();
    let options = CollectionOptions {
        inner_join: true,
        ..sequential()
    };
    let collection = SampleCollection::build(catalog, &[table], options).unwrap();

    let names: Vec<_> = collection.rows().iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[test]
fn test_snapshot_reload_verifies_every_run() {
    let runs = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_runs(runs.path(), &["A", "B", "C"]);
    let table = MetadataTable::import(write_metadata(runs.path()), true).unwrap();

    let catalog = FileCatalog::build(runs.path(), TypeFilter::Raw, true).unwrap();
    let mut original = SampleCollection::build(catalog, &[table], sequential()).unwrap();
    original.initialize_all().unwrap();
    original.save_all(cache.path()).unwrap();
    let snapshot_hash = original.save_metadata(cache.path(), "study").unwrap();

    let snapshot_path = cache.path().join("study.msAIm");
    let snapshot = MetadataTable::import_snapshot(&snapshot_path, Some(&snapshot_hash)).unwrap();
    assert_eq!(snapshot.verified, Some(true));

    let catalog = FileCatalog::build(cache.path(), TypeFilter::Cached, true).unwrap();
    let mut reloaded = SampleCollection::build(catalog, &[snapshot.value], sequential()).unwrap();
    reloaded.initialize_all().unwrap();

    assert_eq!(reloaded.len(), 3);
    for row in reloaded.rows() {
        let before = original.get(&row.name).unwrap();
        assert_eq!(row.file_type, FileType::Cached);
        assert_eq!(row.run.payload(), before.run.payload());

        let hash = row.run.cache_hash().unwrap();
        let loaded: Loaded<SpectralPayload> = ContentStore::load(&row.path, Some(hash)).unwrap();
        assert_eq!(loaded.verified, Some(true));
        assert_eq!(Some(&loaded.value), before.run.payload());
    }
    assert_eq!(
        reloaded.get("A").unwrap().metadata.get("group"),
        Some(&Value::from("ctrl"))
    );
}

#[test]
fn test_tampered_cache_is_detected() {
    let runs = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_runs(runs.path(), &["A"]);

    let mut run = RunHandle::new(runs.path().join("A.mzML"));
    run.initialize().unwrap();
    let hash = run.save(cache.path(), "A").unwrap();

    let cached = cache.path().join("A.msAIr");
    let mut bytes = fs::read(&cached).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    fs::write(&cached, bytes).unwrap();

    assert!(!ContentStore::verify(&cached, &hash).unwrap());
    match ContentStore::load::<SpectralPayload, _>(&cached, Some(&hash)) {
        Ok(loaded) => assert_eq!(loaded.verified, Some(false)),
        Err(_) => {}
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let runs = tempdir().unwrap();
    let names = ["S01", "S02", "S03", "S04", "S05", "S06", "S07"];
    write_runs(runs.path(), &names);

    let build = |parallel: ParallelConfig| {
        let catalog = FileCatalog::build(runs.path(), TypeFilter::Raw, true).unwrap();
        let options = CollectionOptions {
            inner_join: false,
            parallel,
        };
        let mut collection = SampleCollection::build(catalog, &[], options).unwrap();
        collection.initialize_all().unwrap();
        collection
    };

    let sequential = build(ParallelConfig::sequential());
    for workers in [1, 2, 8] {
        let parallel = build(ParallelConfig::with_workers(workers));
        assert_eq!(parallel.len(), names.len());
        for (p, s) in parallel.rows().iter().zip(sequential.rows()) {
            assert_eq!(p.name, s.name);
            assert_eq!(p.run, s.run);
        }
    }
}

#[test]
fn test_duplicate_names_fail_catalog() {
    let runs = tempdir().unwrap();
    write_runs(runs.path(), &["A"]);
    fs::create_dir(runs.path().join("nested")).unwrap();
    write_runs(&runs.path().join("nested"), &["A"]);

    match FileCatalog::build(runs.path(), TypeFilter::All, true) {
        Err(msai::catalog::CatalogError::DuplicateNames(dups)) => {
            assert_eq!(dups.len(), 2);
            assert!(dups.iter().all(|d| d.name == "A"));
        }
        other => panic!("expected duplicate names, got {:?}", other),
    }

    // Non-recursive scans only see the top level
    assert_eq!(FileCatalog::build(runs.path(), TypeFilter::All, false).unwrap().len(), 1);
}
