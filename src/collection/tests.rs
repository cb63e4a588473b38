use super::*;
use crate::catalog::TypeFilter;
use crate::spectra::{PayloadBuilder, RawReadError, ScanBuilder, SpectralPayload};
use crate::store::ContentStore;
use std::fs;
use tempfile::TempDir;

/// Reader that derives a small payload from the file stem
struct StemReader;

impl StemReader {
    fn payload_for(stem: &str) -> SpectralPayload {
        let scans = stem.len() as i64 + 1;
        let mut builder = PayloadBuilder::new().run_id(Some(stem.to_string()));
        for id in 1..=scans {
            builder.push(
                ScanBuilder::new(id)
                    .retention_time(id as f64 * 0.1)
                    .add_peak(100.0 + id as f64, 10.0 * id as f64)
                    .build(),
            );
        }
        builder.build()
    }
}

impl RawReader for StemReader {
    fn format_name(&self) -> &str {
        "stem"
    }

    fn read(&self, path: &Path) -> Result<SpectralPayload, RawReadError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.starts_with("Bad") {
            return Err(RawReadError::Unsupported(path.display().to_string()));
        }
        Ok(Self::payload_for(&stem))
    }
}

fn raw_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(format!("{}.mzML", name)), b"<mzML/>").unwrap();
    }
    dir
}

fn indexed_table(csv: &str, source: &str) -> MetadataTable {
    let mut table = MetadataTable::from_reader(csv.as_bytes(), b',', source).unwrap();
    table.set_index("name").unwrap();
    table
}

fn collection(dir: &Path, tables: &[MetadataTable], options: CollectionOptions) -> SampleCollection {
    let catalog = FileCatalog::build(dir, TypeFilter::All, true).unwrap();
    SampleCollection::builder(catalog)
        .tables(tables)
        .options(options)
        .with_reader(Arc::new(StemReader))
        .build()
        .unwrap()
}

fn sequential() -> CollectionOptions {
    CollectionOptions {
        inner_join: false,
        parallel: ParallelConfig::sequential(),
    }
}

fn names(collection: &SampleCollection) -> Vec<&str> {
    collection.rows().iter().map(|row| row.name.as_str()).collect()
}

#[test]
fn test_left_join_keeps_every_file() {
    let dir = raw_dir(&["A", "B", "C"]);
    let meta = indexed_table("name,group\nA,ctrl\nC,treated\n", "groups.csv");

    let collection = collection(dir.path(), &[meta], sequential());

    assert_eq!(names(&collection), vec!["A", "B", "C"]);
    assert_eq!(collection.metadata_columns(), &["group".to_string()]);

    let a = collection.get("A").unwrap();
    assert_eq!(a.metadata.get("group"), Some(&Value::from("ctrl")));
    assert_eq!(a.file_type, FileType::Raw);
    assert_eq!(a.run.path(), a.path.as_path());
    assert_eq!(
        a.run.metadata().and_then(|m| m.get("group")),
        Some(&Value::from("ctrl"))
    );

    let b = collection.get("B").unwrap();
    assert!(b.metadata.is_empty());
    assert!(b.run.metadata().is_none());
    assert!(!b.run.is_initialized());
}

#[test]
fn test_inner_join_keeps_matches_in_catalog_order() {
    let dir = raw_dir(&["A", "B", "C", "D"]);
    let first = indexed_table("name,group\nD,x\nA,y\nC,z\n", "first.csv");
    let second = indexed_table("name,dose\nC,1.5\nD,2.5\nB,0.5\n", "second.csv");

    let options = CollectionOptions {
        inner_join: true,
        ..sequential()
    };
    let collection = collection(dir.path(), &[first, second], options);

    assert_eq!(names(&collection), vec!["C", "D"]);
    assert_eq!(collection.metadata_columns(), &["group".to_string(), "dose".to_string()]);
    assert_eq!(collection.get("D").unwrap().metadata.get("dose"), Some(&Value::Float(2.5)));
}

#[test]
fn test_inner_join_without_tables_keeps_all() {
    let dir = raw_dir(&["A", "B"]);
    let options = CollectionOptions {
        inner_join: true,
        ..sequential()
    };
    assert_eq!(collection(dir.path(), &[], options).len(), 2);
}

#[test]
fn test_colliding_columns_are_suffixed() {
    let dir = raw_dir(&["A"]);
    let first = indexed_table("name,group,path\nA,ctrl,/x\n", "first.csv");
    let second = indexed_table("name,group\nA,batch1\n", "second.csv");

    let collection = collection(dir.path(), &[first, second], sequential());

    assert_eq!(
        collection.metadata_columns(),
        &["group".to_string(), "path_1".to_string(), "group_2".to_string()]
    );

    let a = collection.get("A").unwrap();
    assert_eq!(a.metadata.get("group"), Some(&Value::from("ctrl")));
    assert_eq!(a.metadata.get("group_2"), Some(&Value::from("batch1")));
    assert_eq!(a.metadata.get("path_1"), Some(&Value::from("/x")));
    // The run keeps the tables' own labels; the later table wins
    assert_eq!(
        a.run.metadata().and_then(|m| m.get("group")),
        Some(&Value::from("batch1"))
    );
}

#[test]
fn test_positional_table_matches_nothing() {
    let dir = raw_dir(&["A", "B"]);
    let table = MetadataTable::from_reader("name,group\nA,x\nB,y\n".as_bytes(), b',', "p.csv").unwrap();

    let collection = collection(dir.path(), &[table], sequential());

    assert_eq!(collection.len(), 2);
    assert!(collection.rows().iter().all(|row| row.metadata.is_empty()));
}

#[test]
fn test_initialize_and_save_all() {
    let dir = raw_dir(&["A", "B", "C"]);
    let cache = tempfile::tempdir().unwrap();
    let mut collection = collection(dir.path(), &[], sequential());

    collection.initialize_all().unwrap();
    assert!(collection.rows().iter().all(|row| row.run.is_initialized()));
    assert_eq!(
        collection.get("B").unwrap().run.payload(),
        Some(&StemReader::payload_for("B"))
    );

    collection.save_all(cache.path()).unwrap();
    assert_eq!(collection.metadata_columns(), &[CACHE_HASH_COLUMN.to_string()]);

    for row in collection.rows() {
        let file = cache.path().join(format!("{}.msAIr", row.name));
        let hash = row.metadata.get(CACHE_HASH_COLUMN).and_then(Value::as_str).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(row.run.cache_hash(), Some(hash));
        assert!(ContentStore::verify(&file, hash).unwrap());
    }
}

#[test]
fn test_save_all_twice_overwrites_hash_column() {
    let dir = raw_dir(&["A"]);
    let cache = tempfile::tempdir().unwrap();
    let mut collection = collection(dir.path(), &[], sequential());

    collection.initialize_all().unwrap();
    collection.save_all(cache.path()).unwrap();
    collection.save_all(cache.path()).unwrap();

    assert_eq!(collection.metadata_columns().len(), 1);
    assert_eq!(collection.get("A").unwrap().metadata.len(), 1);
}

#[test]
fn test_save_all_requires_initialized_runs() {
    let dir = raw_dir(&["A", "B"]);
    let cache = tempfile::tempdir().unwrap();
    let mut collection = collection(dir.path(), &[], sequential());

    let err = collection.save_all(cache.path()).unwrap_err();
    assert!(matches!(
        err,
        CollectionError::Run { sample, source: RunError::NotInitialized(_), .. } if sample == "A"
    ));
}

#[test]
fn test_failed_initialize_all_commits_nothing() {
    for parallel in [ParallelConfig::sequential(), ParallelConfig::with_workers(2)] {
        let dir = raw_dir(&["A", "Bad", "C"]);
        let options = CollectionOptions {
            inner_join: false,
            parallel,
        };
        let mut collection = collection(dir.path(), &[], options);

        let err = collection.initialize_all().unwrap_err();
        assert!(matches!(err, CollectionError::Run { ref sample, .. } if sample == "Bad"));

        assert_eq!(names(&collection), vec!["A", "Bad", "C"]);
        assert!(collection.rows().iter().all(|row| !row.run.is_initialized()));
    }
}

#[test]
fn test_failed_save_all_records_no_hashes() {
    for parallel in [ParallelConfig::sequential(), ParallelConfig::with_workers(3)] {
        let dir = raw_dir(&["A", "B", "C"]);
        let cache = tempfile::tempdir().unwrap();
        // A directory in place of B's cache file makes B's save fail
        fs::create_dir(cache.path().join("B.msAIr")).unwrap();
        let options = CollectionOptions {
            inner_join: false,
            parallel,
        };
        let mut collection = collection(dir.path(), &[], options);
        collection.initialize_all().unwrap();

        let err = collection.save_all(cache.path()).unwrap_err();
        assert!(matches!(err, CollectionError::Run { ref sample, .. } if sample == "B"));

        assert!(collection.metadata_columns().is_empty());
        assert_eq!(names(&collection), vec!["A", "B", "C"]);
        for row in collection.rows() {
            assert!(row.run.is_initialized());
            assert!(row.metadata.get(CACHE_HASH_COLUMN).is_none());
            assert_eq!(row.run.cache_hash(), None);
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = raw_dir(&["A", "BB", "CCC", "DDDD", "EEEEE"]);
    let meta = indexed_table("name,group\nA,x\nCCC,y\nEEEEE,z\n", "m.csv");
    let tables = [meta];

    let mut seq = collection(dir.path(), &tables, sequential());
    seq.initialize_all().unwrap();

    for workers in [1, 2, 8] {
        let options = CollectionOptions {
            inner_join: false,
            parallel: ParallelConfig::with_workers(workers),
        };
        let mut par = collection(dir.path(), &tables, options);
        par.initialize_all().unwrap();

        assert_eq!(names(&par), names(&seq));
        for (p, s) in par.rows().iter().zip(seq.rows()) {
            assert_eq!(p.metadata, s.metadata);
            assert_eq!(p.run, s.run);
        }
        assert_eq!(par.to_record_batch().unwrap(), seq.to_record_batch().unwrap());
    }
}

#[test]
fn test_snapshot_reload() {
    let dir = raw_dir(&["A", "B", "C"]);
    let cache = tempfile::tempdir().unwrap();
    let meta = indexed_table("name,group\nA,ctrl\nC,treated\n", "groups.csv");

    let mut original = collection(dir.path(), &[meta], sequential());
    original.initialize_all().unwrap();
    original.save_all(cache.path()).unwrap();
    let hash = original.save_metadata(cache.path(), "study").unwrap();

    let snapshot_path = cache.path().join("study.msAIm");
    assert!(ContentStore::verify(&snapshot_path, &hash).unwrap());

    let snapshot = MetadataTable::import(&snapshot_path, false).unwrap();
    assert_eq!(snapshot.index_column(), Some(NAME_COLUMN));
    assert_eq!(snapshot.len(), 3);

    let catalog = FileCatalog::build(cache.path(), TypeFilter::Cached, false).unwrap();
    assert_eq!(catalog.len(), 3);
    let mut reloaded = SampleCollection::build(catalog, &[snapshot], sequential()).unwrap();

    assert_eq!(
        reloaded.metadata_columns(),
        &["group".to_string(), CACHE_HASH_COLUMN.to_string()]
    );
    assert!(reloaded.get("B").unwrap().metadata.get("group").is_none());

    reloaded.initialize_all().unwrap();
    for row in reloaded.rows() {
        let before = original.get(&row.name).unwrap();
        assert_eq!(row.file_type, FileType::Cached);
        assert_eq!(row.run.payload(), before.run.payload());
        assert_eq!(row.run.cache_hash(), before.run.cache_hash());
        let file_hash = row.run.cache_hash().unwrap();
        assert!(ContentStore::verify(&row.path, file_hash).unwrap());
    }
}

#[test]
fn test_record_batch_and_display() {
    let dir = raw_dir(&["A", "B"]);
    let meta = indexed_table("name,injection\nA,3\n", "m.csv");
    let mut collection = collection(dir.path(), &[meta], sequential());
    collection.initialize_all().unwrap();

    let batch = collection.to_record_batch().unwrap();
    let schema = batch.schema();
    let columns: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();

    assert_eq!(
        columns,
        vec!["name", "file_type", "size_mb", "path", "injection", "initialized"]
    );
    assert_eq!(schema.field(4).data_type(), &DataType::Int64);
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.column(4).null_count(), 1);
    assert_eq!(collection.shape(), (2, 6));

    let rendered = collection.to_string();
    assert!(rendered.contains("injection"));
    assert!(rendered.contains("mzML"));
}

#[test]
fn test_options_from_toml() {
    let options: CollectionOptions = toml::from_str(
        r#"
        inner_join = true

        [parallel]
        mode = "disabled"
        "#,
    )
    .unwrap();

    assert!(options.inner_join);
    assert_eq!(options.parallel, ParallelConfig::sequential());
    assert_eq!(options.parallel.resolve(), ExecutionStrategy::Sequential);
}
