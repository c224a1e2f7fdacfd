//! End-to-end batch runs over temporary directory trees

use std::fs;
use std::path::{Path, PathBuf};

use assert_approx_eq::assert_approx_eq;
use mina_rust_lib::{
    read_table_csv, run_batch, write_table_csv, Calibration, Config, Exclusive, ExclusiveExtractor,
    ExtractedImage, FailurePolicy, Field, GraphFileExtractor, MinaError, SkeletonExtractor,
    SkeletonGraph, Value,
};

const RECORD: &str = r#"{
    "components": [
        {"branch_count": 0},
        {"branch_count": 1, "avg_branch_length": 4.0, "edges": [{"length": 4.0}]},
        {"branch_count": 2, "avg_branch_length": 3.0, "edges": [{"length": 2.0}, {"length": 4.0}]}
    ],
    "slices": [{"area": 400.0, "area_fraction": 25.0}]
}"#;

fn write_record(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, RECORD).unwrap();
}

fn config(root: &Path, pattern: &str) -> Config {
    Config {
        root_directory: root.to_path_buf(),
        pattern: pattern.to_string(),
        output_path: root.join("results.csv"),
        ..Config::default()
    }
}

fn titles(table: &mina_rust_lib::BatchTable) -> Vec<String> {
    (0..table.len())
        .map(|row| match table.value(row, Field::ImageTitle) {
            Some(Value::Text(title)) => title.clone(),
            other => panic!("unexpected title {other:?}"),
        })
        .collect()
}

#[test]
fn only_matching_files_become_rows() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_record(&root.join("cell_skel_1.json"));
    write_record(&root.join("a/cell_skel_2.json"));
    write_record(&root.join("a/b/cell_skel_3.json"));
    write_record(&root.join("a/raw_4.json"));
    fs::write(root.join("a/b/notes.txt"), "not a record").unwrap();

    let report = run_batch(&config(root, ".*_skel_[0-9]*"), &GraphFileExtractor::new()).unwrap();

    assert_eq!(report.table.len(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.table.columns, Field::STANDARD.to_vec());
}

#[test]
fn rows_carry_expected_statistics() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell.json"));

    let report = run_batch(&config(dir.path(), "cell"), &GraphFileExtractor::new()).unwrap();
    let table = &report.table;

    assert_eq!(table.value(0, Field::PunctateCount), Some(&Value::Count(1)));
    assert_eq!(table.value(0, Field::RodCount), Some(&Value::Count(1)));
    assert_eq!(table.value(0, Field::NetworkCount), Some(&Value::Count(1)));
    assert_eq!(table.value(0, Field::NetworkBranchCount), Some(&Value::Count(2)));

    let number = |field: Field| table.value(0, field).and_then(Value::as_f64).unwrap();
    assert_approx_eq!(number(Field::MitochondrialFootprint), 100.0);
    assert_approx_eq!(number(Field::RodLenMean), 4.0);
    assert_approx_eq!(number(Field::NetworkBranchLenMean), 3.0);
    assert_approx_eq!(number(Field::BranchLenMean), 10.0 / 3.0);
    assert_approx_eq!(number(Field::SummedBranchLensMean), 10.0 / 3.0);
    assert_approx_eq!(number(Field::NetworkBranchesMean), 1.0);
}

#[test]
fn scale_converts_lengths_and_areas() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell.json"));

    let base = run_batch(&config(dir.path(), "cell"), &GraphFileExtractor::new()).unwrap();
    let scaled_config = Config { scale: 2.0, ..config(dir.path(), "cell") };
    let scaled = run_batch(&scaled_config, &GraphFileExtractor::new()).unwrap();

    let get = |table: &mina_rust_lib::BatchTable, field: Field| {
        table.value(0, field).and_then(Value::as_f64).unwrap()
    };
    assert_approx_eq!(get(&scaled.table, Field::RodLenMean), get(&base.table, Field::RodLenMean) / 2.0);
    assert_approx_eq!(
        get(&scaled.table, Field::MitochondrialFootprint),
        get(&base.table, Field::MitochondrialFootprint) / 4.0
    );
    assert_eq!(scaled.table.value(0, Field::RodCount), base.table.value(0, Field::RodCount));
}

#[test]
fn identity_scale_matches_pixel_values_exactly() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell.json"));

    let extracted = GraphFileExtractor::new();
    let report = run_batch(&config(dir.path(), "cell"), &extracted).unwrap();
    let direct = mina_rust_lib::process_image(&dir.path().join("cell.json"), &extracted).unwrap();

    for (index, field) in report.table.columns.iter().enumerate() {
        assert_eq!(Some(&report.table.rows[0][index]), direct.get(*field));
    }
}

#[test]
fn invalid_scale_fails_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell.json"));

    let calls = std::sync::atomic::AtomicUsize::new(0);
    let counting = |path: &Path| -> mina_rust_lib::Result<ExtractedImage> {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        GraphFileExtractor::new().extract(path)
    };

    let bad = Config { scale: 0.0, ..config(dir.path(), "cell") };
    assert!(matches!(run_batch(&bad, &counting), Err(MinaError::InvalidScale(_))));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn failing_image_is_skipped_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell_1.json"));
    fs::write(dir.path().join("cell_2.json"), "{ broken").unwrap();
    write_record(&dir.path().join("cell_3.json"));

    let report = run_batch(&config(dir.path(), "cell_"), &GraphFileExtractor::new()).unwrap();

    assert_eq!(report.table.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("cell_2.json"));
    assert_eq!(titles(&report.table), vec!["cell_1.json", "cell_3.json"]);
}

#[test]
fn failing_image_aborts_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell_1.json"));
    fs::write(dir.path().join("cell_2.json"), "{ broken").unwrap();

    let abort = Config { failure_policy: FailurePolicy::Abort, ..config(dir.path(), "cell_") };
    let err = run_batch(&abort, &GraphFileExtractor::new()).unwrap_err();
    assert!(matches!(err, MinaError::Record { .. }));
}

#[test]
fn batch_without_rows_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell.json"));

    let err = run_batch(&config(dir.path(), "nothing_matches"), &GraphFileExtractor::new()).unwrap_err();
    assert!(matches!(err, MinaError::NoResults(_)));
}

#[test]
fn missing_footprint_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cell.json"),
        r#"{"components": [{"branch_count": 1, "avg_branch_length": 2.0, "edges": [{"length": 2.0}]}]}"#,
    )
    .unwrap();
    write_record(&dir.path().join("cell_with_mask.json"));

    let report = run_batch(&config(dir.path(), "cell"), &GraphFileExtractor::new()).unwrap();
    assert_eq!(report.table.len(), 1);
    assert!(report.skipped[0].reason.contains("mitochondrial_footprint"));

    // Without the footprint column both rows are fine
    let narrow = Config {
        columns: vec![Field::ImageTitle, Field::RodCount, Field::RodLenMean],
        ..config(dir.path(), "cell")
    };
    let report = run_batch(&narrow, &GraphFileExtractor::new()).unwrap();
    assert_eq!(report.table.len(), 2);
    assert_eq!(report.table.columns.len(), 3);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        write_record(&dir.path().join(format!("d{}/cell_{:02}.json", i % 3, i)));
    }

    let parallel = run_batch(&config(dir.path(), "cell_"), &GraphFileExtractor::new()).unwrap();
    let sequential_config = Config { use_parallel: false, ..config(dir.path(), "cell_") };
    let sequential = run_batch(&sequential_config, &GraphFileExtractor::new()).unwrap();

    assert_eq!(parallel.table, sequential.table);
    assert_eq!(parallel.table.len(), 12);
}

struct Recording {
    seen: Vec<PathBuf>,
}

impl ExclusiveExtractor for Recording {
    fn extract_mut(&mut self, path: &Path) -> mina_rust_lib::Result<ExtractedImage> {
        self.seen.push(path.to_path_buf());
        GraphFileExtractor::new().extract(path)
    }
}

#[test]
fn exclusive_extractor_sees_each_path_once_in_parallel_batch() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        write_record(&dir.path().join(format!("d{}/cell_{:02}.json", i % 2, i)));
    }

    let extractor = Exclusive::new(Recording { seen: Vec::new() });
    let report = run_batch(&config(dir.path(), "cell_"), &extractor).unwrap();
    assert_eq!(report.table.len(), 10);

    let mut seen = extractor.into_inner().seen;
    assert_eq!(seen.len(), 10);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 10);
}

#[test]
fn rows_follow_sorted_path_order() {
    let dir = tempfile::tempdir().unwrap();
    let titled = |title: &str| {
        format!(
            r#"{{"title": "{title}", "components": [], "slices": [{{"area": 1.0, "area_fraction": 0.0}}]}}"#
        )
    };
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("b/cell.json"), titled("second")).unwrap();
    fs::write(dir.path().join("a/cell.json"), titled("first")).unwrap();
    fs::write(dir.path().join("c.json"), titled("third")).unwrap();

    let report = run_batch(&config(dir.path(), ".*json"), &GraphFileExtractor::new()).unwrap();
    assert_eq!(titles(&report.table), vec!["first", "second", "third"]);
}

#[cfg(unix)]
#[test]
fn symlinked_paths_are_processed_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_record(&root.join("sub/cell_1.json"));
    write_record(&root.join("cell_2.json"));
    std::os::unix::fs::symlink(root, root.join("sub/back_to_root")).unwrap();
    std::os::unix::fs::symlink(root.join("sub"), root.join("sub_alias")).unwrap();

    let report = run_batch(&config(root, "cell_"), &GraphFileExtractor::new()).unwrap();
    assert_eq!(report.table.len(), 2);
}

#[test]
fn custom_extractor_plugs_into_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("img_1.tif"), b"").unwrap();
    fs::write(dir.path().join("img_2.tif"), b"").unwrap();

    let extractor = |path: &Path| -> mina_rust_lib::Result<ExtractedImage> {
        Ok(ExtractedImage {
            title: path.file_name().unwrap().to_string_lossy().into_owned(),
            graph: SkeletonGraph::default(),
            calibration: Calibration::default(),
            mask_slices: Some(vec![]),
        })
    };

    let report = run_batch(&config(dir.path(), "img_"), &extractor).unwrap();
    assert_eq!(titles(&report.table), vec!["img_1.tif", "img_2.tif"]);
    assert_eq!(report.table.value(1, Field::MitochondrialFootprint), Some(&Value::Number(0.0)));
}

#[test]
fn written_results_read_back_with_same_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_record(&dir.path().join("cell_1.json"));
    write_record(&dir.path().join("cell_2.json"));

    let cfg = Config {
        scale: 4.61,
        unit_name: Some("um".to_string()),
        ..config(dir.path(), "cell_")
    };
    let report = run_batch(&cfg, &GraphFileExtractor::new()).unwrap();
    let out: PathBuf = dir.path().join("out/results.csv");
    write_table_csv(&report.table, &out).unwrap();

    let parsed = read_table_csv(&out).unwrap();
    assert_eq!(parsed.columns, report.table.columns);
    assert_eq!(parsed.len(), report.table.len());
    assert_eq!(parsed.unit_name.as_deref(), Some("um"));
}
