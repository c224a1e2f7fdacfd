// src/batch.rs - Batch orchestration over a directory tree

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::config::{Config, FailurePolicy};
use crate::errors::{MinaError, Result};
use crate::extraction::SkeletonExtractor;
use crate::fields::{AnalysisResult, Field, Value};
use crate::image_io::find_matching_files;
use crate::pipeline::process_image;
use crate::scaling::{scale_value, ScaleRatio};

/// Aggregated per-image results with a fixed, ordered column schema
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTable {
    pub columns: Vec<Field>,
    /// Unit label for scaled columns, if any
    pub unit_name: Option<String>,
    /// One row per analyzed image; values follow `columns`
    pub rows: Vec<Vec<Value>>,
}

impl BatchTable {
    pub fn new(columns: Vec<Field>, unit_name: Option<String>) -> Self {
        Self { columns, unit_name, rows: Vec::new() }
    }

    /// Column titles as written to the header row
    pub fn titles(&self) -> Vec<String> {
        let unit = self.unit_name.as_deref();
        self.columns.iter().map(|field| field.title_with_unit(unit)).collect()
    }

    pub fn column_index(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|&column| column == field)
    }

    /// Value of `field` in row `row`
    pub fn value(&self, row: usize, field: Field) -> Option<&Value> {
        let index = self.column_index(field)?;
        self.rows.get(row)?.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An image left out of the table, and why
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub table: BatchTable,
    pub skipped: Vec<ImageFailure>,
}

/// Restrict a result to the schema, in schema order, scaled to physical units.
///
/// Fields outside the schema are dropped; a schema field missing from the
/// result is a [`MinaError::SchemaMismatch`].
pub fn assemble_row(result: &AnalysisResult, columns: &[Field], ratio: ScaleRatio) -> Result<Vec<Value>> {
    columns
        .iter()
        .map(|&field| {
            let value = result.get(field).ok_or_else(|| MinaError::SchemaMismatch {
                image: image_title(result),
                field,
            })?;
            Ok(scale_value(field, value.clone(), ratio))
        })
        .collect()
}

fn image_title(result: &AnalysisResult) -> String {
    match result.get(Field::ImageTitle) {
        Some(Value::Text(title)) => title.clone(),
        _ => "<untitled>".to_string(),
    }
}

fn analyze_row<E: SkeletonExtractor + ?Sized>(
    path: &Path,
    extractor: &E,
    columns: &[Field],
    ratio: ScaleRatio,
) -> Result<Vec<Value>> {
    let result = process_image(path, extractor)?;
    assemble_row(&result, columns, ratio)
}

fn with_path(path: &Path, error: MinaError) -> MinaError {
    match error {
        MinaError::Extraction { .. } | MinaError::SchemaMismatch { .. } | MinaError::Record { .. } => error,
        other => MinaError::Extraction {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// Analyze every matching file under the configured root.
///
/// The configuration is validated before any file is touched. Rows follow
/// the sorted order of the matched paths whether or not the analysis runs
/// in parallel. Failed images are skipped or abort the batch according to
/// `failure_policy`; a batch without a single analyzed image is an error.
pub fn run_batch<E: SkeletonExtractor + ?Sized>(config: &Config, extractor: &E) -> Result<BatchReport> {
    let config = config.validate()?;
    let start_time = Instant::now();

    let paths = find_matching_files(&config.root_directory, &config.pattern)?;
    info!(
        "Found {} files matching '{}' under {}",
        paths.len(),
        config.pattern.as_str(),
        config.root_directory.display()
    );

    let columns = config.columns.as_slice();
    let ratio = config.scale;

    let mut table = BatchTable::new(config.columns.clone(), config.unit_name.clone());
    let mut skipped = Vec::new();

    let mut record = |path: &Path, outcome: Result<Vec<Value>>| -> Result<()> {
        match outcome {
            Ok(row) => {
                table.rows.push(row);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to analyze {}: {}", path.display(), e);
                match config.failure_policy {
                    FailurePolicy::Abort => Err(with_path(path, e)),
                    FailurePolicy::Skip => {
                        skipped.push(ImageFailure {
                            path: path.to_path_buf(),
                            reason: e.to_string(),
                        });
                        Ok(())
                    }
                }
            }
        }
    };

    if config.use_parallel {
        // Collecting an indexed parallel iterator keeps input order
        let outcomes: Vec<Result<Vec<Value>>> = paths
            .par_iter()
            .map(|path| analyze_row(path, extractor, columns, ratio))
            .collect();

        for (path, outcome) in paths.iter().zip(outcomes) {
            record(path.as_path(), outcome)?;
        }
    } else {
        for path in &paths {
            info!("Processing: {}", path.display());
            record(path.as_path(), analyze_row(path, extractor, columns, ratio))?;
        }
    }

    if table.is_empty() {
        return Err(MinaError::NoResults(config.root_directory.clone()));
    }

    info!(
        "Analyzed {} of {} images ({} skipped) in {:.2} seconds",
        table.len(),
        paths.len(),
        skipped.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(BatchReport { table, skipped })
}
