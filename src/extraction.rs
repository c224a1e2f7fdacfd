// src/extraction.rs - Seam to the external skeleton-extraction service

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{MinaError, Result};
use crate::footprint::SliceMeasurement;
use crate::image_io::load_mask;
use crate::skeleton::{Calibration, Component, SkeletonGraph};

/// Everything the analysis needs from the extraction service for one image
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub title: String,
    pub graph: SkeletonGraph,
    pub calibration: Calibration,
    /// Thresholded mask measurements; `None` when no mask was supplied
    pub mask_slices: Option<Vec<SliceMeasurement>>,
}

/// Produces a skeleton graph for one matched file.
///
/// Implementations are shared across worker threads during parallel
/// batches. Wrap a collaborator that cannot be called concurrently in
/// [`Exclusive`].
pub trait SkeletonExtractor: Sync {
    fn extract(&self, path: &Path) -> Result<ExtractedImage>;
}

impl<F> SkeletonExtractor for F
where
    F: Fn(&Path) -> Result<ExtractedImage> + Sync,
{
    fn extract(&self, path: &Path) -> Result<ExtractedImage> {
        self(path)
    }
}

/// Serializes every call to the wrapped extractor behind a lock
pub struct Exclusive<E> {
    inner: Mutex<E>,
}

impl<E> Exclusive<E> {
    pub fn new(inner: E) -> Self {
        Self { inner: Mutex::new(inner) }
    }

    /// Recover the wrapped extractor once the batch is done
    pub fn into_inner(self) -> E {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Extractor that needs exclusive access per call
pub trait ExclusiveExtractor: Send {
    fn extract_mut(&mut self, path: &Path) -> Result<ExtractedImage>;
}

impl<E: ExclusiveExtractor> SkeletonExtractor for Exclusive<E> {
    fn extract(&self, path: &Path) -> Result<ExtractedImage> {
        let mut inner = self.inner.lock().map_err(|_| MinaError::Extraction {
            path: path.to_path_buf(),
            reason: "extractor lock poisoned by an earlier failure".to_string(),
        })?;
        inner.extract_mut(path)
    }
}

/// Graph record as written by the skeletonizer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GraphRecord {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub calibration: Calibration,

    #[serde(default)]
    pub components: Vec<Component>,

    /// Precomputed per-slice mask measurements
    #[serde(default)]
    pub slices: Option<Vec<SliceMeasurement>>,

    /// Mask slice images, relative to the record file
    #[serde(default)]
    pub mask_images: Option<Vec<PathBuf>>,
}

/// Reads JSON graph records from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFileExtractor;

impl GraphFileExtractor {
    pub fn new() -> Self {
        Self
    }

    fn mask_slices(record: &GraphRecord, path: &Path) -> Result<Option<Vec<SliceMeasurement>>> {
        if let Some(slices) = &record.slices {
            return Ok(Some(slices.clone()));
        }

        let Some(images) = &record.mask_images else {
            return Ok(None);
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut slices = Vec::with_capacity(images.len());
        for mask_path in images {
            let mask = load_mask(base.join(mask_path))?;
            slices.push(SliceMeasurement::from_mask(&mask, &record.calibration));
        }
        Ok(Some(slices))
    }
}

impl SkeletonExtractor for GraphFileExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedImage> {
        let content = fs::read_to_string(path)?;
        let record: GraphRecord = serde_json::from_str(&content).map_err(|source| {
            MinaError::Record { path: path.to_path_buf(), source }
        })?;

        for (index, component) in record.components.iter().enumerate() {
            if component.edges.iter().any(|edge| !edge.length.is_finite() || edge.length <= 0.0) {
                return Err(MinaError::Extraction {
                    path: path.to_path_buf(),
                    reason: format!("component {} has an invalid edge length", index),
                });
            }
        }

        let mask_slices = Self::mask_slices(&record, path)?;

        let title = record.title.clone().unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });

        debug!(
            "Loaded graph record {}: {} components, mask {}",
            path.display(),
            record.components.len(),
            if mask_slices.is_some() { "present" } else { "absent" }
        );

        Ok(ExtractedImage {
            title,
            graph: SkeletonGraph::new(record.components),
            calibration: record.calibration,
            mask_slices,
        })
    }
}
