// src/lib.rs - Library interface for MiNA

pub mod batch;
pub mod classification;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod fields;
pub mod footprint;
pub mod image_io;
pub mod output;
pub mod pipeline;
pub mod scaling;
pub mod skeleton;
pub mod statistics;

// Re-export commonly used types and functions
pub use errors::{MinaError, Result};
pub use config::{Config, FailurePolicy};
pub use batch::{run_batch, BatchReport, BatchTable, ImageFailure};
pub use extraction::{Exclusive, ExclusiveExtractor, ExtractedImage, GraphFileExtractor, SkeletonExtractor};
pub use fields::{AnalysisResult, Field, UnitKind, Value};
pub use output::{read_table_csv, write_table_csv};
pub use pipeline::{analyze_extracted, process_image};
pub use scaling::ScaleRatio;
pub use skeleton::{Calibration, Component, Edge, SkeletonGraph};

// Re-export the analysis building blocks
pub use classification::{classify, Classification, MorphologyClass};
pub use footprint::{footprint, SliceMeasurement};
pub use statistics::{mean, median, population_stdev, summarize, Summary};
