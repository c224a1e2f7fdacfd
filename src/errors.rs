use thiserror::Error;
use std::io;
use std::path::PathBuf;

use crate::fields::Field;

/// Custom error types for MiNA
#[derive(Error, Debug)]
pub enum MinaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Invalid file name pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid scale {0}: pixels per unit must be a finite value > 0")]
    InvalidScale(f64),

    #[error("Statistics requested over an empty sequence")]
    EmptyInput,

    #[error("Skeleton extraction failed for {path}: {reason}")]
    Extraction {
        path: PathBuf,
        reason: String,
    },

    #[error("Malformed graph record {path}: {source}")]
    Record {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Result for '{image}' is missing schema field '{field}'")]
    SchemaMismatch {
        image: String,
        field: Field,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Malformed table: {0}")]
    Table(String),

    #[error("No images under {0} were analyzed successfully")]
    NoResults(PathBuf),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, MinaError>;
