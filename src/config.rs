// src/config.rs - Batch configuration, loaded from TOML and overridden from the CLI

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::errors::{MinaError, Result};
use crate::fields::Field;
use crate::scaling::ScaleRatio;

/// What to do when one image cannot be analyzed
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log and record the image, continue with the rest of the batch
    Skip,
    /// Stop the batch at the first failure
    Abort,
}

/// Configuration for a MiNA batch run
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub root_directory: PathBuf,

    /// Matched against the start of each file name
    #[serde(default = "default_pattern")]
    pub pattern: String,

    #[serde(default)]
    pub output_path: PathBuf,

    /// Pixels per physical unit
    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(default)]
    pub unit_name: Option<String>,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    #[serde(default = "default_failure_policy")]
    pub failure_policy: FailurePolicy,

    /// Output schema, in column order
    #[serde(default = "default_columns")]
    pub columns: Vec<Field>,
}

fn default_pattern() -> String {
    ".*".to_string()
}

fn default_scale() -> f64 {
    1.0
}

fn default_parallel() -> bool {
    true
}

fn default_failure_policy() -> FailurePolicy {
    FailurePolicy::Skip
}

fn default_columns() -> Vec<Field> {
    Field::STANDARD.to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            pattern: default_pattern(),
            output_path: PathBuf::from("mina_results.csv"),
            scale: default_scale(),
            unit_name: None,
            use_parallel: default_parallel(),
            failure_policy: default_failure_policy(),
            columns: default_columns(),
        }
    }
}

/// Configuration after validation, with the pattern compiled
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub root_directory: PathBuf,
    pub pattern: Regex,
    pub scale: ScaleRatio,
    pub unit_name: Option<String>,
    pub use_parallel: bool,
    pub failure_policy: FailurePolicy,
    pub columns: Vec<Field>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MinaError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| MinaError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Validate configuration and compile the file name pattern
    pub fn validate(&self) -> Result<ValidatedConfig> {
        // Check root directory exists
        if !self.root_directory.exists() {
            return Err(MinaError::InvalidPath(self.root_directory.clone()));
        }
        if !self.root_directory.is_dir() {
            return Err(MinaError::Config(format!(
                "{} is not a directory", self.root_directory.display()
            )));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(MinaError::Config("output_path must be set".to_string()));
        }

        // Anchor at the start of the file name only
        let pattern = Regex::new(&format!("^(?:{})", self.pattern)).map_err(|source| {
            MinaError::Pattern { pattern: self.pattern.clone(), source }
        })?;

        let scale = ScaleRatio::new(self.scale)?;

        if self.columns.is_empty() {
            return Err(MinaError::Config("columns must name at least one field".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.columns {
            if !seen.insert(*field) {
                return Err(MinaError::Config(format!("column '{}' is listed twice", field)));
            }
        }

        if let Some(unit) = &self.unit_name {
            if unit.trim().is_empty() {
                return Err(MinaError::Config("unit_name must not be blank".to_string()));
            }
        }

        Ok(ValidatedConfig {
            root_directory: self.root_directory.clone(),
            pattern,
            scale,
            unit_name: self.unit_name.clone(),
            use_parallel: self.use_parallel,
            failure_policy: self.failure_policy,
            columns: self.columns.clone(),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            MinaError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}
