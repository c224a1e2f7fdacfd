// src/fields.rs - Named output fields and per-image analysis results

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a field's value responds to pixel-to-unit conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Divided by the ratio
    Length,
    /// Divided by the ratio squared
    Area,
    Unscaled,
}

/// Type of value stored under a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Count,
    Number,
}

/// The fixed set of named per-image outputs.
///
/// Declaration order is the canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ImageTitle,
    MitochondrialFootprint,
    PunctateCount,
    RodCount,
    NetworkCount,
    RodLenMean,
    RodLenMed,
    RodLenStdevp,
    NetworkBranchCount,
    NetworkBranchesPerNetworkMean,
    NetworkBranchLenMean,
    NetworkLenMean,
    NetworkLenMed,
    NetworkLenStdevp,
    BranchCount,
    BranchLenMean,
    BranchLenMed,
    BranchLenStdevp,
    SummedBranchLensMean,
    SummedBranchLensMed,
    SummedBranchLensStdevp,
    NetworkBranchesMean,
    NetworkBranchesMed,
    NetworkBranchesStdevp,
}

impl Field {
    pub const ALL: [Field; 24] = [
        Field::ImageTitle,
        Field::MitochondrialFootprint,
        Field::PunctateCount,
        Field::RodCount,
        Field::NetworkCount,
        Field::RodLenMean,
        Field::RodLenMed,
        Field::RodLenStdevp,
        Field::NetworkBranchCount,
        Field::NetworkBranchesPerNetworkMean,
        Field::NetworkBranchLenMean,
        Field::NetworkLenMean,
        Field::NetworkLenMed,
        Field::NetworkLenStdevp,
        Field::BranchCount,
        Field::BranchLenMean,
        Field::BranchLenMed,
        Field::BranchLenStdevp,
        Field::SummedBranchLensMean,
        Field::SummedBranchLensMed,
        Field::SummedBranchLensStdevp,
        Field::NetworkBranchesMean,
        Field::NetworkBranchesMed,
        Field::NetworkBranchesStdevp,
    ];

    /// Default output schema
    pub const STANDARD: [Field; 19] = [
        Field::ImageTitle,
        Field::MitochondrialFootprint,
        Field::PunctateCount,
        Field::RodCount,
        Field::NetworkCount,
        Field::RodLenMean,
        Field::RodLenMed,
        Field::RodLenStdevp,
        Field::NetworkBranchCount,
        Field::NetworkBranchLenMean,
        Field::BranchLenMean,
        Field::BranchLenMed,
        Field::BranchLenStdevp,
        Field::SummedBranchLensMean,
        Field::SummedBranchLensMed,
        Field::SummedBranchLensStdevp,
        Field::NetworkBranchesMean,
        Field::NetworkBranchesMed,
        Field::NetworkBranchesStdevp,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::ImageTitle => "image_title",
            Field::MitochondrialFootprint => "mitochondrial_footprint",
            Field::PunctateCount => "punctate_count",
            Field::RodCount => "rod_count",
            Field::NetworkCount => "network_count",
            Field::RodLenMean => "rod_len_mean",
            Field::RodLenMed => "rod_len_med",
            Field::RodLenStdevp => "rod_len_stdevp",
            Field::NetworkBranchCount => "network_branch_count",
            Field::NetworkBranchesPerNetworkMean => "network_branches_per_network_mean",
            Field::NetworkBranchLenMean => "network_branch_len_mean",
            Field::NetworkLenMean => "network_len_mean",
            Field::NetworkLenMed => "network_len_med",
            Field::NetworkLenStdevp => "network_len_stdevp",
            Field::BranchCount => "branch_count",
            Field::BranchLenMean => "branch_len_mean",
            Field::BranchLenMed => "branch_len_med",
            Field::BranchLenStdevp => "branch_len_stdevp",
            Field::SummedBranchLensMean => "summed_branch_lens_mean",
            Field::SummedBranchLensMed => "summed_branch_lens_med",
            Field::SummedBranchLensStdevp => "summed_branch_lens_stdevp",
            Field::NetworkBranchesMean => "network_branches_mean",
            Field::NetworkBranchesMed => "network_branches_med",
            Field::NetworkBranchesStdevp => "network_branches_stdevp",
        }
    }

    /// Human-readable column title
    pub fn title(self) -> &'static str {
        match self {
            Field::ImageTitle => "Image title",
            Field::MitochondrialFootprint => "Mitochondrial footprint",
            Field::PunctateCount => "Punctate count",
            Field::RodCount => "Rod count",
            Field::NetworkCount => "Network count",
            Field::RodLenMean => "Mean rod length",
            Field::RodLenMed => "Median rod length",
            Field::RodLenStdevp => "Stdev rod length",
            Field::NetworkBranchCount => "Total network branch count",
            Field::NetworkBranchesPerNetworkMean => "Mean network branch count",
            Field::NetworkBranchLenMean => "Mean network branch length",
            Field::NetworkLenMean => "Mean network length",
            Field::NetworkLenMed => "Median network length",
            Field::NetworkLenStdevp => "Stdev network length",
            Field::BranchCount => "All branch count",
            Field::BranchLenMean => "Mean length of all branches",
            Field::BranchLenMed => "Median length of all branches",
            Field::BranchLenStdevp => "Stdev length of all branches",
            Field::SummedBranchLensMean => "Mean network and rod length",
            Field::SummedBranchLensMed => "Median network and rod length",
            Field::SummedBranchLensStdevp => "Stdev network and rod length",
            Field::NetworkBranchesMean => "Mean branches per component",
            Field::NetworkBranchesMed => "Median branches per component",
            Field::NetworkBranchesStdevp => "Stdev branches per component",
        }
    }

    pub fn unit_kind(self) -> UnitKind {
        match self {
            Field::MitochondrialFootprint => UnitKind::Area,
            Field::RodLenMean
            | Field::RodLenMed
            | Field::RodLenStdevp
            | Field::NetworkBranchLenMean
            | Field::NetworkLenMean
            | Field::NetworkLenMed
            | Field::NetworkLenStdevp
            | Field::BranchLenMean
            | Field::BranchLenMed
            | Field::BranchLenStdevp
            | Field::SummedBranchLensMean
            | Field::SummedBranchLensMed
            | Field::SummedBranchLensStdevp => UnitKind::Length,
            _ => UnitKind::Unscaled,
        }
    }

    pub fn value_kind(self) -> ValueKind {
        match self {
            Field::ImageTitle => ValueKind::Text,
            Field::PunctateCount
            | Field::RodCount
            | Field::NetworkCount
            | Field::NetworkBranchCount
            | Field::BranchCount => ValueKind::Count,
            _ => ValueKind::Number,
        }
    }

    /// Column title, suffixed with the unit for scaled fields when a unit is named.
    pub fn title_with_unit(self, unit_name: Option<&str>) -> String {
        match (unit_name, self.unit_kind()) {
            (Some(unit), UnitKind::Length) => format!("{} ({})", self.title(), unit),
            (Some(unit), UnitKind::Area) => format!("{} ({}^2)", self.title(), unit),
            _ => self.title().to_string(),
        }
    }

    /// Inverse of [`Field::title_with_unit`]
    pub fn from_title(title: &str) -> Option<Field> {
        let title = title.trim();
        Field::ALL.iter().copied().find(|field| {
            if title == field.title() {
                return true;
            }
            match title.strip_prefix(field.title()) {
                Some(rest) => field.unit_kind() != UnitKind::Unscaled
                    && rest.starts_with(" (")
                    && rest.ends_with(')'),
                None => false,
            }
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single output value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Count(u64),
    Number(f64),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Text(_) => None,
            Value::Count(count) => Some(*count as f64),
            Value::Number(number) => Some(*number),
        }
    }

    /// Parse a serialized cell according to the field's value kind
    pub fn parse(field: Field, raw: &str) -> Option<Value> {
        match field.value_kind() {
            ValueKind::Text => Some(Value::Text(raw.to_string())),
            ValueKind::Count => raw.trim().parse().ok().map(Value::Count),
            ValueKind::Number => raw.trim().parse().ok().map(Value::Number),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Count(count) => write!(f, "{}", count),
            Value::Number(number) => write!(f, "{:.6}", number),
        }
    }
}

/// Named outputs of one analyzed image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    values: BTreeMap<Field, Value>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: Value) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }
}
