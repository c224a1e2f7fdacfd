// src/scaling.rs - Pixel-to-physical-unit conversion of output values

use crate::errors::{MinaError, Result};
use crate::fields::{Field, UnitKind, Value};

/// Pixels per physical unit. Always finite and > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRatio(f64);

impl ScaleRatio {
    pub const IDENTITY: ScaleRatio = ScaleRatio(1.0);

    pub fn new(pixels_per_unit: f64) -> Result<Self> {
        if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
            return Err(MinaError::InvalidScale(pixels_per_unit));
        }
        Ok(ScaleRatio(pixels_per_unit))
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// Convert a pixel-unit value of the given kind
    pub fn apply(self, kind: UnitKind, value: f64) -> f64 {
        if self.is_identity() {
            return value;
        }
        match kind {
            UnitKind::Length => value / self.0,
            UnitKind::Area => value / (self.0 * self.0),
            UnitKind::Unscaled => value,
        }
    }
}

impl Default for ScaleRatio {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rescale a single value stored under `field`. Text and counts pass through.
pub fn scale_value(field: Field, value: Value, ratio: ScaleRatio) -> Value {
    match value {
        Value::Number(number) => Value::Number(ratio.apply(field.unit_kind(), number)),
        other => other,
    }
}
