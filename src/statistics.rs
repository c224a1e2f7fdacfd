// src/statistics.rs - Mean / median / population standard deviation

use crate::errors::{MinaError, Result};

/// Summary of a numeric sequence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub stdevp: f64,
}

impl Summary {
    /// Value reported for a group with no members
    pub const EMPTY: Summary = Summary { mean: 0.0, median: 0.0, stdevp: 0.0 };
}

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MinaError::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle element for odd lengths, average of the two middle elements otherwise
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MinaError::EmptyInput);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let index = (sorted.len() - 1) / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[index])
    } else {
        Ok((sorted[index] + sorted[index + 1]) / 2.0)
    }
}

/// Population standard deviation (divisor = count, no Bessel correction)
pub fn population_stdev(values: &[f64]) -> Result<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Mean with an explicit divisor instead of the element count.
/// A zero divisor yields 0.0.
pub fn weighted_mean(values: &[f64], divisor: u64) -> f64 {
    if divisor == 0 {
        return 0.0;
    }
    values.iter().sum::<f64>() / divisor as f64
}

/// Mean, median and population stdev of `values`.
pub fn summarize(values: &[f64]) -> Result<Summary> {
    Ok(Summary {
        mean: mean(values)?,
        median: median(values)?,
        stdevp: population_stdev(values)?,
    })
}

/// Like [`summarize`], but an empty group reports [`Summary::EMPTY`].
pub fn summarize_or_zero(values: &[f64]) -> Summary {
    match summarize(values) {
        Ok(summary) => summary,
        Err(_) => Summary::EMPTY,
    }
}
