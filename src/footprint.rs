// src/footprint.rs - Area / volume occupied by a thresholded mask

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::skeleton::Calibration;

/// Area measurements of one mask slice
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SliceMeasurement {
    /// Measured area of the whole slice
    pub area: f64,
    /// Percentage (0..=100) of foreground pixels
    pub area_fraction: f64,
}

impl SliceMeasurement {
    pub fn new(area: f64, area_fraction: f64) -> Self {
        Self { area, area_fraction }
    }

    /// Measure a binary mask slice; any nonzero pixel is foreground.
    pub fn from_mask(mask: &GrayImage, calibration: &Calibration) -> Self {
        let (width, height) = mask.dimensions();
        let total_pixels = u64::from(width) * u64::from(height);

        let area = total_pixels as f64 * calibration.pixel_width * calibration.pixel_height;
        if total_pixels == 0 {
            return Self::new(area, 0.0);
        }

        let foreground = mask.pixels().filter(|pixel| pixel[0] > 0).count();
        let area_fraction = foreground as f64 / total_pixels as f64 * 100.0;

        Self::new(area, area_fraction)
    }

    /// Foreground area of this slice
    pub fn footprint(&self) -> f64 {
        self.area * (self.area_fraction / 100.0)
    }
}

/// Footprint of a single slice or a volume.
///
/// A single slice reports its foreground area. For volumes the per-slice
/// areas are summed and multiplied by the slice depth.
pub fn footprint(slices: &[SliceMeasurement], pixel_depth: f64) -> f64 {
    match slices {
        [] => 0.0,
        [slice] => slice.footprint(),
        _ => {
            let area_sum: f64 = slices.iter().map(SliceMeasurement::footprint).sum();
            area_sum * pixel_depth
        }
    }
}
