// src/pipeline.rs - Per-image morphology analysis

use std::path::Path;

use log::debug;

use crate::classification::classify;
use crate::errors::Result;
use crate::extraction::{ExtractedImage, SkeletonExtractor};
use crate::fields::{AnalysisResult, Field, Value};
use crate::footprint::footprint;
use crate::statistics::{summarize_or_zero, weighted_mean, Summary};

fn insert_summary(result: &mut AnalysisResult, fields: [Field; 3], summary: Summary) {
    let [mean, median, stdevp] = fields;
    result.insert(mean, Value::Number(summary.mean));
    result.insert(median, Value::Number(summary.median));
    result.insert(stdevp, Value::Number(summary.stdevp));
}

/// Analyze one extracted skeleton in pixel units.
///
/// Groups with no members (e.g. an image without rods) report 0.0 for
/// their mean, median and stdev. The footprint is only present when the
/// extraction supplied mask data.
pub fn analyze_extracted(extracted: &ExtractedImage) -> AnalysisResult {
    let graph = &extracted.graph;
    let mut result = AnalysisResult::new();

    result.insert(Field::ImageTitle, Value::Text(extracted.title.clone()));

    // Step 1: Footprint of the thresholded mask
    if let Some(slices) = &extracted.mask_slices {
        let area = footprint(slices, extracted.calibration.pixel_depth);
        result.insert(Field::MitochondrialFootprint, Value::Number(area));
    }

    // Step 2: Per-component classification
    let classes = classify(graph);

    result.insert(Field::PunctateCount, Value::Count(classes.punctate_count));
    result.insert(Field::RodCount, Value::Count(classes.rod_count));
    result.insert(Field::NetworkCount, Value::Count(classes.network_count));

    insert_summary(
        &mut result,
        [Field::RodLenMean, Field::RodLenMed, Field::RodLenStdevp],
        summarize_or_zero(&classes.rod_lengths),
    );

    result.insert(Field::NetworkBranchCount, Value::Count(classes.network_branch_count));
    result.insert(
        Field::NetworkBranchesPerNetworkMean,
        Value::Number(if classes.network_count == 0 {
            0.0
        } else {
            classes.network_branch_count as f64 / classes.network_count as f64
        }),
    );
    result.insert(
        Field::NetworkBranchLenMean,
        Value::Number(weighted_mean(&classes.network_lengths, classes.network_branch_count)),
    );
    insert_summary(
        &mut result,
        [Field::NetworkLenMean, Field::NetworkLenMed, Field::NetworkLenStdevp],
        summarize_or_zero(&classes.network_lengths),
    );

    // Step 3: Per-edge statistics from the flat edge listing
    let branch_lengths: Vec<f64> = graph.edges().map(|edge| edge.length).collect();
    result.insert(Field::BranchCount, Value::Count(branch_lengths.len() as u64));
    insert_summary(
        &mut result,
        [Field::BranchLenMean, Field::BranchLenMed, Field::BranchLenStdevp],
        summarize_or_zero(&branch_lengths),
    );

    let summed_lengths: Vec<f64> = graph.components.iter().map(|c| c.summed_edge_length()).collect();
    insert_summary(
        &mut result,
        [Field::SummedBranchLensMean, Field::SummedBranchLensMed, Field::SummedBranchLensStdevp],
        summarize_or_zero(&summed_lengths),
    );

    let branches: Vec<f64> = graph.components.iter().map(|c| f64::from(c.branch_count)).collect();
    insert_summary(
        &mut result,
        [Field::NetworkBranchesMean, Field::NetworkBranchesMed, Field::NetworkBranchesStdevp],
        summarize_or_zero(&branches),
    );

    debug!(
        "{}: {} punctate, {} rods, {} networks, {} branches",
        extracted.title,
        classes.punctate_count,
        classes.rod_count,
        classes.network_count,
        branch_lengths.len()
    );

    result
}

/// Extract and analyze the image at `path`
pub fn process_image<E: SkeletonExtractor + ?Sized>(path: &Path, extractor: &E) -> Result<AnalysisResult> {
    let extracted = extractor.extract(path)?;
    Ok(analyze_extracted(&extracted))
}
