// src/skeleton.rs - Graph model handed over by the skeleton-extraction service

use serde::{Deserialize, Serialize};

/// A single branch of the skeleton graph
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Edge {
    /// Branch length in pixel units
    pub length: f64,
}

/// A connected subgraph of the skeleton
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Component {
    pub branch_count: u32,

    /// Unused when `branch_count == 0`
    #[serde(default)]
    pub avg_branch_length: f64,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Component {
    pub fn new(branch_count: u32, avg_branch_length: f64, edges: Vec<Edge>) -> Self {
        Self { branch_count, avg_branch_length, edges }
    }

    /// Sum of this component's edge lengths
    pub fn summed_edge_length(&self) -> f64 {
        self.edges.iter().map(|edge| edge.length).sum()
    }
}

/// Skeleton graph of one image. Components are never merged or split once received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SkeletonGraph {
    #[serde(default)]
    pub components: Vec<Component>,
}

impl SkeletonGraph {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Flat graph-level edge listing, in component order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.components.iter().flat_map(|component| component.edges.iter())
    }
}

/// Physical calibration of the source image
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Calibration {
    #[serde(default = "default_unit")]
    pub pixel_width: f64,
    #[serde(default = "default_unit")]
    pub pixel_height: f64,
    #[serde(default = "default_unit")]
    pub pixel_depth: f64,
}

fn default_unit() -> f64 {
    1.0
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            pixel_depth: 1.0,
        }
    }
}
