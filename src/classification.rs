// src/classification.rs - Punctate / rod / network partition of skeleton components

use crate::skeleton::{Component, SkeletonGraph};

/// Morphology class of a skeleton component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphologyClass {
    /// No branches
    Punctate,
    /// Exactly one branch
    Rod,
    /// Two or more branches
    Network,
}

impl MorphologyClass {
    /// Classification depends on the branch count only.
    pub fn of(component: &Component) -> Self {
        match component.branch_count {
            0 => MorphologyClass::Punctate,
            1 => MorphologyClass::Rod,
            _ => MorphologyClass::Network,
        }
    }
}

/// Per-class counts and contributing lengths for one graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub punctate_count: u64,
    pub rod_count: u64,
    pub network_count: u64,

    /// Average branch length of every rod
    pub rod_lengths: Vec<f64>,

    /// `avg_branch_length * branch_count` of every network, an estimate
    /// of the network's total branch length
    pub network_lengths: Vec<f64>,

    /// Sum of branch counts over all networks
    pub network_branch_count: u64,
}

/// Classify every component of `graph`.
pub fn classify(graph: &SkeletonGraph) -> Classification {
    let mut result = Classification::default();

    for component in &graph.components {
        match MorphologyClass::of(component) {
            MorphologyClass::Punctate => {
                result.punctate_count += 1;
            }
            MorphologyClass::Rod => {
                result.rod_count += 1;
                result.rod_lengths.push(component.avg_branch_length);
            }
            MorphologyClass::Network => {
                let branches = u64::from(component.branch_count);
                result.network_count += 1;
                result.network_lengths.push(component.avg_branch_length * branches as f64);
                result.network_branch_count += branches;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Edge;
    use assert_approx_eq::assert_approx_eq;

    fn component(branch_count: u32, avg: f64) -> Component {
        let edges = (0..branch_count).map(|_| Edge { length: avg }).collect();
        Component::new(branch_count, avg, edges)
    }

    #[test]
    fn class_is_a_function_of_branch_count() {
        assert_eq!(MorphologyClass::of(&component(0, 0.0)), MorphologyClass::Punctate);
        assert_eq!(MorphologyClass::of(&component(1, 4.0)), MorphologyClass::Rod);
        assert_eq!(MorphologyClass::of(&component(2, 4.0)), MorphologyClass::Network);
        assert_eq!(MorphologyClass::of(&component(17, 1.0)), MorphologyClass::Network);

        // avg_branch_length has no influence
        assert_eq!(MorphologyClass::of(&Component::new(0, 99.0, vec![])), MorphologyClass::Punctate);
    }

    #[test]
    fn punctates_contribute_count_only() {
        let graph = SkeletonGraph::new(vec![
            Component::new(0, 12.0, vec![]),
            Component::new(0, 0.0, vec![]),
        ]);
        let result = classify(&graph);

        assert_eq!(result.punctate_count, 2);
        assert!(result.rod_lengths.is_empty());
        assert!(result.network_lengths.is_empty());
        assert_eq!(result.network_branch_count, 0);
    }

    #[test]
    fn rods_contribute_their_average_length() {
        let graph = SkeletonGraph::new(vec![component(1, 3.5), component(1, 6.25)]);
        let result = classify(&graph);

        assert_eq!(result.rod_count, 2);
        assert_eq!(result.rod_lengths, vec![3.5, 6.25]);
    }

    #[test]
    fn networks_contribute_weighted_length_and_branches() {
        let graph = SkeletonGraph::new(vec![
            component(0, 0.0),
            component(1, 2.0),
            component(3, 2.0),
            component(2, 5.0),
        ]);
        let result = classify(&graph);

        assert_eq!(result.punctate_count, 1);
        assert_eq!(result.rod_count, 1);
        assert_eq!(result.network_count, 2);
        assert_eq!(result.network_branch_count, 5);
        assert_approx_eq!(result.network_lengths[0], 6.0);
        assert_approx_eq!(result.network_lengths[1], 10.0);
    }

    #[test]
    fn empty_graph_has_no_classes() {
        assert_eq!(classify(&SkeletonGraph::default()), Classification::default());
    }
}
