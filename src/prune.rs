use crate::constants::PRUNE_SAMPLE_SIZE;
use crate::data::Dataset;
use crate::node::Node;
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::mem;

/// Settings of reduced-error pruning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PruneConfig {
    /// Maximum number of validation records used to judge a prune.
    pub sample_size: usize,
    /// Seed of the validation sampling, random when `None`.
    pub seed: Option<u64>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        PruneConfig {
            sample_size: PRUNE_SAMPLE_SIZE,
            seed: None,
        }
    }
}

impl PruneConfig {
    pub fn set_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PruneReport {
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub error_before: f64,
    pub error_after: f64,
    pub sample_size: usize,
    /// Number of decision nodes replaced by a leaf.
    pub accepted: usize,
    /// Number of candidate replacements that were undone.
    pub rejected: usize,
}

impl Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pruning: n_nodes: {} -> {}, error: {:.4} -> {:.4} on {} records ({} accepted, {} rejected)",
            self.nodes_before,
            self.nodes_after,
            self.error_before,
            self.error_after,
            self.sample_size,
            self.accepted,
            self.rejected
        )
    }
}

impl Tree {
    /// Reduced-error pruning against the validation records in `index`.
    ///
    /// Decision nodes are visited bottom up. A node whose children are all
    /// leaves is replaced by a leaf in the live tree, and the replacement is
    /// kept when it does not increase the number of misclassified records.
    /// A parent whose children all became leaves is tried once the walk gets
    /// back to it.
    pub(crate) fn prune(&mut self, data: &Dataset, index: &[usize]) -> PruneReport {
        let mut report = PruneReport {
            nodes_before: self.node_count(),
            nodes_after: 0,
            error_before: self.error_rate(data, index),
            error_after: 0.0,
            sample_size: index.len(),
            accepted: 0,
            rejected: 0,
        };
        let mut path = Vec::new();
        self.prune_bottom_up(&mut path, data, index, &mut report);
        report.nodes_after = self.node_count();
        report.error_after = self.error_rate(data, index);
        report
    }

    fn prune_bottom_up(&mut self, path: &mut Vec<String>, data: &Dataset, index: &[usize], report: &mut PruneReport) {
        let values: Vec<String> = match self.root.get(path) {
            Some(Node::Decision { children, .. }) => children.keys().cloned().collect(),
            _ => return,
        };
        for value in values {
            path.push(value);
            self.prune_bottom_up(path, data, index, report);
            path.pop();
        }

        let candidate = match self.root.get(path).and_then(Node::collapse) {
            Some(leaf) => leaf,
            None => return,
        };
        let original_errors = self.count_errors(data, index);
        let original = match self.root.get_mut(path) {
            Some(node) => mem::replace(node, candidate),
            None => return,
        };
        let pruned_errors = self.count_errors(data, index);

        if pruned_errors <= original_errors {
            report.accepted += 1;
        } else {
            if let Some(node) = self.root.get_mut(path) {
                *node = original;
            }
            report.rejected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::GainRatioSplitter;

    fn and_tree() -> Tree {
        let data = Dataset::from_str_rows(
            &["A", "B"],
            &[&["1", "1", "yes"], &["1", "0", "no"], &["0", "1", "no"], &["0", "0", "no"]],
            1.0,
        )
        .unwrap();
        Tree::fit(&data, &GainRatioSplitter::new(0.99, false), None, 2).unwrap()
    }

    #[test]
    fn test_prune_keeps_useful_split() {
        let mut tree = and_tree();
        let validation = Dataset::from_str_rows(
            &["A", "B"],
            &[&["1", "1", "yes"], &["1", "0", "no"], &["0", "1", "no"]],
            1.0,
        )
        .unwrap();
        let before = tree.clone();
        let report = tree.prune(&validation, &validation.index);
        assert_eq!(tree, before);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.error_before, 0.0);
        assert_eq!(report.error_after, 0.0);
        assert_eq!(report.nodes_before, report.nodes_after);
    }

    #[test]
    fn test_prune_collapses_to_root_leaf() {
        let mut tree = and_tree();
        // The validation set says the label never depends on B, nor on A.
        let validation = Dataset::from_str_rows(
            &["A", "B"],
            &[&["1", "1", "no"], &["1", "0", "no"], &["0", "1", "no"], &["0", "0", "no"]],
            1.0,
        )
        .unwrap();
        let report = tree.prune(&validation, &validation.index);
        assert_eq!(tree.root, Node::leaf("no", 4.0));
        assert_eq!(report.accepted, 2);
        assert_eq!(report.nodes_before, 5);
        assert_eq!(report.nodes_after, 1);
        assert_eq!(report.error_before, 0.25);
        assert_eq!(report.error_after, 0.0);
    }

    #[test]
    fn test_prune_never_increases_error() {
        let mut tree = and_tree();
        let validation = Dataset::from_str_rows(
            &["A", "B"],
            &[
                &["1", "1", "no"],
                &["1", "1", "yes"],
                &["1", "0", "yes"],
                &["0", "1", "no"],
                &["0", "0", "yes"],
            ],
            1.0,
        )
        .unwrap();
        let report = tree.prune(&validation, &validation.index);
        assert!(report.error_after <= report.error_before);
        assert_eq!(tree.rules().len(), tree.leaf_count());
    }

    #[test]
    fn test_prune_config_builder() {
        let config = PruneConfig::default().set_sample_size(10).set_seed(3);
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.seed, Some(3));
        assert_eq!(PruneConfig::default().sample_size, PRUNE_SAMPLE_SIZE);
    }
}
