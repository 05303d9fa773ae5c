use crate::data::Dataset;
use crate::entropy::majority_label;
use crate::errors::C45Error;
use crate::node::Node;
use crate::splitter::{partition, Splitter};
use log::debug;
use std::collections::BTreeMap;

/// Recursively grows a C4.5 tree from a dataset.
///
/// Every call works on its own index of records and its own list of
/// attributes still available on that branch.
pub struct Grower<'a, T: Splitter> {
    pub data: &'a Dataset,
    pub splitter: &'a T,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl<'a, T: Splitter> Grower<'a, T> {
    pub fn new(data: &'a Dataset, splitter: &'a T, max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Grower {
            data,
            splitter,
            max_depth,
            min_samples_split,
        }
    }

    /// Grow the full tree over every record and attribute of the dataset.
    pub fn grow_root(&self) -> Result<Node, C45Error> {
        let available: Vec<usize> = (0..self.data.n_attributes()).collect();
        self.grow(&self.data.index, &available, 1)
    }

    /// Grow the node at level `depth` (the root is at level 1).
    pub fn grow(&self, index: &[usize], available: &[usize], depth: usize) -> Result<Node, C45Error> {
        let data = self.data;
        let total_weight = data.total_weight(index);
        let majority = match majority_label(data, index) {
            Some(label) => label,
            None => {
                return Err(C45Error::EmptyDataset(
                    "cannot grow a node without records".to_string(),
                ))
            }
        };

        let first = data.label(index[0]);
        if index.iter().all(|i| data.label(*i) == first) {
            return Ok(Node::leaf(first, total_weight));
        }

        if available.is_empty() || self.max_depth.map_or(false, |m| depth >= m) {
            return Ok(Node::leaf(majority, total_weight));
        }

        if index.len() < self.min_samples_split {
            return Ok(Node::leaf(majority, total_weight));
        }

        // Weightless records carry no information to split on.
        if total_weight <= 0.0 {
            return Ok(Node::leaf(majority, total_weight));
        }

        let split = match self.splitter.best_split(data, index, available)? {
            Some(split) => split,
            None => return Ok(Node::leaf(majority, total_weight)),
        };

        if !self.splitter.accept_split(data, index, &split) {
            debug!(
                "split on {} rejected by the independence test at depth {}",
                data.attributes[split.attribute], depth
            );
            return Ok(Node::leaf(majority, total_weight));
        }

        debug!(
            "splitting {} records on {} at depth {}, gain ratio {:.4}",
            index.len(),
            data.attributes[split.attribute],
            depth,
            split.gain_ratio
        );

        let remaining: Vec<usize> = available.iter().copied().filter(|a| *a != split.attribute).collect();
        let mut children = BTreeMap::new();
        for (value, subset) in partition(data, index, split.attribute) {
            let child = if subset.is_empty() {
                Node::leaf(majority, 0.0)
            } else {
                self.grow(&subset, &remaining, depth + 1)?
            };
            children.insert(value.to_string(), child);
        }

        Ok(Node::Decision {
            attribute: data.attributes[split.attribute].clone(),
            attribute_index: split.attribute,
            children,
        })
    }
}
