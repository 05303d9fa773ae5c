use crate::data::Dataset;
use crate::entropy::majority;
use crate::errors::C45Error;
use crate::grower::Grower;
use crate::node::Node;
use crate::splitter::Splitter;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A fitted C4.5 tree.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Tree {
    pub root: Node,
    /// Majority label of the unweighted training set, used when an unseen
    /// value is met below a node with no leaf children.
    pub fallback_label: String,
}

impl Tree {
    /// Grow a tree over every record of `data`.
    pub fn fit<T: Splitter>(
        data: &Dataset,
        splitter: &T,
        max_depth: Option<usize>,
        min_samples_split: usize,
    ) -> Result<Self, C45Error> {
        data.validate()?;
        if data.is_empty() {
            return Err(C45Error::EmptyDataset("fit called with zero records".to_string()));
        }
        if data.total_weight(&data.index) <= 0.0 {
            return Err(C45Error::EmptyDataset(
                "fit called with zero total weight".to_string(),
            ));
        }
        let fallback_label = majority(data.index.iter().map(|i| (data.label(*i), 1.0)))
            .map(|l| l.to_string())
            .ok_or_else(|| C45Error::EmptyDataset("fit called with zero records".to_string()))?;
        let root = Grower::new(data, splitter, max_depth, min_samples_split).grow_root()?;
        Ok(Tree { root, fallback_label })
    }

    /// Predict the label of a single row of attribute values.
    ///
    /// The row is read positionally and is not checked against the training
    /// arity, `C45Classifier::predict` is the checked entry point.
    pub(crate) fn predict_row<S: AsRef<str>>(&self, row: &[S]) -> &str {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { label, .. } => return label,
                Node::Decision {
                    attribute_index,
                    children,
                    ..
                } => match children.get(row[*attribute_index].as_ref()) {
                    Some(child) => node = child,
                    None => {
                        return node
                            .leaf_child_labels()
                            .into_iter()
                            .max()
                            .unwrap_or(self.fallback_label.as_str())
                    }
                },
            }
        }
    }

    /// Predict the labels of many rows.
    pub(crate) fn predict<S: AsRef<str> + Sync>(&self, rows: &[Vec<S>], parallel: bool) -> Vec<String> {
        if parallel {
            rows.par_iter().map(|r| self.predict_row(r).to_string()).collect()
        } else {
            rows.iter().map(|r| self.predict_row(r).to_string()).collect()
        }
    }

    /// Number of records in `index` whose predicted label differs from their label.
    pub(crate) fn count_errors(&self, data: &Dataset, index: &[usize]) -> usize {
        index
            .iter()
            .filter(|i| self.predict_row(&data.records[**i]) != data.label(**i))
            .count()
    }

    /// Fraction of records in `index` that are misclassified.
    pub(crate) fn error_rate(&self, data: &Dataset, index: &[usize]) -> f64 {
        if index.is_empty() {
            return 0.0;
        }
        self.count_errors(data, index) as f64 / index.len() as f64
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn rules(&self) -> Vec<String> {
        self.root.rules()
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
