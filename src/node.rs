use crate::entropy::majority;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A node of a C4.5 decision tree.
///
/// Children of a decision node are owned by it and ordered by attribute value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Node {
    Decision {
        /// Name of the attribute tested by this node.
        attribute: String,
        /// Position of the attribute in a record.
        attribute_index: usize,
        children: BTreeMap<String, Node>,
    },
    Leaf {
        label: String,
        /// Total weight of the training records that reached this leaf.
        weight: f64,
    },
}

impl Node {
    pub fn leaf(label: &str, weight: f64) -> Self {
        Node::Leaf {
            label: label.to_string(),
            weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Depth of the tree rooted at this node, a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Decision { children, .. } => 1 + children.values().map(Node::depth).max().unwrap_or(0),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Decision { children, .. } => children.values().map(Node::leaf_count).sum(),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Decision { children, .. } => 1 + children.values().map(Node::node_count).sum::<usize>(),
        }
    }

    /// Total training weight below this node.
    pub fn weight(&self) -> f64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Decision { children, .. } => children.values().map(Node::weight).sum(),
        }
    }

    /// One rule per leaf, `"A = a AND B = b => label"`, in child order.
    pub fn rules(&self) -> Vec<String> {
        let mut rules = Vec::new();
        let mut conditions = Vec::new();
        self.collect_rules(&mut conditions, &mut rules);
        rules
    }

    fn collect_rules(&self, conditions: &mut Vec<String>, rules: &mut Vec<String>) {
        match self {
            Node::Leaf { label, .. } => {
                if conditions.is_empty() {
                    rules.push(format!("=> {}", label));
                } else {
                    rules.push(format!("{} => {}", conditions.join(" AND "), label));
                }
            }
            Node::Decision {
                attribute, children, ..
            } => {
                for (value, child) in children {
                    conditions.push(format!("{} = {}", attribute, value));
                    child.collect_rules(conditions, rules);
                    conditions.pop();
                }
            }
        }
    }

    /// Labels of the children that are leaves, ignoring decision children.
    pub fn leaf_child_labels(&self) -> Vec<&str> {
        match self {
            Node::Leaf { .. } => Vec::new(),
            Node::Decision { children, .. } => children
                .values()
                .filter_map(|c| match c {
                    Node::Leaf { label, .. } => Some(label.as_str()),
                    Node::Decision { .. } => None,
                })
                .collect(),
        }
    }

    /// The leaf that would replace this decision node when all of its children are leaves.
    ///
    /// The label is the most common label among the children, ties going to the
    /// first child in value order, and the weight is the sum of the children's weights.
    pub fn collapse(&self) -> Option<Node> {
        let children = match self {
            Node::Decision { children, .. } => children,
            Node::Leaf { .. } => return None,
        };
        if children.is_empty() || !children.values().all(Node::is_leaf) {
            return None;
        }
        let labels = self.leaf_child_labels();
        let label = majority(labels.iter().map(|l| (*l, 1.0)))?;
        Some(Node::leaf(label, self.weight()))
    }

    /// Node reached by following the branch `path` of attribute values.
    pub fn get(&self, path: &[String]) -> Option<&Node> {
        let mut node = self;
        for value in path {
            node = match node {
                Node::Decision { children, .. } => children.get(value)?,
                Node::Leaf { .. } => return None,
            };
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &[String]) -> Option<&mut Node> {
        let mut node = self;
        for value in path {
            node = match node {
                Node::Decision { children, .. } => children.get_mut(value)?,
                Node::Leaf { .. } => return None,
            };
        }
        Some(node)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        match self {
            Node::Leaf { label, weight } => writeln!(f, "{:indent$}Class: {}, Weight: {}", "", label, weight),
            Node::Decision {
                attribute, children, ..
            } => {
                for (value, child) in children {
                    writeln!(f, "{:indent$}{} = {}", "", attribute, value)?;
                    child.fmt_indented(f, indent + 2)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
