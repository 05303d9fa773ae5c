mod grower;
mod node;

// Modules
pub mod classifier;
pub mod constants;
pub mod data;
pub mod entropy;
pub mod errors;
pub mod metric;
pub mod prune;
pub mod sampler;
pub mod splitter;
pub mod stats;
pub mod tree;

// Individual classes, and functions
pub use classifier::{C45Classifier, TreeSummary};
pub use data::Dataset;
pub use errors::C45Error;
pub use node::Node;
pub use prune::{PruneConfig, PruneReport};
pub use tree::Tree;
