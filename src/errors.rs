//! Errors
//!
//! Custom error types used throughout the `c45tree` crate.
use thiserror::Error;

/// Errors that can occur while fitting, pruning or using a C4.5 tree.
#[derive(Debug, Error)]
pub enum C45Error {
    /// The model was used before a successful call to fit.
    #[error("Decision tree has not been trained yet!")]
    NotTrained,
    /// A record does not carry the number of attributes the model expects.
    #[error("Number of values in record and attributes do not match, expected {expected} but {found} provided.")]
    SchemaMismatch { expected: usize, found: usize },
    /// No records, or the records carry zero total weight.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
