//! Data
//!
//! Categorical records with a trailing class label, paired with per-record weights.
use crate::errors::C45Error;

/// A categorical dataset.
///
/// Every record holds one value per attribute followed by the class label,
/// so `records[i].len() == attributes.len() + 1`. Records are paired one to one
/// with non-negative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Attribute names, in record order, excluding the label.
    pub attributes: Vec<String>,
    /// Attribute values followed by the class label.
    pub records: Vec<Vec<String>>,
    /// Weight of each record.
    pub weights: Vec<f64>,
    /// Row indices of the dataset, every row of `records` exactly once.
    pub index: Vec<usize>,
}

impl Dataset {
    /// Create a dataset with an explicit weight for every record.
    ///
    /// * `attributes` - Attribute names, excluding the label column.
    /// * `records` - Attribute values followed by the class label.
    /// * `weights` - Non-negative weight for every record.
    pub fn new(attributes: Vec<String>, records: Vec<Vec<String>>, weights: Vec<f64>) -> Result<Self, C45Error> {
        let index = (0..records.len()).collect();
        let data = Dataset {
            attributes,
            records,
            weights,
            index,
        };
        data.validate()?;
        Ok(data)
    }

    /// Create a dataset where every record carries the same weight.
    pub fn with_uniform_weight(
        attributes: Vec<String>,
        records: Vec<Vec<String>>,
        weight: f64,
    ) -> Result<Self, C45Error> {
        let weights = vec![weight; records.len()];
        Self::new(attributes, records, weights)
    }

    /// Create a unit weighted dataset from feature rows and a separate label column.
    pub fn from_features(
        attributes: Vec<String>,
        features: Vec<Vec<String>>,
        labels: Vec<String>,
    ) -> Result<Self, C45Error> {
        if features.len() != labels.len() {
            return Err(C45Error::InvalidParameter(
                "labels".to_string(),
                format!("{} labels", features.len()),
                labels.len().to_string(),
            ));
        }
        let records = features
            .into_iter()
            .zip(labels)
            .map(|(mut row, label)| {
                row.push(label);
                row
            })
            .collect();
        Self::with_uniform_weight(attributes, records, 1.0)
    }

    /// Build a dataset from string slices, mostly useful for small fixtures.
    pub fn from_str_rows(attributes: &[&str], rows: &[&[&str]], weight: f64) -> Result<Self, C45Error> {
        let attributes = attributes.iter().map(|a| a.to_string()).collect();
        let records = rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();
        Self::with_uniform_weight(attributes, records, weight)
    }

    /// Check the shape and weight invariants of the dataset.
    pub fn validate(&self) -> Result<(), C45Error> {
        if self.records.len() != self.weights.len() {
            return Err(C45Error::InvalidParameter(
                "weights".to_string(),
                format!("{} weights", self.records.len()),
                self.weights.len().to_string(),
            ));
        }
        let expected = self.attributes.len() + 1;
        if let Some(r) = self.records.iter().find(|r| r.len() != expected) {
            return Err(C45Error::SchemaMismatch {
                expected,
                found: r.len(),
            });
        }
        let mut seen = vec![false; self.records.len()];
        for i in self.index.iter() {
            if *i >= seen.len() || seen[*i] {
                return Err(C45Error::InvalidParameter(
                    "index".to_string(),
                    format!("every row of 0..{} exactly once", self.records.len()),
                    format!("row {}", i),
                ));
            }
            seen[*i] = true;
        }
        if self.index.len() != self.records.len() {
            return Err(C45Error::InvalidParameter(
                "index".to_string(),
                format!("{} rows", self.records.len()),
                self.index.len().to_string(),
            ));
        }
        if let Some(w) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(C45Error::InvalidParameter(
                "weight".to_string(),
                "a finite non-negative number".to_string(),
                w.to_string(),
            ));
        }
        Ok(())
    }

    /// Append a record, keeping `index` in step with `records`.
    pub fn push_record(&mut self, record: Vec<String>, weight: f64) {
        self.index.push(self.records.len());
        self.records.push(record);
        self.weights.push(weight);
    }

    /// Number of records.
    pub fn rows(&self) -> usize {
        self.records.len()
    }

    /// Number of attributes, excluding the label.
    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Class label of a record.
    pub fn label(&self, row: usize) -> &str {
        &self.records[row][self.attributes.len()]
    }

    /// Value of an attribute in a record.
    pub fn value(&self, row: usize, attribute: usize) -> &str {
        &self.records[row][attribute]
    }

    /// Attribute values of a record, without the label.
    pub fn features(&self, row: usize) -> &[String] {
        &self.records[row][..self.attributes.len()]
    }

    /// Sum of the weights of the records in `index`.
    pub fn total_weight(&self, index: &[usize]) -> f64 {
        index.iter().map(|i| self.weights[*i]).sum()
    }
}
