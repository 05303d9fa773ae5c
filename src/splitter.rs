//! Splitter
//!
//! Gain ratio attribute selection, and the chi-square gate applied to the chosen split.
use crate::data::Dataset;
use crate::entropy::{entropy, entropy_of};
use crate::errors::C45Error;
use crate::stats::{ChiSquareTest, ContingencyTable};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Statistics of splitting a record set on one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Position of the attribute in the record.
    pub attribute: usize,
    pub gain: f64,
    pub split_information: f64,
    pub gain_ratio: f64,
}

/// Group the records in `index` by their value of `attribute`,
/// keeping values in first-encountered order.
pub fn partition<'a>(data: &'a Dataset, index: &[usize], attribute: usize) -> Vec<(&'a str, Vec<usize>)> {
    let mut position: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<usize>)> = Vec::new();
    for i in index {
        let value = data.value(*i, attribute);
        match position.get(value) {
            Some(p) => groups[*p].1.push(*i),
            None => {
                position.insert(value, groups.len());
                groups.push((value, vec![*i]));
            }
        }
    }
    groups
}

/// Gain, split information and gain ratio of `attribute` on the records in `index`.
///
/// `total_entropy` is the class entropy of the whole record set.
pub fn evaluate_attribute(
    data: &Dataset,
    index: &[usize],
    attribute: usize,
    total_entropy: f64,
) -> Result<SplitInfo, C45Error> {
    let total_weight = data.total_weight(index);
    if total_weight <= 0.0 {
        return Err(C45Error::EmptyDataset(
            "cannot split a record set with zero total weight".to_string(),
        ));
    }
    let mut attribute_entropy = 0.0;
    let mut subset_weights = Vec::new();
    for (_, subset) in partition(data, index, attribute) {
        let subset_weight = data.total_weight(&subset);
        // A weightless subset carries no probability mass.
        if subset_weight <= 0.0 {
            continue;
        }
        attribute_entropy += subset_weight / total_weight * entropy(data, &subset)?;
        subset_weights.push(subset_weight);
    }
    let gain = total_entropy - attribute_entropy;
    let split_information = entropy_of(&subset_weights)?;
    let gain_ratio = if split_information != 0.0 {
        gain / split_information
    } else {
        0.0
    };
    Ok(SplitInfo {
        attribute,
        gain,
        split_information,
        gain_ratio,
    })
}

/// Gain ratio of a single attribute on the records in `index`.
pub fn gain_ratio(data: &Dataset, index: &[usize], attribute: usize) -> Result<f64, C45Error> {
    let total_entropy = entropy(data, index)?;
    Ok(evaluate_attribute(data, index, attribute, total_entropy)?.gain_ratio)
}

/// Trait for choosing, and then accepting or rejecting, the split of a node.
pub trait Splitter {
    /// Find the best attribute among `available` to split the records in `index` on.
    fn best_split(&self, data: &Dataset, index: &[usize], available: &[usize]) -> Result<Option<SplitInfo>, C45Error>;
    /// Decide whether a chosen split should be used.
    fn accept_split(&self, data: &Dataset, index: &[usize], split: &SplitInfo) -> bool;
}

/// C4.5 splitter: the attribute with the highest gain ratio, gated by
/// a chi-square test of independence between that attribute and the label.
///
/// The significance test is only run on the attribute already chosen by
/// gain ratio, rather than filtering every candidate before selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GainRatioSplitter {
    /// Splits whose p-value exceeds this threshold are rejected.
    pub chi_square_threshold: f64,
    /// Apply Yates' correction to one degree of freedom tables.
    pub continuity_correction: bool,
}

impl GainRatioSplitter {
    pub fn new(chi_square_threshold: f64, continuity_correction: bool) -> Self {
        GainRatioSplitter {
            chi_square_threshold,
            continuity_correction,
        }
    }

    pub fn independence_test(&self, data: &Dataset, index: &[usize], attribute: usize) -> ChiSquareTest {
        ContingencyTable::from_records(data, index, attribute).test(self.continuity_correction)
    }
}

impl Splitter for GainRatioSplitter {
    fn best_split(&self, data: &Dataset, index: &[usize], available: &[usize]) -> Result<Option<SplitInfo>, C45Error> {
        let total_entropy = entropy(data, index)?;
        let mut best: Option<SplitInfo> = None;
        for attribute in available {
            let info = evaluate_attribute(data, index, *attribute, total_entropy)?;
            let best_ratio = best.as_ref().map_or(0.0, |b| b.gain_ratio);
            // Only a strict improvement replaces the current best.
            if info.gain_ratio > best_ratio {
                best = Some(info);
            }
        }
        Ok(best)
    }

    fn accept_split(&self, data: &Dataset, index: &[usize], split: &SplitInfo) -> bool {
        let test = self.independence_test(data, index, split.attribute);
        test.p_value <= self.chi_square_threshold
    }
}
