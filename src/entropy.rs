//! Entropy
//!
//! Class-label entropy and majority labels over weighted record sets.
use crate::data::Dataset;
use crate::errors::C45Error;
use hashbrown::HashMap;

/// Accumulate weight per label, keeping labels in first-encountered order.
pub fn label_totals<'a, I>(pairs: I) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut position: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<(&'a str, f64)> = Vec::new();
    for (label, weight) in pairs {
        match position.get(label) {
            Some(p) => totals[*p].1 += weight,
            None => {
                position.insert(label, totals.len());
                totals.push((label, weight));
            }
        }
    }
    totals
}

/// Weight per class label for the records in `index`.
pub fn class_weights<'a>(data: &'a Dataset, index: &[usize]) -> Vec<(&'a str, f64)> {
    label_totals(index.iter().map(|i| (data.label(*i), data.weights[*i])))
}

/// Label with the strictly greatest accumulated weight.
///
/// Ties go to the label encountered first, so the result only depends
/// on the order of `pairs`. Returns `None` when `pairs` is empty.
pub fn majority<'a, I>(pairs: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for (label, total) in label_totals(pairs) {
        match best {
            Some((_, w)) if total <= w => {}
            _ => best = Some((label, total)),
        }
    }
    best.map(|(label, _)| label)
}

/// Majority class of the records in `index`, weighted by record weight.
pub fn majority_label<'a>(data: &'a Dataset, index: &[usize]) -> Option<&'a str> {
    majority(index.iter().map(|i| (data.label(*i), data.weights[*i])))
}

/// Entropy of a distribution given by non-negative masses.
pub fn entropy_of(masses: &[f64]) -> Result<f64, C45Error> {
    let total: f64 = masses.iter().sum();
    if total <= 0.0 {
        return Err(C45Error::EmptyDataset(
            "entropy requires a positive total weight".to_string(),
        ));
    }
    let mut entropy = 0.0;
    for m in masses.iter().filter(|m| **m > 0.0) {
        let p = m / total;
        entropy -= p * p.log2();
    }
    Ok(entropy)
}

/// Weighted class-label entropy of the records in `index`.
pub fn entropy(data: &Dataset, index: &[usize]) -> Result<f64, C45Error> {
    let masses: Vec<f64> = class_weights(data, index).into_iter().map(|(_, w)| w).collect();
    entropy_of(&masses)
}
