use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

fn count_matches<A: AsRef<str>, B: AsRef<str>>(y: &[A], yhat: &[B]) -> usize {
    let mut matches = 0;
    for (t, p) in y.iter().zip(yhat.iter()) {
        let (t, p): (&str, &str) = (t.as_ref(), p.as_ref());
        if t == p {
            matches += 1;
        }
    }
    matches
}

/// Fraction of predictions that differ from the true labels.
pub fn error_rate<A: AsRef<str>, B: AsRef<str>>(y: &[A], yhat: &[B]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    (y.len() - count_matches(y, yhat)) as f64 / y.len() as f64
}

/// Fraction of predictions that match the true labels.
pub fn accuracy<A: AsRef<str>, B: AsRef<str>>(y: &[A], yhat: &[B]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    count_matches(y, yhat) as f64 / y.len() as f64
}

/// Accuracy overall, and per true class (the recall of each class).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub per_class: BTreeMap<String, f64>,
}

impl Evaluation {
    pub fn new<A: AsRef<str>, B: AsRef<str>>(y: &[A], yhat: &[B]) -> Self {
        let mut totals: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for (t, p) in y.iter().zip(yhat.iter()) {
            let (t, p): (&str, &str) = (t.as_ref(), p.as_ref());
            let entry = totals.entry(t.to_string()).or_insert((0, 0));
            entry.1 += 1;
            if t == p {
                entry.0 += 1;
            }
        }
        let per_class = totals
            .into_iter()
            .map(|(label, (correct, total))| (label, correct as f64 / total as f64))
            .collect();
        Evaluation {
            accuracy: accuracy(y, yhat),
            per_class,
        }
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Evaluation result: ")?;
        writeln!(f, "Total accuracy: {}", self.accuracy)?;
        for (label, acc) in &self.per_class {
            writeln!(f, "Accuracy {}: {}", label, acc)?;
        }
        Ok(())
    }
}
