//! Stats
//!
//! Chi-square test of independence between an attribute and the class label.
use crate::data::Dataset;
use hashbrown::HashMap;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Observed counts of attribute value (rows) by class label (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    pub counts: Vec<Vec<f64>>,
}

/// Result of a chi-square independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

impl ContingencyTable {
    pub fn from_counts(counts: Vec<Vec<f64>>) -> Self {
        ContingencyTable { counts }
    }

    /// Cross tabulate record counts of `attribute` against the label.
    /// Record weights are not used, each record counts once.
    pub fn from_records(data: &Dataset, index: &[usize], attribute: usize) -> Self {
        let mut rows: HashMap<&str, usize> = HashMap::new();
        let mut cols: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<Vec<f64>> = Vec::new();
        for i in index {
            let n_rows = rows.len();
            let r = *rows.entry(data.value(*i, attribute)).or_insert(n_rows);
            let n_cols = cols.len();
            let c = *cols.entry(data.label(*i)).or_insert(n_cols);
            if r == counts.len() {
                counts.push(Vec::new());
            }
            if counts[r].len() <= c {
                counts[r].resize(c + 1, 0.0);
            }
            counts[r][c] += 1.0;
        }
        for row in counts.iter_mut() {
            row.resize(cols.len(), 0.0);
        }
        ContingencyTable { counts }
    }

    pub fn n_rows(&self) -> usize {
        self.counts.len()
    }

    pub fn n_cols(&self) -> usize {
        self.counts.first().map_or(0, |r| r.len())
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.n_rows().saturating_sub(1) * self.n_cols().saturating_sub(1)
    }

    /// Pearson chi-square statistic.
    ///
    /// With `correction`, Yates' continuity correction is applied to tables
    /// with a single degree of freedom.
    pub fn chi_square(&self, correction: bool) -> f64 {
        let row_sums: Vec<f64> = self.counts.iter().map(|r| r.iter().sum()).collect();
        let col_sums: Vec<f64> = (0..self.n_cols())
            .map(|c| self.counts.iter().map(|r| r[c]).sum())
            .collect();
        let total: f64 = row_sums.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let yates = correction && self.degrees_of_freedom() == 1;
        let mut statistic = 0.0;
        for (r, row) in self.counts.iter().enumerate() {
            for (c, observed) in row.iter().enumerate() {
                let expected = row_sums[r] * col_sums[c] / total;
                if expected <= 0.0 {
                    continue;
                }
                let mut diff = (observed - expected).abs();
                if yates {
                    diff = (diff - 0.5).max(0.0);
                }
                statistic += diff * diff / expected;
            }
        }
        statistic
    }

    pub fn test(&self, correction: bool) -> ChiSquareTest {
        let degrees_of_freedom = self.degrees_of_freedom();
        if degrees_of_freedom == 0 {
            return ChiSquareTest {
                statistic: 0.0,
                degrees_of_freedom,
                p_value: 1.0,
            };
        }
        let statistic = self.chi_square(correction);
        ChiSquareTest {
            statistic,
            degrees_of_freedom,
            p_value: chi_square_p_value(statistic, degrees_of_freedom),
        }
    }
}

/// Upper tail probability of the chi-square distribution.
pub fn chi_square_p_value(statistic: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom == 0 || statistic <= 0.0 {
        return 1.0;
    }
    match ChiSquared::new(degrees_of_freedom as f64) {
        Ok(distribution) => distribution.sf(statistic),
        Err(_) => 1.0,
    }
}
