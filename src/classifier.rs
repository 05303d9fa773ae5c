use crate::constants::{CHI_SQUARE_THRESHOLD, MIN_SAMPLES_SPLIT};
use crate::data::Dataset;
use crate::errors::C45Error;
use crate::metric::Evaluation;
use crate::prune::{PruneConfig, PruneReport};
use crate::sampler::{make_rng, FixedSizeSampler, Sampler};
use crate::splitter::GainRatioSplitter;
use crate::tree::Tree;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs;

/// Statistics of a fitted tree.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TreeSummary {
    pub n_instances: usize,
    pub n_attributes: usize,
    pub n_leaves: usize,
    pub n_rules: usize,
    pub n_nodes: usize,
    pub depth: usize,
}

impl Display for TreeSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Decision Tree Classifier Summary")?;
        writeln!(f, "================================")?;
        writeln!(f, "Number of Instances   : {}", self.n_instances)?;
        writeln!(f, "Number of Attributes  : {}", self.n_attributes)?;
        writeln!(f, "Number of Leaves      : {}", self.n_leaves)?;
        writeln!(f, "Number of Rules       : {}", self.n_rules)?;
        writeln!(f, "Number of Nodes       : {}", self.n_nodes)?;
        writeln!(f, "Tree Depth            : {}", self.depth)
    }
}

/// C4.5 decision tree classifier for categorical data.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct C45Classifier {
    /// Maximum depth of the tree, a lone leaf having depth 1. Unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Nodes with fewer records than this become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// A split is only used when the chi-square test of independence between
    /// the chosen attribute and the label has a p-value at most this threshold.
    #[serde(default = "default_chi_square_threshold")]
    pub chi_square_threshold: f64,
    /// Apply Yates' continuity correction to one degree of freedom tables.
    #[serde(default)]
    pub continuity_correction: bool,
    // Members set by fit, and not parameters set by the user.
    /// Attribute names seen at fit time.
    pub attributes: Vec<String>,
    pub tree: Option<Tree>,
    n_instances: usize,
}

fn default_min_samples_split() -> usize {
    MIN_SAMPLES_SPLIT
}
fn default_chi_square_threshold() -> f64 {
    CHI_SQUARE_THRESHOLD
}

impl Default for C45Classifier {
    fn default() -> Self {
        C45Classifier {
            max_depth: None,
            min_samples_split: MIN_SAMPLES_SPLIT,
            chi_square_threshold: CHI_SQUARE_THRESHOLD,
            continuity_correction: false,
            attributes: Vec::new(),
            tree: None,
            n_instances: 0,
        }
    }
}

impl C45Classifier {
    /// C4.5 classifier object
    ///
    /// * `max_depth` - Maximum depth of the tree, `None` for unlimited.
    /// * `min_samples_split` - Minimum number of records needed to split a node, at least 1.
    /// * `chi_square_threshold` - p-value threshold of the split significance test, in (0, 1).
    pub fn new(
        max_depth: Option<usize>,
        min_samples_split: usize,
        chi_square_threshold: f64,
    ) -> Result<Self, C45Error> {
        let classifier = C45Classifier {
            max_depth,
            min_samples_split,
            chi_square_threshold,
            ..Default::default()
        };
        classifier.validate_parameters()?;
        Ok(classifier)
    }

    pub fn validate_parameters(&self) -> Result<(), C45Error> {
        if self.min_samples_split == 0 {
            return Err(C45Error::InvalidParameter(
                "min_samples_split".to_string(),
                "an integer of at least 1".to_string(),
                self.min_samples_split.to_string(),
            ));
        }
        if !(self.chi_square_threshold > 0.0 && self.chi_square_threshold < 1.0) {
            return Err(C45Error::InvalidParameter(
                "chi_square_threshold".to_string(),
                "a number in (0, 1)".to_string(),
                self.chi_square_threshold.to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(C45Error::InvalidParameter(
                "max_depth".to_string(),
                "None or a depth of at least 1".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.tree = None;
        self.attributes = Vec::new();
        self.n_instances = 0;
    }

    fn splitter(&self) -> GainRatioSplitter {
        GainRatioSplitter::new(self.chi_square_threshold, self.continuity_correction)
    }

    /// Fit the classifier on a weighted dataset.
    ///
    /// * `data` - Records with a trailing label, and one weight per record.
    pub fn fit(&mut self, data: &Dataset) -> Result<(), C45Error> {
        self.validate_parameters()?;
        data.validate()?;
        let tree = Tree::fit(data, &self.splitter(), self.max_depth, self.min_samples_split)?;
        info!(
            "Fitted a tree on {} records: {} nodes, {} leaves, depth {}.",
            data.rows(),
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        self.attributes = data.attributes.clone();
        self.n_instances = data.rows();
        self.tree = Some(tree);
        Ok(())
    }

    /// Fit on feature rows and labels, every record getting the same `weight`.
    pub fn fit_uniform(
        &mut self,
        attributes: &[String],
        features: &[Vec<String>],
        labels: &[String],
        weight: f64,
    ) -> Result<(), C45Error> {
        let mut data = Dataset::from_features(attributes.to_vec(), features.to_vec(), labels.to_vec())?;
        data.weights = vec![weight; data.rows()];
        self.fit(&data)
    }

    /// Get reference to the fitted tree.
    pub fn get_tree(&self) -> Result<&Tree, C45Error> {
        self.tree.as_ref().ok_or(C45Error::NotTrained)
    }

    fn check_record<S: AsRef<str>>(&self, record: &[S]) -> Result<(), C45Error> {
        if record.len() != self.attributes.len() {
            return Err(C45Error::SchemaMismatch {
                expected: self.attributes.len(),
                found: record.len(),
            });
        }
        Ok(())
    }

    /// Predict the label of one record of attribute values.
    pub fn predict<S: AsRef<str>>(&self, record: &[S]) -> Result<String, C45Error> {
        let tree = self.get_tree()?;
        self.check_record(record)?;
        Ok(tree.predict_row(record).to_string())
    }

    /// Predict the labels of many records.
    ///
    /// * `records` - Records of attribute values, without labels.
    /// * `parallel` - Predict in parallel.
    pub fn predict_batch<S: AsRef<str> + Sync>(
        &self,
        records: &[Vec<S>],
        parallel: bool,
    ) -> Result<Vec<String>, C45Error> {
        let tree = self.get_tree()?;
        for record in records {
            self.check_record(record)?;
        }
        Ok(tree.predict(records, parallel))
    }

    /// Accuracy, overall and per class, of the classifier on labeled records.
    pub fn evaluate(&self, data: &Dataset) -> Result<Evaluation, C45Error> {
        let tree = self.get_tree()?;
        if data.n_attributes() != self.attributes.len() {
            return Err(C45Error::SchemaMismatch {
                expected: self.attributes.len(),
                found: data.n_attributes(),
            });
        }
        data.validate()?;
        let y: Vec<&str> = data.index.iter().map(|i| data.label(*i)).collect();
        let yhat: Vec<&str> = data.index.iter().map(|i| tree.predict_row(data.features(*i))).collect();
        Ok(Evaluation::new(&y, &yhat))
    }

    /// Reduced-error pruning against a labeled validation dataset.
    ///
    /// * `validation` - Records with a trailing label, weights are ignored.
    /// * `config` - Sample size and seed of the validation sample.
    pub fn prune(&mut self, validation: &Dataset, config: &PruneConfig) -> Result<PruneReport, C45Error> {
        if self.tree.is_none() {
            return Err(C45Error::NotTrained);
        }
        if validation.is_empty() {
            return Err(C45Error::EmptyDataset(
                "prune called with zero validation records".to_string(),
            ));
        }
        if validation.n_attributes() != self.attributes.len() {
            return Err(C45Error::SchemaMismatch {
                expected: self.attributes.len(),
                found: validation.n_attributes(),
            });
        }
        validation.validate()?;
        if config.sample_size == 0 {
            warn!("Pruning sample size is zero, the full validation set is used instead.");
        }
        let sample = if config.sample_size == 0 {
            validation.index.clone()
        } else {
            let mut rng = make_rng(config.seed);
            let (chosen, _) = FixedSizeSampler::new(config.sample_size).sample(&mut rng, &validation.index);
            chosen
        };
        let tree = self.tree.as_mut().ok_or(C45Error::NotTrained)?;
        let report = tree.prune(validation, &sample);
        info!("{}", report);
        Ok(report)
    }

    pub fn depth(&self) -> Result<usize, C45Error> {
        Ok(self.get_tree()?.depth())
    }

    pub fn n_leaves(&self) -> Result<usize, C45Error> {
        Ok(self.get_tree()?.leaf_count())
    }

    pub fn n_nodes(&self) -> Result<usize, C45Error> {
        Ok(self.get_tree()?.node_count())
    }

    /// One rule per leaf, conditions from the root joined by `AND`.
    pub fn rules(&self) -> Result<Vec<String>, C45Error> {
        Ok(self.get_tree()?.rules())
    }

    pub fn summary(&self) -> Result<TreeSummary, C45Error> {
        let tree = self.get_tree()?;
        Ok(TreeSummary {
            n_instances: self.n_instances,
            n_attributes: self.attributes.len(),
            n_leaves: tree.leaf_count(),
            n_rules: tree.rules().len(),
            n_nodes: tree.node_count(),
            depth: tree.depth(),
        })
    }

    /// Save a classifier as a json object to a file.
    ///
    /// * `path` - Path to save classifier.
    pub fn save_model(&self, path: &str) -> Result<(), C45Error> {
        let model = self.json_dump()?;
        match fs::write(path, model) {
            Err(e) => Err(C45Error::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Dump a classifier as a json object
    pub fn json_dump(&self) -> Result<String, C45Error> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(C45Error::UnableToWrite(e.to_string())),
        }
    }

    /// Load a classifier from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    pub fn from_json(json_str: &str) -> Result<Self, C45Error> {
        let model = serde_json::from_str::<C45Classifier>(json_str);
        match model {
            Ok(m) => Ok(m),
            Err(e) => Err(C45Error::UnableToRead(e.to_string())),
        }
    }

    /// Load a classifier from a path to a json classifier object.
    ///
    /// * `path` - Path to load classifier from.
    pub fn load_model(path: &str) -> Result<Self, C45Error> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(C45Error::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }

    // Set methods for parameters

    /// Set the maximum depth.
    /// * `max_depth` - Maximum depth of the tree, `None` for unlimited.
    pub fn set_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of records needed to split a node.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the p-value threshold of the split significance test.
    pub fn set_chi_square_threshold(mut self, chi_square_threshold: f64) -> Self {
        self.chi_square_threshold = chi_square_threshold;
        self
    }

    /// Set whether Yates' continuity correction is applied.
    pub fn set_continuity_correction(mut self, continuity_correction: bool) -> Self {
        self.continuity_correction = continuity_correction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use std::fs;

    fn and_dataset() -> Dataset {
        Dataset::from_str_rows(
            &["A", "B"],
            &[&["1", "1", "yes"], &["1", "0", "no"], &["0", "1", "no"], &["0", "0", "no"]],
            1.0,
        )
        .unwrap()
    }

    fn tennis() -> Dataset {
        let file = fs::read_to_string("resources/play_tennis.csv").expect("Something went wrong reading the file");
        let mut lines = file.lines();
        let header: Vec<String> = lines.next().unwrap().split(',').map(|s| s.to_string()).collect();
        let records: Vec<Vec<String>> = lines
            .filter(|l| !l.is_empty())
            .map(|l| l.split(',').map(|s| s.to_string()).collect())
            .collect();
        let attributes = header[..header.len() - 1].to_vec();
        Dataset::with_uniform_weight(attributes, records, 1.0).unwrap()
    }

    #[test]
    fn test_and_scenario() {
        let data = and_dataset();
        let mut model = C45Classifier::default().set_chi_square_threshold(0.99);
        model.fit(&data).unwrap();
        assert_eq!(model.n_leaves().unwrap(), 3);
        assert_eq!(model.depth().unwrap(), 3);
        assert_eq!(model.n_nodes().unwrap(), 5);
        let rules = model.rules().unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules.contains(&"A = 1 AND B = 1 => yes".to_string()));
        assert_eq!(rules.iter().filter(|r| r.ends_with("=> no")).count(), 2);
        for i in data.index.iter() {
            assert_eq!(model.predict(data.features(*i)).unwrap(), data.label(*i));
        }
    }

    #[test]
    fn test_and_scenario_min_samples_split() {
        let data = and_dataset();
        let mut model = C45Classifier::default()
            .set_chi_square_threshold(0.99)
            .set_min_samples_split(5);
        model.fit(&data).unwrap();
        assert_eq!(model.depth().unwrap(), 1);
        assert_eq!(model.get_tree().unwrap().root, Node::leaf("no", 4.0));
    }

    #[test]
    fn test_single_label_dataset() {
        let data = Dataset::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["x".to_string(), "p".to_string(), "ok".to_string()],
                vec!["y".to_string(), "q".to_string(), "ok".to_string()],
                vec!["z".to_string(), "p".to_string(), "ok".to_string()],
            ],
            vec![0.5, 1.5, 2.0],
        )
        .unwrap();
        let mut model = C45Classifier::default();
        model.fit(&data).unwrap();
        assert_eq!(model.get_tree().unwrap().root, Node::leaf("ok", 4.0));
    }

    #[test]
    fn test_unseen_values_never_error() {
        let data = and_dataset();
        let mut model = C45Classifier::default().set_chi_square_threshold(0.99);
        model.fit(&data).unwrap();
        // The root has a "no" leaf child for A = 0.
        assert_eq!(model.predict(&["7", "1"]).unwrap(), "no");
        // Below A = 1 both children are leaves, "yes" is the greatest label.
        assert_eq!(model.predict(&["1", "7"]).unwrap(), "yes");
    }

    #[test]
    fn test_not_trained() {
        let mut model = C45Classifier::default();
        assert!(matches!(model.predict(&["1", "1"]), Err(C45Error::NotTrained)));
        assert!(matches!(model.depth(), Err(C45Error::NotTrained)));
        assert!(matches!(model.n_leaves(), Err(C45Error::NotTrained)));
        assert!(matches!(model.n_nodes(), Err(C45Error::NotTrained)));
        assert!(matches!(model.rules(), Err(C45Error::NotTrained)));
        assert!(matches!(model.summary(), Err(C45Error::NotTrained)));
        assert!(matches!(
            model.prune(&and_dataset(), &PruneConfig::default()),
            Err(C45Error::NotTrained)
        ));
    }

    #[test]
    fn test_schema_mismatch() {
        let mut model = C45Classifier::default();
        model.fit(&and_dataset()).unwrap();
        assert!(matches!(
            model.predict(&["1"]),
            Err(C45Error::SchemaMismatch { expected: 2, found: 1 })
        ));
        let records = vec![vec!["1", "1"], vec!["1", "1", "1"]];
        assert!(matches!(
            model.predict_batch(&records, false),
            Err(C45Error::SchemaMismatch { expected: 2, found: 3 })
        ));
        for parallel in [false, true] {
            assert!(matches!(
                model.predict_batch(&[vec!["1"]], parallel),
                Err(C45Error::SchemaMismatch { expected: 2, found: 1 })
            ));
        }
        let narrow = Dataset::from_str_rows(&["A"], &[&["1", "yes"]], 1.0).unwrap();
        assert!(matches!(
            model.evaluate(&narrow),
            Err(C45Error::SchemaMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_fit_rejects_records_missing_from_index() {
        let mut data = Dataset::from_str_rows(&["A"], &[&["x", "a"], &["y", "a"]], 1.0).unwrap();
        data.records.push(vec!["z".to_string(), "b".to_string()]);
        data.weights.push(1.0);
        let mut model = C45Classifier::default().set_chi_square_threshold(0.5);
        assert!(matches!(model.fit(&data), Err(C45Error::InvalidParameter(..))));
        assert!(model.tree.is_none());

        let mut data = Dataset::from_str_rows(&["A"], &[&["x", "a"], &["y", "a"]], 1.0).unwrap();
        data.push_record(vec!["z".to_string(), "b".to_string()], 1.0);
        model.fit(&data).unwrap();
        assert_eq!(model.summary().unwrap().n_instances, 3);
        assert_eq!(model.get_tree().unwrap().root.weight(), 3.0);
        assert_eq!(model.predict(&["z"]).unwrap(), "b");
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            C45Classifier::new(None, 0, 0.05),
            Err(C45Error::InvalidParameter(..))
        ));
        assert!(matches!(
            C45Classifier::new(None, 2, 1.0),
            Err(C45Error::InvalidParameter(..))
        ));
        assert!(matches!(
            C45Classifier::new(None, 2, 0.0),
            Err(C45Error::InvalidParameter(..))
        ));
        assert!(matches!(
            C45Classifier::new(Some(0), 2, 0.05),
            Err(C45Error::InvalidParameter(..))
        ));
        let mut model = C45Classifier::default().set_min_samples_split(0);
        assert!(matches!(model.fit(&and_dataset()), Err(C45Error::InvalidParameter(..))));
        assert!(model.tree.is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let mut model = C45Classifier::default();
        let data = Dataset::from_str_rows(&["A"], &[], 1.0).unwrap();
        assert!(matches!(model.fit(&data), Err(C45Error::EmptyDataset(_))));
        assert!(model.tree.is_none());
    }

    #[test]
    fn test_tennis_fit_summary_and_depth_bound() {
        let data = tennis();
        let mut model = C45Classifier::default().set_chi_square_threshold(0.5);
        model.fit(&data).unwrap();
        let summary = model.summary().unwrap();
        assert_eq!(summary.n_instances, 14);
        assert_eq!(summary.n_attributes, 4);
        assert_eq!(summary.n_leaves, summary.n_rules);
        assert!(summary.to_string().contains("Number of Instances   : 14"));

        for max_depth in 1..5 {
            let mut model = C45Classifier::default()
                .set_chi_square_threshold(0.5)
                .set_max_depth(Some(max_depth));
            model.fit(&data).unwrap();
            assert!(model.depth().unwrap() <= max_depth);
            assert_eq!(model.rules().unwrap().len(), model.n_leaves().unwrap());
        }
    }

    #[test]
    fn test_prune_never_increases_sample_error() {
        let data = tennis();
        let mut model = C45Classifier::default().set_chi_square_threshold(0.5);
        model.fit(&data).unwrap();
        // Flip a few labels so the validation set disagrees with the training set.
        let mut validation = data.clone();
        for i in [0, 3, 8] {
            let label = if validation.label(i) == "yes" { "no" } else { "yes" };
            let n = validation.n_attributes();
            validation.records[i][n] = label.to_string();
        }
        let config = PruneConfig::default().set_sample_size(10).set_seed(42);
        let report = model.prune(&validation, &config).unwrap();
        assert_eq!(report.sample_size, 10);
        assert!(report.error_after <= report.error_before);
        assert!(report.nodes_after <= report.nodes_before);
        assert_eq!(model.n_nodes().unwrap(), report.nodes_after);
    }

    #[test]
    fn test_prune_is_reproducible_with_seed() {
        let data = tennis();
        let mut validation = data.clone();
        let n = validation.n_attributes();
        validation.records[5][n] = "yes".to_string();
        let config = PruneConfig::default().set_sample_size(7).set_seed(11);

        let mut first = C45Classifier::default().set_chi_square_threshold(0.5);
        first.fit(&data).unwrap();
        let mut second = first.clone();
        let a = first.prune(&validation, &config).unwrap();
        let b = second.prune(&validation, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.get_tree().unwrap(), second.get_tree().unwrap());
    }

    #[test]
    fn test_prune_rejects_bad_validation() {
        let mut model = C45Classifier::default();
        model.fit(&and_dataset()).unwrap();
        let empty = Dataset::from_str_rows(&["A", "B"], &[], 1.0).unwrap();
        assert!(matches!(
            model.prune(&empty, &PruneConfig::default()),
            Err(C45Error::EmptyDataset(_))
        ));
        let narrow = Dataset::from_str_rows(&["A"], &[&["1", "yes"]], 1.0).unwrap();
        assert!(matches!(
            model.prune(&narrow, &PruneConfig::default()),
            Err(C45Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_evaluate() {
        let data = and_dataset();
        let mut model = C45Classifier::default().set_chi_square_threshold(0.99);
        model.fit(&data).unwrap();
        let eval = model.evaluate(&data).unwrap();
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.per_class["yes"], 1.0);
    }

    #[test]
    fn test_fit_uniform_weight() {
        let attributes = vec!["A".to_string()];
        let features = vec![vec!["x".to_string()], vec!["y".to_string()]];
        let labels = vec!["a".to_string(), "a".to_string()];
        let mut model = C45Classifier::default();
        model.fit_uniform(&attributes, &features, &labels, 3.0).unwrap();
        assert_eq!(model.get_tree().unwrap().root, Node::leaf("a", 6.0));
    }

    #[test]
    fn test_model_save_and_load() {
        let data = tennis();
        let mut model = C45Classifier::default()
            .set_chi_square_threshold(0.5)
            .set_max_depth(Some(3));
        model.fit(&data).unwrap();
        let records: Vec<Vec<String>> = data.index.iter().map(|i| data.features(*i).to_vec()).collect();
        let preds = model.predict_batch(&records, true).unwrap();

        model.save_model("resources/c45_model.json").unwrap();
        let loaded = C45Classifier::load_model("resources/c45_model.json").unwrap();
        fs::remove_file("resources/c45_model.json").unwrap();
        assert_eq!(loaded.predict_batch(&records, false).unwrap(), preds);
        assert_eq!(loaded.max_depth, Some(3));
        assert_eq!(loaded.summary().unwrap(), model.summary().unwrap());

        let from_str = C45Classifier::from_json(&model.json_dump().unwrap()).unwrap();
        assert_eq!(from_str.get_tree().unwrap(), model.get_tree().unwrap());
        assert!(matches!(
            C45Classifier::from_json("{not json"),
            Err(C45Error::UnableToRead(_))
        ));
    }
}
