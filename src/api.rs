//! High-level API for mining, classifying and evaluating
//!
//! This module provides a user-friendly interface for common tasks:
//! training a rule classifier, predicting, and scoring with a confusion matrix.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rcar::api::RuleLearner;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Mine rules and build a classifier
//! let model = RuleLearner::new()
//!     .with_min_support(0.1)
//!     .with_min_confidence(0.8)
//!     .train_from_file("train.arff")?;
//!
//! // Score it on held-out data
//! let matrix = model.evaluate_from_file("test.arff")?;
//! println!("Accuracy: {:.2}%", matrix.accuracy() * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::classifier::{BaselineClassifier, BaselinePolicy, RuleClassifier};
use crate::core::{ClassCode, Classifier, Dataset, Instance, Result};
use crate::data::{NominalDataset, Schema};
use crate::metrics::ConfusionMatrix;
use crate::miner::{AprioriMiner, MinerConfig, SupportBasis};
use crate::utils::validation;
use log::info;
use std::path::Path;

/// Rule learner with builder-style configuration
#[derive(Debug, Clone, Default)]
pub struct RuleLearner {
    config: MinerConfig,
}

impl RuleLearner {
    /// Create a learner with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a learner from a full miner configuration
    pub fn with_config(config: MinerConfig) -> Self {
        Self { config }
    }

    /// Set the minimum support fraction
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.config.min_support = min_support;
        self
    }

    /// Set the minimum confidence
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.config.min_confidence = min_confidence;
        self
    }

    /// Choose what support fractions are measured against
    pub fn with_support_basis(mut self, support_basis: SupportBasis) -> Self {
        self.config.support_basis = support_basis;
        self
    }

    /// Limit the number of items in an antecedent
    pub fn with_max_antecedent_size(mut self, max_size: usize) -> Self {
        self.config.max_antecedent_size = Some(max_size);
        self
    }

    /// Get the miner configuration
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Mine rules from a dataset and build a classifier.
    ///
    /// The model carries no schema, so file evaluation uses the codes of the
    /// test file as they are. Use [`RuleLearner::train_nominal`] to keep them
    /// aligned.
    pub fn train<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<TrainedModel> {
        self.train_with_schema(dataset, Schema::default())
    }

    /// Mine rules from a loaded dataset, remembering its schema
    pub fn train_nominal(&self, dataset: &NominalDataset) -> Result<TrainedModel> {
        self.train_with_schema(dataset, dataset.schema().clone())
    }

    fn train_with_schema<D: Dataset + ?Sized>(
        &self,
        dataset: &D,
        schema: Schema,
    ) -> Result<TrainedModel> {
        validation::validate_config(&self.config)?;

        let rules = AprioriMiner::new(self.config.clone()).mine(dataset);
        info!(
            "Mined {} rules from {} instances (min_support={}, min_confidence={})",
            rules.len(),
            dataset.len(),
            self.config.min_support,
            self.config.min_confidence
        );

        Ok(TrainedModel {
            classifier: RuleClassifier::new(rules),
            config: self.config.clone(),
            schema,
        })
    }

    /// Train from a dataset file, detecting the format from its extension
    pub fn train_from_file<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let dataset = NominalDataset::from_path(path)?;
        self.train_nominal(&dataset)
    }
}

/// Trained rule classifier with a high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel {
    classifier: RuleClassifier,
    config: MinerConfig,
    schema: Schema,
}

impl TrainedModel {
    /// Predict a single instance
    pub fn predict(&self, instance: &Instance) -> ClassCode {
        self.classifier.predict(instance)
    }

    /// Predict every instance of a dataset
    pub fn predict_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> Vec<ClassCode> {
        predict_all(&self.classifier, dataset)
    }

    /// Build a confusion matrix over a dataset
    pub fn evaluate<D: Dataset + ?Sized>(&self, dataset: &D) -> ConfusionMatrix {
        evaluate_with(&self.classifier, dataset)
    }

    /// Evaluate on a dataset file.
    ///
    /// When the model was trained with a schema, the file is re-encoded
    /// against it first so codes mean the same values on both sides.
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<ConfusionMatrix> {
        let dataset = NominalDataset::from_path(path)?;
        Ok(self.evaluate(&self.align(dataset)?))
    }

    /// Re-encode a dataset against the training schema, if there is one
    pub fn align(&self, dataset: NominalDataset) -> Result<NominalDataset> {
        if self.schema.class_attribute().is_none() {
            return Ok(dataset);
        }
        dataset.align_to(&self.schema)
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        let rules = self.classifier.rules();
        ModelInfo {
            n_rules: rules.len(),
            max_antecedent_size: rules.iter().map(|r| r.len()).max().unwrap_or(0),
            mean_confidence: if rules.is_empty() {
                0.0
            } else {
                rules.iter().map(|r| r.confidence()).sum::<f64>() / rules.len() as f64
            },
        }
    }

    /// Get the underlying classifier
    pub fn classifier(&self) -> &RuleClassifier {
        &self.classifier
    }

    /// Configuration the rules were mined with
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Schema of the training data; empty when trained on bare instances
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Model information
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub n_rules: usize,
    pub max_antecedent_size: usize,
    pub mean_confidence: f64,
}

/// One training entry point per kind of classifier
#[derive(Debug, Clone)]
pub enum Learner {
    Rules(RuleLearner),
    Majority,
    Minority,
}

impl Learner {
    /// Train the selected kind of classifier
    pub fn train<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<Model> {
        match self {
            Learner::Rules(learner) => learner.train(dataset).map(Model::Rules),
            Learner::Majority => Ok(Model::Baseline(BaselineClassifier::fit(
                dataset,
                BaselinePolicy::Majority,
            ))),
            Learner::Minority => Ok(Model::Baseline(BaselineClassifier::fit(
                dataset,
                BaselinePolicy::Minority,
            ))),
        }
    }
}

/// A model trained by a [`Learner`]
#[derive(Debug, Clone)]
pub enum Model {
    Rules(TrainedModel),
    Baseline(BaselineClassifier),
}

impl Classifier for Model {
    fn predict(&self, instance: &Instance) -> ClassCode {
        match self {
            Model::Rules(model) => model.predict(instance),
            Model::Baseline(model) => model.predict(instance),
        }
    }
}

/// Predict every instance of a dataset with any classifier
pub fn predict_all<C: Classifier + ?Sized, D: Dataset + ?Sized>(
    classifier: &C,
    dataset: &D,
) -> Vec<ClassCode> {
    dataset.instances().map(|i| classifier.predict(i)).collect()
}

/// Score any classifier on a dataset
pub fn evaluate_with<C: Classifier + ?Sized, D: Dataset + ?Sized>(
    classifier: &C,
    dataset: &D,
) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::new();
    for instance in dataset.instances() {
        matrix.add(instance.class(), classifier.predict(instance));
    }
    matrix
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Mine rules from a file with the given thresholds
    pub fn train_file<P: AsRef<Path>>(
        path: P,
        min_support: f64,
        min_confidence: f64,
    ) -> Result<TrainedModel> {
        RuleLearner::new()
            .with_min_support(min_support)
            .with_min_confidence(min_confidence)
            .train_from_file(path)
    }

    /// Quick evaluation: train on training file, test on test file.
    ///
    /// Test rows are re-encoded against the training schema by value name.
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
        config: MinerConfig,
    ) -> Result<ConfusionMatrix> {
        let train = NominalDataset::from_path(train_path)?;
        let test = NominalDataset::from_path(test_path)?;
        let model = RuleLearner::with_config(config).train_nominal(&train)?;
        Ok(model.evaluate(&test.align_to(train.schema())?))
    }

    /// Hold-out validation with a sequential split (not shuffled, for reproducibility)
    pub fn holdout_validation(
        dataset: &NominalDataset,
        train_ratio: f64,
        learner: &Learner,
    ) -> Result<ConfusionMatrix> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(crate::core::CarError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let (train, test) = dataset.split(train_ratio);
        let model = learner.train(&train)?;
        Ok(evaluate_with(&model, &test))
    }

    /// k-fold cross-validation over contiguous folds, pooled into one matrix.
    ///
    /// The first `len % folds` folds take one extra instance.
    pub fn cross_validate(
        dataset: &NominalDataset,
        folds: usize,
        learner: &Learner,
    ) -> Result<ConfusionMatrix> {
        validation::validate_folds(folds, dataset.len())?;

        let n = dataset.len();
        let mut pooled = ConfusionMatrix::new();
        let mut start = 0;
        for fold in 0..folds {
            let size = n / folds + usize::from(fold < n % folds);
            let end = start + size;

            let test_idx: Vec<usize> = (start..end).collect();
            let train_idx: Vec<usize> = (0..start).chain(end..n).collect();
            let model = learner.train(&dataset.subset(&train_idx))?;
            let matrix = evaluate_with(&model, &dataset.subset(&test_idx));

            info!(
                "Fold {}/{}: {} test instances, accuracy {:.4}",
                fold + 1,
                folds,
                matrix.total(),
                matrix.accuracy()
            );
            pooled.merge(&matrix);
            start = end;
        }
        Ok(pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CarError, NO_PREDICTION};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture() -> NominalDataset {
        NominalDataset::from_instances(vec![
            Instance::new(vec![1, 3], 5),
            Instance::new(vec![2, 3], 5),
            Instance::new(vec![3], 4),
            Instance::new(vec![0], 4),
            Instance::new(vec![0, 2], 4),
            Instance::new(vec![1, 3], 5),
        ])
    }

    #[test]
    fn test_builder_pattern() {
        let learner = RuleLearner::new()
            .with_min_support(0.3)
            .with_min_confidence(0.9)
            .with_support_basis(SupportBasis::Dataset)
            .with_max_antecedent_size(2);

        assert_eq!(learner.config().min_support, 0.3);
        assert_eq!(learner.config().min_confidence, 0.9);
        assert_eq!(learner.config().support_basis, SupportBasis::Dataset);
        assert_eq!(learner.config().max_antecedent_size, Some(2));
    }

    #[test]
    fn test_train_rejects_bad_thresholds() {
        let result = RuleLearner::new().with_min_support(1.2).train(&fixture());
        assert!(matches!(result, Err(CarError::InvalidParameter(_))));

        let result = RuleLearner::new().with_min_confidence(-0.5).train(&fixture());
        assert!(matches!(result, Err(CarError::InvalidParameter(_))));
    }

    #[test]
    fn test_train_and_predict() {
        let model = RuleLearner::new()
            .with_min_support(0.6)
            .with_min_confidence(0.99)
            .train(&fixture())
            .expect("Training should succeed");

        assert_eq!(model.classifier().len(), 3);
        assert_eq!(model.predict(&Instance::new(vec![0, 2], 0)), 4);
        assert_eq!(model.predict(&Instance::new(vec![1, 3], 0)), 5);
        assert_eq!(model.predict(&Instance::new(vec![2], 0)), NO_PREDICTION);

        let info = model.info();
        assert_eq!(info.n_rules, 3);
        assert_eq!(info.max_antecedent_size, 2);
        assert_eq!(info.mean_confidence, 1.0);
    }

    #[test]
    fn test_evaluate_on_training_data() {
        let model = RuleLearner::new()
            .with_min_support(0.6)
            .with_min_confidence(0.99)
            .train(&fixture())
            .unwrap();

        // rows 1 ({2,3}) and 2 ({3}) get no prediction
        let matrix = model.evaluate(&fixture());
        assert_eq!(matrix.total(), 6);
        assert_eq!(matrix.correct(), 4);
        assert_eq!(matrix.count(5, NO_PREDICTION), 1);
        assert_eq!(matrix.count(4, NO_PREDICTION), 1);
        assert_eq!(
            model.predict_dataset(&fixture()),
            vec![5, NO_PREDICTION, NO_PREDICTION, 4, 4, 5]
        );
    }

    #[test]
    fn test_learner_variants() {
        let majority = Learner::Majority.train(&fixture()).unwrap();
        // 4 and 5 both occur three times; the smaller code wins
        assert_eq!(majority.predict(&Instance::new(vec![1], 0)), 4);

        let rules = Learner::Rules(RuleLearner::new().with_min_support(0.6).with_min_confidence(0.99))
            .train(&fixture())
            .unwrap();
        assert!(matches!(rules, Model::Rules(_)));
        assert_eq!(rules.predict(&Instance::new(vec![1], 0)), 5);
    }

    #[test]
    fn test_cross_validation_covers_every_instance_once() {
        let learner = Learner::Rules(RuleLearner::new().with_min_support(0.2).with_min_confidence(0.5));
        let matrix = quick::cross_validate(&fixture(), 3, &learner).unwrap();
        assert_eq!(matrix.total(), 6);

        let uneven = quick::cross_validate(&fixture(), 4, &Learner::Majority).unwrap();
        assert_eq!(uneven.total(), 6);
    }

    #[test]
    fn test_cross_validation_rejects_bad_folds() {
        assert!(quick::cross_validate(&fixture(), 1, &Learner::Majority).is_err());
        assert!(quick::cross_validate(&fixture(), 7, &Learner::Majority).is_err());
    }

    #[test]
    fn test_holdout_validation() {
        let matrix = quick::holdout_validation(&fixture(), 0.5, &Learner::Majority).unwrap();
        assert_eq!(matrix.total(), 3);
        assert!(quick::holdout_validation(&fixture(), 1.0, &Learner::Majority).is_err());
    }

    #[test]
    fn test_file_operations() {
        let mut temp_file = NamedTempFile::with_suffix(".arff").expect("Failed to create temp file");
        writeln!(temp_file, "@relation toy").expect("Failed to write");
        writeln!(temp_file, "@attribute a {{x, y}}").expect("Failed to write");
        writeln!(temp_file, "@attribute class {{p, q}}").expect("Failed to write");
        writeln!(temp_file, "@data").expect("Failed to write");
        writeln!(temp_file, "x,p").expect("Failed to write");
        writeln!(temp_file, "x,p").expect("Failed to write");
        writeln!(temp_file, "y,q").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let model = quick::train_file(temp_file.path(), 0.5, 0.9).expect("Training should succeed");
        let matrix = model
            .evaluate_from_file(temp_file.path())
            .expect("Evaluation should succeed");
        assert_eq!(matrix.accuracy(), 1.0);
    }

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
        for row in rows {
            writeln!(temp_file, "{row}").expect("Failed to write");
        }
        temp_file.flush().expect("Failed to flush");
        temp_file
    }

    #[test]
    fn test_file_evaluation_matches_values_by_name() {
        // sunny=0, rainy=1 when training; overcast=0, sunny=1, rainy=2 in the test file
        let train = write_csv(&["outlook,play", "sunny,no", "rainy,yes"]);
        let test = write_csv(&["outlook,play", "overcast,yes", "sunny,no", "rainy,yes"]);

        let model = quick::train_file(train.path(), 0.5, 0.9).unwrap();
        assert_eq!(model.schema().attributes().len(), 1);
        let matrix = model.evaluate_from_file(test.path()).unwrap();
        assert_eq!(matrix.total(), 3);
        assert_eq!(matrix.correct(), 2);
        assert_eq!(matrix.count(3, NO_PREDICTION), 1);

        let config = MinerConfig {
            min_support: 0.5,
            min_confidence: 0.9,
            ..MinerConfig::default()
        };
        let split = quick::evaluate_split(train.path(), test.path(), config).unwrap();
        assert_eq!(split, matrix);
    }

    #[test]
    fn test_file_evaluation_rejects_unknown_class() {
        let train = write_csv(&["outlook,play", "sunny,no", "rainy,yes"]);
        let test = write_csv(&["outlook,play", "sunny,maybe"]);

        let model = quick::train_file(train.path(), 0.5, 0.9).unwrap();
        assert!(matches!(
            model.evaluate_from_file(test.path()),
            Err(CarError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_bare_training_keeps_file_codes() {
        let model = RuleLearner::new()
            .with_min_support(0.6)
            .with_min_confidence(0.99)
            .train(&fixture())
            .unwrap();
        assert!(model.schema().class_attribute().is_none());
        let dataset = model.align(fixture()).unwrap();
        assert_eq!(dataset.instance(0).items(), &[1, 3]);
    }
}
