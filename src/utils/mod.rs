//! Utility functions for rule mining workflows

use crate::core::Dataset;

/// Fail-fast checks for caller-supplied configuration
pub mod validation {
    use crate::core::{CarError, Result};
    use crate::miner::MinerConfig;

    /// Check that a threshold lies in [0, 1]
    pub fn validate_threshold(name: &str, value: f64) -> Result<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(CarError::InvalidParameter(format!(
                "{name} must be between 0 and 1, got: {value}"
            )))
        }
    }

    /// Check every field of a miner configuration
    pub fn validate_config(config: &MinerConfig) -> Result<()> {
        validate_threshold("Minimum support", config.min_support)?;
        validate_threshold("Minimum confidence", config.min_confidence)?;
        if config.max_antecedent_size == Some(0) {
            return Err(CarError::InvalidParameter(
                "Maximum antecedent size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check a cross-validation fold count against the dataset size
    pub fn validate_folds(folds: usize, n_instances: usize) -> Result<()> {
        if folds < 2 || folds > n_instances {
            return Err(CarError::InvalidParameter(format!(
                "Fold count must be between 2 and {n_instances}, got: {folds}"
            )));
        }
        Ok(())
    }
}

/// Statistical utilities for datasets
pub mod stats {
    use super::*;
    use crate::core::ItemCode;
    use std::collections::BTreeMap;

    /// Number of instances containing each item code
    pub fn item_frequency<D: Dataset + ?Sized>(dataset: &D) -> BTreeMap<ItemCode, usize> {
        let mut frequency = BTreeMap::new();
        for instance in dataset.instances() {
            for &item in instance.items() {
                *frequency.entry(item).or_insert(0) += 1;
            }
        }
        frequency
    }

    /// The `n` most frequent items, most frequent first (ties by smaller code)
    pub fn top_items<D: Dataset + ?Sized>(dataset: &D, n: usize) -> Vec<(ItemCode, usize)> {
        let mut items: Vec<_> = item_frequency(dataset).into_iter().collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        items.truncate(n);
        items
    }

    /// Basic shape of a dataset
    pub fn summarize<D: Dataset + ?Sized>(dataset: &D) -> DatasetSummary {
        let frequency = dataset.frequency_by_class();
        let lengths: Vec<usize> = dataset.instances().map(|i| i.items().len()).collect();

        let majority_share = frequency
            .values()
            .max()
            .map_or(0.0, |&n| n as f64 / dataset.len() as f64);
        let mean_items = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };

        DatasetSummary {
            n_instances: dataset.len(),
            n_classes: frequency.len(),
            n_items: item_frequency(dataset).len(),
            mean_items,
            majority_share,
        }
    }
}

/// Shape of a dataset as reported by [`stats::summarize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSummary {
    pub n_instances: usize,
    pub n_classes: usize,
    /// Distinct item codes observed
    pub n_items: usize,
    /// Mean number of items per instance
    pub mean_items: f64,
    /// Share of the most frequent class (the majority baseline accuracy)
    pub majority_share: f64,
}
