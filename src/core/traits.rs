//! Core traits for rule mining and classification

use crate::core::{ClassCode, Instance};
use std::collections::BTreeMap;

/// Dataset abstraction consumed by the miner and the evaluators
pub trait Dataset: Send + Sync {
    /// Number of instances in the dataset
    fn len(&self) -> usize;

    /// Get a single instance by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn instance(&self, i: usize) -> &Instance;

    /// Number of instances per class code, ascending by code
    fn frequency_by_class(&self) -> BTreeMap<ClassCode, usize> {
        let mut frequency = BTreeMap::new();
        for i in 0..self.len() {
            *frequency.entry(self.instance(i).class()).or_insert(0) += 1;
        }
        frequency
    }

    /// Number of distinct classes present in the dataset
    fn number_of_classes(&self) -> usize {
        self.frequency_by_class().len()
    }

    /// Iterate over all instances in order
    fn instances(&self) -> Box<dyn Iterator<Item = &Instance> + '_> {
        Box::new((0..self.len()).map(move |i| self.instance(i)))
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that maps an instance to a class code
pub trait Classifier: Send + Sync {
    /// Predict the class of a single instance, or [`crate::NO_PREDICTION`]
    fn predict(&self, instance: &Instance) -> ClassCode;

    /// Predict multiple instances
    fn predict_batch(&self, instances: &[Instance]) -> Vec<ClassCode> {
        instances.iter().map(|i| self.predict(i)).collect()
    }
}
