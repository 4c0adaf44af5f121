//! Class association rule mining and rule-based classification
//!
//! Frequent itemsets are mined level-wise from nominal data, turned into
//! class association rules, and assembled into a classifier whose
//! predictions are scored with a multi-class confusion matrix.

pub mod api;
pub mod classifier;
pub mod core;
pub mod data;
pub mod itemset;
pub mod metrics;
pub mod miner;
pub mod report;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{Learner, Model, ModelInfo, RuleLearner, TrainedModel};
pub use crate::classifier::{BaselineClassifier, BaselinePolicy, RuleClassifier};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{CarError, Result};
pub use crate::data::{DataFormat, NominalDataset, Schema};
pub use crate::metrics::ConfusionMatrix;
pub use crate::miner::{mine, AprioriMiner, MinerConfig, SupportBasis};
pub use crate::report::{EvaluationReport, RuleReport};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
