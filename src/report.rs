//! JSON and text reports for mined rules and evaluations
//!
//! Reports are snapshots for people and downstream tooling. They are written,
//! never read back: a model is cheap to re-mine from its training data.

use crate::core::{CarError, ClassCode, ItemCode, Result, Rule};
use crate::data::Schema;
use crate::metrics::ConfusionMatrix;
use crate::miner::{LevelStats, MinerConfig, SupportBasis};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Provenance attached to every report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Library version used to create the report
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Parameters the reported run used
    pub parameters: RunParameters,
}

impl ReportMetadata {
    pub fn new(parameters: RunParameters) -> Self {
        Self {
            library_version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            parameters,
        }
    }
}

/// How the reported model was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunParameters {
    /// `rules`, `majority` or `minority`
    pub learner: String,
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub support_basis: Option<String>,
    pub max_antecedent_size: Option<usize>,
    /// Fold count for cross-validated evaluations
    pub folds: Option<usize>,
}

impl RunParameters {
    /// Parameters of a rule-mining run
    pub fn rules(config: &MinerConfig) -> Self {
        let basis = match config.support_basis {
            SupportBasis::Class => "class",
            SupportBasis::Dataset => "dataset",
        };
        Self {
            learner: "rules".to_string(),
            min_support: Some(config.min_support),
            min_confidence: Some(config.min_confidence),
            support_basis: Some(basis.to_string()),
            max_antecedent_size: config.max_antecedent_size,
            folds: None,
        }
    }

    /// Parameters of a baseline run (`majority` or `minority`)
    pub fn baseline(name: &str) -> Self {
        Self {
            learner: name.to_string(),
            min_support: None,
            min_confidence: None,
            support_basis: None,
            max_antecedent_size: None,
            folds: None,
        }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = Some(folds);
        self
    }
}

/// One mined rule, by code and by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEntry {
    pub antecedent: Vec<ItemCode>,
    pub consequent: ClassCode,
    /// `{name=value, ...}`
    pub antecedent_text: String,
    pub consequent_text: String,
    pub support_antecedent: usize,
    pub support_rule: usize,
    pub support_klass: usize,
    pub confidence: f64,
}

/// Rules mined from one dataset
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub metadata: ReportMetadata,
    pub relation: String,
    pub n_instances: usize,
    pub levels: Vec<LevelStats>,
    pub rules: Vec<RuleEntry>,
}

impl RuleReport {
    /// Build a report, rendering codes through `schema`
    pub fn new(
        schema: &Schema,
        n_instances: usize,
        config: &MinerConfig,
        rules: &[Rule],
        levels: &[LevelStats],
    ) -> Self {
        let rules = rules
            .iter()
            .map(|rule| RuleEntry {
                antecedent: rule.antecedent().to_vec(),
                consequent: rule.consequent(),
                antecedent_text: schema.describe_itemset(rule.antecedent()),
                consequent_text: schema.class_name(rule.consequent()),
                support_antecedent: rule.support_antecedent(),
                support_rule: rule.support_rule(),
                support_klass: rule.support_klass(),
                confidence: rule.confidence(),
            })
            .collect();

        Self {
            metadata: ReportMetadata::new(RunParameters::rules(config)),
            relation: schema.relation().to_string(),
            n_instances,
            levels: levels.to_vec(),
            rules,
        }
    }

    /// Save report to file as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path)
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!("Relation: {}", self.relation);
        println!("Instances: {}", self.n_instances);
        for level in &self.levels {
            println!(
                "  level {}: {} candidates, {} frequent",
                level.level, level.candidates, level.frequent
            );
        }
        println!("Rules: {}", self.rules.len());
        for entry in &self.rules {
            println!(
                "  {} => {}  (conf {:.4}, support {}/{})",
                entry.antecedent_text,
                entry.consequent_text,
                entry.confidence,
                entry.support_rule,
                entry.support_klass
            );
        }
    }
}

/// Precision, recall and F-measure for one real class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: ClassCode,
    pub name: String,
    pub instances: usize,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

/// One non-zero confusion matrix cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub real: String,
    pub predicted: String,
    pub count: usize,
}

/// Metrics of one evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub metadata: ReportMetadata,
    pub relation: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_recall: f64,
    pub average_precision: f64,
    pub micro_f: f64,
    pub macro_f: f64,
    pub kappa: f64,
    pub classes: Vec<ClassMetrics>,
    pub matrix: Vec<MatrixCell>,
}

impl EvaluationReport {
    /// Build a report from a filled confusion matrix
    pub fn new(schema: &Schema, matrix: &ConfusionMatrix, parameters: RunParameters) -> Self {
        let classes = matrix
            .real_classes()
            .iter()
            .map(|&class| ClassMetrics {
                class,
                name: schema.class_name(class),
                instances: matrix.row_sum(class),
                precision: matrix.precision(class),
                recall: matrix.recall(class),
                f_measure: matrix.f_measure(class),
            })
            .collect();

        let mut cells = Vec::new();
        for &real in matrix.real_classes() {
            for &predicted in matrix.predicted_classes() {
                let count = matrix.count(real, predicted);
                if count > 0 {
                    cells.push(MatrixCell {
                        real: schema.class_name(real),
                        predicted: schema.class_name(predicted),
                        count,
                    });
                }
            }
        }

        Self {
            metadata: ReportMetadata::new(parameters),
            relation: schema.relation().to_string(),
            total: matrix.total(),
            correct: matrix.correct(),
            accuracy: matrix.accuracy(),
            average_recall: matrix.average_recall(),
            average_precision: matrix.average_precision(),
            micro_f: matrix.micro_f(),
            macro_f: matrix.macro_f(),
            kappa: matrix.kappa(),
            classes,
            matrix: cells,
        }
    }

    /// Save report to file as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path)
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!("Relation: {}", self.relation);
        println!("Learner: {}", self.metadata.parameters.learner);
        if let Some(folds) = self.metadata.parameters.folds {
            println!("Folds: {folds}");
        }
        println!(
            "Accuracy: {:.2}% ({}/{})",
            self.accuracy * 100.0,
            self.correct,
            self.total
        );
        println!("Average recall: {:.4}", self.average_recall);
        println!("Average precision: {:.4}", self.average_precision);
        println!("Micro F: {:.4}", self.micro_f);
        println!("Macro F: {:.4}", self.macro_f);
        println!("Kappa: {:.4}", self.kappa);
        for class in &self.classes {
            println!(
                "  {:<16} n={:<6} P={:.4} R={:.4} F={:.4}",
                class.name, class.instances, class.precision, class.recall, class.f_measure
            );
        }
    }
}

fn write_json<T: Serialize, P: AsRef<Path>>(report: &T, path: P) -> Result<()> {
    let file = File::create(path).map_err(CarError::IoError)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| CarError::SerializationError(e.to_string()))?;
    writer.flush().map_err(CarError::IoError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NO_PREDICTION;
    use tempfile::NamedTempFile;

    fn schema() -> Schema {
        Schema::new(
            "toy",
            vec![
                ("a".to_string(), vec!["x".to_string(), "y".to_string()]),
                ("class".to_string(), vec!["p".to_string(), "q".to_string()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rule_report_renders_names() {
        let rules = vec![Rule::new(vec![0], 2, 3, 3, 4)];
        let levels = vec![LevelStats {
            level: 1,
            candidates: 2,
            frequent: 1,
        }];
        let report = RuleReport::new(&schema(), 6, &MinerConfig::default(), &rules, &levels);

        assert_eq!(report.relation, "toy");
        assert_eq!(report.rules[0].antecedent_text, "{a=x}");
        assert_eq!(report.rules[0].consequent_text, "p");
        assert_eq!(report.rules[0].confidence, 1.0);
        assert_eq!(report.levels, levels);
        assert_eq!(report.metadata.parameters.support_basis.as_deref(), Some("class"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["levels"][0],
            serde_json::json!({"level": 1, "candidates": 2, "frequent": 1})
        );
    }

    #[test]
    fn test_evaluation_report_cells() {
        let mut matrix = ConfusionMatrix::new();
        matrix.add(2, 2);
        matrix.add(2, 2);
        matrix.add(3, NO_PREDICTION);

        let report = EvaluationReport::new(
            &schema(),
            &matrix,
            RunParameters::baseline("majority").with_folds(3),
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.correct, 2);
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.matrix.len(), 2);
        assert_eq!(report.matrix[1].predicted, "?");
        assert_eq!(report.metadata.parameters.folds, Some(3));
        assert_eq!(report.metadata.parameters.min_support, None);
    }

    #[test]
    fn test_save_to_file() {
        let rules = vec![Rule::new(vec![1], 3, 2, 2, 2)];
        let report = RuleReport::new(&schema(), 4, &MinerConfig::default(), &rules, &[]);

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        report.save_to_file(temp_file.path()).expect("Failed to save report");

        let text = std::fs::read_to_string(temp_file.path()).expect("Failed to read report");
        let json: serde_json::Value = serde_json::from_str(&text).expect("Invalid JSON");
        assert_eq!(json["rules"][0]["antecedent_text"], "{a=y}");
        assert_eq!(json["rules"][0]["consequent_text"], "q");
        assert_eq!(json["metadata"]["library_version"], crate::VERSION);
        assert!(chrono::DateTime::parse_from_rfc3339(
            json["metadata"]["created_at"].as_str().unwrap()
        )
        .is_ok());
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let report = RuleReport::new(&schema(), 0, &MinerConfig::default(), &[], &[]);
        let result = report.save_to_file("/non/existent/dir/report.json");
        assert!(matches!(result, Err(CarError::IoError(_))));
    }
}
