//! RCAR Command Line Interface
//!
//! A command-line interface for mining class association rules, evaluating
//! rule classifiers, and predicting with ARFF and CSV data formats.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rcar::api::{evaluate_with, predict_all, quick, Learner, RuleLearner};
use rcar::core::{Dataset, Result};
use rcar::data::{DataFormat, NominalDataset};
use rcar::miner::{AprioriMiner, MinerConfig, SupportBasis};
use rcar::report::{EvaluationReport, RuleReport, RunParameters};
use rcar::utils::{stats, validation};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rcar")]
#[command(about = "Class association rule mining and rule-based classification")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine class association rules from a dataset
    Mine(MineArgs),
    /// Train on one file and evaluate on another
    Evaluate(EvaluateArgs),
    /// k-fold cross-validation on a single dataset
    Cv(CvArgs),
    /// Predict the class of every instance in a file
    Predict(PredictArgs),
    /// Display dataset statistics
    Describe(DescribeArgs),
}

/// Mining thresholds shared by every training subcommand
#[derive(Args, Clone, Debug)]
struct MiningArgs {
    /// Minimum support fraction (0.0-1.0)
    #[arg(short = 's', long, default_value = "0.1")]
    min_support: f64,

    /// Minimum confidence (0.0-1.0)
    #[arg(short = 'c', long, default_value = "0.5")]
    min_confidence: f64,

    /// What support fractions are measured against
    #[arg(long, default_value = "class")]
    basis: CliSupportBasis,

    /// Maximum number of items in a rule antecedent
    #[arg(long)]
    max_size: Option<usize>,
}

impl MiningArgs {
    fn config(&self) -> MinerConfig {
        MinerConfig {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            support_basis: self.basis.into(),
            max_antecedent_size: self.max_size,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliSupportBasis {
    /// Support within the rule's class (count(I and c) / count(c))
    #[value(name = "class")]
    Class,
    /// Support over the whole dataset (count(I) / size)
    #[value(name = "dataset")]
    Dataset,
}

impl From<CliSupportBasis> for SupportBasis {
    fn from(cli_basis: CliSupportBasis) -> Self {
        match cli_basis {
            CliSupportBasis::Class => SupportBasis::Class,
            CliSupportBasis::Dataset => SupportBasis::Dataset,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliBaseline {
    /// Always predict the most frequent training class
    #[value(name = "majority")]
    Majority,
    /// Always predict the least frequent training class
    #[value(name = "minority")]
    Minority,
}

#[derive(Args)]
struct MineArgs {
    /// Data file (ARFF or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, arff, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    #[command(flatten)]
    mining: MiningArgs,

    /// Output JSON report file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Test data file
    #[arg(long)]
    test: PathBuf,

    /// Data format: auto, arff, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    #[command(flatten)]
    mining: MiningArgs,

    /// Evaluate a baseline classifier instead of mined rules
    #[arg(long)]
    baseline: Option<CliBaseline>,

    /// Output JSON report file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct CvArgs {
    /// Data file
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, arff, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Number of folds
    #[arg(short = 'k', long, default_value = "10")]
    folds: usize,

    #[command(flatten)]
    mining: MiningArgs,

    /// Cross-validate a baseline classifier instead of mined rules
    #[arg(long)]
    baseline: Option<CliBaseline>,

    /// Output JSON report file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PredictArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Input data file (same attributes as the training file)
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, arff, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    #[command(flatten)]
    mining: MiningArgs,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct DescribeArgs {
    /// Data file
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, arff, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Number of most frequent items to list
    #[arg(long, default_value = "10")]
    top: usize,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Mine(args) => mine_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Cv(args) => cv_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Describe(args) => describe_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_dataset(path: &Path, format: &str) -> Result<NominalDataset> {
    let format = DataFormat::from_name(format, path)?;
    info!("Loading {path:?} as {format:?}");

    let dataset = NominalDataset::from_file(path, format)?;
    info!(
        "Loaded {} instances with {} attributes and {} classes",
        dataset.len(),
        dataset.schema().attributes().len(),
        dataset.number_of_classes()
    );
    Ok(dataset)
}

fn build_learner(mining: &MiningArgs, baseline: Option<CliBaseline>) -> (Learner, RunParameters) {
    match baseline {
        Some(CliBaseline::Majority) => (Learner::Majority, RunParameters::baseline("majority")),
        Some(CliBaseline::Minority) => (Learner::Minority, RunParameters::baseline("minority")),
        None => {
            let config = mining.config();
            let parameters = RunParameters::rules(&config);
            (Learner::Rules(RuleLearner::with_config(config)), parameters)
        }
    }
}

fn mine_command(args: MineArgs) -> Result<()> {
    let config = args.mining.config();
    validation::validate_config(&config)?;

    let dataset = load_dataset(&args.data, &args.format)?;
    info!(
        "Mining with min_support={}, min_confidence={}, basis={:?}",
        config.min_support, config.min_confidence, config.support_basis
    );

    let outcome = AprioriMiner::new(config.clone()).mine_detailed(&dataset);
    let report = RuleReport::new(
        dataset.schema(),
        dataset.len(),
        &config,
        &outcome.rules,
        &outcome.levels,
    );

    println!("=== Mined Rules ===");
    report.print_summary();

    if let Some(output_path) = args.output {
        report.save_to_file(&output_path)?;
        info!("Report saved to: {output_path:?}");
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let train = load_dataset(&args.train, &args.format)?;
    let test = load_dataset(&args.test, &args.format)?.align_to(train.schema())?;

    let (learner, parameters) = build_learner(&args.mining, args.baseline);
    let model = learner.train(&train)?;
    let matrix = evaluate_with(&model, &test);

    let report = EvaluationReport::new(train.schema(), &matrix, parameters);

    println!("=== Evaluation ===");
    println!("Training file: {:?}", args.train);
    println!("Test file: {:?}", args.test);
    report.print_summary();
    println!("\nConfusion matrix (class codes, ? = no prediction):");
    print!("{matrix}");

    if let Some(output_path) = args.output {
        report.save_to_file(&output_path)?;
        info!("Report saved to: {output_path:?}");
    }

    Ok(())
}

fn cv_command(args: CvArgs) -> Result<()> {
    let dataset = load_dataset(&args.data, &args.format)?;
    info!("Cross-validation on {:?} with {} folds", args.data, args.folds);

    let (learner, parameters) = build_learner(&args.mining, args.baseline);
    let matrix = quick::cross_validate(&dataset, args.folds, &learner)?;

    let report = EvaluationReport::new(dataset.schema(), &matrix, parameters.with_folds(args.folds));

    println!("=== Cross-Validation Results ===");
    println!("Data file: {:?}", args.data);
    report.print_summary();
    println!("\nConfusion matrix (class codes, ? = no prediction):");
    print!("{matrix}");

    if let Some(output_path) = args.output {
        report.save_to_file(&output_path)?;
        info!("Report saved to: {output_path:?}");
    }

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let train = load_dataset(&args.train, &args.format)?;
    let data = load_dataset(&args.data, &args.format)?.align_to(train.schema())?;

    let model = RuleLearner::with_config(args.mining.config()).train_nominal(&train)?;
    info!("Making predictions using {} rules", model.classifier().len());

    let predictions = predict_all(model.classifier(), &data);
    let schema = train.schema();

    // Output results
    if let Some(output_path) = args.output {
        let file = File::create(&output_path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# Predictions for {} instances", predictions.len())?;
        writeln!(writer, "# Format: instance_index predicted_class")?;
        for (i, &class) in predictions.iter().enumerate() {
            writeln!(writer, "{} {}", i, schema.class_name(class))?;
        }
        writer.flush()?;

        info!("Predictions saved to: {output_path:?}");
    } else {
        println!("# Predictions for {} instances", predictions.len());
        println!("# Format: instance_index predicted_class");
        for (i, &class) in predictions.iter().enumerate() {
            println!("{} {}", i, schema.class_name(class));
        }
    }

    Ok(())
}

fn describe_command(args: DescribeArgs) -> Result<()> {
    let dataset = load_dataset(&args.data, &args.format)?;
    let schema = dataset.schema();
    let summary = stats::summarize(&dataset);

    println!("=== Dataset ===");
    println!("Relation: {}", schema.relation());
    println!("Instances: {}", summary.n_instances);
    println!("Attributes: {}", schema.attributes().len());
    println!("Distinct items: {}", summary.n_items);
    println!("Mean items per instance: {:.2}", summary.mean_items);

    println!("\nClasses:");
    for (class, count) in dataset.frequency_by_class() {
        println!(
            "  {:<16} {:>6} ({:.1}%)",
            schema.class_name(class),
            count,
            count as f64 / summary.n_instances as f64 * 100.0
        );
    }
    println!("Majority baseline accuracy: {:.2}%", summary.majority_share * 100.0);

    println!("\nMost frequent items:");
    for (item, count) in stats::top_items(&dataset, args.top) {
        println!("  {:<24} {:>6}", schema.describe_item(item), count);
    }

    Ok(())
}
