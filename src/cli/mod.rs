//! Titanic search CLI
//!
//! `titanic train` runs the combinatorial search, `titanic retrain` rebuilds the
//! models of an exported recipe file. Both can rank the population and write one
//! submission file per model.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::{DataReader, PassengerReader, SubmissionWriter};
use crate::learners::ModelKind;
use crate::search::{
    export_recipes, import_recipes, write_ranking, ModelPopulation, Orchestrator, RankMetric,
    SearchConfig,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_warn(msg: &str) {
    println!("  {} {}", "!".yellow(), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "titanic")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Combinatorial model search over the Kaggle Titanic dataset")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every feature combination and transform
    Train(TrainArgs),

    /// Retrain the models of an exported recipe file
    Retrain(RetrainArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Training CSV (with a Survived column)
    #[arg(long)]
    pub train: PathBuf,

    /// Test CSV; one submission per model is written when given
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// JSON search configuration; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model families (linreg, logreg, svm)
    #[arg(short, long, value_delimiter = ',')]
    pub models: Option<Vec<ModelKind>>,

    /// Combination sizes for the plain phase
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<usize>>,

    /// Transform dimensions (2, 3, 4)
    #[arg(long, value_delimiter = ',')]
    pub transform_dims: Option<Vec<usize>>,

    /// Train the hand-picked feature sets
    #[arg(long, conflicts_with = "no_specific")]
    pub specific: bool,

    /// Skip the hand-picked feature sets
    #[arg(long)]
    pub no_specific: bool,

    /// Run the weight-decay sweep
    #[arg(long)]
    pub regularize: bool,

    /// Lowest regularization exponent (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub k_min: Option<i32>,

    /// Highest regularization exponent (exclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub k_max: Option<i32>,

    /// Train one SVM per batch size 1..=N
    #[arg(long)]
    pub svm_batches: Option<usize>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub cv_folds: Option<usize>,

    /// Keep only the best N models by Ein
    #[arg(long)]
    pub top: Option<usize>,

    /// Output directory for rankings and submissions
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Export the recipes of the final population to this JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write the in-sample error ranking
    #[arg(long)]
    pub rank_ein: bool,

    /// Write the cross-validation error ranking
    #[arg(long)]
    pub rank_ecv: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Stop starting new models after this many seconds
    #[arg(long)]
    pub time_budget: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct RetrainArgs {
    /// Recipe JSON written by `train --export`
    #[arg(short, long)]
    pub recipes: PathBuf,

    /// Training CSV (with a Survived column)
    #[arg(long)]
    pub train: PathBuf,

    /// Test CSV; one submission per model is written when given
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// JSON search configuration of the original run; learner settings are taken from it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub cv_folds: Option<usize>,

    /// Output directory for rankings and submissions
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Write the in-sample error ranking
    #[arg(long)]
    pub rank_ein: bool,

    /// Write the cross-validation error ranking
    #[arg(long)]
    pub rank_ecv: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SearchConfig> {
    match path {
        Some(path) => Ok(SearchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?),
        None => Ok(SearchConfig::default()),
    }
}

/// Merge the optional config file with the command-line flags.
pub fn build_config(args: &TrainArgs) -> anyhow::Result<SearchConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(models) = &args.models {
        config.models = models.clone();
    }
    if let Some(sizes) = &args.sizes {
        config.combination_sizes = sizes.clone();
    }
    if let Some(dims) = &args.transform_dims {
        config.transform_dimensions = dims.clone();
    }
    if args.specific {
        config.specific = true;
    }
    if args.no_specific {
        config.specific = false;
    }
    if args.regularize {
        config.regularize = true;
    }
    if let Some(k_min) = args.k_min {
        config.k_range.0 = k_min;
    }
    if let Some(k_max) = args.k_max {
        config.k_range.1 = k_max;
    }
    if args.svm_batches.is_some() {
        config.svm_batch_sweep = args.svm_batches;
    }
    if let Some(folds) = args.cv_folds {
        config.learner.cv_folds = folds;
    }
    if args.top.is_some() {
        config.top_n = args.top;
    }
    if args.jobs.is_some() {
        config.n_jobs = args.jobs;
    }
    if args.time_budget.is_some() {
        config.time_budget_secs = args.time_budget;
    }
    config.rank_ein |= args.rank_ein;
    config.rank_ecv |= args.rank_ecv;

    config.validate()?;
    Ok(config)
}

/// Settings for retraining: the original run's config file, if any, with the
/// retrain flags on top. Every imported recipe is kept, so `top_n` is cleared.
pub fn retrain_config(args: &RetrainArgs) -> anyhow::Result<SearchConfig> {
    let mut config = load_config(args.config.as_deref())?;
    config.top_n = None;
    if let Some(folds) = args.cv_folds {
        config.learner.cv_folds = folds;
    }
    if args.jobs.is_some() {
        config.n_jobs = args.jobs;
    }
    config.rank_ein |= args.rank_ein;
    config.rank_ecv |= args.rank_ecv;

    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(args: &TrainArgs) -> anyhow::Result<()> {
    section("Train");

    let config = build_config(args)?;
    let train = load_train(&args.train)?;

    let models: Vec<&str> = config.models.iter().map(|m| m.as_str()).collect();
    println!(
        "  {:<16} {}",
        muted("Models"),
        models.join(", ").white()
    );
    println!(
        "  {:<16} {:?}  {} {:?}",
        muted("Sizes"),
        config.combination_sizes,
        muted("transforms"),
        config.transform_dimensions
    );

    let orchestrator = Orchestrator::new(config)?;

    step_run("Searching");
    let start = Instant::now();
    let population = orchestrator.run(&train)?;
    step_done(&format!("{} models in {:.2?}", population.len(), start.elapsed()));

    let config = orchestrator.config();
    let outputs = Outputs {
        dir: &args.output,
        test: args.test.as_deref(),
        export: args.export.as_deref(),
        rank_ein: config.rank_ein,
        rank_ecv: config.rank_ecv,
    };
    outputs.write(&orchestrator, population)
}

pub fn cmd_retrain(args: &RetrainArgs) -> anyhow::Result<()> {
    section("Retrain");

    step_run(&format!("Loading recipes from {}", args.recipes.display()));
    let recipes = import_recipes(&args.recipes)?;
    step_done(&format!("{} recipes", recipes.len()));

    let config = retrain_config(args)?;
    let train = load_train(&args.train)?;
    let orchestrator = Orchestrator::new(config)?;

    step_run("Training");
    let start = Instant::now();
    let population = orchestrator.retrain(&recipes, &train)?;
    step_done(&format!("{} models in {:.2?}", population.len(), start.elapsed()));
    if population.len() < recipes.len() {
        step_warn(&format!("{} recipes failed to train", recipes.len() - population.len()));
    }

    let outputs = Outputs {
        dir: &args.output,
        test: args.test.as_deref(),
        export: None,
        rank_ein: orchestrator.config().rank_ein,
        rank_ecv: orchestrator.config().rank_ecv,
    };
    outputs.write(&orchestrator, population)
}

fn load_train(path: &Path) -> anyhow::Result<crate::data::DataMatrix> {
    step_run("Loading training data");
    let start = Instant::now();
    let train = PassengerReader::train(path)
        .read()
        .with_context(|| format!("reading {}", path.display()))?;
    step_done(&format!(
        "{} passengers × {} features in {:.2?}",
        train.nrows(),
        train.features().len(),
        start.elapsed()
    ));
    Ok(train)
}

/// Everything written after the population is trained.
struct Outputs<'a> {
    dir: &'a Path,
    test: Option<&'a Path>,
    export: Option<&'a Path>,
    rank_ein: bool,
    rank_ecv: bool,
}

impl Outputs<'_> {
    fn write(&self, orchestrator: &Orchestrator, mut population: ModelPopulation) -> anyhow::Result<()> {
        print_leaders(&mut population, 5);

        if self.rank_ein || self.rank_ecv {
            std::fs::create_dir_all(self.dir)?;
        }
        for (enabled, metric) in [(self.rank_ein, RankMetric::Ein), (self.rank_ecv, RankMetric::Ecv)] {
            if !enabled {
                continue;
            }
            let path = self.dir.join(metric.file_name());
            step_run(&format!("Ranking by {}", metric.label()));
            let start = Instant::now();
            write_ranking(&mut population, &path, metric)?;
            step_done(&format!("{} in {:.2?}", path.display(), start.elapsed()));
        }

        if let Some(path) = self.export {
            export_recipes(&population, path)?;
            step_ok(&format!("Recipes → {}", path.display()));
        }

        if let Some(test_path) = self.test {
            step_run("Loading test data");
            let test = PassengerReader::test(test_path)
                .read()
                .with_context(|| format!("reading {}", test_path.display()))?;
            step_done(&format!("{} passengers", test.nrows()));

            let writer = SubmissionWriter::new(self.dir)?;
            step_run("Writing submissions");
            let report = orchestrator.test(&population, &test, &writer);
            step_done(&format!("{} files in {}", report.written.len(), writer.dir().display()));
            for (name, reason) in &report.failed {
                step_warn(&format!("{}: {}", name, reason));
            }
        }

        println!();
        Ok(())
    }
}

fn print_leaders(population: &mut ModelPopulation, n: usize) {
    population.sort_by_ein();

    println!();
    println!("  {:<6} {:>10}  {}", muted("rank"), muted("Ein"), muted("model"));
    println!("  {}", dim(&"─".repeat(56)));
    for (rank, model) in population.top_n(n).iter().enumerate() {
        println!("  {:<6} {:>10.6}  {}", rank, model.ein(), model.name().white());
    }
    println!("  {}", dim(&"─".repeat(56)));

    if let Some(best) = population.get(0) {
        println!();
        println!("  {} {} {} {:.6}", ok("best"), best.name().white().bold(), muted("Ein:"), best.ein());
    }
}
