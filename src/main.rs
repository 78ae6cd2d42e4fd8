use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

mod classifier;
mod config;
mod encoder;
mod error;
mod loader;
mod metrics;
mod models;
mod pipeline;
mod report;
mod risk;
mod scaler;
mod split;

use crate::classifier::SolverConfig;
use crate::config::{PipelineConfig, DEFAULT_CSV_PATH, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use crate::error::PipelineError;
use crate::models::Respondent;

#[derive(Parser)]
#[command(name = "student-mental-health-risk")]
#[command(about = "Mental health risk classifier for student survey data", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train, evaluate and score the sample respondent (default)
    Run {
        #[command(flatten)]
        args: PipelineArgs,
        /// Also write the evaluation summary as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        args: PipelineArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Train, then score one respondent given as raw survey answers
    Predict {
        #[command(flatten)]
        args: PipelineArgs,
        #[command(flatten)]
        answers: AnswerArgs,
    },
}

#[derive(Args, Clone)]
struct PipelineArgs {
    /// Survey CSV file
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    test_size: f64,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,
    /// Inverse regularization strength
    #[arg(long, default_value_t = 1.0)]
    c: f64,
}

impl Default for PipelineArgs {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            csv: defaults.csv_path,
            test_size: defaults.test_fraction,
            seed: defaults.seed,
            max_iter: defaults.solver.max_iter,
            tolerance: defaults.solver.tolerance,
            c: defaults.solver.c,
        }
    }
}

impl From<PipelineArgs> for PipelineConfig {
    fn from(args: PipelineArgs) -> Self {
        PipelineConfig {
            csv_path: args.csv,
            test_fraction: args.test_size,
            seed: args.seed,
            solver: SolverConfig {
                max_iter: args.max_iter,
                tolerance: args.tolerance,
                c: args.c,
            },
        }
    }
}

#[derive(Args, Clone)]
struct AnswerArgs {
    #[arg(long, default_value = "Female")]
    gender: String,
    #[arg(long, default_value_t = 21.0)]
    age: f64,
    #[arg(long, default_value = "year 2")]
    year: String,
    /// CGPA bracket exactly as written in the survey, e.g. "3.00 - 3.49"
    #[arg(long, default_value = "3.00 - 3.49")]
    cgpa: String,
    #[arg(long, default_value = "No")]
    marital: String,
    #[arg(long, default_value = "Yes")]
    anxiety: String,
    #[arg(long, default_value = "No")]
    panic: String,
    #[arg(long, default_value = "No")]
    treatment: String,
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run {
        args: PipelineArgs::default(),
        json_out: None,
    });

    match command {
        Commands::Run { args, json_out } => {
            let config = PipelineConfig::from(args);
            let run = pipeline::train(&config)?;
            let summary = pipeline::evaluate(&run, &config)?;

            print!("{}", report::console_output(&summary));

            if let Some(path) = json_out {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Evaluation summary written to {}", path.display());
            }
        }
        Commands::Report { args, out } => {
            let config = PipelineConfig::from(args);
            let run = pipeline::train(&config)?;
            let summary = pipeline::evaluate(&run, &config)?;

            std::fs::write(&out, report::build_report(&summary))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Predict { args, answers } => {
            let config = PipelineConfig::from(args);
            let cgpa = risk::cgpa_midpoint(&answers.cgpa)
                .ok_or_else(|| PipelineError::UnmappedCgpa(answers.cgpa.clone()))?;
            let run = pipeline::train(&config)?;

            let respondent = Respondent {
                gender: &answers.gender,
                age: answers.age,
                year_of_study: &answers.year,
                cgpa,
                marital_status: &answers.marital,
                anxiety: &answers.anxiety,
                panic_attack: &answers.panic,
                sought_treatment: &answers.treatment,
            };
            let prediction = run
                .fitted
                .predict_respondent(&respondent)
                .context("failed to score respondent")?;

            println!("Predicted Risk Level: {}", prediction.risk_label);
            println!("Risk Probability Score: {:.2}", prediction.probability);
            println!("Recommendation: {}", prediction.recommendation);
        }
    }

    Ok(())
}
