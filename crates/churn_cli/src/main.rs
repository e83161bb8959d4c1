//! Customer churn early warning command line interface
//!
//! Loads the model artifact once, then scores customers from flags, a
//! JSON file, a JSON-lines batch or the built-in sample presets.

use anyhow::{Context, Result};
use churn_core::config::LoggingConfig;
use churn_core::customer::limits;
use churn_core::{
    initialize, render_text, sample_scenarios, Assessment, ChurnConfig, CustomerRecord, Gender,
    Geography, InferenceFailure, MissingFeaturePolicy, RiskClassifierAdapter, StartupFailure,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const EXIT_INFERENCE: u8 = 1;
const EXIT_STARTUP: u8 = 2;

const MISMATCH_HINT: &str = "Please check that all features match your trained model.";

#[derive(Parser)]
#[command(name = "churn-cli")]
#[command(about = "Customer churn early warning", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model artifact, overrides configuration
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Trained feature list, overrides configuration
    #[arg(long, value_name = "PATH")]
    features: Option<PathBuf>,

    /// Missing trained feature handling, overrides configuration
    #[arg(long, value_name = "POLICY")]
    missing_policy: Option<MissingFeaturePolicy>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one customer
    Predict(PredictCommand),
    /// Score one JSON customer record per line
    Batch {
        /// JSON-lines input file
        file: PathBuf,
    },
    /// Score the high, medium and low risk sample customers
    Scenarios,
    /// Show the loaded model artifact
    Info,
}

#[derive(Args)]
struct PredictCommand {
    /// Read the customer from a JSON file instead of flags
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    #[command(flatten)]
    customer: CustomerArgs,
}

/// Customer fields; defaults match the input form
#[derive(Args)]
struct CustomerArgs {
    #[arg(long, default_value_t = 650, value_parser = clap::value_parser!(u16).range(300..=850))]
    credit_score: u16,

    #[arg(long, default_value_t = Geography::France)]
    geography: Geography,

    #[arg(long, default_value_t = Gender::Male)]
    gender: Gender,

    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u8).range(18..=100))]
    age: u8,

    /// Years as a customer
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=10))]
    tenure: u8,

    #[arg(long, default_value_t = 75_000.0, value_parser = parse_balance)]
    balance: f64,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    num_of_products: u8,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    has_cr_card: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    is_active_member: bool,

    #[arg(long, default_value_t = 60_000.0, value_parser = parse_salary)]
    estimated_salary: f64,
}

impl From<&CustomerArgs> for CustomerRecord {
    fn from(args: &CustomerArgs) -> Self {
        CustomerRecord {
            credit_score: args.credit_score,
            geography: args.geography,
            gender: args.gender,
            age: args.age,
            tenure: args.tenure,
            balance: args.balance,
            num_of_products: args.num_of_products,
            has_cr_card: args.has_cr_card,
            is_active_member: args.is_active_member,
            estimated_salary: args.estimated_salary,
        }
    }
}

fn parse_amount(s: &str, (lo, hi): (f64, f64)) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !value.is_finite() || value < lo || value > hi {
        return Err(format!("must be between {lo} and {hi}"));
    }
    Ok(value)
}

fn parse_balance(s: &str) -> Result<f64, String> {
    parse_amount(s, limits::BALANCE)
}

fn parse_salary(s: &str) -> Result<f64, String> {
    parse_amount(s, limits::ESTIMATED_SALARY)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default().level);
            return fail_startup(&e);
        }
    };

    init_logging(&config.logging.level);
    info!(
        version = churn_core::VERSION,
        model = %config.artifacts.model_path.display(),
        features = %config.artifacts.features_path.display(),
        missing_policy = ?config.features.missing_policy,
        "churn early warning starting"
    );

    // artifacts must be in place before any input is read
    let adapter = match initialize(&config) {
        Ok(adapter) => adapter,
        Err(e) => return fail_startup(&e),
    };

    let outcome = match &cli.command {
        Commands::Predict(cmd) => predict(adapter, cmd, cli.json),
        Commands::Batch { file } => batch(adapter, file, cli.json),
        Commands::Scenarios => scenarios(adapter, cli.json),
        Commands::Info => show_info(adapter, cli.json),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_INFERENCE)
        }
    }
}

/// Configuration file and environment, then command-line flags on top
fn resolve_config(cli: &Cli) -> Result<ChurnConfig, StartupFailure> {
    let mut config = ChurnConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.model {
        config.artifacts.model_path = path.clone();
    }
    if let Some(path) = &cli.features {
        config.artifacts.features_path = path.clone();
    }
    if let Some(policy) = cli.missing_policy {
        config.features.missing_policy = policy;
    }
    Ok(config)
}

fn fail_startup(e: &StartupFailure) -> ExitCode {
    error!(error = %e, "startup failed");
    eprintln!("Startup error: {e}");
    ExitCode::from(EXIT_STARTUP)
}

/// Logs go to stderr so stdout stays parseable
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_inference_failure(e: &InferenceFailure) {
    error!(error = %e, "prediction failed");
    eprintln!("Prediction error: {e}");
    eprintln!("{MISMATCH_HINT}");
}

fn read_record(path: &Path) -> Result<CustomerRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read customer file {}", path.display()))?;
    parse_record(&content)
}

fn parse_record(json: &str) -> Result<CustomerRecord> {
    let record: CustomerRecord =
        serde_json::from_str(json).context("Failed to parse customer record")?;
    record
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid customer record: {e}"))?;
    Ok(record)
}

fn predict(adapter: &RiskClassifierAdapter, cmd: &PredictCommand, json: bool) -> Result<ExitCode> {
    let record = match &cmd.input {
        Some(path) => read_record(path)?,
        None => CustomerRecord::from(&cmd.customer),
    };

    match adapter.assess(&record) {
        Ok(assessment) => {
            if json {
                print_json(&assessment)?;
            } else {
                print!("{}", render_text(&assessment));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_inference_failure(&e);
            Ok(ExitCode::from(EXIT_INFERENCE))
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchLine {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    assessment: Option<Assessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    scored: usize,
    failed: usize,
    /// Failures raised by the model rather than by the input line
    inference_failed: usize,
}

/// Score each non-blank line independently
fn score_lines<R: BufRead>(
    adapter: &RiskClassifierAdapter,
    reader: R,
    mut emit: impl FnMut(BatchLine) -> Result<()>,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let result = match parse_record(&line) {
            Ok(record) => adapter.assess(&record).map_err(|e| {
                summary.inference_failed += 1;
                format!("Prediction error: {e}")
            }),
            Err(e) => Err(format!("{e:#}")),
        };

        match result {
            Ok(assessment) => {
                summary.scored += 1;
                emit(BatchLine {
                    line: line_no,
                    assessment: Some(assessment),
                    error: None,
                })?;
            }
            Err(e) => {
                summary.failed += 1;
                warn!(line = line_no, error = %e, "batch record skipped");
                emit(BatchLine {
                    line: line_no,
                    assessment: None,
                    error: Some(e),
                })?;
            }
        }
    }

    Ok(summary)
}

fn batch(adapter: &RiskClassifierAdapter, path: &Path, json: bool) -> Result<ExitCode> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open batch file {}", path.display()))?;

    let summary = score_lines(adapter, BufReader::new(file), |out| {
        if json {
            println!("{}", serde_json::to_string(&out)?);
        } else if let Some(a) = &out.assessment {
            let p = &a.prediction;
            println!(
                "line {}: {} {} churn {:.1}%",
                out.line,
                p.tier.indicator(),
                p.tier.label(),
                p.churn_percent()
            );
        } else if let Some(e) = &out.error {
            println!("line {}: {e}", out.line);
        }
        Ok(())
    })?;

    let line = format!(
        "Processed {} records: {} scored, {} failed",
        summary.scored + summary.failed,
        summary.scored,
        summary.failed
    );
    if json {
        eprintln!("{line}");
    } else {
        println!("{line}");
        if summary.inference_failed > 0 {
            println!("{MISMATCH_HINT}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct ScenarioOutput<'a> {
    name: &'a str,
    illustrates: churn_core::RiskTier,
    assessment: Assessment,
}

fn scenarios(adapter: &RiskClassifierAdapter, json: bool) -> Result<ExitCode> {
    let mut outputs = Vec::new();
    let presets = sample_scenarios();

    for scenario in &presets {
        let assessment = match adapter.assess(&scenario.record) {
            Ok(a) => a,
            Err(e) => {
                report_inference_failure(&e);
                return Ok(ExitCode::from(EXIT_INFERENCE));
            }
        };
        if json {
            outputs.push(ScenarioOutput {
                name: scenario.name,
                illustrates: scenario.illustrates,
                assessment,
            });
        } else {
            println!("=== {} ===", scenario.name);
            println!("{}", render_text(&assessment));
        }
    }

    if json {
        print_json(&outputs)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn show_info(adapter: &RiskClassifierAdapter, json: bool) -> Result<ExitCode> {
    let info = adapter
        .info()
        .context("Installed classifier has no artifact metadata")?;

    if json {
        print_json(&serde_json::json!({
            "version": churn_core::VERSION,
            "artifact": info,
            "missing_policy": adapter.policy(),
            "feature_names": adapter.feature_names(),
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("churn-core {}", churn_core::VERSION);
    println!("Model:        {}", info.model_path.display());
    println!("Features:     {}", info.features_path.display());
    println!("Model hash:   {}", info.model_hash);
    println!("Model size:   {} bytes", info.model_size_bytes);
    println!("Trees:        {}", info.num_trees);
    println!("Model width:  {}", info.model_n_features);
    println!("Policy:       {:?}", adapter.policy());
    println!("Trained features ({}):", info.feature_count);
    for name in adapter.feature_names() {
        println!("  {name}");
    }
    Ok(ExitCode::SUCCESS)
}
