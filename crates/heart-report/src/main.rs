//! CLI entry point for the heart disease report tool.

use anyhow::{Result, anyhow};
use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use heart_report::normalizer::DEFAULT_SENTINEL;
use heart_report::{
    BatchRun, ChestPainType, InferenceContext, ManualRun, PatientForm, Report, ReportConfig,
    ReportPipeline, ReportResult, Sex, Thalassemia, UnseenCategoryPolicy, load_csv,
};
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

/// Environment variable naming the default artifacts directory.
const ARTIFACTS_ENV: &str = "HEART_REPORT_ARTIFACTS_DIR";

/// CLI-compatible sex enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSex {
    Male,
    Female,
}

impl From<CliSex> for Sex {
    fn from(cli: CliSex) -> Self {
        match cli {
            CliSex::Male => Sex::Male,
            CliSex::Female => Sex::Female,
        }
    }
}

/// CLI-compatible chest pain type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChestPain {
    TypicalAngina,
    AtypicalAngina,
    NonAnginal,
    Asymptomatic,
}

impl From<CliChestPain> for ChestPainType {
    fn from(cli: CliChestPain) -> Self {
        match cli {
            CliChestPain::TypicalAngina => ChestPainType::TypicalAngina,
            CliChestPain::AtypicalAngina => ChestPainType::AtypicalAngina,
            CliChestPain::NonAnginal => ChestPainType::NonAnginal,
            CliChestPain::Asymptomatic => ChestPainType::Asymptomatic,
        }
    }
}

/// CLI-compatible thalassemia enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliThalassemia {
    Normal,
    FixedDefect,
    ReversableDefect,
}

impl From<CliThalassemia> for Thalassemia {
    fn from(cli: CliThalassemia) -> Self {
        match cli {
            CliThalassemia::Normal => Thalassemia::Normal,
            CliThalassemia::FixedDefect => Thalassemia::FixedDefect,
            CliThalassemia::ReversableDefect => Thalassemia::ReversableDefect,
        }
    }
}

/// CLI-compatible unseen category policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliUnseenPolicy {
    /// Drop unseen indicator columns silently
    Ignore,
    /// Drop unseen indicator columns with a warning
    Warn,
    /// Fail the run
    Reject,
}

impl From<CliUnseenPolicy> for UnseenCategoryPolicy {
    fn from(cli: CliUnseenPolicy) -> Self {
        match cli {
            CliUnseenPolicy::Ignore => UnseenCategoryPolicy::Ignore,
            CliUnseenPolicy::Warn => UnseenCategoryPolicy::Warn,
            CliUnseenPolicy::Reject => UnseenCategoryPolicy::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Heart disease prediction with poetic reports",
    long_about = "Predicts heart disease from patient records with a pre-fitted model and \
                  writes a short report per record.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  HEART_REPORT_ARTIFACTS_DIR    Default artifacts directory\n\n\
                  EXAMPLES:\n  \
                  # Single patient, PDF written to ./outputs/poetic_report.pdf\n  \
                  heart-report predict --age 63 --trestbps 145 --chol 233 --thalch 150 \\\n      \
                  --oldpeak 2.3 --ca 0 --sex male --cp typical-angina --thal normal\n\n  \
                  # Batch, CSV written to ./outputs/heart_poetic_report.csv\n  \
                  heart-report batch -i patients.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding feature_columns.json, scaler.json and model.json
    #[arg(short, long, global = true)]
    artifacts: Option<PathBuf>,

    /// Output directory for PDF and CSV reports
    #[arg(short, long, global = true, default_value = "./outputs")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON reports to stdout instead of a table
    ///
    /// Disables all progress logs.
    #[arg(long, global = true)]
    json: bool,

    /// Do not write the PDF/CSV report
    #[arg(long, global = true)]
    no_export: bool,

    /// Handling of categorical values the model never saw
    #[arg(long, global = true, value_enum, default_value = "warn")]
    unseen_policy: CliUnseenPolicy,

    /// Value substituted for missing categorical fields
    #[arg(long, global = true, default_value_t = DEFAULT_SENTINEL.to_string())]
    sentinel: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict for a single manually entered patient and write a PDF
    Predict(PredictArgs),
    /// Predict for every row of a CSV file and write a CSV
    Batch {
        /// Path to the CSV file of patient records
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct PredictArgs {
    /// Age in years (1-120)
    #[arg(long)]
    age: u32,

    /// Resting blood pressure
    #[arg(long, visible_alias = "blood-pressure")]
    trestbps: f64,

    /// Serum cholesterol
    #[arg(long, visible_alias = "cholesterol")]
    chol: f64,

    /// Maximum heart rate achieved
    #[arg(long, visible_alias = "max-heart-rate")]
    thalch: f64,

    /// ST depression
    #[arg(long, visible_alias = "st-depression", allow_hyphen_values = true)]
    oldpeak: f64,

    /// Number of major vessels (0-3)
    #[arg(long, visible_alias = "vessels")]
    ca: u32,

    #[arg(long, value_enum)]
    sex: CliSex,

    /// Chest pain type
    #[arg(long, value_enum)]
    cp: CliChestPain,

    /// Thalassemia
    #[arg(long, value_enum)]
    thal: CliThalassemia,
}

impl From<&PredictArgs> for PatientForm {
    fn from(args: &PredictArgs) -> Self {
        PatientForm {
            age: args.age,
            trestbps: args.trestbps,
            chol: args.chol,
            thalch: args.thalch,
            oldpeak: args.oldpeak,
            ca: args.ca,
            sex: args.sex.into(),
            cp: args.cp.into(),
            thal: args.thal.into(),
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = build_config(&args)?;
    info!("Artifacts directory: {}", config.artifacts_dir.display());

    match run(&args, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Run failed: {}", e);
            Err(anyhow!("{}", e))
        }
    }
}

fn build_config(args: &Args) -> Result<ReportConfig> {
    let artifacts_dir = args
        .artifacts
        .clone()
        .or_else(|| env::var(ARTIFACTS_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| ReportConfig::default().artifacts_dir);

    Ok(ReportConfig::builder()
        .artifacts_dir(artifacts_dir)
        .output_dir(&args.output)
        .categorical_sentinel(&args.sentinel)
        .unseen_category_policy(args.unseen_policy.into())
        .write_exports(!args.no_export)
        .build()?)
}

fn run(args: &Args, config: &ReportConfig) -> ReportResult<()> {
    let context = InferenceContext::load(config)?;
    let pipeline = ReportPipeline::new(&context, config);
    let now = Local::now().naive_local();

    match &args.command {
        Command::Predict(predict) => {
            let form = PatientForm::from(predict);
            let run = pipeline.run_manual(&form, now)?;
            if args.json {
                print_json(std::slice::from_ref(&run.report))
            } else {
                print_manual_summary(&run);
                Ok(())
            }
        }
        Command::Batch { input } => {
            let df = load_csv(input)?;
            let run = pipeline.run_batch(df, now)?;
            if args.json {
                print_json(&run.reports)
            } else {
                print_batch_summary(&run, input);
                Ok(())
            }
        }
    }
}

fn print_json(reports: &[Report]) -> ReportResult<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

/// Print the single-record report.
///
/// Uses `println!` intentionally: this is the command's output, not a log.
fn print_manual_summary(run: &ManualRun) {
    let report = &run.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("HEART DISEASE REPORT");
    println!("{}", "=".repeat(80));
    println!();

    for (label, value) in &report.fields {
        println!("  {:<18} {}", format!("{}:", label), value);
    }
    println!();
    println!("Prediction: {}", report.prediction_text);
    println!();
    println!("Poetic Summary:     {}", report.poetic_summary);
    println!("Doctor's Note:      {}", report.doctor_note);
    println!("Companion Message:  {}", report.companion_message);
    println!();
    println!("{}", run.table);
    println!();
    println!("Report Generated At: {}", report.generated_at);

    if let Some(path) = &run.pdf_path {
        println!("PDF saved to: {}", path.display());
    }
    warn_about_dropped(&run.encoding.unseen_indicators);
    println!("{}", "=".repeat(80));
}

/// Print the batch table and where it was saved.
fn print_batch_summary(run: &BatchRun, input: &std::path::Path) {
    let at_risk = run.reports.iter().filter(|r| r.prediction.is_disease()).count();

    println!();
    println!("{}", "=".repeat(80));
    println!("BATCH REPORT COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("Input:  {} ({} rows)", input.display(), run.reports.len());
    if let Some(path) = &run.csv_path {
        println!("Output: {}", path.display());
    }
    println!(
        "Predictions: {} at risk, {} steady",
        at_risk,
        run.reports.len() - at_risk
    );
    if let Some(first) = run.reports.first() {
        println!("Report Generated At: {}", first.generated_at);
    }
    println!();
    println!("{}", run.table);
    warn_about_dropped(&run.encoding.unseen_indicators);
    println!("{}", "=".repeat(80));
}

fn warn_about_dropped(unseen: &[String]) {
    if !unseen.is_empty() {
        println!();
        println!("Warnings:");
        println!(
            "  ! Categories unknown to the model were ignored: {}",
            unseen.join(", ")
        );
    }
}
