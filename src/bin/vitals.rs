//! VitalSense CLI - Command-line interface for the health risk engine
//!
//! Commands:
//! - score: Replay snapshots through a profile and print the resulting report
//! - validate: Check snapshots against the ingestion contract
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use vitalsense::source::{parse_snapshot_array, parse_snapshot_ndjson};
use vitalsense::trends::TrendWarning;
use vitalsense::{
    EngineConfig, HealthRiskScore, MetricsSnapshot, Recommendation, UserHealthProfile,
    VitalsError, PRODUCER_NAME, VITALS_VERSION,
};

/// VitalSense - Health risk scoring from metrics snapshots
#[derive(Parser)]
#[command(name = "vitals")]
#[command(author = "Synheart AI Inc")]
#[command(version = VITALS_VERSION)]
#[command(about = "Score health snapshots and derive recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay snapshots through a profile and print the report
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Mark a task as completed after ingestion (repeatable)
        #[arg(long = "complete")]
        complete: Vec<String>,
    },

    /// Validate snapshots against the ingestion contract
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one snapshot per line)
    Ndjson,
    /// JSON array of snapshots
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), VitalsCliError> {
    match cli.command {
        Commands::Score {
            input,
            input_format,
            output_format,
            config,
            complete,
        } => cmd_score(
            &input,
            input_format,
            output_format,
            config.as_deref(),
            &complete,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn read_input(input: &Path) -> Result<String, VitalsCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_snapshots(
    input: &Path,
    format: InputFormat,
) -> Result<Vec<MetricsSnapshot>, VitalsCliError> {
    let data = read_input(input)?;
    let snapshots = match format {
        InputFormat::Ndjson => parse_snapshot_ndjson(&data)?,
        InputFormat::Json => parse_snapshot_array(&data)?,
    };
    Ok(snapshots)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, VitalsCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_score(
    input: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    complete: &[String],
) -> Result<(), VitalsCliError> {
    let config = load_config(config)?;
    let mut snapshots = read_snapshots(input, input_format)?.into_iter();

    let first = snapshots.next().ok_or(VitalsCliError::NoSnapshots)?;
    let mut profile = UserHealthProfile::with_config(first, &config)?;

    // A rejected snapshot is "no new data"; keep replaying the rest
    let mut rejected = 0usize;
    for snapshot in snapshots {
        if let Err(e) = profile.ingest(snapshot) {
            warn!(error = %e, "snapshot rejected");
            rejected += 1;
        }
    }

    let mut completed = Vec::new();
    for task_id in complete {
        let completion = profile.complete_task(task_id)?;
        completed.push(CompletedTask {
            id: task_id.clone(),
            points: completion.points_awarded(),
        });
    }

    let report = ScoreReport {
        producer: PRODUCER_NAME.to_string(),
        version: VITALS_VERSION.to_string(),
        profile_id: profile.id().to_string(),
        history_len: profile.history_len(),
        rejected,
        risk_score: profile.risk_score().clone(),
        warnings: profile.warnings().to_vec(),
        advice: profile.advice().iter().map(|s| s.to_string()).collect(),
        recommendations: profile.recommendations().to_vec(),
        completed,
        earned_points: profile.earned_points(),
        total_available_points: profile.total_available_points(),
    };

    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };
    println!("{}", output);
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), VitalsCliError> {
    let snapshots = read_snapshots(input, input_format)?;

    let mut errors = Vec::new();
    let mut previous: Option<&MetricsSnapshot> = None;
    for (index, snapshot) in snapshots.iter().enumerate() {
        let result = snapshot.validate().and_then(|()| match previous {
            Some(prev) if snapshot.timestamp <= prev.timestamp => Err(VitalsError::OutOfOrder {
                previous: prev.timestamp,
                received: snapshot.timestamp,
            }),
            _ => Ok(()),
        });
        match result {
            Ok(()) => previous = Some(snapshot),
            Err(e) => errors.push(ValidationErrorDetail {
                index,
                timestamp: snapshot.timestamp.to_rfc3339(),
                error: e.to_string(),
            }),
        }
    }

    let report = ValidationReport {
        total_snapshots: snapshots.len(),
        valid_snapshots: snapshots.len() - errors.len(),
        invalid_snapshots: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Validated {} snapshots: {} valid, {} invalid",
            report.total_snapshots, report.valid_snapshots, report.invalid_snapshots
        );
        for detail in &report.errors {
            println!("  [{}] {}: {}", detail.index, detail.timestamp, detail.error);
        }
    }

    if report.invalid_snapshots > 0 {
        Err(VitalsCliError::ValidationFailed(report.invalid_snapshots))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), VitalsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "vitals_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("VitalSense version {}", VITALS_VERSION),
    });

    match config {
        Some(path) if path.exists() => match load_config(Some(path)) {
            Ok(config) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Configuration valid (history capacity {}, trend window {})",
                    config.history_capacity, config.trends.window
                ),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid configuration: {}", CliError::from(e).message),
            }),
        },
        Some(_) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Configuration file does not exist".to_string(),
        }),
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using reference configuration".to_string(),
        }),
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (ready for --input -)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VITALS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("VitalSense Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(VitalsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum VitalsCliError {
    Io(io::Error),
    Engine(VitalsError),
    Json(serde_json::Error),
    NoSnapshots,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for VitalsCliError {
    fn from(e: io::Error) -> Self {
        VitalsCliError::Io(e)
    }
}

impl From<VitalsError> for VitalsCliError {
    fn from(e: VitalsError) -> Self {
        VitalsCliError::Engine(e)
    }
}

impl From<serde_json::Error> for VitalsCliError {
    fn from(e: serde_json::Error) -> Self {
        VitalsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitalsCliError> for CliError {
    fn from(e: VitalsCliError) -> Self {
        match e {
            VitalsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitalsCliError::Engine(e) => {
                let (code, hint) = match &e {
                    VitalsError::Configuration(_) => {
                        ("CONFIG_ERROR", "Check reference ranges, weights and capacities")
                    }
                    VitalsError::TaskNotFound(_) => {
                        ("TASK_NOT_FOUND", "Task ids come from the active recommendations")
                    }
                    VitalsError::OutOfOrder { .. } | VitalsError::InvalidSnapshot(_) => {
                        ("INVALID_SNAPSHOT", "Run 'vitals validate' for details")
                    }
                    VitalsError::Transport(_) => ("TRANSPORT_ERROR", "Retry the device sync"),
                    VitalsError::Parse(_) | VitalsError::Json(_) => {
                        ("PARSE_ERROR", "Ensure input contains metrics snapshots")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            VitalsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            VitalsCliError::NoSnapshots => CliError {
                code: "NO_SNAPSHOTS".to_string(),
                message: "No snapshots found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            VitalsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} snapshots failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            VitalsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ScoreReport {
    producer: String,
    version: String,
    profile_id: String,
    history_len: usize,
    rejected: usize,
    risk_score: HealthRiskScore,
    warnings: Vec<TrendWarning>,
    advice: Vec<String>,
    recommendations: Vec<Recommendation>,
    completed: Vec<CompletedTask>,
    earned_points: u32,
    total_available_points: u32,
}

#[derive(serde::Serialize)]
struct CompletedTask {
    id: String,
    points: u32,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_snapshots: usize,
    valid_snapshots: usize,
    invalid_snapshots: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    timestamp: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
