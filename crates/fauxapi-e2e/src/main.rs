//! # fauxapi-e2e
//!
//! Runs the scenario catalog against the failure-injecting client and
//! writes the aggregated report.
//!
//! ## Usage
//!
//! ```bash
//! # Run every scenario with the default 30% failure rate
//! fauxapi-e2e
//!
//! # Reproducible run, smoke scenarios only
//! fauxapi-e2e run --seed 42 --marker smoke
//!
//! # List available scenarios
//! fauxapi-e2e list
//!
//! # Re-aggregate saved records
//! fauxapi-e2e report --input .fauxapi-reports/results.json
//! ```

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use fauxapi_core::{ClientConfig, FailureRate, FakeApiClient};
use fauxapi_e2e::{
    Catalog, InjectedFailurePolicy, Marker, ReportFormat as LibReportFormat, ReportWriter,
    RunConfig, RunReport, RunResults, TerminalReporter, TestRunner, TestScenario, Verbosity,
    aggregate, all_scenarios, artifact_name, boxed_scenarios, create_progress_callback,
    load_records, resolve_run_id,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scenario runner and report aggregator for the fauxapi client.
#[derive(Parser, Debug)]
#[command(name = "fauxapi-e2e")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    /// Show detailed output and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show pass/fail summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run scenarios and write reports (default)
    Run(RunArgs),
    /// List available scenarios without running them
    List,
    /// Re-aggregate saved records and write the report
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Probability in [0, 1] that a simulated call fails
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML client configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Run only scenarios matching this pattern
    #[arg(long)]
    pub filter: Option<String>,

    /// Run only scenarios from this catalog
    #[arg(long)]
    pub catalog: Option<Catalog>,

    /// Run only scenarios carrying this marker
    #[arg(long)]
    pub marker: Option<Marker>,

    /// Count well-formed injected failures as passed
    #[arg(long)]
    pub tolerate_injected: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Records file written by a previous run
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for records and reports
    #[arg(long, default_value = ".fauxapi-reports")]
    pub output_dir: PathBuf,

    /// Generate report in specified format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Run identifier for the artifact name (defaults to $GITHUB_RUN_ID)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Exit non-zero when the failure rate exceeds this percentage
    #[arg(long, default_value_t = 80.0)]
    pub fail_threshold: f64,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Markdown format (human-readable)
    Markdown,
    /// JSON format (machine-readable)
    #[default]
    Json,
    /// Both markdown and JSON
    Both,
}

impl ReportFormat {
    /// Converts CLI report format to library report format.
    fn to_lib_format(self) -> LibReportFormat {
        match self {
            ReportFormat::Markdown => LibReportFormat::Markdown,
            ReportFormat::Json => LibReportFormat::Json,
            ReportFormat::Both => LibReportFormat::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    if verbosity != Verbosity::Quiet {
        println!(
            "\n{} {}",
            "🧪 API Test Harness".bold(),
            format!("v{}", fauxapi_e2e::VERSION).dimmed()
        );
        println!("{}", "━".repeat(40).dimmed());
    }

    let outcome = match cli.command {
        Some(Command::List) => {
            list_scenarios();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Report(args)) => report_command(&args, verbosity),
        Some(Command::Run(args)) => run_command(&args, verbosity),
        None => run_command(&cli.run, verbosity),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays readable. `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Layers configuration: defaults, YAML file, environment, then flags.
fn build_client_config(args: &RunArgs) -> Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    let mut config = config
        .with_env()
        .context("Invalid FAUXAPI_* environment override")?;

    if let Some(rate) = args.failure_rate {
        config.failure_rate = FailureRate::new(rate).context("Invalid --failure-rate")?;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

fn build_run_config(args: &RunArgs) -> RunConfig {
    let mut config = RunConfig::new();

    if let Some(filter) = &args.filter {
        config = config.with_filter(filter);
    }
    if let Some(catalog) = args.catalog {
        config = config.with_catalog(catalog);
    }
    if let Some(marker) = args.marker {
        config = config.with_marker(marker);
    }
    if args.tolerate_injected {
        config = config.with_policy(InjectedFailurePolicy::Tolerate);
    }

    config
}

fn list_scenarios() {
    let scenarios = all_scenarios();
    println!("\n{}\n", "Available scenarios:".bold());

    for catalog in Catalog::all() {
        let members: Vec<_> = scenarios.iter().filter(|s| s.catalog() == *catalog).collect();
        if members.is_empty() {
            continue;
        }

        println!("  {}", catalog.as_str().bold().underline());
        for scenario in members {
            let markers = scenario
                .markers()
                .iter()
                .map(|m| format!("[{}]", m))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "    {}  {} {}",
                scenario.name().cyan(),
                scenario.description().dimmed(),
                markers.yellow()
            );
        }
    }

    println!(
        "\n  {}",
        format!(
            "Total: {} scenario{}",
            scenarios.len(),
            if scenarios.len() == 1 { "" } else { "s" }
        )
        .dimmed()
    );
}

fn run_command(args: &RunArgs, verbosity: Verbosity) -> Result<ExitCode> {
    let client_config = build_client_config(args)?;
    let run_config = build_run_config(args);

    if verbosity != Verbosity::Quiet {
        let seed = client_config
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string());
        println!(
            "{}",
            format!(
                "Failure rate {}, seed {}",
                client_config.failure_rate, seed
            )
            .dimmed()
        );
    }

    let mut client = FakeApiClient::new(client_config).context("Failed to build client")?;
    let runner = TestRunner::new(boxed_scenarios()).on_progress(create_progress_callback(verbosity));

    let results = runner
        .run(&mut client, &run_config)
        .context("Test run failed")?;

    finish(&results, &args.output, verbosity)
}

fn report_command(args: &ReportArgs, verbosity: Verbosity) -> Result<ExitCode> {
    let results = load_results(&args.input)?;
    info!(records = results.total_count(), input = %args.input.display(), "Loaded saved records");
    finish(&results, &args.output, verbosity)
}

fn load_results(path: &Path) -> Result<RunResults> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records = load_records(&content)
        .with_context(|| format!("Failed to parse records from {}", path.display()))?;
    Ok(RunResults::from_records(records))
}

/// Prints the summary, writes every report, and applies the failure threshold.
fn finish(results: &RunResults, output: &OutputArgs, verbosity: Verbosity) -> Result<ExitCode> {
    let report = aggregate(&results.records);
    let reporter = TerminalReporter::with_verbosity(verbosity);

    if verbosity != Verbosity::Quiet {
        if verbosity == Verbosity::Verbose {
            reporter.print_by_catalog(results);
        }
        if !results.all_passed() {
            reporter.print_failures(results);
        }
        reporter.print_failure_analysis(&report);
    }

    // Always print summary
    reporter.print_summary(results, &report);

    let written = write_reports(results, &report, output)?;
    if verbosity != Verbosity::Quiet {
        for path in &written {
            println!("{}", format!("Report written: {}", path.display()).dimmed());
        }
    }

    if exceeds_threshold(&report, output.fail_threshold) {
        eprintln!(
            "\n{} failure rate {:.2}% exceeds threshold {:.2}%",
            "Threshold:".red().bold(),
            report.fail_rate,
            output.fail_threshold
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Writes records and reports, plus an artifact copy of `report.json`.
/// The artifact name and every report share one timestamp.
fn write_reports(results: &RunResults, report: &RunReport, output: &OutputArgs) -> Result<Vec<PathBuf>> {
    let generated_at = Utc::now();
    let run_id = resolve_run_id(output.run_id.as_deref());
    let name = artifact_name(&generated_at.with_timezone(&Local), &run_id, report, "json");

    ReportWriter::new(output.output_dir.clone())
        .with_artifact_name(name)
        .write_at(results, report, output.format.to_lib_format(), generated_at)
        .with_context(|| format!("Failed to write reports to {}", output.output_dir.display()))
}

fn exceeds_threshold(report: &RunReport, threshold: f64) -> bool {
    report.fail_rate > threshold
}
