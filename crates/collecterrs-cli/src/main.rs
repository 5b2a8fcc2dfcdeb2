/*
 * CLI entry point.
 *
 * Sets up dual diagnostics:
 * 1. miette     — structured terminal rendering for handled errors
 * 2. color-eyre — panic reports for unhandled crashes
 * 3. tracing    — structured JSON logs to ./logs/collecterrs.log, plus a
 *                 compact stderr layer gated by --verbose/RUST_LOG
 */

mod errors;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use collecterrs_core::analyzer::{run_analysis, AnalysisConfig};
use collecterrs_core::report::{catalog_to_json, report_to_json};
use collecterrs_core::source::{services_root, FsAstProvider, FsServiceEnumerator};
use collecterrs_core::{handle_error_logic, ReportExt};
use errors::{into_lib_report, CliError};
use snafu::ResultExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "collecterrs", about = "Computes each usecase's closed set of returnable error codes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a project and write its error report.
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Project root, containing `go.mod` and `services/`.
    #[arg(long)]
    project: PathBuf,

    /// Where to write the JSON report.
    #[arg(long)]
    output: PathBuf,

    /// Enable verbose (debug-level) stderr logging.
    #[arg(long)]
    verbose: bool,

    /// Fixed-point iteration ceiling for cross-service linking. Defaults to
    /// a ceiling proportional to the number of unresolved placeholders.
    #[arg(long, env = "COLLECTERRS_MAX_LINK_ITERATIONS")]
    max_link_iterations: Option<usize>,

    /// Also write a sibling `<output>.catalog.json` with each service's
    /// declared (not necessarily returned) error catalog.
    #[arg(long)]
    with_declared_catalog: bool,
}

fn module_name(project_root: &std::path::Path) -> Result<String, CliError> {
    let go_mod = std::fs::read_to_string(project_root.join("go.mod"))?;
    go_mod
        .lines()
        .find_map(|line| line.strip_prefix("module "))
        .map(|name| name.trim().to_string())
        .ok_or_else(|| {
            CliError::Io {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "go.mod has no module directive"),
            }
        })
}

fn run(args: &AnalyzeArgs) -> Result<(), CliError> {
    let module_name = module_name(&args.project)?;
    let services_root = services_root(&args.project);
    let ast_provider = FsAstProvider::new(args.project.clone(), module_name.clone());
    let service_enumerator = FsServiceEnumerator;

    let config = AnalysisConfig {
        module_name,
        services_root: services_root.to_string_lossy().into_owned(),
        max_link_iterations: args.max_link_iterations,
        with_declared_catalog: args.with_declared_catalog,
    };

    let output = run_analysis(&ast_provider, &service_enumerator, &config)?;

    let json = report_to_json(&output.report).context(errors::ReportEncodeSnafu)?;
    std::fs::write(&args.output, json)?;

    if let Some(catalog) = &output.declared_catalog {
        let catalog_json = catalog_to_json(catalog).context(errors::ReportEncodeSnafu)?;
        let catalog_path = args.output.with_extension("catalog.json");
        std::fs::write(catalog_path, catalog_json)?;
    }

    Ok(())
}

fn main() -> miette::Result<()> {
    color_eyre::install().expect("failed to install color-eyre");

    let file_appender = tracing_appender::rolling::daily("logs", "collecterrs.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let cli = Cli::parse();
    let Command::Analyze(args) = &cli.command;

    let stderr_filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr).compact().with_filter(stderr_filter))
        .init();

    miette::set_panic_hook();

    if let Err(report) = into_lib_report(run(args)) {
        handle_error_logic(&report);
        let api_err = report.to_api_error();
        eprintln!("\n[Diagnostic ID: {}]", api_err.correlation_id);
        return Err(miette::Report::new(report));
    }

    Ok(())
}
