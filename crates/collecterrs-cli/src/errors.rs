/*
 * CLI-specific error definitions.
 *
 * Pattern for consuming collecterrs-core:
 * 1. Define your own error enum with snafu + miette.
 * 2. Use #[snafu(context(false))] to get From<io::Error> for CliError — this
 *    makes `?` work inside functions returning Result<_, CliError>.
 * 3. At the boundary (main), wrap CliError in LibReport.
 *
 * Why not use LibResult<_, CliError> everywhere:
 * Rust's orphan rule prevents implementing From<io::Error> for
 * LibReport<CliError> in this crate, because neither io::Error nor LibReport
 * is defined here. The solution is to use Result<_, CliError> for internal
 * functions and only wrap into LibReport at the top-level boundary.
 */

use collecterrs_core::AnalyzerError;
use miette::Diagnostic;
use snafu::prelude::*;

#[derive(Debug, Snafu, Diagnostic)]
#[snafu(visibility(pub))]
pub enum CliError {
    /// The analysis itself failed (source access, non-convergent linking).
    #[snafu(display("analysis failed: {source}"))]
    #[diagnostic(code(cli::analysis_failed))]
    Analysis {
        #[diagnostic_source]
        source: AnalyzerError,
    },

    /// The report (or declared catalog) could not be serialized to JSON.
    #[snafu(display("failed to serialize report: {source}"))]
    #[diagnostic(code(cli::report_encode))]
    ReportEncode { source: serde_json::Error },

    /// Wraps std::io::Error.
    ///
    /// #[snafu(context(false))] generates: From<std::io::Error> for CliError.
    /// This makes `?` work in functions returning Result<_, CliError>.
    #[snafu(context(false))]
    #[snafu(display("IO error: {source}"))]
    #[diagnostic(code(cli::io_error))]
    Io { source: std::io::Error },
}

impl From<AnalyzerError> for CliError {
    fn from(source: AnalyzerError) -> Self {
        CliError::Analysis { source }
    }
}

/// Helper to wrap a CliError result into a LibReport at the boundary.
pub fn into_lib_report(r: Result<(), CliError>) -> collecterrs_core::LibResult<(), CliError> {
    r.map_err(|e| collecterrs_core::LibReport(collecterrs_core::rootcause::Report::new(e)))
}
