//! Analysis-domain error type: a `snafu` + `miette::Diagnostic` enum used
//! internally with `?`, wrapped in `LibReport` only at a crate boundary via
//! [`crate::ReportExt`].

use miette::Diagnostic;
use snafu::prelude::*;

#[derive(Debug, Snafu, Diagnostic)]
#[snafu(visibility(pub))]
pub enum AnalyzerError {
    /// Could not enumerate a project's services or load one package's
    /// syntax tree through the configured [`crate::source::AstProvider`] /
    /// [`crate::source::ServiceEnumerator`].
    #[snafu(display("failed to access package {package_path}"))]
    #[diagnostic(
        code(collecterrs::source_access),
        help("check that the configured AstProvider can resolve this package path")
    )]
    SourceAccess {
        package_path: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The cross-service linker did not reach a fixed point within its
    /// iteration ceiling.
    #[snafu(display("cross-service linking did not converge after {iterations} iterations"))]
    #[diagnostic(
        code(collecterrs::linking_non_convergence),
        help("look for a provider-call cycle between services")
    )]
    LinkingNonConvergence { iterations: usize },
}

impl From<crate::analyzer::linker::LinkError> for AnalyzerError {
    fn from(e: crate::analyzer::linker::LinkError) -> Self {
        let crate::analyzer::linker::LinkError::NonConvergence { iterations } = e;
        AnalyzerError::LinkingNonConvergence { iterations }
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
