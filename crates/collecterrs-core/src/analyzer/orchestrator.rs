//! Ties service enumeration, per-package analysis, cross-service linking,
//! and the optional declared-error catalog into one analysis run.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::analyzer::catalog::{collect_service_errors, DeclaredErrorCatalog};
use crate::analyzer::linker::link_provider_errors;
use crate::analyzer::package::{analyze_package, PackageKind};
use crate::error::AnalyzerError;
use crate::model::{HandledSet, PackageErrors, ProviderCall};
use crate::source::{package_path, AstProvider, ServiceEnumerator};

/// `service -> usecase -> [error_code, ...]`, the shape serialized as the
/// final report.
pub type Report = HashMap<String, PackageErrors>;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub module_name: String,
    pub services_root: String,
    /// Fixed-point iteration ceiling for the cross-service linker. `None`
    /// derives a ceiling proportional to the number of unresolved
    /// placeholders found.
    pub max_link_iterations: Option<usize>,
    pub with_declared_catalog: bool,
}

fn default_max_iterations(report: &Report) -> usize {
    let placeholder_count = report
        .values()
        .flat_map(|usecases| usecases.values())
        .flatten()
        .filter(|e| e.is_placeholder())
        .count();
    8 * placeholder_count.max(1)
}

#[derive(Debug, Default)]
pub struct AnalysisOutput {
    pub report: Report,
    pub declared_catalog: Option<DeclaredErrorCatalog>,
}

/// Runs the whole pipeline: enumerate services, analyze each one's storage
/// then usecase package, link cross-service placeholders, and optionally
/// collect each service's declared catalog.
#[instrument(skip(ast_provider, service_enumerator, config), fields(module = %config.module_name))]
pub fn run_analysis(
    ast_provider: &dyn AstProvider,
    service_enumerator: &dyn ServiceEnumerator,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let services = service_enumerator.enumerate_services(&config.services_root)?;
    debug!(count = services.len(), "enumerated services");

    let mut report: Report = HashMap::new();
    let mut handled: HashMap<String, HashMap<String, HandledSet>> = HashMap::new();
    let mut declared_catalog = config.with_declared_catalog.then(DeclaredErrorCatalog::new);
    let mut returned_providers: HashMap<String, Vec<ProviderCall>> = HashMap::new();

    for service in &services {
        let storage_path = package_path(&config.module_name, service, "storage");
        let storage_files = ast_provider.load_package(&storage_path)?;
        let storage = analyze_package(&storage_files, PackageKind::Storage, None, &mut returned_providers);

        let usecase_path = package_path(&config.module_name, service, "usecase");
        let usecase_files = ast_provider.load_package(&usecase_path)?;
        let usecase = analyze_package(&usecase_files, PackageKind::Usecase, Some(&storage.errors), &mut returned_providers);

        debug!(service = %service, usecases = usecase.errors.len(), "analyzed service");

        if let Some(catalog) = declared_catalog.as_mut() {
            let mut files = storage_files;
            files.extend(usecase_files);
            catalog.insert(service.clone(), collect_service_errors(service, &files));
        }

        report.insert(service.clone(), usecase.errors);
        handled.insert(service.clone(), usecase.handled);
    }

    // Non-convergence is logged, not fatal: the partially-linked map
    // (dangling known-service placeholders simply never get resolved) is
    // still useful output.
    let max_iterations = config.max_link_iterations.unwrap_or_else(|| default_max_iterations(&report));
    match link_provider_errors(&mut report, &handled, max_iterations) {
        Ok(()) => debug!("cross-service linking converged"),
        Err(e) => warn!(error = %e, "cross-service linking did not converge, returning best-effort report"),
    }

    Ok(AnalysisOutput { report, declared_catalog })
}
