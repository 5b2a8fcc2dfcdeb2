pub mod catalog;
pub mod linker;
pub mod orchestrator;
pub mod package;

pub use catalog::{collect_service_errors, DeclaredErrorCatalog, DeclaredErrors};
pub use linker::{link_provider_errors, LinkError};
pub use orchestrator::{run_analysis, AnalysisConfig, AnalysisOutput, Report};
pub use package::{analyze_package, PackageAnalysis, PackageKind};
