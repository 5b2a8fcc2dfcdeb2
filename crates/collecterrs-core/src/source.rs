//! The two traits a real front-end implements to feed this crate an AST,
//! plus a filesystem-backed adapter and an in-memory one for tests.
//! Parsing Go source text itself is out of scope for this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ast::File;
use crate::error::AnalyzerError;
use crate::naming::to_camel_case;

pub trait AstProvider {
    /// `package_path` is `<module>/services/<service>/{storage,usecase}`.
    fn load_package(&self, package_path: &str) -> Result<Vec<File>, AnalyzerError>;
}

pub trait ServiceEnumerator {
    /// Returns service names already normalized via [`to_camel_case`],
    /// sorted for determinism (the original relies on `os.ReadDir`'s
    /// filename-sorted order).
    fn enumerate_services(&self, services_root: &str) -> Result<Vec<String>, AnalyzerError>;
}

fn source_access(package_path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> AnalyzerError {
    AnalyzerError::SourceAccess { package_path: package_path.into(), source: Box::new(source) }
}

/// Reads one `package.ast.json` sidecar file per package directory — the
/// on-disk contract a real `go/packages`-equivalent front-end would be
/// expected to emit.
pub struct FsAstProvider {
    project_root: PathBuf,
    module_name: String,
}

impl FsAstProvider {
    pub fn new(project_root: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        Self { project_root: project_root.into(), module_name: module_name.into() }
    }

    fn resolve_dir(&self, package_path: &str) -> PathBuf {
        let rel = package_path.strip_prefix(self.module_name.as_str()).unwrap_or(package_path);
        self.project_root.join(rel.trim_start_matches('/'))
    }
}

impl AstProvider for FsAstProvider {
    fn load_package(&self, package_path: &str) -> Result<Vec<File>, AnalyzerError> {
        let sidecar = self.resolve_dir(package_path).join("package.ast.json");
        let bytes = std::fs::read(&sidecar).map_err(|e| source_access(package_path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| source_access(package_path, e))
    }
}

/// Enumerates service directories under `services_root`.
pub struct FsServiceEnumerator;

impl ServiceEnumerator for FsServiceEnumerator {
    fn enumerate_services(&self, services_root: &str) -> Result<Vec<String>, AnalyzerError> {
        let entries = std::fs::read_dir(services_root).map_err(|e| source_access(services_root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| source_access(services_root, e))?;
            let is_dir = entry.file_type().map_err(|e| source_access(services_root, e))?.is_dir();
            if is_dir {
                names.push(to_camel_case(&entry.file_name().to_string_lossy()));
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory [`AstProvider`], used by unit/integration tests and by
/// embedders who already hold a parsed AST and don't want a filesystem
/// round-trip.
#[derive(Debug, Default)]
pub struct StaticAstProvider {
    packages: HashMap<String, Vec<File>>,
}

impl StaticAstProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package_path: impl Into<String>, files: Vec<File>) -> Self {
        self.packages.insert(package_path.into(), files);
        self
    }
}

impl AstProvider for StaticAstProvider {
    fn load_package(&self, package_path: &str) -> Result<Vec<File>, AnalyzerError> {
        self.packages
            .get(package_path)
            .cloned()
            .ok_or_else(|| source_access(package_path, std::io::Error::new(std::io::ErrorKind::NotFound, "package not registered")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticServiceEnumerator {
    services: Vec<String>,
}

impl StaticServiceEnumerator {
    pub fn new(services: Vec<String>) -> Self {
        Self { services }
    }
}

impl ServiceEnumerator for StaticServiceEnumerator {
    fn enumerate_services(&self, _services_root: &str) -> Result<Vec<String>, AnalyzerError> {
        Ok(self.services.clone())
    }
}

/// Joins a project's module name, service root, and package kind into the
/// path convention [`AstProvider::load_package`] expects.
pub fn package_path(module_name: &str, service: &str, kind: &str) -> String {
    format!("{module_name}/services/{service}/{kind}")
}

pub fn services_root(project_root: &Path) -> PathBuf {
    project_root.join("services")
}
