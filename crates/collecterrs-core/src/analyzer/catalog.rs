//! Extracts each service's *declared* error catalog: the `<Service>Errors`
//! interface some services define to document their codes, independent of
//! whatever a usecase actually returns. A non-authoritative supplement to
//! the main report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{Decl, File};

/// `code -> declaring method name` (e.g. `"NotFound" -> "NotFoundError"`).
pub type DeclaredErrors = HashMap<String, String>;

/// `service name -> its declared catalog`. Empty for services with no
/// `<Service>Errors` interface.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeclaredErrorCatalog(pub HashMap<String, DeclaredErrors>);

impl DeclaredErrorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service_name: String, declared: DeclaredErrors) {
        if !declared.is_empty() {
            self.0.insert(service_name, declared);
        }
    }
}

/// Scans `files` for a `type <TitleCase(service_name)>Errors interface {
/// ... }` declaration and extracts every method whose name ends in
/// `Error` as a declared code.
pub fn collect_service_errors(service_name: &str, files: &[File]) -> DeclaredErrors {
    let interface_name = format!("{}Errors", title_case(service_name));
    let mut declared = DeclaredErrors::new();

    for file in files {
        for decl in &file.decls {
            let Decl::InterfaceType(iface) = decl else { continue };
            if iface.name != interface_name {
                continue;
            }
            for method in &iface.methods {
                if let Some(code) = method.strip_suffix("Error") {
                    declared.insert(code.to_string(), method.clone());
                }
            }
        }
    }

    declared
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
