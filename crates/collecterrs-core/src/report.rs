//! Pure (filesystem-free) serialization of an analysis run's output.
//! Writing the result to disk is the CLI crate's concern, not
//! this library's — keeps framework/domain logic separate from I/O and
//! argument parsing.

use crate::analyzer::{DeclaredErrorCatalog, Report};

pub fn report_to_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn catalog_to_json(catalog: &DeclaredErrorCatalog) -> serde_json::Result<String> {
    serde_json::to_string_pretty(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExitError;
    use std::collections::HashMap;

    #[test]
    fn report_serializes_error_codes_as_plain_strings() {
        let mut report: Report = HashMap::new();
        let mut usecases = HashMap::new();
        usecases.insert("Cases".to_string(), vec![ExitError::code("NotFound")]);
        report.insert("dummy".to_string(), usecases);

        let json = report_to_json(&report).unwrap();
        assert!(json.contains("\"NotFound\""));
        assert!(!json.contains("\"Code\""));
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let mut catalog = DeclaredErrorCatalog::new();
        let mut declared = HashMap::new();
        declared.insert("NotFound".to_string(), "NotFoundError".to_string());
        catalog.insert("dummy".to_string(), declared);

        let json = catalog_to_json(&catalog).unwrap();
        let parsed: DeclaredErrorCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.0["dummy"]["NotFound"], "NotFoundError");
    }
}
