//! Binds local variable names to the error codes they currently hold.

use std::collections::HashMap;

use crate::ast::{Expr, MapKey, MapValueType, Stmt};

#[derive(Debug, Default)]
pub struct ErrorVarTracker {
    error_vars: HashMap<String, String>,
}

impl ErrorVarTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// An assignment whose RHS is a recognized error expression binds every
    /// LHS identifier to that code; unrecognized RHS leaves the map
    /// unchanged. Monotonic and order-sensitive: later statements overwrite
    /// earlier ones.
    pub fn track(&mut self, node: &Stmt) {
        let Stmt::Assign(assign) = node else { return };

        for rhs in &assign.rhs {
            let code = self.error_code(rhs);
            let Some(code) = code else { continue };
            for lhs in &assign.lhs {
                if let Expr::Ident(name) = lhs {
                    self.error_vars.insert(name.clone(), code.clone());
                }
            }
        }
    }

    /// Resolves `expr` to an error code, or `None` if it isn't recognized.
    pub fn error_code(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Selector { x, sel } => {
                if let Some(code) = recognized_errs_selector(x, sel) {
                    return Some(code);
                }
                // Not a direct errsX.YError selector; keep looking deeper,
                // matching the original's unconditional recursive fallback.
                self.error_code(x)
            }
            Expr::Call { func, args } => {
                let Expr::Selector { x: base, sel } = func.as_ref() else { return None };
                if sel != "WithDetails" {
                    return None;
                }
                let mut code = self.error_code(base)?;
                if let Some(first_arg) = args.first() {
                    let keys = extract_map_keys(first_arg);
                    code = format!("{code} ({})", keys.join(","));
                }
                Some(code)
            }
            Expr::Ident(name) => self.error_vars.get(name).cloned(),
            _ => None,
        }
    }

    /// Only used by the return-contribution rules, which need to
    /// distinguish "resolved via a tracked identifier" from "resolved via a
    /// fresh inline expression" for provider-call interop; exposed as a
    /// read-only lookup.
    pub fn tracked(&self, name: &str) -> Option<&str> {
        self.error_vars.get(name).map(String::as_str)
    }
}

/// `X.Y` where `Y` ends in `Error` and `X` is an identifier starting with
/// `errs`.
fn recognized_errs_selector(x: &Expr, sel: &str) -> Option<String> {
    let Some(code) = sel.strip_suffix("Error") else { return None };
    let Expr::Ident(ident) = x else { return None };
    if !ident.starts_with("errs") {
        return None;
    }
    Some(code.to_string())
}

/// Extracts `key:Type` pairs from a map-literal first argument to
/// `WithDetails`. Non-literal keys are skipped; value type is the map's
/// declared value type (primitive, `pkg.Name`, or `unknown`).
fn extract_map_keys(expr: &Expr) -> Vec<String> {
    let Expr::MapLit { value_type, entries } = expr else { return Vec::new() };
    let type_name = match value_type {
        MapValueType::Basic(name) => name.clone(),
        MapValueType::Qualified { pkg, name } => format!("{pkg}.{name}"),
        MapValueType::Unknown => "unknown".to_string(),
    };

    entries
        .iter()
        .filter_map(|(key, _)| {
            let key_name = match key {
                MapKey::StringLit(s) => Some(s.clone()),
                MapKey::Ident(s) => Some(s.clone()),
                MapKey::Other => None,
            }?;
            Some(format!("{key_name}:{type_name}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AssignStmt;

    fn assign(lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        Stmt::Assign(AssignStmt { lhs, rhs })
    }

    #[test]
    fn recognizes_errs_selector() {
        let tracker = ErrorVarTracker::new();
        let expr = Expr::errs_selector("errsDummy", "FromVar1Error");
        assert_eq!(tracker.error_code(&expr), Some("FromVar1".to_string()));
    }

    #[test]
    fn ignores_non_errs_prefix() {
        let tracker = ErrorVarTracker::new();
        let expr = Expr::errs_selector("otherPkg", "FooError");
        assert_eq!(tracker.error_code(&expr), None);
    }

    #[test]
    fn tracks_assignment_and_resolves_ident() {
        let mut tracker = ErrorVarTracker::new();
        tracker.track(&assign(
            vec![Expr::ident("e")],
            vec![Expr::errs_selector("errsDummy", "FromVar1Error")],
        ));
        assert_eq!(tracker.error_code(&Expr::ident("e")), Some("FromVar1".to_string()));
    }

    #[test]
    fn multiple_lhs_get_same_code() {
        let mut tracker = ErrorVarTracker::new();
        tracker.track(&assign(
            vec![Expr::ident("a"), Expr::ident("b")],
            vec![Expr::errs_selector("errsDummy", "DummyError")],
        ));
        assert_eq!(tracker.error_code(&Expr::ident("a")), Some("Dummy".to_string()));
        assert_eq!(tracker.error_code(&Expr::ident("b")), Some("Dummy".to_string()));
    }

    #[test]
    fn later_assignment_overwrites_earlier() {
        let mut tracker = ErrorVarTracker::new();
        tracker.track(&assign(vec![Expr::ident("e")], vec![Expr::errs_selector("errsDummy", "FooError")]));
        tracker.track(&assign(vec![Expr::ident("e")], vec![Expr::errs_selector("errsDummy", "BarError")]));
        assert_eq!(tracker.error_code(&Expr::ident("e")), Some("Bar".to_string()));
    }

    #[test]
    fn unrecognized_rhs_leaves_mapping_unchanged() {
        let mut tracker = ErrorVarTracker::new();
        tracker.track(&assign(vec![Expr::ident("e")], vec![Expr::errs_selector("errsDummy", "FooError")]));
        tracker.track(&assign(vec![Expr::ident("e")], vec![Expr::Other]));
        assert_eq!(tracker.error_code(&Expr::ident("e")), Some("Foo".to_string()));
    }

    #[test]
    fn with_details_appends_typed_keys() {
        let tracker = ErrorVarTracker::new();
        let expr = Expr::call(
            Expr::selector(Expr::errs_selector("errsDummy", "WithDetailsError"), "WithDetails"),
            vec![Expr::MapLit {
                value_type: MapValueType::Basic("string".to_string()),
                entries: vec![(MapKey::StringLit("foo".to_string()), Expr::BasicString("bar".to_string()))],
            }],
        );
        assert_eq!(tracker.error_code(&expr), Some("WithDetails (foo:string)".to_string()));
    }

    #[test]
    fn with_details_skips_non_literal_keys() {
        let tracker = ErrorVarTracker::new();
        let expr = Expr::call(
            Expr::selector(Expr::errs_selector("errsDummy", "WithDetailsError"), "WithDetails"),
            vec![Expr::MapLit {
                value_type: MapValueType::Qualified { pkg: "time".to_string(), name: "Time".to_string() },
                entries: vec![
                    (MapKey::StringLit("ts".to_string()), Expr::BasicString("x".to_string())),
                    (MapKey::Other, Expr::BasicString("y".to_string())),
                ],
            }],
        );
        assert_eq!(tracker.error_code(&expr), Some("WithDetails (ts:time.Time)".to_string()));
    }
}
