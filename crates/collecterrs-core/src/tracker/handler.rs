//! Recognizes source patterns that mean a caller handles an error locally
//! rather than propagating it.

use crate::ast::{BinaryOp, Expr, IfStmt, UnaryOp};
use crate::model::HandledSet;
use crate::tracker::error_var::ErrorVarTracker;

#[derive(Debug, Default)]
pub struct ErrorHandlerDetector {
    handled: HandledSet,
}

impl ErrorHandlerDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handled(&self) -> &HandledSet {
        &self.handled
    }

    pub fn into_handled(self) -> HandledSet {
        self.handled
    }

    /// Four recognized guard shapes, checked against an `if` statement's
    /// condition:
    /// 1. `err != nil && !errors.Is(err, errsX.YError)` — the `&&` wrapper is
    ///    not actually evaluated; only the right-hand `!errors.Is(...)` is
    ///    inspected, preserved verbatim even though this also matches an
    ///    unrelated left-hand condition.
    /// 2. `errors.Is(err, errsX.YError)` / `errors.Is(err, trackedVar)`
    /// 3. `errsX.YError.Is(err)` — a custom `.Is` method on an error value.
    pub fn inspect(&mut self, stmt: &IfStmt, err_tracker: &ErrorVarTracker) {
        match &stmt.cond {
            Expr::Binary { op: BinaryOp::LogicalAnd, y, .. } => {
                if let Expr::Unary { op: UnaryOp::Not, x } = y.as_ref() {
                    if let Expr::Call { func, args } = x.as_ref() {
                        if is_errors_is_call(func) {
                            self.mark_errors_is_target(args, err_tracker);
                        }
                    }
                }
            }
            Expr::Call { func, args } => {
                if is_errors_is_call(func) {
                    self.mark_errors_is_target(args, err_tracker);
                } else if is_custom_error_is_call(func) {
                    self.mark_custom_error_is(func);
                }
            }
            _ => {}
        }
    }

    fn mark_errors_is_target(&mut self, args: &[Expr], err_tracker: &ErrorVarTracker) {
        if args.len() < 2 {
            return;
        }

        if let Expr::Selector { x, sel } = &args[1] {
            if let Some(code) = sel.strip_suffix("Error") {
                if let Expr::Ident(ident) = x.as_ref() {
                    if ident.starts_with("errs") {
                        self.handled.insert(code.to_string());
                    }
                }
            }
        }

        if let Expr::Ident(name) = &args[1] {
            if let Some(code) = err_tracker.tracked(name) {
                self.handled.insert(code.to_string());
            }
        }
    }

    /// `errsX.YError.Is(err)`: marks `Y` handled, plus the fully-qualified
    /// `serviceName.Y` form (the service name being `errsX` with its `errs`
    /// prefix stripped and lowercased first letter), since a cross-service
    /// linked report may carry either spelling.
    fn mark_custom_error_is(&mut self, func: &Expr) {
        let Expr::Selector { x: sel_x, sel } = func else { return };
        if sel != "Is" {
            return;
        }
        let Expr::Selector { x: error_sel_x, sel: error_sel } = sel_x.as_ref() else { return };
        let Some(error_name) = error_sel.strip_suffix("Error") else { return };
        let Expr::Ident(ident) = error_sel_x.as_ref() else { return };
        if !ident.starts_with("errs") {
            return;
        }

        self.handled.insert(error_name.to_string());

        let Some(service_name) = ident.strip_prefix("errs") else { return };
        if service_name.is_empty() {
            return;
        }
        let mut chars = service_name.chars();
        let service_prefix = match chars.next() {
            Some(head) => head.to_lowercase().collect::<String>() + chars.as_str(),
            None => return,
        };
        self.handled.insert(format!("{service_prefix}.{error_name}"));
    }
}

fn is_errors_is_call(func: &Expr) -> bool {
    let Expr::Selector { x, sel } = func else { return false };
    sel == "Is" && matches!(x.as_ref(), Expr::Ident(pkg) if pkg == "errors")
}

/// Any `X.Is(...)` call where `X` is itself a selector ending in `Error` —
/// a generic match for custom error objects with an `.Is` method.
fn is_custom_error_is_call(func: &Expr) -> bool {
    let Expr::Selector { x, sel } = func else { return false };
    if sel != "Is" {
        return false;
    }
    matches!(x.as_ref(), Expr::Selector { sel: inner_sel, .. } if inner_sel.ends_with("Error"))
}
