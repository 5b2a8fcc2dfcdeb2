//! Walks one package's functions and produces its raw (pre-link) error
//! sets.

use std::collections::{HashMap, HashSet};

use crate::ast::{expr_to_dotted, Decl, Expr, File, FuncDecl, ReturnStmt, Stmt};
use crate::model::{dedup_push, storage_key, ExitError, HandledSet, PackageErrors, ProviderCall, STORAGE_PREFIX};
use crate::tracker::provider::extract_provider_method;
use crate::tracker::{ErrorHandlerDetector, ErrorVarTracker, ProviderTracker};

/// Which directory convention a package was loaded from — decides whether
/// only file-name-matching entry-point methods are analyzed (usecase) or
/// every top-level function is (storage, and anything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Usecase,
    Storage,
    Other,
}

#[derive(Debug, Default)]
pub struct PackageAnalysis {
    pub errors: PackageErrors,
    pub handled: HashMap<String, HandledSet>,
}

/// `returned_providers` is the orchestrator-owned, analysis-run-wide cache
/// keyed by bare function name; it is read by
/// [`ProviderTracker`] and written here as each function finishes.
pub fn analyze_package(
    files: &[File],
    kind: PackageKind,
    extra_errs: Option<&PackageErrors>,
    returned_providers: &mut HashMap<String, Vec<ProviderCall>>,
) -> PackageAnalysis {
    let pf = collect_package_functions(files);
    let mut out = PackageAnalysis::default();

    for file in files {
        for decl in &file.decls {
            let Decl::Func(fn_decl) = decl else { continue };
            if kind == PackageKind::Usecase && !is_usecase_method(&file.name, fn_decl) {
                continue;
            }

            let mut err_tracker = ErrorVarTracker::new();
            let mut err_handler = ErrorHandlerDetector::new();
            let mut provider_tracker = ProviderTracker::new();
            let mut visited = HashSet::new();
            let mut errors = Vec::new();

            analyze_function(
                fn_decl,
                &pf,
                &mut visited,
                &mut err_tracker,
                &mut err_handler,
                &mut provider_tracker,
                &mut errors,
                returned_providers,
            );

            let name = if kind == PackageKind::Storage { storage_key(&fn_decl.name) } else { fn_decl.name.clone() };

            let mut deduped = Vec::new();
            for e in errors {
                dedup_push(&mut deduped, e);
            }

            let handled = err_handler.handled();
            for e in &deduped {
                let rendered = e.render();
                if let Some(nested) = extra_errs.and_then(|m| m.get(&rendered)) {
                    for nested_err in nested {
                        if !handled.contains(&nested_err.render()) {
                            out.errors.entry(name.clone()).or_default().push(nested_err.clone());
                        }
                    }
                } else if !rendered.starts_with(STORAGE_PREFIX) {
                    out.errors.entry(name.clone()).or_default().push(e.clone());
                }
            }

            out.handled.insert(name, err_handler.into_handled());
        }
    }

    out
}

fn is_usecase_method(filename: &str, fn_decl: &FuncDecl) -> bool {
    fn_decl.receiver.is_some() && fn_decl.name.eq_ignore_ascii_case(filename)
}

struct PackageFunctions<'a> {
    func_decls: HashMap<String, &'a FuncDecl>,
    methods: HashMap<String, &'a FuncDecl>,
}

fn collect_package_functions(files: &[File]) -> PackageFunctions<'_> {
    let mut func_decls = HashMap::new();
    let mut methods = HashMap::new();
    for file in files {
        for decl in &file.decls {
            if let Decl::Func(fn_decl) = decl {
                if fn_decl.receiver.is_some() {
                    methods.insert(fn_decl.call_key(), fn_decl);
                } else {
                    func_decls.insert(fn_decl.name.clone(), fn_decl);
                }
            }
        }
    }
    PackageFunctions { func_decls, methods }
}

/// Recursion here is guarded by `visited`, keyed by bare function name
/// (not the receiver-qualified key) — matching the original's
/// `visited[fn.Name.Name]`, a quirk kept verbatim rather than tightened.
#[allow(clippy::too_many_arguments)]
fn analyze_function(
    fn_decl: &FuncDecl,
    pf: &PackageFunctions,
    visited: &mut HashSet<String>,
    err_tracker: &mut ErrorVarTracker,
    err_handler: &mut ErrorHandlerDetector,
    provider_tracker: &mut ProviderTracker,
    errors: &mut Vec<ExitError>,
    returned_providers: &mut HashMap<String, Vec<ProviderCall>>,
) {
    if visited.contains(&fn_decl.name) {
        return;
    }
    visited.insert(fn_decl.name.clone());

    walk_pass1(&fn_decl.body, err_tracker, err_handler, provider_tracker, returned_providers);

    let mut func_providers = Vec::new();
    walk_pass2(
        &fn_decl.body,
        pf,
        visited,
        err_tracker,
        err_handler,
        provider_tracker,
        errors,
        returned_providers,
        &mut func_providers,
    );

    returned_providers.insert(fn_decl.name.clone(), func_providers);
}

fn walk_pass1(
    stmts: &[Stmt],
    err_tracker: &mut ErrorVarTracker,
    err_handler: &mut ErrorHandlerDetector,
    provider_tracker: &mut ProviderTracker,
    returned_providers: &HashMap<String, Vec<ProviderCall>>,
) {
    for stmt in stmts {
        provider_tracker.track(stmt, returned_providers);
        err_tracker.track(stmt);
        if let Stmt::If(if_stmt) = stmt {
            err_handler.inspect(if_stmt, err_tracker);
            walk_pass1(&if_stmt.body, err_tracker, err_handler, provider_tracker, returned_providers);
            walk_pass1(&if_stmt.else_body, err_tracker, err_handler, provider_tracker, returned_providers);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_pass2(
    stmts: &[Stmt],
    pf: &PackageFunctions,
    visited: &mut HashSet<String>,
    err_tracker: &mut ErrorVarTracker,
    err_handler: &mut ErrorHandlerDetector,
    provider_tracker: &mut ProviderTracker,
    errors: &mut Vec<ExitError>,
    returned_providers: &mut HashMap<String, Vec<ProviderCall>>,
    func_providers: &mut Vec<ProviderCall>,
) {
    for stmt in stmts {
        match stmt {
            Stmt::Return(ret) => {
                check_return_statement(ret, err_tracker, provider_tracker, errors);
                for expr in &ret.results {
                    match expr {
                        Expr::Ident(name) => func_providers.extend(provider_tracker.calls_for(name).iter().cloned()),
                        Expr::Call { .. } => {
                            if let Some((provider, method)) = extract_provider_method(expr) {
                                func_providers.push(ProviderCall::new(provider, method));
                            }
                        }
                        _ => {}
                    }
                    walk_expr_calls(expr, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
                }
            }
            Stmt::Assign(assign) => {
                for expr in &assign.rhs {
                    walk_expr_calls(expr, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
                }
            }
            Stmt::Expr(expr) => {
                walk_expr_calls(expr, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            }
            Stmt::If(if_stmt) => {
                walk_expr_calls(&if_stmt.cond, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
                walk_pass2(
                    &if_stmt.body,
                    pf,
                    visited,
                    err_tracker,
                    err_handler,
                    provider_tracker,
                    errors,
                    returned_providers,
                    func_providers,
                );
                walk_pass2(
                    &if_stmt.else_body,
                    pf,
                    visited,
                    err_tracker,
                    err_handler,
                    provider_tracker,
                    errors,
                    returned_providers,
                    func_providers,
                );
            }
            Stmt::Other => {}
        }
    }
}

/// Visits every call expression reachable from `expr` (recursing through
/// selectors, unary/binary operands, and map-literal values), analyzing
/// each one. Mirrors `ast.Inspect` walking every `*ast.CallExpr` node
/// regardless of where it's nested.
#[allow(clippy::too_many_arguments)]
fn walk_expr_calls(
    expr: &Expr,
    pf: &PackageFunctions,
    visited: &mut HashSet<String>,
    err_tracker: &mut ErrorVarTracker,
    err_handler: &mut ErrorHandlerDetector,
    provider_tracker: &mut ProviderTracker,
    errors: &mut Vec<ExitError>,
    returned_providers: &mut HashMap<String, Vec<ProviderCall>>,
) {
    match expr {
        Expr::Call { args, .. } => {
            analyze_call_expression(expr, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            for arg in args {
                walk_expr_calls(arg, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            }
        }
        Expr::Selector { x, .. } | Expr::Unary { x, .. } => {
            walk_expr_calls(x, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
        }
        Expr::Binary { x, y, .. } => {
            walk_expr_calls(x, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            walk_expr_calls(y, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
        }
        Expr::MapLit { entries, .. } => {
            for (_, value) in entries {
                walk_expr_calls(value, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            }
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn analyze_call_expression(
    call: &Expr,
    pf: &PackageFunctions,
    visited: &mut HashSet<String>,
    err_tracker: &mut ErrorVarTracker,
    err_handler: &mut ErrorHandlerDetector,
    provider_tracker: &mut ProviderTracker,
    errors: &mut Vec<ExitError>,
    returned_providers: &mut HashMap<String, Vec<ProviderCall>>,
) {
    let Expr::Call { func, .. } = call else { return };
    match func.as_ref() {
        Expr::Selector { x, sel } => {
            let key = format!("{}.{sel}", expr_to_dotted(x));
            if let Some(decl) = pf.methods.get(&key) {
                analyze_function(decl, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            }
        }
        Expr::Ident(name) => {
            if let Some(decl) = pf.func_decls.get(name) {
                analyze_function(decl, pf, visited, err_tracker, err_handler, provider_tracker, errors, returned_providers);
            }
        }
        _ => {}
    }

    if let Some((provider, method)) = extract_provider_method(call) {
        errors.push(ExitError::provider(provider, method));
    }
}

/// Direct return-statement contributions: `return errsX.YError`, a
/// provider-call or error-var expression, or a tracked identifier
/// (possibly itself carrying provider calls).
fn check_return_statement(
    ret: &ReturnStmt,
    err_tracker: &ErrorVarTracker,
    provider_tracker: &ProviderTracker,
    errors: &mut Vec<ExitError>,
) {
    for expr in &ret.results {
        match expr {
            Expr::Selector { x, sel } => {
                if let Some(code) = sel.strip_suffix("Error") {
                    if let Expr::Ident(ident) = x.as_ref() {
                        if ident.starts_with("errs") {
                            errors.push(ExitError::code(code));
                        }
                    }
                }
            }
            Expr::Call { .. } => {
                if let Some((provider, method)) = extract_provider_method(expr) {
                    errors.push(ExitError::provider(provider, method));
                }
                if let Some(code) = err_tracker.error_code(expr) {
                    errors.push(ExitError::code(code));
                }
            }
            Expr::Ident(name) => {
                if let Some(code) = err_tracker.tracked(name) {
                    errors.push(ExitError::code(code.to_string()));
                }
                for call in provider_tracker.calls_for(name) {
                    errors.push(ExitError::Provider(call.clone()));
                }
            }
            _ => {}
        }
    }
}
