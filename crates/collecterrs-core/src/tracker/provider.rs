//! Binds variable names to the provider calls they (transitively) came
//! from.

use std::collections::HashMap;

use crate::ast::{expr_to_dotted, Expr, Stmt};
use crate::model::ProviderCall;

#[derive(Debug, Default)]
pub struct ProviderTracker {
    calls: HashMap<String, Vec<ProviderCall>>,
}

impl ProviderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls_for(&self, name: &str) -> &[ProviderCall] {
        self.calls.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `returned_providers` is the orchestrator-owned cache of
    /// `function name -> provider calls reachable from its returns`
    /// consulted here to propagate providers through
    /// intermediate helper calls.
    pub fn track(&mut self, node: &Stmt, returned_providers: &HashMap<String, Vec<ProviderCall>>) {
        let Stmt::Assign(assign) = node else { return };

        for rhs in &assign.rhs {
            let Expr::Call { .. } = rhs else { continue };

            if let Some(func_name) = func_name(rhs) {
                if let Some(providers) = returned_providers.get(&func_name) {
                    for lhs in &assign.lhs {
                        if let Expr::Ident(name) = lhs {
                            self.calls.entry(name.clone()).or_default().extend(providers.iter().cloned());
                        }
                    }
                }
            }

            if let Some((provider, method)) = extract_provider_method(rhs) {
                for lhs in &assign.lhs {
                    if let Expr::Ident(name) = lhs {
                        self.calls
                            .entry(name.clone())
                            .or_default()
                            .push(ProviderCall::new(provider.clone(), method.clone()));
                    }
                }
            }
        }
    }
}

fn func_name(call: &Expr) -> Option<String> {
    let Expr::Call { func, .. } = call else { return None };
    match func.as_ref() {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Selector { x, sel } => Some(format!("{}.{sel}", expr_to_dotted(x))),
        _ => None,
    }
}

/// Matches `receiver.Providers.<ProviderName>.<MethodName>(...)` — a
/// selector chain whose second-from-top selector is literally `Providers`.
pub fn extract_provider_method(call: &Expr) -> Option<(String, String)> {
    let Expr::Call { func, .. } = call else { return None };
    let Expr::Selector { x: provider_sel, sel: method } = func.as_ref() else { return None };
    let Expr::Selector { x: providers_sel, sel: provider } = provider_sel.as_ref() else { return None };
    let Expr::Selector { sel: providers_literal, .. } = providers_sel.as_ref() else { return None };
    if providers_literal != "Providers" {
        return None;
    }
    Some((provider.clone(), method.clone()))
}
