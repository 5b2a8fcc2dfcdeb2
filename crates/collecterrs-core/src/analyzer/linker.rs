//! Fixed-point resolution of cross-service provider placeholders into
//! concrete, service-qualified error codes.

use std::collections::HashMap;

use snafu::Snafu;

use crate::model::{dedup_push, ErrorCode, ExitError, HandledSet, PackageErrors};
use crate::naming::to_camel_case;

#[derive(Debug, Snafu)]
pub enum LinkError {
    #[snafu(display("cross-service linking did not converge after {iterations} iterations"))]
    NonConvergence { iterations: usize },
}

/// `errs[service][usecase]` in place, plus the per-(service, usecase)
/// handled-code sets recorded during package analysis, used to suppress
/// nested errors the caller already handles locally.
pub fn link_provider_errors(
    errs: &mut HashMap<String, PackageErrors>,
    handled: &HashMap<String, HashMap<String, HandledSet>>,
    max_iterations: usize,
) -> Result<(), LinkError> {
    let mut iterations = 0;
    loop {
        let mut link_exists = false;
        iterations += 1;
        if iterations > max_iterations {
            return Err(LinkError::NonConvergence { iterations: iterations - 1 });
        }

        let service_names: Vec<String> = errs.keys().cloned().collect();
        for service_name in &service_names {
            let usecase_names: Vec<String> =
                errs.get(service_name).map(|m| m.keys().cloned().collect()).unwrap_or_default();

            for usecase_name in &usecase_names {
                let usecase_errs = errs[service_name][usecase_name].clone();
                let mut new_errs = Vec::new();

                for usecase_err in &usecase_errs {
                    let ExitError::Provider(call) = usecase_err else {
                        new_errs.push(usecase_err.clone());
                        continue;
                    };

                    let nested_service_name = to_camel_case(&call.provider);
                    let Some(nested_service) = errs.get(&nested_service_name) else {
                        // External provider, not one of our own services —
                        // it definitely won't return named errors.
                        continue;
                    };
                    let Some(nested_errs) = nested_service.get(&call.method) else {
                        continue;
                    };

                    for nested_err in nested_errs {
                        // A caller's HandledSet records bare codes (no detail
                        // suffix), so the nested error must be stripped the
                        // same way before the lookup.
                        let bare_code = ErrorCode::new(nested_err.render()).bare().to_string();
                        let already_handled = handled
                            .get(service_name)
                            .and_then(|m| m.get(usecase_name))
                            .is_some_and(|set| set.contains(&bare_code));
                        if already_handled {
                            continue;
                        }

                        if nested_err.is_placeholder() {
                            link_exists = true;
                            new_errs.push(nested_err.clone());
                        } else {
                            new_errs.push(ExitError::code(format!("{nested_service_name}.{}", nested_err.render())));
                        }
                    }
                }

                let mut deduped = Vec::new();
                for e in new_errs {
                    dedup_push(&mut deduped, e);
                }
                errs.get_mut(service_name).unwrap().insert(usecase_name.clone(), deduped);
            }
        }

        if !link_exists {
            return Ok(());
        }
    }
}
