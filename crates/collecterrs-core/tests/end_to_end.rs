//! Runs the full orchestrator over in-memory fixtures modeling the
//! `dummy`/`otp`/`users` services, covering the return-contribution
//! scenarios and cross-cutting invariants end to end rather than at the
//! level of one tracker or analyzer stage.
//!
//! Covers: direct named return, return via a tracked variable, a
//! `WithDetails`-suffixed return, a nested helper call, a storage-provider
//! placeholder resolved in-service (with partial local handling), and a
//! cross-service provider call resolved by the linker.

use collecterrs_core::analyzer::{run_analysis, AnalysisConfig};
use collecterrs_core::ast::{
    AssignStmt, Decl, Expr, File, FuncDecl, IfStmt, InterfaceDecl, ReturnStmt, Stmt,
};
use collecterrs_core::source::{package_path, StaticAstProvider, StaticServiceEnumerator};

const MODULE: &str = "proj";

fn method(name: &str, receiver: &str, body: Vec<Stmt>) -> Decl {
    Decl::Func(FuncDecl { name: name.to_string(), receiver: Some(receiver.to_string()), body })
}

fn file(name: &str, decls: Vec<Decl>) -> File {
    File { name: name.to_string(), decls }
}

fn errors_is(target: Expr) -> Expr {
    Expr::call(Expr::selector(Expr::ident("errors"), "Is"), vec![Expr::ident("err"), target])
}

/// Builds the `dummy` service: a storage package with one function that
/// can exit two ways, and five usecase entry points, one per return
/// scenario (except cross-service linking, covered by `users`/`otp`
/// below).
fn dummy_storage() -> Vec<File> {
    vec![file(
        "storage",
        vec![
            method(
                "GetDummy",
                "s",
                vec![
                    Stmt::If(IfStmt::new(
                        Expr::ident("someCondition"),
                        vec![Stmt::Return(ReturnStmt {
                            results: vec![Expr::errs_selector("errsDummy", "NotFoundError")],
                        })],
                    )),
                    Stmt::Return(ReturnStmt {
                        results: vec![Expr::errs_selector("errsDummy", "AlreadyExistsError")],
                    }),
                ],
            ),
            Decl::InterfaceType(InterfaceDecl {
                name: "DummyErrors".to_string(),
                methods: vec!["NotFoundError".to_string(), "AlreadyExistsError".to_string()],
            }),
        ],
    )]
}

fn dummy_usecase() -> Vec<File> {
    vec![
        // Scenario 1: direct named return.
        file(
            "directreturn",
            vec![method(
                "DirectReturn",
                "u",
                vec![Stmt::Return(ReturnStmt { results: vec![Expr::errs_selector("errsDummy", "DummyError")] })],
            )],
        ),
        // Scenario 2: return via a tracked variable.
        file(
            "viavariable",
            vec![method(
                "ViaVariable",
                "u",
                vec![
                    Stmt::Assign(AssignStmt {
                        lhs: vec![Expr::ident("err")],
                        rhs: vec![Expr::errs_selector("errsDummy", "FooError")],
                    }),
                    Stmt::Return(ReturnStmt { results: vec![Expr::ident("err")] }),
                ],
            )],
        ),
        // Scenario 3: WithDetails-suffixed return.
        file(
            "withdetails",
            vec![method(
                "WithDetails",
                "u",
                vec![Stmt::Return(ReturnStmt {
                    results: vec![Expr::call(
                        Expr::selector(Expr::errs_selector("errsDummy", "BarError"), "WithDetails"),
                        vec![Expr::MapLit {
                            value_type: collecterrs_core::ast::MapValueType::Basic("string".to_string()),
                            entries: vec![(
                                collecterrs_core::ast::MapKey::StringLit("id".to_string()),
                                Expr::BasicString("abc".to_string()),
                            )],
                        }],
                    )],
                })],
            )],
        ),
        // Scenario 4: a nested helper call, followed recursively.
        file(
            "nestedhelper",
            vec![
                method(
                    "NestedHelper",
                    "u",
                    vec![Stmt::Return(ReturnStmt {
                        results: vec![Expr::call(Expr::selector(Expr::ident("u"), "helperFunc"), vec![])],
                    })],
                ),
                method(
                    "helperFunc",
                    "u",
                    vec![Stmt::Return(ReturnStmt { results: vec![Expr::errs_selector("errsDummy", "HelperError")] })],
                ),
            ],
        ),
        // Scenario 5: a storage-provider placeholder resolved in-service,
        // with one of the two storage codes handled locally.
        file(
            "storageplaceholder",
            vec![method(
                "StoragePlaceholder",
                "u",
                vec![
                    Stmt::Assign(AssignStmt {
                        lhs: vec![Expr::ident("_"), Expr::ident("err")],
                        rhs: vec![Expr::provider_call("u", "Storage", "GetDummy", vec![])],
                    }),
                    Stmt::If(IfStmt::new(errors_is(Expr::errs_selector("errsDummy", "NotFoundError")), vec![])),
                    Stmt::Return(ReturnStmt { results: vec![Expr::ident("err")] }),
                ],
            )],
        ),
    ]
}

/// `otp` service: no storage dependency, a single usecase entry point
/// whose error return lives in an `else` branch rather than a plain
/// top-level return, mirroring how the real generate-code usecase nests
/// its attempt-limit error inside an `if ok { ... } else { ... }`.
fn otp_usecase() -> Vec<File> {
    vec![file(
        "generatecode",
        vec![method(
            "GenerateCode",
            "u",
            vec![Stmt::If(IfStmt::with_else(
                Expr::ident("ok"),
                vec![Stmt::Return(ReturnStmt { results: vec![Expr::ident("nil")] })],
                vec![Stmt::Return(ReturnStmt {
                    results: vec![Expr::errs_selector("errsOtp", "TooManyAttemptsError")],
                })],
            ))],
        )],
    )]
}

/// `users` service: scenario 6, a cross-service provider call to `otp`.
fn users_usecase() -> Vec<File> {
    vec![file(
        "login",
        vec![method(
            "Login",
            "u",
            vec![
                Stmt::Assign(AssignStmt {
                    lhs: vec![Expr::ident("err")],
                    rhs: vec![Expr::provider_call("u", "Otp", "GenerateCode", vec![])],
                }),
                Stmt::Return(ReturnStmt { results: vec![Expr::ident("err")] }),
            ],
        )],
    )]
}

fn empty_storage() -> Vec<File> {
    vec![file("storage", vec![])]
}

fn provider_and_enumerator() -> (StaticAstProvider, StaticServiceEnumerator) {
    let provider = StaticAstProvider::new()
        .with_package(package_path(MODULE, "dummy", "storage"), dummy_storage())
        .with_package(package_path(MODULE, "dummy", "usecase"), dummy_usecase())
        .with_package(package_path(MODULE, "otp", "storage"), empty_storage())
        .with_package(package_path(MODULE, "otp", "usecase"), otp_usecase())
        .with_package(package_path(MODULE, "users", "storage"), empty_storage())
        .with_package(package_path(MODULE, "users", "usecase"), users_usecase());
    let enumerator = StaticServiceEnumerator::new(vec!["dummy".to_string(), "otp".to_string(), "users".to_string()]);
    (provider, enumerator)
}

fn config(with_declared_catalog: bool) -> AnalysisConfig {
    AnalysisConfig {
        module_name: MODULE.to_string(),
        services_root: format!("{MODULE}/services"),
        max_link_iterations: Some(32),
        with_declared_catalog,
    }
}

#[test]
fn direct_named_return_is_collected() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert_eq!(
        output.report["dummy"]["DirectReturn"],
        vec![collecterrs_core::model::ExitError::code("Dummy")]
    );
}

#[test]
fn return_via_tracked_variable_is_collected() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert_eq!(
        output.report["dummy"]["ViaVariable"],
        vec![collecterrs_core::model::ExitError::code("Foo")]
    );
}

#[test]
fn with_details_suffixes_the_detail_schema() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert_eq!(
        output.report["dummy"]["WithDetails"],
        vec![collecterrs_core::model::ExitError::code("Bar (id:string)")]
    );
}

#[test]
fn nested_helper_error_is_followed_recursively() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert_eq!(
        output.report["dummy"]["NestedHelper"],
        vec![collecterrs_core::model::ExitError::code("Helper")]
    );
}

#[test]
fn storage_placeholder_resolves_in_service_and_suppresses_handled_code() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    // NotFound is locally handled via errors.Is and must not appear;
    // AlreadyExists is not handled and must survive.
    assert_eq!(
        output.report["dummy"]["StoragePlaceholder"],
        vec![collecterrs_core::model::ExitError::code("AlreadyExists")]
    );
}

#[test]
fn cross_service_provider_call_resolves_to_qualified_code() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert_eq!(
        output.report["users"]["Login"],
        vec![collecterrs_core::model::ExitError::code("otp.TooManyAttempts")]
    );
    assert_eq!(
        output.report["otp"]["GenerateCode"],
        vec![collecterrs_core::model::ExitError::code("TooManyAttempts")]
    );
}

#[test]
fn declared_catalog_is_populated_only_when_requested() {
    let (provider, enumerator) = provider_and_enumerator();

    let without = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert!(without.declared_catalog.is_none());

    let with = run_analysis(&provider, &enumerator, &config(true)).unwrap();
    let catalog = with.declared_catalog.unwrap();
    let dummy_declared = &catalog.0["dummy"];
    assert_eq!(dummy_declared.get("NotFound"), Some(&"NotFoundError".to_string()));
    assert_eq!(dummy_declared.get("AlreadyExists"), Some(&"AlreadyExistsError".to_string()));
    assert!(!catalog.0.contains_key("otp"));
}

#[test]
fn no_final_report_entry_carries_an_unresolved_placeholder() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();

    for usecases in output.report.values() {
        for codes in usecases.values() {
            for code in codes {
                assert!(!code.render().contains('['), "unresolved placeholder leaked into final report: {code:?}");
            }
        }
    }
}

#[test]
fn no_usecase_has_duplicate_error_codes() {
    let (provider, enumerator) = provider_and_enumerator();
    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();

    for (service, usecases) in &output.report {
        for (usecase, codes) in usecases {
            let mut seen = std::collections::HashSet::new();
            for code in codes {
                assert!(seen.insert(code.render()), "duplicate code in {service}.{usecase}: {code:?}");
            }
        }
    }
}

#[test]
fn running_analysis_twice_produces_identical_reports() {
    let (provider, enumerator) = provider_and_enumerator();
    let first = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    let second = run_analysis(&provider, &enumerator, &config(false)).unwrap();

    let first_json = collecterrs_core::report::report_to_json(&first.report).unwrap();
    let second_json = collecterrs_core::report::report_to_json(&second.report).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn provider_call_to_an_unknown_service_is_dropped_not_fabricated() {
    let provider = StaticAstProvider::new()
        .with_package(package_path(MODULE, "dummy", "storage"), empty_storage())
        .with_package(
            package_path(MODULE, "dummy", "usecase"),
            vec![file(
                "external",
                vec![method(
                    "External",
                    "u",
                    vec![
                        Stmt::Assign(AssignStmt {
                            lhs: vec![Expr::ident("err")],
                            rhs: vec![Expr::provider_call("u", "Redis", "Get", vec![])],
                        }),
                        Stmt::Return(ReturnStmt { results: vec![Expr::ident("err")] }),
                    ],
                )],
            )],
        );
    let enumerator = StaticServiceEnumerator::new(vec!["dummy".to_string()]);

    let output = run_analysis(&provider, &enumerator, &config(false)).unwrap();
    assert!(output.report["dummy"]["External"].is_empty());
}
