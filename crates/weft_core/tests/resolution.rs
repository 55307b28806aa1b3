//! Error reporting and resolution limits of compiled containers.

use weft_core::prelude::*;

fn compile(module: Module) -> Container {
    Compiler::with_modules(module).build_container()
}

// ═══════════════════════════════════════════════════════════════════════════════
// MISSING SERVICES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn missing_dependency_reports_the_path() {
    let c = compile(
        Module::new()
            .with("app", factory(|db: i32| db, deps!["db"]))
            .with("db", factory(|url: String| url.len(), deps!["url"])),
    );

    let err = c.get("app").unwrap_err();
    let Error::NotFound { id, trail } = &err else {
        panic!("expected NotFound, got {err:?}");
    };
    assert_eq!(id.as_str(), "url");
    assert_eq!(trail.to_string(), "app -> db -> url");
    assert_eq!(
        err.to_string(),
        "service \"url\" not found (stack: app -> db -> url)"
    );
}

#[test]
fn failed_builds_are_retried() {
    let mut compiler = Compiler::new();
    compiler.add_module(Module::new().with("b", factory(|a: i32| a, deps!["a"])));
    let c = compiler.build_container();

    assert!(c.get("b").unwrap_err().is_not_found());
    assert!(!c.is_cached("b"));
    // The stack unwinds after the failure, so the next request starts clean.
    assert!(c.get("b").unwrap_err().to_string().ends_with("(stack: b -> a)"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// USER ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
#[error("port {0} is reserved")]
struct ReservedPort(u16);

#[test]
fn factory_errors_propagate_unchanged() {
    let c = compile(Module::new().with("port", value(22_u16)).with(
        "listener",
        try_factory(
            |port: u16| {
                if port < 1024 {
                    Err(Error::custom(ReservedPort(port)))
                } else {
                    Ok(port)
                }
            },
            deps!["port"],
        ),
    ));

    let err = c.get("listener").unwrap_err();
    assert_eq!(err.to_string(), "port 22 is reserved");
    let Error::Build(inner) = err else {
        panic!("expected a build error");
    };
    assert!(inner.downcast_ref::<ReservedPort>().is_some());
}

#[test]
fn wrong_type_is_a_mismatch() {
    let c = compile(Module::new().with("n", value(1_i32)));
    assert!(matches!(
        c.get_as::<String>("n"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn extension_errors_leave_service_unbuilt() {
    let c = compile(
        Module::new().with("n", value(1_i32)).with_anonymous(extend(
            "n",
            try_bind(|_: i32| Err::<i32, _>(Error::custom("rejected")), deps![]),
        )),
    );

    assert_eq!(c.get("n").unwrap_err().to_string(), "rejected");
    assert!(!c.is_cached("n"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPTH LIMIT
// ═══════════════════════════════════════════════════════════════════════════════

fn chain(len: usize) -> Module {
    let mut module = Module::new().with("s0", value(0_usize));
    for i in 1..len {
        let prev = format!("s{}", i - 1);
        module = module.with(format!("s{i}"), factory(|n: usize| n + 1, deps![prev]));
    }
    module
}

#[test]
fn deep_chains_resolve_without_limit() {
    let c = compile(chain(200));
    assert_eq!(c.get_as::<usize>("s199").unwrap(), 199);
}

#[test]
fn depth_limit_stops_long_chains() {
    let c = Compiler::with_modules(chain(10))
        .build_container_with(ContainerConfig::new().with_max_depth(4));

    assert_eq!(c.get_as::<usize>("s3").unwrap(), 3);
    assert!(matches!(
        c.get("s9"),
        Err(Error::DepthLimitExceeded { depth: 5, max: 4 })
    ));
    assert!(!c.is_cached("s9"));
}

#[test]
fn cached_values_bypass_the_limit() {
    let c = Compiler::with_modules(chain(6))
        .build_container_with(ContainerConfig::new().with_max_depth(3));

    // Bottom-up, every dependency is already cached.
    for i in 0..6 {
        assert_eq!(c.get_as::<usize>(&format!("s{i}")).unwrap(), i);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INLINE DEPENDENCIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn inline_dependencies_are_not_registered() {
    let c = compile(Module::new().with("port", value(8080_u16)).with(
        "addr",
        template("{}:{}", deps![value("localhost"), "port"]),
    ));

    assert_eq!(c.get_as::<String>("addr").unwrap(), "localhost:8080");
    assert_eq!(c.len(), 2);
}

#[test]
fn collect_and_invoke_compose() {
    let c = compile(
        Module::new()
            .with("a", value(1_i32))
            .with("b", value(2_i32))
            .with("all", collect(deps!["a", "b"]))
            .with(
                "sum",
                callback(
                    |values: Vec<Value>| {
                        values
                            .iter()
                            .filter_map(|v| v.downcast_ref::<i32>())
                            .sum::<i32>()
                    },
                    deps![],
                ),
            )
            .with("total", invoke("sum", deps!["all"])),
    );

    assert_eq!(c.get_as::<i32>("total").unwrap(), 3);
}

#[test]
fn aliases_share_the_target_value() {
    let c = compile(
        Module::new()
            .with("primary", factory(|| String::from("pg"), deps![]))
            .with("db", alias("primary")),
    );

    let a = c.get("primary").unwrap();
    let b = c.get("db").unwrap();
    assert!(Value::ptr_eq(&a, &b));
}
