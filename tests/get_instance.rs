//! Integration tests for resolving interfaces to singletons.
//!
//! Each test defines its own registry with `define_registry!`, so registrations
//! never leak between tests and they can run in parallel.

use inclined_registry::{define_registry, Args, Component, Managed, RegistryError};
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

trait Shape: Send + Sync {
    fn label(&self) -> String;
}

struct Simple;

impl Shape for Simple {
    fn label(&self) -> String {
        "simple".into()
    }
}

impl Managed for Simple {}

impl Component for Simple {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Simple)
    }
}

struct Square;

impl Shape for Square {
    fn label(&self) -> String {
        "square".into()
    }
}

impl Managed for Square {}

impl Component for Square {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Square)
    }
}

/// Takes a required `Shape` and an optional `Shape` that nothing provides.
struct Complex {
    inner: Arc<dyn Shape>,
    extra: Option<Arc<dyn Shape>>,
}

impl Shape for Complex {
    fn label(&self) -> String {
        format!("complex({})", self.inner.label())
    }
}

impl Managed for Complex {}

impl Component for Complex {
    fn construct(args: &Args) -> Result<Self, RegistryError> {
        Ok(Complex {
            inner: args.required(0)?,
            extra: args.optional(1)?,
        })
    }
}

struct Unbuildable {
    _missing: Arc<dyn Shape>,
}

impl Managed for Unbuildable {}

impl Component for Unbuildable {
    fn construct(args: &Args) -> Result<Self, RegistryError> {
        Ok(Unbuildable {
            _missing: args.required(0)?,
        })
    }
}

struct Failing;

impl Managed for Failing {}

impl Component for Failing {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Err(RegistryError::NoProvider {
            interface: "Failing".into(),
        })
    }
}

impl Shape for Failing {
    fn label(&self) -> String {
        unreachable!()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_no_providers() {
    define_registry!(reg);

    let err = reg::named::<dyn Shape>("NoImpls").get_instance().err().unwrap();
    assert_eq!(err.to_string(), "No implementations known for NoImpls");
    assert!(reg::named::<dyn Shape>("NoImpls").get_instances().unwrap().is_empty());
}

#[test]
fn test_singleton_identity() {
    define_registry!(reg);

    let shape = reg::named::<dyn Shape>("Simple");
    shape.provider::<Simple>(|it| it);

    let first = shape.get_instance().unwrap();
    let second = reg::named::<dyn Shape>("Simple").get_instance().unwrap();
    assert_eq!(first.label(), "simple");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_constructor_params() {
    define_registry!(reg);

    let simple = reg::named::<dyn Shape>("Simple");
    let missing = reg::named::<dyn Shape>("Missing");
    let complex = reg::named::<dyn Shape>("Complex");
    simple.provider::<Simple>(|it| it);
    complex.provider::<Complex>(|it| it);
    reg::describe::<Complex>()
        .optional(1, "extra", &missing)
        .required(0, "inner", &simple);

    let built = reg::build_instance::<Complex>().unwrap();
    assert!(Arc::ptr_eq(&built.inner, &simple.get_instance().unwrap()));
    assert!(built.extra.is_none());

    assert_eq!(complex.get_instance().unwrap().label(), "complex(simple)");
}

#[test]
fn test_missing_required_param() {
    define_registry!(reg);

    let missing = reg::named::<dyn Shape>("NoImpls");
    reg::describe::<Unbuildable>().required(0, "missing", &missing);
    let unbuildable = reg::named::<Unbuildable>("Unbuildable");
    unbuildable.provider::<Unbuildable>(|it| it);

    let err = unbuildable.get_instance().err().unwrap();
    assert_eq!(
        err,
        RegistryError::MissingDependency {
            owner: "Unbuildable".into(),
            interface: "NoImpls".into(),
        }
    );
    assert_eq!(err.to_string(), "Could not construct Unbuildable param NoImpls");
}

#[test]
fn test_undeclared_param() {
    define_registry!(reg);

    // Complex reads index 0 and 1 but nothing was declared for it here
    let err = reg::build_instance::<Complex>().err().unwrap();
    assert_eq!(
        err,
        RegistryError::UndeclaredParam {
            owner: "Complex".into(),
            index: 0,
        }
    );
}

#[test]
fn test_ambiguous_sources() {
    define_registry!(reg);

    let many = reg::named::<dyn Shape>("ManyImpl");
    many.provider::<Square>(|it| it);
    many.provider::<Simple>(|it| it);

    let err = many.get_instance().err().unwrap();
    assert_eq!(
        err.to_string(),
        "More than one source of ManyImpl: Simple, Square"
    );
    assert_eq!(many.get_instances().unwrap().len(), 2);
}

#[test]
fn test_delayed_source_loses_to_normal_one() {
    define_registry!(reg);

    let many = reg::named::<dyn Shape>("ManyImpl");
    many.delayed().provider::<Square>(|it| it);
    many.provider::<Simple>(|it| it);

    assert_eq!(many.get_instance().unwrap().label(), "simple");
}

#[test]
fn test_only_delayed_source_is_used() {
    define_registry!(reg);

    let fallback = reg::named::<dyn Shape>("Fallback");
    fallback.delayed().provider::<Square>(|it| it);

    assert_eq!(fallback.get_instance().unwrap().label(), "square");
}

#[test]
fn test_get_instances_orders_delayed_last() {
    define_registry!(reg);

    let many = reg::named::<dyn Shape>("ManyImpl");
    many.delayed().provider::<Square>(|it| it);
    many.provider::<Simple>(|it| it);

    let labels: Vec<String> = many
        .get_instances()
        .unwrap()
        .iter()
        .map(|s| s.label())
        .collect();
    assert_eq!(labels, ["simple", "square"]);
    assert_eq!(many.source_names(), ["Square", "Simple"]);
}

#[test]
fn test_get_instances_shares_singletons() {
    define_registry!(reg);

    let shape = reg::named::<dyn Shape>("Simple");
    shape.provider::<Simple>(|it| it);

    let single = shape.get_instance().unwrap();
    let all = shape.get_instances().unwrap();
    assert_eq!(all.len(), 1);
    assert!(Arc::ptr_eq(&single, &all[0]));
}

#[test]
fn test_reset_builds_new_instance() {
    define_registry!(reg);

    let shape = reg::named::<dyn Shape>("Simple");
    shape.provider::<Simple>(|it| it);

    let before = shape.get_instance().unwrap();
    shape.reset_cached_implementations();
    let after = shape.get_instance().unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(shape.source_names(), ["Simple"]);
}

#[test]
fn test_failed_construction_propagates() {
    define_registry!(reg);

    let shape = reg::named::<dyn Shape>("Failing");
    shape.provider::<Failing>(|it| it);

    assert_eq!(
        shape.get_instance().err().unwrap(),
        RegistryError::NoProvider {
            interface: "Failing".into()
        }
    );
}

#[test]
fn test_type_mismatch_between_handles() {
    define_registry!(reg);

    reg::named::<dyn Shape>("Shared").provider::<Simple>(|it| it);
    let err = reg::named::<Simple>("Shared").get_instance().err().unwrap();
    assert!(matches!(err, RegistryError::TypeMismatch { .. }));
}
