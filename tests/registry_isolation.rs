//! Integration tests for registry isolation and multiple registries.
//!
//! Interfaces, metadata and resolvers all belong to one registry; the same
//! names and types can be wired differently in each.

use inclined_registry::{define_registry, Args, Component, Managed, Registry, RegistryError};
use std::sync::Arc;

trait Backend: Send + Sync {
    fn url(&self) -> &'static str;
}

struct Postgres;

impl Backend for Postgres {
    fn url(&self) -> &'static str {
        "postgresql://localhost"
    }
}

impl Managed for Postgres {}

impl Component for Postgres {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Postgres)
    }
}

struct Redis;

impl Backend for Redis {
    fn url(&self) -> &'static str {
        "redis://localhost"
    }
}

impl Managed for Redis {}

impl Component for Redis {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Redis)
    }
}

/// Wraps whatever `Backend` its registry provides.
struct Service {
    backend: Arc<dyn Backend>,
}

impl Managed for Service {}

impl Component for Service {
    fn construct(args: &Args) -> Result<Self, RegistryError> {
        Ok(Service {
            backend: args.required(0)?,
        })
    }
}

#[test]
fn test_multiple_isolated_registries() {
    define_registry!(database);
    define_registry!(cache);
    define_registry!(config);

    database::named::<dyn Backend>("Backend").provider::<Postgres>(|it| it);
    cache::named::<dyn Backend>("Backend").provider::<Redis>(|it| it);

    assert_eq!(
        database::named::<dyn Backend>("Backend").get_instance().unwrap().url(),
        "postgresql://localhost"
    );
    assert_eq!(
        cache::named::<dyn Backend>("Backend").get_instance().unwrap().url(),
        "redis://localhost"
    );
    assert!(config::named::<dyn Backend>("Backend").get_instance().is_err());
}

#[test]
fn test_metadata_is_per_registry() {
    define_registry!(reg_a);
    define_registry!(reg_b);

    let backend_a = reg_a::named::<dyn Backend>("Backend");
    let backend_b = reg_b::named::<dyn Backend>("Backend");
    backend_a.provider::<Postgres>(|it| it);
    backend_b.provider::<Redis>(|it| it);
    reg_a::describe::<Service>().required(0, "backend", &backend_a);

    let service = reg_a::build_instance::<Service>().unwrap();
    assert_eq!(service.backend.url(), "postgresql://localhost");

    // reg_b knows Service's type but not its params
    assert_eq!(
        reg_b::build_instance::<Service>().err().unwrap(),
        RegistryError::UndeclaredParam {
            owner: "Service".into(),
            index: 0,
        }
    );
}

#[test]
fn test_same_singleton_type_different_registries() {
    define_registry!(reg_a);
    define_registry!(reg_b);

    reg_a::named::<dyn Backend>("Backend").provider::<Redis>(|it| it);
    reg_b::named::<dyn Backend>("Backend").provider::<Redis>(|it| it);

    let a = reg_a::named::<dyn Backend>("Backend").get_instance().unwrap();
    let b = reg_b::named::<dyn Backend>("Backend").get_instance().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_owned_registry() {
    let registry = Registry::new();
    let other = Registry::default();

    registry.named::<dyn Backend>("Backend").provider::<Postgres>(|it| it);

    assert!(registry.named::<dyn Backend>("Backend").get_instance().is_ok());
    assert!(other.named::<dyn Backend>("Backend").get_instance().is_err());
}

#[test]
fn test_registry_shared_across_threads() {
    define_registry!(threaded);

    threaded::named::<dyn Backend>("Backend").provider::<Postgres>(|it| it);
    // construction itself is not serialized across threads; build before sharing
    let first = threaded::named::<dyn Backend>("Backend").get_instance().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| threaded::named::<dyn Backend>("Backend").get_instance().unwrap())
        })
        .collect();
    let instances: Vec<Arc<dyn Backend>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &first));
    }
}
