//! Instance resolver example for inclined-registry.
//!
//! Demonstrates replacing singletons in tests without touching registrations:
//! a resolver registered at normal priority answers for the interfaces it
//! knows and leaves everything else to the default resolver.
//!
//! Run with: `cargo run --example resolver_override`

use inclined_registry::{
    define_registry, wrap, Args, Component, CoreActions, Instance, InstanceResolver,
    InterfaceEntry, Managed, RegistryError,
};
use std::collections::HashMap;
use std::sync::Arc;

define_registry!(app);

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

impl Managed for SystemClock {}

impl Component for SystemClock {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(SystemClock)
    }
}

struct FrozenClock(u64);

impl Clock for FrozenClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Serves fixed instances by interface name.
struct Fixtures {
    by_name: HashMap<&'static str, Instance>,
}

impl InstanceResolver for Fixtures {
    fn many(&self, interface: &InterfaceEntry, actions: &dyn CoreActions) -> Result<Vec<Instance>, RegistryError> {
        Ok(self.maybe_one(interface, actions)?.into_iter().collect())
    }

    fn maybe_one(&self, interface: &InterfaceEntry, _actions: &dyn CoreActions) -> Result<Option<Instance>, RegistryError> {
        Ok(self.by_name.get(interface.name()).cloned())
    }
}

fn main() -> Result<(), RegistryError> {
    println!("=== Resolver Override Example ===\n");

    let clock = app::named::<dyn Clock>("Clock");
    clock.provider::<SystemClock>(|it| it);

    println!("Active resolvers: {:?}", app::instance_resolvers().source_names());

    app::instance_resolvers().supplier("Fixtures", "frozen", |_| {
        let mut by_name = HashMap::new();
        by_name.insert("Clock", wrap::<dyn Clock>(Arc::new(FrozenClock(1_700_000_000))));
        Ok(Arc::new(Fixtures { by_name }))
    });
    println!("Active resolvers: {:?}", app::instance_resolvers().source_names());

    println!("Clock says: {}", clock.get_instance()?.now());

    println!("\n=== Example Complete ===");
    Ok(())
}
