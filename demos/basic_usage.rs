//! Basic usage example for inclined-registry.
//!
//! Demonstrates:
//! - Registering a provider against a named interface
//! - Declaring constructor params
//! - Lazy, memoized construction
//!
//! Run with: `cargo run --example basic_usage`

use inclined_registry::{describe, named, Args, Component, Managed, RegistryError};
use std::sync::Arc;

trait Config: Send + Sync {
    fn database_url(&self) -> String;
}

trait Repository: Send + Sync {
    fn describe(&self) -> String;
}

struct StaticConfig;

impl Config for StaticConfig {
    fn database_url(&self) -> String {
        "postgresql://localhost/app".into()
    }
}

impl Managed for StaticConfig {}

impl Component for StaticConfig {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        println!("  (building StaticConfig)");
        Ok(StaticConfig)
    }
}

struct UserRepository {
    config: Arc<dyn Config>,
}

impl Repository for UserRepository {
    fn describe(&self) -> String {
        format!("users at {}", self.config.database_url())
    }
}

impl Managed for UserRepository {}

impl Component for UserRepository {
    fn construct(args: &Args) -> Result<Self, RegistryError> {
        println!("  (building UserRepository)");
        Ok(UserRepository {
            config: args.required(0)?,
        })
    }
}

fn main() -> Result<(), RegistryError> {
    println!("=== Basic Usage Example ===\n");

    let config = named::<dyn Config>("Config");
    let repository = named::<dyn Repository>("Repository");

    // 1. Register providers; nothing is built yet
    println!("1. Registering providers...");
    config.provider::<StaticConfig>(|it| it);
    repository.provider::<UserRepository>(|it| it);
    describe::<UserRepository>().required(0, "config", &config);
    println!("   Repository sources: {:?}\n", repository.source_names());

    // 2. First request builds the whole graph
    println!("2. First request...");
    let first = repository.get_instance()?;
    println!("   {}\n", first.describe());

    // 3. Later requests return the same singleton
    println!("3. Second request...");
    let second = repository.get_instance()?;
    println!("   Same instance: {}\n", Arc::ptr_eq(&first, &second));

    // 4. Missing providers are reported by name
    println!("4. Unknown interface...");
    match named::<dyn Config>("Secrets").get_instance() {
        Ok(_) => println!("   unexpected provider"),
        Err(e) => println!("   Error: {e}"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
