//! Trait contracts example for inclined-registry.
//!
//! Demonstrates the **contract-based dependency injection** pattern:
//! - Define traits (contracts) that specify behavior
//! - Register several implementations of one contract
//! - Let delayed (default) implementations step aside for real ones
//! - Fill late properties after construction
//!
//! Run with: `cargo run --example trait_contracts`

use inclined_registry::{define_registry, Args, Component, Injected, Managed, RegistryError};
use std::sync::Arc;

// Create an isolated registry for this example
define_registry!(services);

// =============================================================================
// Contract Definitions (Traits)
// =============================================================================

/// Contract for a logging service.
trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn name(&self) -> &str;
}

/// Contract for a notification service.
trait Notifier: Send + Sync {
    fn notify(&self, recipient: &str, message: &str);
}

// =============================================================================
// Concrete Implementations
// =============================================================================

/// Fallback logger, registered as delayed.
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("[CONSOLE] {message}");
    }

    fn name(&self) -> &str {
        "ConsoleLogger"
    }
}

impl Managed for ConsoleLogger {}

impl Component for ConsoleLogger {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(ConsoleLogger)
    }
}

/// File-based logger implementation (simulated).
struct FileLogger {
    path: String,
}

impl Logger for FileLogger {
    fn log(&self, message: &str) {
        println!("[FILE:{}] {message}", self.path);
    }

    fn name(&self) -> &str {
        "FileLogger"
    }
}

/// Email notifier whose logger arrives after construction.
#[derive(Default)]
struct EmailNotifier {
    logger: Injected<dyn Logger>,
}

impl Notifier for EmailNotifier {
    fn notify(&self, recipient: &str, message: &str) {
        if let Some(logger) = self.logger.get() {
            logger.log(&format!("mail to {recipient}"));
        }
        println!("[EMAIL] To: {recipient} - {message}");
    }
}

impl Managed for EmailNotifier {
    fn post_construct(&self) {
        println!("EmailNotifier ready (logger set: {})", self.logger.is_set());
    }
}

impl Component for EmailNotifier {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(EmailNotifier::default())
    }
}

fn main() -> Result<(), RegistryError> {
    println!("=== Trait Contracts Example ===\n");

    let logger = services::named::<dyn Logger>("Logger");
    let notifier = services::named::<dyn Notifier>("Notifier");

    // The console logger is only a default
    logger.delayed().provider::<ConsoleLogger>(|it| it);
    println!("Logger in use: {}", logger.get_instance()?.name());

    // A real logger wins once registered; reset drops the cached default
    logger.supplier("Logging", "file", |_| {
        Ok(Arc::new(FileLogger {
            path: "/var/log/app.log".into(),
        }))
    });
    logger.reset_cached_implementations();
    println!("Logger in use: {}", logger.get_instance()?.name());

    let all: Vec<String> = logger
        .get_instances()?
        .iter()
        .map(|l| l.name().to_string())
        .collect();
    println!("All loggers: {all:?}\n");

    notifier.provider::<EmailNotifier>(|it| it);
    services::describe::<EmailNotifier>().inject("logger", &logger, |it| &it.logger);
    notifier.get_instance()?.notify("ops@example.com", "deploy finished");

    println!("\n=== Example Complete ===");
    Ok(())
}
