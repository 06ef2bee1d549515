//! # Inclined Registry
//!
//! A thread-safe dependency injection registry built around named interfaces.
//!
//! Implementations are registered against an interface by name and built on
//! first request, once. Their dependencies are resolved the same way, either as
//! constructor params or, after construction, as late-injected properties.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use inclined_registry::{named, Args, Component, Managed, RegistryError};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct Frozen;
//!
//! impl Clock for Frozen {
//!     fn now(&self) -> u64 {
//!         1_700_000_000
//!     }
//! }
//!
//! impl Managed for Frozen {}
//!
//! impl Component for Frozen {
//!     fn construct(_args: &Args) -> Result<Self, RegistryError> {
//!         Ok(Frozen)
//!     }
//! }
//!
//! let clock = named::<dyn Clock>("QuickStartClock");
//! clock.provider::<Frozen>(|it| it);
//!
//! let a: Arc<dyn Clock> = clock.get_instance().unwrap();
//! let b = clock.get_instance().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(a.now(), 1_700_000_000);
//! ```
//!
//! ## Features
//!
//! - **Lazy singletons**: every source is built at most once, on first request
//! - **Cycle detection**: constructor cycles fail, property cycles resolve
//! - **Three kinds of sources**: constructed types, supplier functions and
//!   accessor methods of another component
//! - **Priorities**: sources registered through [`InterfaceType::delayed`] only
//!   win when nothing else is available
//! - **Pluggable resolution**: [`InstanceResolver`]s registered in the registry
//!   itself decide how an interface maps to instances
//! - **Tracing support**: `tracing` spans plus an optional [`RegistryEvent`]
//!   callback
//!
//! ## Main Functions
//!
//! - [`named`] - Find or create an interface of the process-wide registry
//! - [`describe`] - Declare constructor params, properties and base type
//! - [`describe_method`] - Declare params of a supplier or accessor
//! - [`build_instance`] - Build a non-registered type with full injection
//! - [`instance_resolvers`] - The interface resolvers are registered against
//! - [`set_trace_callback`] - Set up tracing for registry operations

mod args;
mod interface;
mod lifecycle;
mod macros;
mod metadata;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;
mod resolution;
mod resolver;
mod source;

pub use args::Args;
pub use interface::{InterfaceEntry, InterfaceType};
pub use lifecycle::{downcast, wrap, Built, Instance, Lifecycle, ServiceState};
pub use metadata::{
    Injected, ManagedProperty, MetadataStore, MethodBuilder, Mutator, Param, TypeBuilder,
};
pub use registry::{
    build_instance, clear_trace_callback, describe, describe_method, global, instance_resolvers,
    named, set_trace_callback, Registry, TraceCallback,
};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
pub use registry_trait::RegistryApi;
pub use resolver::{CoreActions, DefaultInstanceResolver, InstanceResolver, INSTANCE_RESOLVER};
pub use source::{
    AccessedDefinition, Component, ConstructedDefinition, Managed, Method, SourceDefinition,
    SuppliedDefinition,
};
