//! The registry context and the process-wide registry.
//!
//! A [`Registry`] interns interface names, stores injection metadata and seeds
//! the default instance resolver. Most applications use the process-wide one
//! through the free functions of this module; tests and embedders can create
//! their own with [`Registry::new`] or [`define_registry!`](crate::define_registry).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use inclined_registry::{Args, Component, Managed, Registry, RegistryError};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello".into()
//!     }
//! }
//!
//! impl Managed for English {}
//!
//! impl Component for English {
//!     fn construct(_args: &Args) -> Result<Self, RegistryError> {
//!         Ok(English)
//!     }
//! }
//!
//! let registry = Registry::new();
//! let greeter = registry.named::<dyn Greeter>("Greeter");
//! greeter.provider::<English>(|it| it);
//!
//! let first = greeter.get_instance().unwrap();
//! let second = greeter.get_instance().unwrap();
//! assert_eq!(first.greet(), "Hello");
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use tracing::debug;

use crate::interface::{InterfaceEntry, InterfaceType};
use crate::lifecycle::downcast;
use crate::metadata::{MetadataStore, MethodBuilder, TypeBuilder};
use crate::resolver::{DefaultInstanceResolver, InstanceResolver, INSTANCE_RESOLVER};
use crate::source::{short_type_name, Component, ConstructedDefinition};
use crate::{RegistryError, RegistryEvent};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time a source
/// is registered, built or reset, and every time an interface is resolved.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Dependency-injection registry: interned interfaces, metadata and resolvers.
pub struct Registry {
    types: Mutex<HashMap<String, Arc<InterfaceEntry>>>,
    metadata: MetadataStore,
    trace: Mutex<Option<Arc<TraceCallback>>>,
    default_resolver: Arc<dyn InstanceResolver>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry with the default instance resolver already in place.
    pub fn new() -> Self {
        let default = Arc::new(DefaultInstanceResolver);
        let registry = Self {
            types: Mutex::new(HashMap::new()),
            metadata: MetadataStore::new(),
            trace: Mutex::new(None),
            default_resolver: default.clone(),
        };

        // Resolving the resolvers needs a resolver, so the default one is
        // registered with its instance already built.
        let seeded = ConstructedDefinition::<DefaultInstanceResolver, dyn InstanceResolver>::new(
            true,
            |it| it,
        )
        .seeded(default);
        registry.intern(INSTANCE_RESOLVER).push(Arc::new(seeded));
        debug!("seeded default instance resolver");

        registry
    }

    fn intern(&self, name: &str) -> Arc<InterfaceEntry> {
        let mut types = self.types.lock().unwrap_or_else(|p| p.into_inner());
        types
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InterfaceEntry::new(name)))
            .clone()
    }

    /// Find or create the interface called `name`.
    ///
    /// The same name always yields the same underlying entry, whatever `I` is
    /// requested; reading it back as a different `I` fails with `TypeMismatch`.
    pub fn named<I: ?Sized>(&self, name: &str) -> InterfaceType<'_, I> {
        InterfaceType::new(self, self.intern(name))
    }

    /// The interface through which instance resolvers are looked up.
    pub fn instance_resolvers(&self) -> InterfaceType<'_, dyn InstanceResolver> {
        self.named(INSTANCE_RESOLVER)
    }

    /// The resolver seeded at creation.
    pub fn default_instance_resolver(&self) -> Arc<dyn InstanceResolver> {
        self.default_resolver.clone()
    }

    /// Declare constructor params, late properties and base type of `T`.
    pub fn describe<T: Any + Send + Sync>(&self) -> TypeBuilder<'_, T> {
        TypeBuilder::new(&self.metadata)
    }

    /// Declare params of a supplier or accessor method.
    pub fn describe_method(&self, owner: &str, method: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(&self.metadata, owner, method)
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Build a `T` with full parameter and property injection without
    /// registering it anywhere. Each call builds a new instance.
    pub fn build_instance<T: Component>(&self) -> Result<Arc<T>, RegistryError> {
        let definition = ConstructedDefinition::<T, T>::concrete(false);
        let instance = self.construct(&definition)?;
        downcast::<T>(&instance, short_type_name::<T>())
    }

    /// Set a tracing callback for registry operations.
    ///
    /// The callback must not call back into the same registry's tracing setters.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Invoke the current callback, if any.
    ///
    /// The lock is released before the callback runs, so callbacks may resolve
    /// from this registry.
    pub(crate) fn emit_event(&self, event: &RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Process-wide registry
// -------------------------------------------------------------------------------------------------

/// Registry shared by the free functions below.
static GLOBAL_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Find or create an interface of the process-wide registry.
///
/// # Examples
///
/// ```
/// use inclined_registry::named;
///
/// trait Clock: Send + Sync {}
///
/// let a = named::<dyn Clock>("Clock");
/// let b = named::<dyn Clock>("Clock");
/// assert!(std::sync::Arc::ptr_eq(a.entry(), b.entry()));
/// ```
pub fn named<I: ?Sized>(name: &str) -> InterfaceType<'static, I> {
    GLOBAL_REGISTRY.named(name)
}

/// Declare injection metadata of `T` in the process-wide registry.
pub fn describe<T: Any + Send + Sync>() -> TypeBuilder<'static, T> {
    GLOBAL_REGISTRY.describe::<T>()
}

/// Declare params of a method in the process-wide registry.
pub fn describe_method(owner: &str, method: &str) -> MethodBuilder<'static> {
    GLOBAL_REGISTRY.describe_method(owner, method)
}

/// Build a non-registered type against the process-wide registry.
pub fn build_instance<T: Component>() -> Result<Arc<T>, RegistryError> {
    GLOBAL_REGISTRY.build_instance::<T>()
}

/// Instance resolvers of the process-wide registry.
pub fn instance_resolvers() -> InterfaceType<'static, dyn InstanceResolver> {
    GLOBAL_REGISTRY.instance_resolvers()
}

/// Sets a tracing callback on the process-wide registry.
///
/// # Example
/// ```rust
/// use inclined_registry::{set_trace_callback, RegistryEvent};
///
/// set_trace_callback(|event| println!("[registry-trace] {event}"));
/// ```
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    GLOBAL_REGISTRY.set_trace_callback(callback);
}

/// Clears the tracing callback of the process-wide registry.
pub fn clear_trace_callback() {
    GLOBAL_REGISTRY.clear_trace_callback();
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
