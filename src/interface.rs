//! Named interface types and the sources registered against them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::args::Args;
use crate::lifecycle::{downcast, wrap, Instance};
use crate::registry::Registry;
use crate::source::{
    AccessedDefinition, Component, ConstructedDefinition, Managed, Method, SourceDefinition,
    SuppliedDefinition,
};
use crate::{RegistryError, RegistryEvent};

/// Interned registry record for one interface name.
///
/// Sources are kept in registration order; nothing is ever removed.
pub struct InterfaceEntry {
    name: String,
    sources: Mutex<Vec<Arc<dyn SourceDefinition>>>,
}

impl InterfaceEntry {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sources: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn SourceDefinition>>> {
        self.sources.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the registered sources.
    pub fn sources(&self) -> Vec<Arc<dyn SourceDefinition>> {
        self.lock().clone()
    }

    /// Source names in registration order.
    pub fn source_names(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn push(&self, source: Arc<dyn SourceDefinition>) {
        self.lock().push(source);
    }
}

impl fmt::Debug for InterfaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceEntry")
            .field("name", &self.name)
            .field("sources", &self.source_names())
            .finish()
    }
}

/// Typed handle on a named interface of a [`Registry`].
///
/// `I` is the Rust type callers receive, usually a `dyn Trait`. Handles are
/// cheap to clone; all handles with the same name share one [`InterfaceEntry`].
pub struct InterfaceType<'r, I: ?Sized> {
    registry: &'r Registry,
    entry: Arc<InterfaceEntry>,
    delayed: bool,
    _marker: PhantomData<fn() -> Arc<I>>,
}

impl<I: ?Sized> Clone for InterfaceType<'_, I> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry,
            entry: self.entry.clone(),
            delayed: self.delayed,
            _marker: PhantomData,
        }
    }
}

impl<I: ?Sized> fmt::Debug for InterfaceType<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceType")
            .field("name", &self.entry.name())
            .field("delayed", &self.delayed)
            .finish()
    }
}

impl<'r, I: ?Sized> InterfaceType<'r, I> {
    pub(crate) fn new(registry: &'r Registry, entry: Arc<InterfaceEntry>) -> Self {
        Self {
            registry,
            entry,
            delayed: false,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn entry(&self) -> &Arc<InterfaceEntry> {
        &self.entry
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn source_names(&self) -> Vec<String> {
        self.entry.source_names()
    }

    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Registrations made through the returned handle get the demoted
    /// ("default") priority.
    pub fn delayed(&self) -> Self {
        Self {
            delayed: true,
            ..self.clone()
        }
    }
}

impl<'r, I> InterfaceType<'r, I>
where
    I: ?Sized + Send + Sync + 'static,
{
    /// Register the concrete type `T` as a provider; `cast` exposes it as `I`
    /// (usually just `|it| it`).
    pub fn provider<T: Component>(&self, cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) {
        self.register(Arc::new(ConstructedDefinition::new(self.delayed, cast)));
    }

    /// Register a producer function, named `owner#method` in diagnostics.
    ///
    /// Its params are declared with `Registry::describe_method(owner, method)`.
    pub fn supplier(
        &self,
        owner: &str,
        method: &str,
        supply: impl Fn(&Args) -> Result<Arc<I>, RegistryError> + Send + Sync + 'static,
    ) {
        self.register(Arc::new(SuppliedDefinition::new(owner, method, self.delayed, supply)));
    }

    /// Register an instance method of the proxy type `P` as a source.
    ///
    /// Its params are declared with `Registry::describe_method` under the short
    /// type name of `P`, see [`Method::owner`].
    ///
    /// # Errors
    ///
    /// [`RegistryError::StaticAccessor`] when `method` has no receiver.
    pub fn accessor<P: Component, R: Managed>(
        &self,
        method: Method<P, R>,
        cast: impl Fn(Arc<R>) -> Arc<I> + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let definition = AccessedDefinition::new(method, self.delayed, cast)?;
        self.register(Arc::new(definition));
        Ok(())
    }

    fn register(&self, source: Arc<dyn SourceDefinition>) {
        self.registry.emit_event(&RegistryEvent::Register {
            interface: self.name().to_string(),
            source: source.name().to_string(),
            delayed: source.delayed(),
        });
        debug!(
            interface = self.name(),
            source = source.name(),
            delayed = source.delayed(),
            "registered source"
        );
        self.entry.push(source);
    }

    /// The single instance of this interface.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NoProvider`] without any source
    /// - [`RegistryError::Ambiguous`] with several equally ranked sources
    /// - any construction failure of the chosen source
    pub fn get_instance(&self) -> Result<Arc<I>, RegistryError> {
        let result = self.registry.exactly_one(&self.entry);
        self.registry.emit_event(&RegistryEvent::Resolve {
            interface: self.name().to_string(),
            found: usize::from(result.is_ok()),
        });
        downcast::<I>(&result?, self.name())
    }

    /// Every instance of this interface, non-delayed sources first.
    pub fn get_instances(&self) -> Result<Vec<Arc<I>>, RegistryError> {
        let instances = self.registry.many(&self.entry)?;
        self.registry.emit_event(&RegistryEvent::Resolve {
            interface: self.name().to_string(),
            found: instances.len(),
        });
        instances
            .iter()
            .map(|instance| downcast::<I>(instance, self.name()))
            .collect()
    }

    /// Forget every constructed singleton so the next request builds afresh.
    ///
    /// Registrations are kept; supplied and accessed sources keep their instances.
    pub fn reset_cached_implementations(&self) {
        self.registry.emit_event(&RegistryEvent::Reset {
            interface: self.name().to_string(),
        });
        debug!(interface = self.name(), "resetting cached implementations");
        for source in self.entry.sources() {
            if source.resettable() {
                source.lifecycle().reset();
            }
        }
    }

    /// Erase a value for use by an `InstanceResolver`.
    pub fn wrap(value: Arc<I>) -> Instance {
        wrap(value)
    }

    /// Recover a value returned by an `InstanceResolver`.
    pub fn unwrap(&self, instance: &Instance) -> Result<Arc<I>, RegistryError> {
        downcast::<I>(instance, self.name())
    }
}
