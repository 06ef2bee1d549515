//! The resolution engine.
//!
//! `construct` builds one definition, `maybe_one` / `exactly_one` / `many`
//! resolve an interface through the active instance resolvers.
//!
//! A definition is memoized *before* its properties are injected. That is what
//! lets property cycles resolve (the peer finds the half-initialized instance)
//! while constructor cycles fail (no instance exists yet to hand back).

use std::any::{Any, TypeId};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::args::Args;
use crate::interface::InterfaceEntry;
use crate::lifecycle::{downcast, Begin, Instance};
use crate::registry::Registry;
use crate::resolver::{CoreActions, InstanceResolver, INSTANCE_RESOLVER};
use crate::source::SourceDefinition;
use crate::{RegistryError, RegistryEvent};

impl Registry {
    /// Build `definition` once, resolving its params and injecting its properties.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DependencyCycle`] when re-entered while building
    /// - [`RegistryError::MissingDependency`] when a required param resolves to nothing
    ///
    /// A failed build leaves the definition `Building`; there is no rollback.
    pub(crate) fn construct(&self, definition: &dyn SourceDefinition) -> Result<Instance, RegistryError> {
        let lifecycle = definition.lifecycle();
        match lifecycle.begin() {
            Begin::Memoized(instance) => return Ok(instance),
            Begin::Cycle => {
                warn!(definition = definition.name(), "dependency cycle detected");
                self.emit_event(&RegistryEvent::Cycle {
                    source: definition.name().to_string(),
                });
                return Err(RegistryError::DependencyCycle {
                    definition: definition.name().to_string(),
                });
            }
            Begin::Started => {}
        }

        let mut args = Args::new(definition.name());
        for param in definition.required(self.metadata()) {
            let arg = self.maybe_one(param.interface())?;
            if arg.is_none() && !param.optional() {
                return Err(RegistryError::MissingDependency {
                    owner: definition.name().to_string(),
                    interface: param.interface().name().to_string(),
                });
            }
            args.push(&param, arg);
        }

        let built = definition.build(self, &args)?;
        lifecycle.memoize(built.clone());
        definition.process(self, &built)?;
        lifecycle.finish();

        debug!(definition = definition.name(), "built instance");
        self.emit_event(&RegistryEvent::Construct {
            source: definition.name().to_string(),
        });
        Ok(built.exposed().clone())
    }

    /// Late injection: every resolvable property of `target` (own and inherited)
    /// is handed to its setter; unresolvable ones are skipped.
    pub(crate) fn inject_properties(&self, target: &dyn Any, type_id: TypeId) -> Result<(), RegistryError> {
        for property in self.metadata().properties(type_id) {
            match self.maybe_one(property.interface())? {
                Some(value) => property.assign(target, &value)?,
                None => trace!(
                    property = property.key(),
                    interface = property.interface().name(),
                    "no value for late property"
                ),
            }
        }
        Ok(())
    }

    /// Active resolvers in resolution order, as the default resolver sees them.
    fn resolvers(&self) -> Result<Vec<Arc<dyn InstanceResolver>>, RegistryError> {
        let entry = self.instance_resolvers().entry().clone();
        self.default_instance_resolver()
            .many(&entry, self)?
            .iter()
            .map(|instance| downcast::<dyn InstanceResolver>(instance, INSTANCE_RESOLVER))
            .collect()
    }

    /// All instances from the first resolver that has any.
    pub(crate) fn many(&self, interface: &InterfaceEntry) -> Result<Vec<Instance>, RegistryError> {
        for resolver in self.resolvers()? {
            let found = resolver.many(interface, self)?;
            if !found.is_empty() {
                trace!(interface = interface.name(), found = found.len(), "resolved many");
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }

    /// The instance from the first resolver that has one.
    pub(crate) fn maybe_one(&self, interface: &InterfaceEntry) -> Result<Option<Instance>, RegistryError> {
        for resolver in self.resolvers()? {
            if let Some(found) = resolver.maybe_one(interface, self)? {
                trace!(interface = interface.name(), "resolved one");
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Like `maybe_one`, but nothing is an error.
    pub(crate) fn exactly_one(&self, interface: &InterfaceEntry) -> Result<Instance, RegistryError> {
        self.maybe_one(interface)?
            .ok_or_else(|| RegistryError::NoProvider {
                interface: interface.name().to_string(),
            })
    }
}

impl CoreActions for Registry {
    fn construct(&self, definition: &dyn SourceDefinition) -> Result<Instance, RegistryError> {
        Registry::construct(self, definition)
    }
}
