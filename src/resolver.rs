//! Pluggable policies that turn the sources of an interface into instances.
//!
//! Resolvers are themselves resolved through the registry, from the interface
//! named [`INSTANCE_RESOLVER`]. They are consulted in resolution order and the
//! first one with an answer wins, so a resolver registered at normal priority
//! runs ahead of the delayed [`DefaultInstanceResolver`] and can override
//! individual interfaces while leaving the rest to the default.

use std::sync::Arc;

use crate::args::Args;
use crate::interface::InterfaceEntry;
use crate::lifecycle::Instance;
use crate::source::{Component, Managed, SourceDefinition};
use crate::RegistryError;

/// Name of the interface resolvers are registered against.
pub const INSTANCE_RESOLVER: &str = "InstanceResolver";

/// Primitive engine operations available to a resolver.
pub trait CoreActions {
    /// Build (or fetch the memoized instance of) one source, with cycle detection.
    fn construct(&self, definition: &dyn SourceDefinition) -> Result<Instance, RegistryError>;
}

/// A policy linking an interface to its instances.
pub trait InstanceResolver: Send + Sync {
    /// All instances; an empty result lets the next resolver answer.
    fn many(&self, interface: &InterfaceEntry, actions: &dyn CoreActions) -> Result<Vec<Instance>, RegistryError>;

    /// Zero or one instance; `None` lets the next resolver answer.
    fn maybe_one(&self, interface: &InterfaceEntry, actions: &dyn CoreActions) -> Result<Option<Instance>, RegistryError>;
}

fn priority(source: &dyn SourceDefinition) -> u8 {
    u8::from(source.delayed())
}

/// Default logic for linking interfaces to instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInstanceResolver;

impl Managed for DefaultInstanceResolver {}

impl Component for DefaultInstanceResolver {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(DefaultInstanceResolver)
    }
}

impl InstanceResolver for DefaultInstanceResolver {
    /// Builds every source; delayed ones sort last, registration order otherwise.
    fn many(&self, interface: &InterfaceEntry, actions: &dyn CoreActions) -> Result<Vec<Instance>, RegistryError> {
        let mut ranked = Vec::new();
        for source in interface.sources() {
            let instance = actions.construct(source.as_ref())?;
            ranked.push((priority(source.as_ref()), instance));
        }
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked.into_iter().map(|(_, instance)| instance).collect())
    }

    /// Only the best-ranked non-empty tier competes: a single non-delayed
    /// source wins over any number of delayed ones.
    fn maybe_one(&self, interface: &InterfaceEntry, actions: &dyn CoreActions) -> Result<Option<Instance>, RegistryError> {
        let sources = interface.sources();
        let Some(best) = sources.iter().map(|s| priority(s.as_ref())).min() else {
            return Ok(None);
        };
        let tier: Vec<Arc<dyn SourceDefinition>> = sources
            .into_iter()
            .filter(|s| priority(s.as_ref()) == best)
            .collect();

        match tier.as_slice() {
            [only] => actions.construct(only.as_ref()).map(Some),
            _ => {
                let mut names: Vec<String> = tier.iter().map(|s| s.name().to_string()).collect();
                names.sort();
                Err(RegistryError::Ambiguous {
                    interface: interface.name().to_string(),
                    sources: names,
                })
            }
        }
    }
}
