//! Core trait exposing a `'static` registry.
//!
//! This module provides the `RegistryApi` trait with default implementations for
//! interface lookup, metadata declaration, direct builds and tracing, over a
//! registry held in a static.

use std::any::Any;
use std::sync::{Arc, LazyLock};

use crate::interface::InterfaceType;
use crate::metadata::{MethodBuilder, TypeBuilder};
use crate::resolver::InstanceResolver;
use crate::source::Component;
use crate::{Registry, RegistryError, RegistryEvent};

/// Core trait defining registry access.
///
/// Provides default implementations for all operations, requiring only the
/// `storage` accessor to be implemented.
pub trait RegistryApi {
    /// Access the storage static.
    ///
    /// This method must be implemented to provide access to the registry.
    fn storage() -> &'static LazyLock<Registry>;

    /// Find or create a named interface.
    fn named<I: ?Sized>(&self, name: &str) -> InterfaceType<'static, I> {
        Self::storage().named(name)
    }

    /// Declare injection metadata of `T`.
    fn describe<T: Any + Send + Sync>(&self) -> TypeBuilder<'static, T> {
        Self::storage().describe::<T>()
    }

    /// Declare params of a supplier or accessor method.
    fn describe_method(&self, owner: &str, method: &str) -> MethodBuilder<'static> {
        Self::storage().describe_method(owner, method)
    }

    /// Build a non-registered `T` with full injection.
    ///
    /// # Errors
    ///
    /// Any failure while resolving the params of `T` or its dependencies.
    fn build_instance<T: Component>(&self) -> Result<Arc<T>, RegistryError> {
        Self::storage().build_instance::<T>()
    }

    /// The interface resolvers are registered against.
    fn instance_resolvers(&self) -> InterfaceType<'static, dyn InstanceResolver> {
        Self::storage().instance_resolvers()
    }

    /// Set a tracing callback for registry operations.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        Self::storage().set_trace_callback(callback);
    }

    /// Clear the tracing callback.
    ///
    /// After calling this, no tracing events will be emitted.
    fn clear_trace_callback(&self) {
        Self::storage().clear_trace_callback();
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
