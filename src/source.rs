//! Source definitions: the ways a registry can produce one instance.
//!
//! - [`ConstructedDefinition`] builds a [`Component`] from its constructor params,
//!   then injects its properties and calls `post_construct`.
//! - [`SuppliedDefinition`] calls a producer function and trusts its result.
//! - [`AccessedDefinition`] calls an instance method on a lazily built proxy
//!   singleton, then calls `post_construct` on the product.

use std::any::{type_name, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::args::Args;
use crate::lifecycle::{downcast, wrap, Built, Lifecycle};
use crate::metadata::{MetadataStore, Param};
use crate::registry::Registry;
use crate::RegistryError;

/// Hook for instances the registry produces.
///
/// `post_construct` runs once all late properties of the instance have been injected.
pub trait Managed: Send + Sync + 'static {
    fn post_construct(&self) {}
}

/// A concrete type the registry knows how to construct.
///
/// Constructor params are declared separately through `Registry::describe` and
/// arrive in `args` under their declared index.
pub trait Component: Managed + Sized {
    fn construct(args: &Args) -> Result<Self, RegistryError>;
}

/// Common contract of every source the resolution engine can build.
pub trait SourceDefinition: Send + Sync {
    /// Human-readable identity used in diagnostics.
    fn name(&self) -> &str;

    /// Demoted priority: ordered after non-delayed sources.
    fn delayed(&self) -> bool;

    fn lifecycle(&self) -> &Lifecycle;

    /// Whether `reset_cached_implementations` clears this source.
    fn resettable(&self) -> bool {
        false
    }

    /// Params to resolve before `build`, ordered by index.
    fn required(&self, metadata: &MetadataStore) -> Vec<Param>;

    /// Produce the raw instance from resolved args.
    fn build(&self, registry: &Registry, args: &Args) -> Result<Built, RegistryError>;

    /// Finish an instance that is already memoized.
    fn process(&self, registry: &Registry, built: &Built) -> Result<(), RegistryError>;
}

/// Last path segment of a type name, keeping generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let head = full.find('<').map_or(full, |at| &full[..at]);
    match head.rfind("::") {
        Some(at) => &full[at + 2..],
        None => full,
    }
}

type Cast<T, I> = Arc<dyn Fn(Arc<T>) -> Arc<I> + Send + Sync>;

// -------------------------------------------------------------------------------------------------
// Constructed
// -------------------------------------------------------------------------------------------------

/// Everything known about how to construct a concrete `T` exposed as `I`.
pub struct ConstructedDefinition<T, I: ?Sized> {
    name: String,
    delayed: bool,
    lifecycle: Lifecycle,
    cast: Cast<T, I>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, I> ConstructedDefinition<T, I>
where
    T: Component,
    I: ?Sized + Send + Sync + 'static,
{
    pub fn new(delayed: bool, cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self {
        Self {
            name: short_type_name::<T>().to_string(),
            delayed,
            lifecycle: Lifecycle::new(),
            cast: Arc::new(cast),
            _marker: PhantomData,
        }
    }

    /// Start out already built with `instance`.
    pub(crate) fn seeded(mut self, instance: Arc<T>) -> Self {
        let exposed = wrap((self.cast)(instance.clone()));
        self.lifecycle = Lifecycle::seeded(Built::new(wrap(instance), exposed));
        self
    }
}

impl<T> ConstructedDefinition<T, T>
where
    T: Component,
{
    /// A definition whose interface is the concrete type itself.
    pub fn concrete(delayed: bool) -> Self {
        Self::new(delayed, |it| it)
    }
}

impl<T, I> SourceDefinition for ConstructedDefinition<T, I>
where
    T: Component,
    I: ?Sized + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn delayed(&self) -> bool {
        self.delayed
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn resettable(&self) -> bool {
        true
    }

    fn required(&self, metadata: &MetadataStore) -> Vec<Param> {
        metadata.constructor_params(TypeId::of::<T>())
    }

    fn build(&self, _registry: &Registry, args: &Args) -> Result<Built, RegistryError> {
        let instance = Arc::new(T::construct(args)?);
        let exposed = wrap((self.cast)(instance.clone()));
        Ok(Built::new(wrap(instance), exposed))
    }

    fn process(&self, registry: &Registry, built: &Built) -> Result<(), RegistryError> {
        let instance = downcast::<T>(built.concrete(), &self.name)?;
        registry.inject_properties(instance.as_ref(), TypeId::of::<T>())?;
        instance.post_construct();
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Supplied
// -------------------------------------------------------------------------------------------------

type Supply<I> = Box<dyn Fn(&Args) -> Result<Arc<I>, RegistryError> + Send + Sync>;

/// A function (usually an associated one) that supplies instances of `I`.
pub struct SuppliedDefinition<I: ?Sized> {
    owner: String,
    method: String,
    name: String,
    delayed: bool,
    lifecycle: Lifecycle,
    supply: Supply<I>,
}

impl<I: ?Sized + Send + Sync + 'static> SuppliedDefinition<I> {
    pub fn new(
        owner: &str,
        method: &str,
        delayed: bool,
        supply: impl Fn(&Args) -> Result<Arc<I>, RegistryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            method: method.to_string(),
            name: format!("{owner}#{method}"),
            delayed,
            lifecycle: Lifecycle::new(),
            supply: Box::new(supply),
        }
    }
}

impl<I: ?Sized + Send + Sync + 'static> SourceDefinition for SuppliedDefinition<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn delayed(&self) -> bool {
        self.delayed
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn required(&self, metadata: &MetadataStore) -> Vec<Param> {
        metadata.method_params(&self.owner, &self.method)
    }

    fn build(&self, _registry: &Registry, args: &Args) -> Result<Built, RegistryError> {
        Ok(Built::shared(wrap((self.supply)(args)?)))
    }

    fn process(&self, _registry: &Registry, _built: &Built) -> Result<(), RegistryError> {
        // the supplier hands back a finished instance
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Accessed
// -------------------------------------------------------------------------------------------------

type Receiver<P, R> = Box<dyn Fn(&P, &Args) -> Result<Arc<R>, RegistryError> + Send + Sync>;

enum MethodKind<P, R: ?Sized> {
    Associated,
    Receiver(Receiver<P, R>),
}

/// A method on `P` returning `R`, as handed to an accessor registration.
///
/// The owner is the short type name of `P`, which is also the owner under
/// which `describe_method` must declare the method's params.
///
/// Only [`Method::instance`] methods can back an accessor; the associated form
/// exists so the registration can refuse it.
pub struct Method<P, R: ?Sized> {
    owner: String,
    name: String,
    kind: MethodKind<P, R>,
}

impl<P, R: ?Sized> Method<P, R> {
    /// A method taking `&P` as receiver.
    pub fn instance(
        name: &str,
        f: impl Fn(&P, &Args) -> Result<Arc<R>, RegistryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            owner: short_type_name::<P>().to_string(),
            name: name.to_string(),
            kind: MethodKind::Receiver(Box::new(f)),
        }
    }

    /// A method without receiver. Use a supplier to register one.
    pub fn associated(
        name: &str,
        _f: impl Fn(&Args) -> Result<Arc<R>, RegistryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            owner: short_type_name::<P>().to_string(),
            name: name.to_string(),
            kind: MethodKind::Associated,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, MethodKind::Associated)
    }
}

/// An instance method on a proxy singleton `P` that produces `R`, exposed as `I`.
pub struct AccessedDefinition<P, R, I: ?Sized> {
    owner: String,
    method: String,
    name: String,
    delayed: bool,
    lifecycle: Lifecycle,
    proxy: ConstructedDefinition<P, P>,
    access: Receiver<P, R>,
    cast: Cast<R, I>,
}

impl<P, R, I> AccessedDefinition<P, R, I>
where
    P: Component,
    R: Managed,
    I: ?Sized + Send + Sync + 'static,
{
    /// Fails for associated (static) methods: an accessor needs a receiver.
    pub fn new(
        method: Method<P, R>,
        delayed: bool,
        cast: impl Fn(Arc<R>) -> Arc<I> + Send + Sync + 'static,
    ) -> Result<Self, RegistryError> {
        let Method { owner, name, kind } = method;
        let access = match kind {
            MethodKind::Receiver(access) => access,
            MethodKind::Associated => {
                return Err(RegistryError::StaticAccessor {
                    owner,
                    method: name,
                })
            }
        };
        Ok(Self {
            name: format!("{owner}.{name}"),
            owner,
            method: name,
            delayed,
            lifecycle: Lifecycle::new(),
            proxy: ConstructedDefinition::concrete(delayed),
            access,
            cast: Arc::new(cast),
        })
    }
}

impl<P, R, I> SourceDefinition for AccessedDefinition<P, R, I>
where
    P: Component,
    R: Managed,
    I: ?Sized + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn delayed(&self) -> bool {
        self.delayed
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn required(&self, metadata: &MetadataStore) -> Vec<Param> {
        metadata.method_params(&self.owner, &self.method)
    }

    fn build(&self, registry: &Registry, args: &Args) -> Result<Built, RegistryError> {
        let proxy = registry.construct(&self.proxy)?;
        let proxy = downcast::<P>(&proxy, self.proxy.name())?;
        let product = (self.access)(proxy.as_ref(), args)?;
        let exposed = wrap((self.cast)(product.clone()));
        Ok(Built::new(wrap(product), exposed))
    }

    fn process(&self, _registry: &Registry, built: &Built) -> Result<(), RegistryError> {
        // the proxy received the injection; the product only gets its hook
        downcast::<R>(built.concrete(), &self.name)?.post_construct();
        Ok(())
    }
}
