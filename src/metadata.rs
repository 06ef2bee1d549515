//! Metadata attached to concrete types and methods.
//!
//! This is what a decorator layer would write: ordered constructor/method
//! parameters, late-injected properties and base-type links. The resolution
//! engine only reads it, at build time, so metadata may be declared before or
//! after the provider itself is registered.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::interface::{InterfaceEntry, InterfaceType};
use crate::lifecycle::Instance;
use crate::RegistryError;

// -------------------------------------------------------------------------------------------------
// Parameters
// -------------------------------------------------------------------------------------------------

/// One injected constructor or method parameter.
#[derive(Clone)]
pub struct Param {
    interface: Arc<InterfaceEntry>,
    optional: bool,
    key: String,
    index: usize,
}

impl Param {
    pub fn new(interface: Arc<InterfaceEntry>, key: impl Into<String>, index: usize, optional: bool) -> Self {
        Self {
            interface,
            optional,
            key: key.into(),
            index,
        }
    }

    /// Interface that must supply the value.
    pub fn interface(&self) -> &Arc<InterfaceEntry> {
        &self.interface
    }

    pub fn optional(&self) -> bool {
        self.optional
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("interface", &self.interface.name())
            .field("optional", &self.optional)
            .field("key", &self.key)
            .field("index", &self.index)
            .finish()
    }
}

fn push_sorted(params: &mut Vec<Param>, param: Param) {
    params.push(param);
    params.sort_by_key(|p| p.index);
}

// -------------------------------------------------------------------------------------------------
// Late-injected properties
// -------------------------------------------------------------------------------------------------

/// Setter for a late-injected field.
///
/// [`Injected`] is the plain storage; a type that wants custom behaviour when a
/// dependency arrives implements this on its own field type instead.
pub trait Mutator<I: ?Sized>: Send + Sync {
    fn assign(&self, value: Arc<I>);
}

/// A field filled in after construction, if a provider exists.
pub struct Injected<I: ?Sized> {
    value: RwLock<Option<Arc<I>>>,
}

impl<I: ?Sized> Injected<I> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// The injected value, or `None` when nothing was resolved (or the owner
    /// was built by hand).
    pub fn get(&self) -> Option<Arc<I>> {
        self.value.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn is_set(&self) -> bool {
        self.value.read().unwrap_or_else(|p| p.into_inner()).is_some()
    }
}

impl<I: ?Sized> Default for Injected<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized + Send + Sync> Mutator<I> for Injected<I> {
    fn assign(&self, value: Arc<I>) {
        *self.value.write().unwrap_or_else(|p| p.into_inner()) = Some(value);
    }
}

impl<I: ?Sized> fmt::Debug for Injected<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("set", &self.is_set())
            .finish()
    }
}

type Assign = Arc<dyn Fn(&dyn Any, &Instance) -> Result<(), RegistryError> + Send + Sync>;

/// A late-injected property of a concrete type.
#[derive(Clone)]
pub struct ManagedProperty {
    interface: Arc<InterfaceEntry>,
    key: String,
    assign: Assign,
}

impl ManagedProperty {
    pub fn interface(&self) -> &Arc<InterfaceEntry> {
        &self.interface
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hand a resolved value to the property's setter on `target`.
    pub(crate) fn assign(&self, target: &dyn Any, value: &Instance) -> Result<(), RegistryError> {
        (self.assign)(target, value)
    }

    /// Re-target an ancestor's property at a descendant through its base links.
    fn through(&self, chain: &[Arc<dyn Upcast>]) -> ManagedProperty {
        if chain.is_empty() {
            return self.clone();
        }
        let chain = chain.to_vec();
        let inner = self.assign.clone();
        let interface = self.interface.name().to_string();
        ManagedProperty {
            interface: self.interface.clone(),
            key: self.key.clone(),
            assign: Arc::new(move |target: &dyn Any, value: &Instance| {
                let mut target = target;
                for link in &chain {
                    target = link
                        .upcast(target)
                        .ok_or_else(|| RegistryError::TypeMismatch {
                            interface: interface.clone(),
                            expected: link.base_name(),
                        })?;
                }
                inner(target, value)
            }),
        }
    }
}

impl fmt::Debug for ManagedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedProperty")
            .field("interface", &self.interface.name())
            .field("key", &self.key)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Base links
// -------------------------------------------------------------------------------------------------

trait Upcast: Send + Sync {
    fn upcast<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any>;
    fn base(&self) -> TypeId;
    fn base_name(&self) -> &'static str;
}

struct Projection<T, B> {
    project: fn(&T) -> &B,
}

impl<T: 'static, B: 'static> Upcast for Projection<T, B> {
    fn upcast<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        target
            .downcast_ref::<T>()
            .map(|t| (self.project)(t) as &dyn Any)
    }

    fn base(&self) -> TypeId {
        TypeId::of::<B>()
    }

    fn base_name(&self) -> &'static str {
        type_name::<B>()
    }
}

// -------------------------------------------------------------------------------------------------
// Store
// -------------------------------------------------------------------------------------------------

#[derive(Default)]
struct TypeMetadata {
    params: Vec<Param>,
    properties: Vec<ManagedProperty>,
    base: Option<Arc<dyn Upcast>>,
}

/// Get-or-create storage of per-type and per-method injection metadata.
#[derive(Default)]
pub struct MetadataStore {
    types: Mutex<HashMap<TypeId, TypeMetadata>>,
    methods: Mutex<HashMap<String, Vec<Param>>>,
}

/// Key under which a method's params are stored.
pub(crate) fn method_key(owner: &str, method: &str) -> String {
    format!("{owner}::{method}")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constructor_param(&self, target: TypeId, param: Param) {
        let mut types = lock(&self.types);
        push_sorted(&mut types.entry(target).or_default().params, param);
    }

    pub fn add_method_param(&self, owner: &str, method: &str, param: Param) {
        let mut methods = lock(&self.methods);
        push_sorted(methods.entry(method_key(owner, method)).or_default(), param);
    }

    pub fn add_property(&self, target: TypeId, property: ManagedProperty) {
        lock(&self.types)
            .entry(target)
            .or_default()
            .properties
            .push(property);
    }

    fn set_base(&self, target: TypeId, link: Arc<dyn Upcast>) {
        lock(&self.types).entry(target).or_default().base = Some(link);
    }

    /// Constructor params of `target`, ordered by index.
    pub fn constructor_params(&self, target: TypeId) -> Vec<Param> {
        lock(&self.types).entry(target).or_default().params.clone()
    }

    /// Params of a method, ordered by index.
    pub fn method_params(&self, owner: &str, method: &str) -> Vec<Param> {
        lock(&self.methods)
            .entry(method_key(owner, method))
            .or_default()
            .clone()
    }

    /// Own properties of `target` followed by those of every declared ancestor.
    pub fn properties(&self, target: TypeId) -> Vec<ManagedProperty> {
        let types = lock(&self.types);
        let mut out = Vec::new();
        let mut chain: Vec<Arc<dyn Upcast>> = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(target);

        while let Some(id) = current.take() {
            if !seen.insert(id) {
                break;
            }
            let Some(meta) = types.get(&id) else {
                break;
            };
            out.extend(meta.properties.iter().map(|p| p.through(&chain)));
            if let Some(link) = meta.base.as_ref() {
                current = Some(link.base());
                chain.push(link.clone());
            }
        }
        out
    }
}

// -------------------------------------------------------------------------------------------------
// Builders
// -------------------------------------------------------------------------------------------------

/// Declares injection metadata for the concrete type `T`.
///
/// Obtained from `Registry::describe`.
pub struct TypeBuilder<'m, T> {
    store: &'m MetadataStore,
    _marker: PhantomData<fn() -> T>,
}

impl<'m, T: Any + Send + Sync> TypeBuilder<'m, T> {
    pub(crate) fn new(store: &'m MetadataStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Constructor param at `index` that must resolve.
    pub fn required<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>) -> Self {
        self.param(index, key, interface, false)
    }

    /// Constructor param at `index` that is `None` when nothing resolves.
    pub fn optional<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>) -> Self {
        self.param(index, key, interface, true)
    }

    fn param<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>, optional: bool) -> Self {
        self.store.add_constructor_param(
            TypeId::of::<T>(),
            Param::new(interface.entry().clone(), key, index, optional),
        );
        self
    }

    /// Late-injected property: after construction, a resolved `I` is handed to
    /// the [`Mutator`] that `field` selects.
    pub fn inject<I>(self, key: &str, interface: &InterfaceType<'_, I>, field: fn(&T) -> &dyn Mutator<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let name = interface.name().to_string();
        let assign: Assign = Arc::new(move |target: &dyn Any, value: &Instance| {
            let target = target
                .downcast_ref::<T>()
                .ok_or_else(|| RegistryError::TypeMismatch {
                    interface: name.clone(),
                    expected: type_name::<T>(),
                })?;
            let value = value
                .downcast_ref::<Arc<I>>()
                .cloned()
                .ok_or_else(|| RegistryError::TypeMismatch {
                    interface: name.clone(),
                    expected: type_name::<I>(),
                })?;
            field(target).assign(value);
            Ok(())
        });
        self.store.add_property(
            TypeId::of::<T>(),
            ManagedProperty {
                interface: interface.entry().clone(),
                key: key.to_string(),
                assign,
            },
        );
        self
    }

    /// Inherit the properties declared for `B`, reached through `project`.
    pub fn extends<B: Any + Send + Sync>(self, project: fn(&T) -> &B) -> Self {
        self.store
            .set_base(TypeId::of::<T>(), Arc::new(Projection { project }));
        self
    }
}

/// Declares injected params of a supplier or accessor method.
///
/// Obtained from `Registry::describe_method`.
pub struct MethodBuilder<'m> {
    store: &'m MetadataStore,
    owner: String,
    method: String,
}

impl<'m> MethodBuilder<'m> {
    pub(crate) fn new(store: &'m MetadataStore, owner: &str, method: &str) -> Self {
        Self {
            store,
            owner: owner.to_string(),
            method: method.to_string(),
        }
    }

    pub fn required<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>) -> Self {
        self.param(index, key, interface, false)
    }

    pub fn optional<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>) -> Self {
        self.param(index, key, interface, true)
    }

    fn param<I: ?Sized>(self, index: usize, key: &str, interface: &InterfaceType<'_, I>, optional: bool) -> Self {
        self.store.add_method_param(
            &self.owner,
            &self.method,
            Param::new(interface.entry().clone(), key, index, optional),
        );
        self
    }
}
