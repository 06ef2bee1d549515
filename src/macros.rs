//! Macros for creating isolated registries.

/// Creates a complete, isolated registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Storage static holding a [`Registry`](crate::Registry) (hidden)
/// - An `Api` struct that implements `RegistryApi`
/// - Free functions mirroring the process-wide ones
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use inclined_registry::{define_registry, Args, Component, Managed, RegistryError};
///
/// trait Store: Send + Sync {
///     fn kind(&self) -> &'static str;
/// }
///
/// struct Memory;
///
/// impl Store for Memory {
///     fn kind(&self) -> &'static str {
///         "memory"
///     }
/// }
///
/// impl Managed for Memory {}
///
/// impl Component for Memory {
///     fn construct(_args: &Args) -> Result<Self, RegistryError> {
///         Ok(Memory)
///     }
/// }
///
/// define_registry!(storage);
///
/// storage::named::<dyn Store>("Store").provider::<Memory>(|it| it);
/// let store: Arc<dyn Store> = storage::named::<dyn Store>("Store").get_instance().unwrap();
/// assert_eq!(store.kind(), "memory");
/// ```
///
/// # Multiple Registries
///
/// Each invocation owns its interfaces, metadata and resolvers:
///
/// ```rust
/// use inclined_registry::define_registry;
///
/// trait Marker: Send + Sync {}
///
/// define_registry!(left);
/// define_registry!(right);
///
/// left::named::<dyn Marker>("Marker")
///     .supplier("Left", "marker", |_| Err(inclined_registry::RegistryError::NoProvider {
///         interface: "unused".into(),
///     }));
///
/// assert_eq!(left::named::<dyn Marker>("Marker").source_names(), ["Left#marker"]);
/// assert!(right::named::<dyn Marker>("Marker").source_names().is_empty());
/// ```
///
/// # Trait-Based Usage
///
/// If you need trait-based usage, the `API` constant is available:
///
/// ```rust
/// use inclined_registry::{define_registry, RegistryApi};
///
/// define_registry!(app);
///
/// assert_eq!(
///     app::API.instance_resolvers().source_names(),
///     ["DefaultInstanceResolver"]
/// );
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            // Registry backing this module (module-private)
            static STORAGE: LazyLock<$crate::Registry> = LazyLock::new($crate::Registry::new);

            /// Zero-sized type that implements the registry API.
            ///
            /// All registry operations are provided by the `RegistryApi` trait's
            /// default implementations. This struct only provides access to the static.
            pub struct Api;

            impl $crate::RegistryApi for Api {
                fn storage() -> &'static LazyLock<$crate::Registry> {
                    &STORAGE
                }
            }

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;

            /// The registry itself.
            pub fn registry() -> &'static $crate::Registry {
                &STORAGE
            }

            /// Find or create a named interface.
            pub fn named<I: ?Sized>(name: &str) -> $crate::InterfaceType<'static, I> {
                use $crate::RegistryApi;
                API.named(name)
            }

            /// Declare injection metadata of `T`.
            pub fn describe<T: std::any::Any + Send + Sync>() -> $crate::TypeBuilder<'static, T> {
                use $crate::RegistryApi;
                API.describe::<T>()
            }

            /// Declare params of a supplier or accessor method.
            pub fn describe_method(owner: &str, method: &str) -> $crate::MethodBuilder<'static> {
                use $crate::RegistryApi;
                API.describe_method(owner, method)
            }

            /// Build a non-registered `T` with full injection.
            pub fn build_instance<T: $crate::Component>() -> Result<Arc<T>, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.build_instance::<T>()
            }

            /// The interface resolvers are registered against.
            pub fn instance_resolvers() -> $crate::InterfaceType<'static, dyn $crate::InstanceResolver> {
                use $crate::RegistryApi;
                API.instance_resolvers()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static) {
                use $crate::RegistryApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::RegistryApi;
                API.clear_trace_callback()
            }
        }
    };
}
