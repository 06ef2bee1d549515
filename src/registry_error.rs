use thiserror::Error;

/// Failures raised while registering or resolving sources.
///
/// Every variant is fatal for the resolution that produced it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A required constructor or method parameter resolved to nothing.
    #[error("Could not construct {owner} param {interface}")]
    MissingDependency { owner: String, interface: String },

    /// `get_instance` was called on an interface without sources.
    #[error("No implementations known for {interface}")]
    NoProvider { interface: String },

    /// More than one equally ranked source exists where one was expected.
    #[error("More than one source of {interface}: {}", .sources.join(", "))]
    Ambiguous {
        interface: String,
        sources: Vec<String>,
    },

    /// A definition was requested again while it was still being built.
    #[error("Dependency cycle detected while trying to build {definition}")]
    DependencyCycle { definition: String },

    /// Accessors need an instance receiver.
    #[error("Use a supplier instead of an accessor for static methods: {owner}.{method}")]
    StaticAccessor { owner: String, method: String },

    /// A stored instance is not of the requested Rust type.
    #[error("Type mismatch for {interface}: expected {expected}")]
    TypeMismatch {
        interface: String,
        expected: &'static str,
    },

    /// A constructor read an argument position it never declared.
    #[error("{owner} has no declared param at index {index}")]
    UndeclaredParam { owner: String, index: usize },
}
