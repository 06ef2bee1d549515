/// Events emitted by a registry while it registers and resolves sources.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use inclined_registry::RegistryEvent;
///
/// let event = RegistryEvent::Resolve {
///     interface: "Logger".into(),
///     found: 1,
/// };
/// assert_eq!(event.to_string(), "resolve { interface: Logger, found: 1 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A source was registered against an interface.
    Register {
        /// Interface name
        interface: String,
        /// Display name of the source (e.g. `Supplied#build`)
        source: String,
        /// Whether the source was registered at the demoted priority
        delayed: bool,
    },

    /// A definition produced a fresh instance.
    Construct {
        /// Display name of the definition
        source: String,
    },

    /// An interface was resolved.
    Resolve {
        /// Interface name
        interface: String,
        /// How many instances were returned
        found: usize,
    },

    /// A definition was re-entered while still building.
    Cycle {
        /// Display name of the definition under construction
        source: String,
    },

    /// Cached instances of an interface were dropped.
    Reset {
        /// Interface name
        interface: String,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register {
                interface,
                source,
                delayed,
            } => write!(
                f,
                "register {{ interface: {interface}, source: {source}, delayed: {delayed} }}"
            ),
            RegistryEvent::Construct { source } => write!(f, "construct {{ source: {source} }}"),
            RegistryEvent::Resolve { interface, found } => {
                write!(f, "resolve {{ interface: {interface}, found: {found} }}")
            }
            RegistryEvent::Cycle { source } => write!(f, "cycle {{ source: {source} }}"),
            RegistryEvent::Reset { interface } => write!(f, "Resetting {interface}"),
        }
    }
}
