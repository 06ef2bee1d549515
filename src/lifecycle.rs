//! Build lifecycle of a single source definition.
//!
//! Each definition owns one [`Lifecycle`]: a three-state flag plus the memoized
//! instance. The flag only moves `Defined -> Building -> Built`; a request that
//! finds it in `Building` is a constructor-argument cycle.

use std::any::{type_name, Any};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::RegistryError;

/// Type-erased singleton as stored by the registry.
///
/// For an interface `I` the erased value is always an `Arc<I>`, so it can be
/// recovered with `downcast_ref::<Arc<I>>()`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Erase an interface value.
pub fn wrap<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Instance {
    Arc::new(value)
}

/// Recover an interface value erased with [`wrap`].
pub fn downcast<I: ?Sized + 'static>(instance: &Instance, interface: &str) -> Result<Arc<I>, RegistryError> {
    instance
        .downcast_ref::<Arc<I>>()
        .cloned()
        .ok_or_else(|| RegistryError::TypeMismatch {
            interface: interface.to_string(),
            expected: type_name::<I>(),
        })
}

/// To detect cycles we track definitions that are in the middle of being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No instance created yet.
    Defined,
    /// Instance creation has started but has not completed.
    Building,
    /// An instance has been created.
    Built,
}

/// What a definition produced: the concrete value and the value exposed for the interface.
///
/// Post-processing (property injection, `post_construct`) works on the concrete
/// value, while callers of the interface receive the exposed one.
#[derive(Clone)]
pub struct Built {
    concrete: Instance,
    exposed: Instance,
}

impl Built {
    pub fn new(concrete: Instance, exposed: Instance) -> Self {
        Self { concrete, exposed }
    }

    /// A value that is its own interface (suppliers, proxies).
    pub fn shared(instance: Instance) -> Self {
        Self {
            concrete: instance.clone(),
            exposed: instance,
        }
    }

    pub fn concrete(&self) -> &Instance {
        &self.concrete
    }

    pub fn exposed(&self) -> &Instance {
        &self.exposed
    }
}

/// Outcome of asking a lifecycle to start building.
pub(crate) enum Begin {
    /// Already memoized; no work to do.
    Memoized(Instance),
    /// Re-entered while `Building`.
    Cycle,
    /// State moved to `Building`; the caller owns the build.
    Started,
}

struct Slot {
    state: ServiceState,
    built: Option<Built>,
}

/// Interior-mutable state + memoized instance of one definition.
pub struct Lifecycle {
    slot: Mutex<Slot>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: ServiceState::Defined,
                built: None,
            }),
        }
    }

    /// A lifecycle that starts out `Built` with the given value.
    pub fn seeded(built: Built) -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: ServiceState::Built,
                built: Some(built),
            }),
        }
    }

    // Poisoning only happens if a user constructor panicked mid-update; the slot
    // itself is always left consistent.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> ServiceState {
        self.lock().state
    }

    /// The exposed instance, if one has been memoized.
    pub fn instance(&self) -> Option<Instance> {
        self.lock().built.as_ref().map(|b| b.exposed.clone())
    }

    pub(crate) fn begin(&self) -> Begin {
        let mut slot = self.lock();
        if let Some(built) = slot.built.as_ref() {
            return Begin::Memoized(built.exposed.clone());
        }
        if slot.state == ServiceState::Building {
            return Begin::Cycle;
        }
        slot.state = ServiceState::Building;
        Begin::Started
    }

    pub(crate) fn memoize(&self, built: Built) {
        self.lock().built = Some(built);
    }

    pub(crate) fn finish(&self) {
        self.lock().state = ServiceState::Built;
    }

    /// Drop the memoized instance and return to `Defined`.
    pub fn reset(&self) {
        let mut slot = self.lock();
        slot.built = None;
        slot.state = ServiceState::Defined;
    }
}
