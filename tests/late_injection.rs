//! Integration tests for late (property) injection.

use inclined_registry::{
    define_registry, Args, Component, Injected, Managed, Mutator, RegistryError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

trait Dep: Send + Sync {
    fn id(&self) -> &'static str;
}

struct Simple;

impl Dep for Simple {
    fn id(&self) -> &'static str {
        "simple"
    }
}

impl Managed for Simple {}

impl Component for Simple {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Simple)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Default)]
struct Late {
    simple: Injected<dyn Dep>,
    absent: Injected<dyn Dep>,
    ready: AtomicBool,
}

impl Managed for Late {
    fn post_construct(&self) {
        self.ready.store(self.simple.is_set(), Ordering::SeqCst);
    }
}

impl Component for Late {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Late::default())
    }
}

/// Records every id it is handed instead of storing the dependency.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<&'static str>>,
}

impl Mutator<dyn Dep> for Recorder {
    fn assign(&self, value: Arc<dyn Dep>) {
        self.seen.lock().unwrap().push(value.id());
    }
}

#[derive(Default)]
struct LateComplicated {
    recorder: Recorder,
}

impl Managed for LateComplicated {}

impl Component for LateComplicated {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(LateComplicated::default())
    }
}

#[derive(Default)]
struct Base {
    inherited: Injected<dyn Dep>,
}

#[derive(Default)]
struct Inheritance {
    base: Base,
    own: Injected<dyn Dep>,
}

impl Managed for Inheritance {}

impl Component for Inheritance {
    fn construct(_args: &Args) -> Result<Self, RegistryError> {
        Ok(Inheritance::default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_property_injected_before_post_construct() {
    define_registry!(reg);

    let simple = reg::named::<dyn Dep>("Simple");
    let absent = reg::named::<dyn Dep>("NoImpls");
    simple.provider::<Simple>(|it| it);
    reg::describe::<Late>()
        .inject("simple", &simple, |it| &it.simple)
        .inject("absent", &absent, |it| &it.absent);

    let late = reg::build_instance::<Late>().unwrap();
    assert!(Arc::ptr_eq(&late.simple.get().unwrap(), &simple.get_instance().unwrap()));
    assert!(!late.absent.is_set());
    assert!(late.ready.load(Ordering::SeqCst));
}

#[test]
fn test_manual_construction_skips_injection() {
    define_registry!(reg);

    let simple = reg::named::<dyn Dep>("Simple");
    simple.provider::<Simple>(|it| it);
    reg::describe::<Late>().inject("simple", &simple, |it| &it.simple);

    let late = Late::default();
    assert!(!late.simple.is_set());
}

#[test]
fn test_custom_mutator() {
    define_registry!(reg);

    let simple = reg::named::<dyn Dep>("Simple");
    simple.provider::<Simple>(|it| it);
    reg::describe::<LateComplicated>().inject("recorder", &simple, |it| &it.recorder);

    let built = reg::build_instance::<LateComplicated>().unwrap();
    assert_eq!(*built.recorder.seen.lock().unwrap(), ["simple"]);
}

#[test]
fn test_inherited_properties() {
    define_registry!(reg);

    let simple = reg::named::<dyn Dep>("Simple");
    simple.provider::<Simple>(|it| it);
    reg::describe::<Base>().inject("inherited", &simple, |it| &it.inherited);
    reg::describe::<Inheritance>()
        .extends(|it| &it.base)
        .inject("own", &simple, |it| &it.own);

    let built = reg::build_instance::<Inheritance>().unwrap();
    assert!(built.own.is_set());
    assert!(built.base.inherited.is_set());
}

#[test]
fn test_ambiguous_property_fails_construction() {
    define_registry!(reg);

    let many = reg::named::<dyn Dep>("ManyImpl");
    many.provider::<Simple>(|it| it);
    many.supplier("Factory", "other", |_| Ok(Arc::new(Simple)));
    reg::describe::<Late>().inject("simple", &many, |it| &it.simple);

    let err = reg::build_instance::<Late>().err().unwrap();
    assert_eq!(
        err.to_string(),
        "More than one source of ManyImpl: Factory#other, Simple"
    );
}

#[test]
fn test_build_instance_is_not_memoized() {
    define_registry!(reg);

    let first = reg::build_instance::<Late>().unwrap();
    let second = reg::build_instance::<Late>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}
