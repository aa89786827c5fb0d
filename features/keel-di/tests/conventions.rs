use std::sync::Arc;

use keel_di::{
    capability, implements, Capability, Component, Constructor, Resolver, TypeCatalog,
    TypeDescriptor,
};

pub trait IGreeter: Send + Sync {
    fn greet(&self) -> String;
}
capability!(dyn IGreeter);

pub struct Greeter;
impl IGreeter for Greeter {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}
impl Component for Greeter {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| Greeter)]
    }
}
implements!(Greeter => dyn IGreeter);

pub struct LoudGreeter;
impl IGreeter for LoudGreeter {
    fn greet(&self) -> String {
        "HELLO".to_string()
    }
}
impl Component for LoudGreeter {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| LoudGreeter)]
    }
}
implements!(LoudGreeter => dyn IGreeter);

pub trait IClock: Send + Sync {}
capability!(dyn IClock);

mod system {
    use super::*;
    pub struct Clock;
    impl IClock for Clock {}
    impl Component for Clock {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::from_fn(|| Clock)]
        }
    }
    implements!(Clock => dyn IClock);
}

mod fake {
    use super::*;
    pub struct Clock;
    impl IClock for Clock {}
    impl Component for Clock {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::from_fn(|| Clock)]
        }
    }
    implements!(Clock => dyn IClock);
}

pub trait IStore: Send + Sync {}
capability!(dyn IStore);

pub struct MemoryStore;
impl IStore for MemoryStore {}
impl Component for MemoryStore {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| MemoryStore)]
    }
}
implements!(MemoryStore => dyn IStore);

/// Starts with an I but carries no interface marker
pub trait Identity: Send + Sync {}
capability!(dyn Identity);

pub trait Handler<M>: Send + Sync {
    fn handle(&self, message: M) -> String;
}
/// Marks the open definition `Handler<_>`
pub struct HandlerOf;

impl<M: 'static> Capability for dyn Handler<M> {
    fn descriptor() -> TypeDescriptor {
        // Only closed implementations are registered
        TypeDescriptor::parametric::<Self, HandlerOf>(|_| None)
    }
}

pub struct Ping;
pub struct Pong;

pub struct PingHandler;
impl Handler<Ping> for PingHandler {
    fn handle(&self, _: Ping) -> String {
        "pong".to_string()
    }
}
impl Component for PingHandler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| PingHandler)]
    }
}
implements!(PingHandler => dyn Handler<Ping>);

pub struct PongHandler;
impl Handler<Pong> for PongHandler {
    fn handle(&self, _: Pong) -> String {
        "ping".to_string()
    }
}
impl Component for PongHandler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| PongHandler)]
    }
}
implements!(PongHandler => dyn Handler<Pong>);

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .interface::<dyn IGreeter>()
        .interface::<dyn IClock>()
        .interface::<dyn IStore>()
        .interface::<dyn Identity>()
        .implementation::<Greeter, dyn IGreeter>()
        .implementation::<LoudGreeter, dyn IGreeter>()
        .implementation::<system::Clock, dyn IClock>()
        .implementation::<fake::Clock, dyn IClock>()
        .implementation::<MemoryStore, dyn IStore>()
        .implementation::<PingHandler, dyn Handler<Ping>>()
        .implementation::<PongHandler, dyn Handler<Pong>>()
}

#[test]
fn interface_is_registered_with_its_namesake() {
    let resolver = Resolver::new();
    resolver
        .registry()
        .add_interfaces_with_matching_implementations(&catalog())
        .unwrap();

    let greeter: Arc<dyn IGreeter> = resolver.get().unwrap();
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn ambiguous_or_missing_matches_are_skipped() {
    let resolver = Resolver::new();
    resolver
        .registry()
        .add_interfaces_with_matching_implementations(&catalog())
        .unwrap();

    assert!(!resolver.supports::<dyn IClock>());
    assert!(!resolver.supports::<dyn IStore>());
    assert!(!resolver.supports::<dyn Identity>());
}

#[test]
fn scanning_keeps_existing_registrations() {
    let resolver = Resolver::new();
    resolver
        .registry()
        .add::<dyn IGreeter, LoudGreeter>()
        .unwrap()
        .add_interfaces_with_matching_implementations(&catalog())
        .unwrap()
        .add_interfaces_with_matching_implementations(&catalog())
        .unwrap();

    assert_eq!(resolver.get::<dyn IGreeter>().unwrap().greet(), "HELLO");
}

#[test]
fn closed_forms_of_an_open_definition_are_registered() {
    let resolver = Resolver::new();
    resolver
        .registry()
        .add_implementations_supporting_open_generic::<HandlerOf>(&catalog())
        .unwrap();

    assert!(resolver.is_registered::<dyn Handler<Ping>>());
    assert!(resolver.is_registered::<dyn Handler<Pong>>());
    assert!(!resolver.is_registered::<dyn IGreeter>());

    assert_eq!(resolver.get::<dyn Handler<Ping>>().unwrap().handle(Ping), "pong");
    assert_eq!(resolver.get::<dyn Handler<Pong>>().unwrap().handle(Pong), "ping");
}

#[test]
fn unscanned_closed_form_is_unregistered() {
    pub struct Unknown;

    let resolver = Resolver::new();
    resolver
        .registry()
        .add_implementations_supporting_open_generic::<HandlerOf>(&catalog())
        .unwrap();

    assert!(resolver.get::<dyn Handler<Unknown>>().is_err());
}

#[test]
fn listing_an_implementation_twice_is_not_ambiguous() {
    let catalog = TypeCatalog::new()
        .interface::<dyn IGreeter>()
        .implementation::<Greeter, dyn IGreeter>()
        .implementation::<Greeter, dyn IGreeter>();

    let resolver = Resolver::new();
    resolver
        .registry()
        .add_interfaces_with_matching_implementations(&catalog)
        .unwrap();

    assert!(resolver.supports::<dyn IGreeter>());
    assert_eq!(resolver.get::<dyn IGreeter>().unwrap().greet(), "hello");
}
