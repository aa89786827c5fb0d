//! Keel DI resolves capabilities to instances of the components registered for them.
//!
//! Components declare their constructors and the capabilities they need,
//! the [Resolver] picks the first constructor it can satisfy and manages
//! the instance according to the registration's [Lifecycle].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use keel_di::{capability, implements, Component, Constructor, Lifecycle, Resolver};
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//! capability!(dyn Logger);
//!
//! pub struct Console;
//! impl Logger for Console {
//!     fn log(&self, message: &str) -> String {
//!         format!("[console] {message}")
//!     }
//! }
//! impl Component for Console {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::from_fn(|| Console)]
//!     }
//! }
//! implements!(Console => dyn Logger);
//!
//! pub struct Service {
//!     logger: Arc<dyn Logger>,
//! }
//! impl Component for Service {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::inject1(|logger: Arc<dyn Logger>| Service { logger })]
//!     }
//! }
//! capability!(Service);
//!
//! let resolver = Resolver::new();
//! resolver
//!     .registry()
//!     .add_with_lifecycle::<dyn Logger, Console>(Lifecycle::Singleton)?
//!     .add::<Service, Service>()?;
//!
//! let service = resolver.get::<Service>()?;
//! assert_eq!(service.logger.log("up"), "[console] up");
//! # Ok::<(), keel_di::ResolveError>(())
//! ```

mod builder;
mod catalog;
mod errors;
mod macros;
mod registration;
mod registry;
mod resolution;
mod resolver;
mod scope;
mod types;
mod validation;

pub use builder::RegistryBuilder;
pub use catalog::TypeCatalog;
pub use errors::ResolveError;
pub use registration::{
    Component, Constructor, Implements, Lifecycle, OpenRegistration, Registration, RegistrationId,
};
pub use resolution::Resolution;
pub use resolver::Resolver;
pub use scope::ScopeStack;
pub use types::{Capability, Instance, Specializer, TypeDescriptor, TypeInfo};
