use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use crate::{
    builder::RegistryBuilder,
    errors::ResolveError,
    registry::Registry,
    resolution::Resolution,
    types::{Capability, Instance, TypeDescriptor},
};

/// Resolves capabilities to instances
///
/// Cloning a resolver is cheap, clones share registrations and singletons.
#[derive(Clone, Default)]
pub struct Resolver(Arc<Registry>);
impl Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Resolver");
        for (declared, registration) in self.0.describe() {
            map.field(declared, &registration);
        }
        map.finish()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process wide resolver
    pub fn global() -> &'static Resolver {
        static GLOBAL: LazyLock<Resolver> = LazyLock::new(Resolver::new);
        &GLOBAL
    }

    /// Returns a builder adding registrations to this resolver
    pub fn registry(&self) -> RegistryBuilder {
        RegistryBuilder::new(self.0.clone())
    }

    /// Configures the registrations of this resolver
    ///
    /// # Example
    /// ```
    /// use keel_di::{capability, Component, Constructor, Lifecycle, Resolver};
    ///
    /// pub struct Settings;
    /// impl Component for Settings {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::from_fn(|| Settings)]
    ///     }
    /// }
    /// capability!(Settings);
    ///
    /// let resolver = Resolver::new();
    /// resolver.configure(|registry| {
    ///     registry.add_with_lifecycle::<Settings, Settings>(Lifecycle::Singleton)?;
    ///     Ok(())
    /// })?;
    ///
    /// assert!(resolver.supports::<Settings>());
    /// # Ok::<(), keel_di::ResolveError>(())
    /// ```
    pub fn configure<F>(&self, configure: F) -> Result<&Self, ResolveError>
    where
        F: FnOnce(&mut RegistryBuilder) -> Result<(), ResolveError>,
    {
        configure(&mut self.registry())?;
        Ok(self)
    }

    /// Opens a resolution, requests made through it share one scope until it is dropped
    pub fn scope(&self) -> Resolution<'_> {
        Resolution::new(self)
    }

    /// Resolves `I` in a new scope
    pub fn get<I: ?Sized + Capability>(&self) -> Result<Arc<I>, ResolveError> {
        self.scope().get::<I>()
    }

    /// Resolves `I` in a new scope, the supplied instances are only available within it
    pub fn get_with<I: ?Sized + Capability>(
        &self,
        supplied: impl IntoIterator<Item = Instance>,
    ) -> Result<Arc<I>, ResolveError> {
        self.scope().get_with::<I>(supplied)
    }

    /// Returns true if `I` is registered, directly or through its open definition
    pub fn supports<I: ?Sized + Capability>(&self) -> bool {
        self.supports_descriptor(&I::descriptor())
    }

    /// Returns true if `I` itself is registered, ignoring open definitions
    pub fn is_registered<I: ?Sized + Capability>(&self) -> bool {
        self.0.contains(&I::descriptor().info.type_id)
    }

    pub(crate) fn supports_descriptor(&self, requested: &TypeDescriptor) -> bool {
        self.0.contains(&requested.info.type_id)
            || requested
                .definition
                .is_some_and(|definition| self.0.contains_open(&definition.type_id))
    }

    pub(crate) fn registry_ref(&self) -> &Registry {
        &self.0
    }
}
