use std::sync::Arc;

use crate::{
    catalog::TypeCatalog,
    errors::ResolveError,
    registration::{Implements, Lifecycle, OpenRegistration, Registration},
    registry::Registry,
    types::{Capability, TypeInfo},
};

/// Adds registrations to a [Resolver](crate::Resolver)
///
/// The builder writes to the resolver's registrations directly,
/// registrations are visible to the resolver as soon as they are added.
///
/// The typed `add*` methods fail on duplicates, while the loosely typed
/// [add_registration](Self::add_registration) and [add_open_generic](Self::add_open_generic)
/// keep the first registration of a type.
pub struct RegistryBuilder {
    registry: Arc<Registry>,
}

impl RegistryBuilder {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        RegistryBuilder { registry }
    }
}

impl RegistryBuilder {
    /// Registers `T` as the [Lifecycle::PerCall] implementation of `I`
    pub fn add<I, T>(&mut self) -> Result<&mut Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        self.add_with_lifecycle::<I, T>(Lifecycle::PerCall)
    }

    pub fn add_with_lifecycle<I, T>(&mut self, lifecycle: Lifecycle) -> Result<&mut Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        self.registry.insert(Registration::new::<I, T>(lifecycle)?)?;
        Ok(self)
    }

    /// Registers `T` as the [Lifecycle::PerCall] implementation of `I`,
    /// `hook` runs on every new instance before it is handed out
    pub fn add_with_hook<I, T>(
        &mut self,
        hook: impl Fn(&mut T) + Send + Sync + 'static,
    ) -> Result<&mut Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        self.add_with_lifecycle_and_hook::<I, T>(Lifecycle::PerCall, hook)
    }

    pub fn add_with_lifecycle_and_hook<I, T>(
        &mut self,
        lifecycle: Lifecycle,
        hook: impl Fn(&mut T) + Send + Sync + 'static,
    ) -> Result<&mut Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        self.registry
            .insert(Registration::with_hook::<I, T>(lifecycle, hook)?)?;
        Ok(self)
    }

    /// Registers an existing instance as `I`, it is returned for every request
    pub fn add_instance<I: ?Sized + Capability>(
        &mut self,
        instance: Arc<I>,
    ) -> Result<&mut Self, ResolveError> {
        self.registry.insert(Registration::supplied(instance))?;
        Ok(self)
    }

    /// Adds a prepared registration, unless its declared type is already registered
    pub fn add_registration(&mut self, registration: Registration) -> &mut Self {
        self.registry.insert_if_absent(registration);
        self
    }

    /// Registers the open implementation marked by `Implementation` for the open definition
    /// marked by `Definition`, as [Lifecycle::PerCall]
    ///
    /// Closed forms of the definition are specialized through their
    /// [TypeDescriptor](crate::TypeDescriptor) on first request.
    pub fn add_open_generic<Definition, Implementation>(&mut self) -> Result<&mut Self, ResolveError>
    where
        Definition: ?Sized + 'static,
        Implementation: ?Sized + 'static,
    {
        self.add_open_generic_with_lifecycle::<Definition, Implementation>(Lifecycle::PerCall)
    }

    pub fn add_open_generic_with_lifecycle<Definition, Implementation>(
        &mut self,
        lifecycle: Lifecycle,
    ) -> Result<&mut Self, ResolveError>
    where
        Definition: ?Sized + 'static,
        Implementation: ?Sized + 'static,
    {
        let open = OpenRegistration::new(
            TypeInfo::of::<Definition>(),
            TypeInfo::of::<Implementation>(),
            lifecycle,
        )?;
        self.registry.insert_open_if_absent(open);
        Ok(self)
    }

    /// Registers every catalog interface `IName` whose only catalog implementation named `Name` implements it
    pub fn add_interfaces_with_matching_implementations(
        &mut self,
        catalog: &TypeCatalog,
    ) -> Result<&mut Self, ResolveError> {
        for entry in catalog.interfaces_with_matching_implementations() {
            tracing::debug!(
                "Found {} for {} by name",
                entry.implementation,
                entry.capability.info
            );
            self.add_registration((entry.register)(Lifecycle::PerCall)?);
        }
        Ok(self)
    }

    /// Registers every catalog implementation of a closed form of the open definition marked by `Definition`
    ///
    /// Each implementation is registered for the closed form it implements.
    pub fn add_implementations_supporting_open_generic<Definition>(
        &mut self,
        catalog: &TypeCatalog,
    ) -> Result<&mut Self, ResolveError>
    where
        Definition: ?Sized + 'static,
    {
        for entry in catalog.implementations_supporting(TypeInfo::of::<Definition>()) {
            tracing::debug!(
                "Found {} for {}",
                entry.implementation,
                entry.capability.info
            );
            self.add_registration((entry.register)(Lifecycle::PerCall)?);
        }
        Ok(self)
    }
}
