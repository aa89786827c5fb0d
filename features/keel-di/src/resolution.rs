use std::{any::type_name, sync::Arc};

use crate::{
    errors::ResolveError,
    registration::{Lifecycle, OpenRegistration, Registration},
    resolver::Resolver,
    scope::{Scope, ScopeStack},
    types::{Capability, Instance, TypeDescriptor, TypeInfo},
    validation,
};

/// One outermost resolution call and its scope
///
/// Every request made through the same `Resolution` shares its PerCall cache and its
/// supplied instances. Constructors receive the active `Resolution`, so the dependencies of a
/// component are resolved within the call that requested the component.
///
/// The scope is torn down when the `Resolution` is dropped.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use keel_di::{capability, Component, Constructor, Resolver};
///
/// pub struct Connection;
/// impl Component for Connection {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::from_fn(|| Connection)]
///     }
/// }
/// capability!(Connection);
///
/// let resolver = Resolver::new();
/// resolver.registry().add::<Connection, Connection>()?;
///
/// let mut resolution = resolver.scope();
/// let a = resolution.get::<Connection>()?;
/// let b = resolution.get::<Connection>()?;
/// assert!(Arc::ptr_eq(&a, &b));
/// drop(resolution);
///
/// let c = resolver.get::<Connection>()?;
/// assert!(!Arc::ptr_eq(&a, &c));
/// # Ok::<(), keel_di::ResolveError>(())
/// ```
pub struct Resolution<'r> {
    resolver: &'r Resolver,
    stack: ScopeStack,
    scope: Scope,
}

impl<'r> Resolution<'r> {
    pub(crate) fn new(resolver: &'r Resolver) -> Self {
        Resolution {
            resolver,
            stack: ScopeStack::new(),
            scope: Scope::default(),
        }
    }

    /// Resolves `I`
    pub fn get<I: ?Sized + Capability>(&mut self) -> Result<Arc<I>, ResolveError> {
        let instance = self.resolve(&I::descriptor())?;
        downcast(instance)
    }

    /// Supplies instances for the rest of this resolution, then resolves `I`
    ///
    /// Fails with [ResolveError::DuplicateSuppliedInstance] if a type is supplied twice,
    /// in which case none of the instances are supplied.
    pub fn get_with<I: ?Sized + Capability>(
        &mut self,
        supplied: impl IntoIterator<Item = Instance>,
    ) -> Result<Arc<I>, ResolveError> {
        let instance = self.resolve_with(&I::descriptor(), supplied)?;
        downcast(instance)
    }

    pub fn resolve_with(
        &mut self,
        requested: &TypeDescriptor,
        supplied: impl IntoIterator<Item = Instance>,
    ) -> Result<Instance, ResolveError> {
        let supplied: Vec<Instance> = supplied.into_iter().collect();
        for instance in &supplied {
            tracing::trace!("Supplying {}", instance.info);
        }
        self.scope.supply_all(supplied)?;
        self.resolve(requested)
    }

    /// Resolves the described capability
    pub fn resolve(&mut self, requested: &TypeDescriptor) -> Result<Instance, ResolveError> {
        let depth = self.stack.push(requested.info);
        tracing::trace!(depth, "Resolving {}", requested.info);

        let result = self.lookup(requested);

        self.stack.pop();
        result
    }

    /// Returns true if the described capability is supplied to this resolution or registered
    ///
    /// Does not construct anything.
    pub fn supports(&self, requested: &TypeDescriptor) -> bool {
        self.scope.supplied(&requested.info.type_id).is_some()
            || self.resolver.supports_descriptor(requested)
    }

    /// Number of requests currently being resolved
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Requests currently being resolved, outermost first
    pub fn path(&self) -> &[TypeInfo] {
        self.stack.path()
    }

    fn lookup(&mut self, requested: &TypeDescriptor) -> Result<Instance, ResolveError> {
        let info = requested.info;

        // Supplied to this resolution
        if let Some(instance) = self.scope.supplied(&info.type_id) {
            tracing::trace!("Using supplied instance of {}", info);
            return Ok(instance.clone());
        }

        // Registered as is
        let resolver = self.resolver;
        let registry = resolver.registry_ref();
        if let Some(registration) = registry.registration(&info.type_id) {
            return self.activate(&registration);
        }

        // Closed form of a registered open definition
        if let Some(definition) = requested.definition {
            if let Some(open) = registry.open_registration(&definition.type_id) {
                let registration = self.specialize(requested, &open)?;
                return self.activate(&registration);
            }
        }

        tracing::error!("Tried to resolve an unregistered type: {}", info);
        Err(ResolveError::UnregisteredType(info))
    }

    /// Builds the closed registration for `requested` and binds it for future requests
    fn specialize(
        &self,
        requested: &TypeDescriptor,
        open: &OpenRegistration,
    ) -> Result<Arc<Registration>, ResolveError> {
        let registration = match requested.specialize(open) {
            Some(registration) => registration?,
            None => {
                return Err(ResolveError::UnsatisfiableDependency {
                    component: requested.info,
                    missing: None,
                })
            }
        };
        validation::specialized(requested.info, &registration)?;

        tracing::debug!(
            "Specialized open definition {} as {} for {}",
            open.definition(),
            registration.concrete(),
            requested.info
        );
        Ok(self.resolver.registry_ref().bind_specialized(registration))
    }

    /// Produces an instance according to the registration's lifecycle
    fn activate(&mut self, registration: &Registration) -> Result<Instance, ResolveError> {
        match registration.lifecycle() {
            Lifecycle::Transient => registration.instantiate(self),
            Lifecycle::PerCall => {
                if let Some(instance) = self.scope.per_call(registration.id()) {
                    tracing::trace!("PerCall cache hit for {}", registration.declared());
                    return Ok(instance.clone());
                }
                let instance = registration.instantiate(self)?;
                Ok(self.scope.store(registration.id(), instance))
            }
            Lifecycle::Singleton => registration.singleton(self),
            Lifecycle::Supplied => registration.instantiate(self),
        }
    }
}

impl Drop for Resolution<'_> {
    fn drop(&mut self) {
        let released = self.scope.teardown();
        if released > 0 {
            tracing::debug!("Resolution closed, released {} scoped instances", released);
        }
    }
}

fn downcast<I: ?Sized + Capability>(instance: Instance) -> Result<Arc<I>, ResolveError> {
    instance
        .downcast::<I>()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            required_type: type_name::<I>(),
            actual_type,
        })
}
