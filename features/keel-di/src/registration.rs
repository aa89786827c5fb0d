use std::{
    any::{type_name, TypeId},
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

use crate::{
    errors::ResolveError,
    resolution::Resolution,
    types::{Capability, Instance, TypeDescriptor, TypeInfo},
    validation,
};

/// Determines how instances of a registration are reused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// If a capability is requested twice within one outermost resolution, the same instance is returned
    #[default]
    PerCall,
    /// A new instance is returned every time
    Transient,
    /// The same instance is returned every time for the lifetime of the resolver
    Singleton,
    /// The instance was supplied by the caller and is never constructed
    Supplied,
}

/// Process unique identity of a [Registration]
///
/// PerCall and Singleton instances are cached by registration, not by requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);
impl RegistrationId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        RegistrationId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A type the resolver can construct
///
/// The constructors are tried in order, the first one whose parameters are all
/// resolvable is used.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use keel_di::{capability, Component, Constructor};
///
/// pub trait Clock: Send + Sync {}
/// capability!(dyn Clock);
///
/// pub struct Scheduler {
///     clock: Option<Arc<dyn Clock>>,
/// }
/// impl Component for Scheduler {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::inject1(|clock: Arc<dyn Clock>| Scheduler { clock: Some(clock) }),
///             Constructor::from_fn(|| Scheduler { clock: None }),
///         ]
///     }
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Returns the constructors of the component, in order of preference
    ///
    /// An empty list means the component can't be constructed by the resolver.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Proof that the component `Self` can be handed out as `I`
///
/// Every component implements it for itself,
/// trait objects are declared with [implements!](crate::implements).
pub trait Implements<I: ?Sized>: Component {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}
impl<T: Component> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

type Build<T> = dyn Fn(&mut Resolution<'_>) -> Result<T, ResolveError> + Send + Sync;

/// One way of constructing a component
///
/// Declares the parameters it needs and builds the component by resolving them in order.
pub struct Constructor<T> {
    parameters: Vec<TypeDescriptor>,
    build: Box<Build<T>>,
}
impl<T> Debug for Constructor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl<T: 'static> Constructor<T> {
    /// Creates a constructor from its parameter list and a build function
    ///
    /// The build function must only resolve the declared parameters.
    pub fn new(
        parameters: Vec<TypeDescriptor>,
        build: impl Fn(&mut Resolution<'_>) -> Result<T, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        Constructor {
            parameters,
            build: Box::new(build),
        }
    }

    /// A constructor without parameters
    pub fn from_fn(construct: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::new(Vec::new(), move |_| Ok(construct()))
    }

    pub fn inject1<A>(construct: impl Fn(Arc<A>) -> T + Send + Sync + 'static) -> Self
    where
        A: ?Sized + Capability,
    {
        Self::new(vec![A::descriptor()], move |resolution| {
            let a = resolution.get::<A>()?;
            Ok(construct(a))
        })
    }

    pub fn inject2<A, B>(construct: impl Fn(Arc<A>, Arc<B>) -> T + Send + Sync + 'static) -> Self
    where
        A: ?Sized + Capability,
        B: ?Sized + Capability,
    {
        Self::new(vec![A::descriptor(), B::descriptor()], move |resolution| {
            let a = resolution.get::<A>()?;
            let b = resolution.get::<B>()?;
            Ok(construct(a, b))
        })
    }

    pub fn inject3<A, B, C>(
        construct: impl Fn(Arc<A>, Arc<B>, Arc<C>) -> T + Send + Sync + 'static,
    ) -> Self
    where
        A: ?Sized + Capability,
        B: ?Sized + Capability,
        C: ?Sized + Capability,
    {
        Self::new(
            vec![A::descriptor(), B::descriptor(), C::descriptor()],
            move |resolution| {
                let a = resolution.get::<A>()?;
                let b = resolution.get::<B>()?;
                let c = resolution.get::<C>()?;
                Ok(construct(a, b, c))
            },
        )
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    /// The first parameter the resolution can't supply, if any
    fn unsupported(&self, resolution: &Resolution<'_>) -> Option<TypeInfo> {
        self.parameters
            .iter()
            .find(|parameter| !resolution.supports(parameter))
            .map(|parameter| parameter.info)
    }
}

type Activate = dyn Fn(&mut Resolution<'_>) -> Result<Instance, ResolveError> + Send + Sync;

fn activator<F>(activate: F) -> Box<Activate>
where
    F: Fn(&mut Resolution<'_>) -> Result<Instance, ResolveError> + Send + Sync + 'static,
{
    Box::new(activate)
}

enum Activator {
    Construct(Box<Activate>),
    Supplied(Instance),
}

/// Binding of a declared capability to the way its instances are produced
pub struct Registration {
    id: RegistrationId,
    declared: TypeInfo,
    concrete: TypeInfo,
    lifecycle: Lifecycle,
    activator: Activator,
    /// Singleton cache slot, locked while the singleton is constructed
    singleton: Mutex<Option<Instance>>,
}
impl Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("declared", &self.declared.type_name)
            .field("concrete", &self.concrete.type_name)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl Registration {
    /// Registers `T` as the implementation of `I`
    ///
    /// Fails with [ResolveError::InvalidArgument] for [Lifecycle::Supplied].
    pub fn new<I, T>(lifecycle: Lifecycle) -> Result<Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        Self::constructed::<I, T>(lifecycle, None)
    }

    /// Registers `T` as the implementation of `I`, running `hook` on every freshly constructed `T`
    ///
    /// The hook runs before the instance is cached or handed out.
    pub fn with_hook<I, T>(
        lifecycle: Lifecycle,
        hook: impl Fn(&mut T) + Send + Sync + 'static,
    ) -> Result<Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        Self::constructed::<I, T>(lifecycle, Some(Box::new(hook)))
    }

    /// Registers an existing instance as `I`
    pub fn supplied<I: ?Sized + Capability>(instance: Arc<I>) -> Self {
        let declared = TypeInfo::of::<I>();
        Registration {
            id: RegistrationId::next(),
            declared,
            concrete: declared,
            lifecycle: Lifecycle::Supplied,
            activator: Activator::Supplied(Instance::of(instance)),
            singleton: Mutex::new(None),
        }
    }

    fn constructed<I, T>(
        lifecycle: Lifecycle,
        hook: Option<Box<dyn Fn(&mut T) + Send + Sync>>,
    ) -> Result<Self, ResolveError>
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        let declared = TypeInfo::of::<I>();
        let lifecycle = validation::constructible(declared, lifecycle)?;

        let activate = activator(move |resolution| {
            let mut component = construct::<T>(declared, resolution)?;
            if let Some(hook) = &hook {
                hook(&mut component);
            }
            let instance = <T as Implements<I>>::upcast(Arc::new(component));
            Ok(Instance::of::<I>(instance))
        });

        Ok(Registration {
            id: RegistrationId::next(),
            declared,
            concrete: TypeInfo::of::<T>(),
            lifecycle,
            activator: Activator::Construct(activate),
            singleton: Mutex::new(None),
        })
    }

    /// Produces a new instance, ignoring the lifecycle
    ///
    /// Supplied registrations return their instance.
    pub fn instantiate(&self, resolution: &mut Resolution<'_>) -> Result<Instance, ResolveError> {
        match &self.activator {
            Activator::Construct(activate) => activate(resolution),
            Activator::Supplied(instance) => Ok(instance.clone()),
        }
    }

    /// Returns the cached singleton, constructing it on first use
    pub(crate) fn singleton(
        &self,
        resolution: &mut Resolution<'_>,
    ) -> Result<Instance, ResolveError> {
        let mut slot = self.singleton.lock();
        if let Some(instance) = slot.as_ref() {
            tracing::trace!("Singleton cache hit for {}", self.declared);
            return Ok(instance.clone());
        }

        let instance = self.instantiate(resolution)?;
        *slot = Some(instance.clone());
        Ok(instance)
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn declared(&self) -> TypeInfo {
        self.declared
    }

    pub fn concrete(&self) -> TypeInfo {
        self.concrete
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Selects the first satisfiable constructor of `T` and builds it
fn construct<T: Component>(
    declared: TypeInfo,
    resolution: &mut Resolution<'_>,
) -> Result<T, ResolveError> {
    let mut missing = None;
    for constructor in T::constructors() {
        match constructor.unsupported(resolution) {
            None => {
                tracing::debug!("Constructing {} as {}", type_name::<T>(), declared);
                return (constructor.build)(resolution);
            }
            Some(parameter) => {
                missing.get_or_insert(parameter);
            }
        }
    }

    Err(ResolveError::UnsatisfiableDependency {
        component: declared,
        missing,
    })
}

/// Registration of an open type-parametric definition against an open implementation
///
/// Both sides are represented by marker types. The closed registration is built on request,
/// see [TypeDescriptor::parametric].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRegistration {
    definition: TypeInfo,
    implementation: TypeInfo,
    lifecycle: Lifecycle,
}
impl OpenRegistration {
    pub fn new(
        definition: TypeInfo,
        implementation: TypeInfo,
        lifecycle: Lifecycle,
    ) -> Result<Self, ResolveError> {
        validation::open_definition(definition, implementation)?;
        let lifecycle = validation::constructible(definition, lifecycle)?;
        Ok(OpenRegistration {
            definition,
            implementation,
            lifecycle,
        })
    }

    /// Builds the closed registration `I` -> `T` if this registration's implementation is `Family`
    pub fn bind<Family, I, T>(&self) -> Option<Result<Registration, ResolveError>>
    where
        Family: ?Sized + 'static,
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        if self.implementation.type_id != TypeId::of::<Family>() {
            return None;
        }
        Some(Registration::new::<I, T>(self.lifecycle))
    }

    pub fn definition(&self) -> TypeInfo {
        self.definition
    }

    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}
