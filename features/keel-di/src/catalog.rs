use crate::{
    errors::ResolveError,
    registration::{Implements, Lifecycle, Registration},
    types::{Capability, TypeDescriptor, TypeInfo},
};

type Register = fn(Lifecycle) -> Result<Registration, ResolveError>;

/// A known component and one capability it implements
#[derive(Clone, Copy)]
pub(crate) struct CatalogEntry {
    pub(crate) implementation: TypeInfo,
    pub(crate) capability: TypeDescriptor,
    pub(crate) register: Register,
}

/// The set of types convention based registration can scan
///
/// Rust can't enumerate the types of a program, so they are listed here instead.
///
/// # Example
/// ```
/// use keel_di::{capability, implements, Component, Constructor, Resolver, TypeCatalog};
///
/// pub trait IGreeter: Send + Sync {}
/// capability!(dyn IGreeter);
///
/// pub struct Greeter;
/// impl IGreeter for Greeter {}
/// impl Component for Greeter {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::from_fn(|| Greeter)]
///     }
/// }
/// implements!(Greeter => dyn IGreeter);
///
/// let catalog = TypeCatalog::new()
///     .interface::<dyn IGreeter>()
///     .implementation::<Greeter, dyn IGreeter>();
///
/// let resolver = Resolver::new();
/// resolver.registry().add_interfaces_with_matching_implementations(&catalog)?;
/// assert!(resolver.supports::<dyn IGreeter>());
/// # Ok::<(), keel_di::ResolveError>(())
/// ```
#[derive(Clone, Default)]
pub struct TypeCatalog {
    interfaces: Vec<TypeInfo>,
    implementations: Vec<CatalogEntry>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists an interface for [add_interfaces_with_matching_implementations](crate::RegistryBuilder::add_interfaces_with_matching_implementations)
    pub fn interface<I: ?Sized + Capability>(mut self) -> Self {
        let info = I::descriptor().info;
        if !self.interfaces.contains(&info) {
            self.interfaces.push(info);
        }
        self
    }

    /// Lists the component `T` as an implementation of `I`
    ///
    /// List it once for every capability it implements, listing the same pair again has no effect.
    pub fn implementation<T, I>(mut self) -> Self
    where
        I: ?Sized + Capability,
        T: Implements<I>,
    {
        let implementation = TypeInfo::of::<T>();
        let capability = I::descriptor();
        let listed = self.implementations.iter().any(|entry| {
            entry.implementation == implementation && entry.capability.info == capability.info
        });
        if !listed {
            self.implementations.push(CatalogEntry {
                implementation,
                capability,
                register: Registration::new::<I, T>,
            });
        }
        self
    }

    /// Pairs every interface with the single implementation named like it, without its `I` marker
    ///
    /// Interfaces without a match, or with more than one, are skipped.
    pub(crate) fn interfaces_with_matching_implementations(&self) -> Vec<CatalogEntry> {
        let mut matches = Vec::new();
        for interface in &self.interfaces {
            let Some(expected) = implementation_name(interface.short_name()) else {
                tracing::trace!("{} has no interface marker, skipping", interface);
                continue;
            };

            let candidates: Vec<&CatalogEntry> = self
                .implementations
                .iter()
                .filter(|entry| {
                    entry.capability.info == *interface
                        && entry.implementation.short_name() == expected
                })
                .collect();

            match candidates.as_slice() {
                [entry] => matches.push(**entry),
                [] => tracing::trace!("No implementation named {} for {}", expected, interface),
                _ => tracing::debug!(
                    "{} implementations named {} for {}, skipping",
                    candidates.len(),
                    expected,
                    interface
                ),
            }
        }
        matches
    }

    /// Implementations of any closed form of the open definition marked by `definition`
    pub(crate) fn implementations_supporting(&self, definition: TypeInfo) -> Vec<CatalogEntry> {
        self.implementations
            .iter()
            .filter(|entry| entry.capability.definition == Some(definition))
            .copied()
            .collect()
    }
}

/// `IGreeter` -> `Greeter`
fn implementation_name(interface: &str) -> Option<&str> {
    let name = interface.strip_prefix('I')?;
    name.starts_with(|first: char| first.is_ascii_uppercase())
        .then_some(name)
}
