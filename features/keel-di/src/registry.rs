use std::{
    any::TypeId,
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    errors::ResolveError,
    registration::{OpenRegistration, Registration},
};

/// Registrations shared by a resolver and its builders
///
/// Registering after the first resolution is allowed and visible immediately.
#[derive(Default)]
pub(crate) struct Registry {
    /// Registrations by declared type, including bound open generic specializations
    exact: RwLock<HashMap<TypeId, Arc<Registration>>>,
    /// Open generic registrations by definition marker
    open: RwLock<HashMap<TypeId, OpenRegistration>>,
}
impl Registry {
    pub(crate) fn registration(&self, declared: &TypeId) -> Option<Arc<Registration>> {
        self.exact.read().get(declared).cloned()
    }

    pub(crate) fn open_registration(&self, definition: &TypeId) -> Option<OpenRegistration> {
        self.open.read().get(definition).copied()
    }

    pub(crate) fn contains(&self, declared: &TypeId) -> bool {
        self.exact.read().contains_key(declared)
    }

    pub(crate) fn contains_open(&self, definition: &TypeId) -> bool {
        self.open.read().contains_key(definition)
    }

    /// Adds a registration, fails if the declared type is already registered
    pub(crate) fn insert(&self, registration: Registration) -> Result<(), ResolveError> {
        let declared = registration.declared();
        match self.exact.write().entry(declared.type_id) {
            Entry::Occupied(_) => Err(ResolveError::DuplicateRegistration(declared)),
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Registered {} as {:?} {}",
                    declared,
                    registration.lifecycle(),
                    registration.concrete()
                );
                entry.insert(Arc::new(registration));
                Ok(())
            }
        }
    }

    /// Adds a registration unless the declared type is already registered
    ///
    /// Returns false if the registration was ignored.
    pub(crate) fn insert_if_absent(&self, registration: Registration) -> bool {
        let declared = registration.declared();
        match self.insert(registration) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("{} is already registered, keeping the first registration", declared);
                false
            }
        }
    }

    /// Binds a specialized open generic registration under its closed type
    ///
    /// Returns the registration which is bound, which is an existing one if another
    /// resolution bound the type first.
    pub(crate) fn bind_specialized(&self, registration: Registration) -> Arc<Registration> {
        self.exact
            .write()
            .entry(registration.declared().type_id)
            .or_insert_with(|| Arc::new(registration))
            .clone()
    }

    /// Adds an open registration unless its definition is already registered
    pub(crate) fn insert_open_if_absent(&self, open: OpenRegistration) -> bool {
        match self.open.write().entry(open.definition().type_id) {
            Entry::Occupied(_) => {
                tracing::debug!(
                    "Open definition {} is already registered, keeping the first registration",
                    open.definition()
                );
                false
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Registered open definition {} as {:?} {}",
                    open.definition(),
                    open.lifecycle(),
                    open.implementation()
                );
                entry.insert(open);
                true
            }
        }
    }

    /// All registrations, exact ones first
    pub(crate) fn describe(&self) -> Vec<(&'static str, String)> {
        let mut entries: Vec<_> = self
            .exact
            .read()
            .values()
            .map(|registration| {
                (
                    registration.declared().type_name,
                    format!("{:?} {}", registration.lifecycle(), registration.concrete()),
                )
            })
            .collect();
        entries.extend(self.open.read().values().map(|open| {
            (
                open.definition().type_name,
                format!("{:?} {} (open)", open.lifecycle(), open.implementation()),
            )
        }));
        entries
    }
}
