use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
};

use crate::{
    errors::ResolveError,
    registration::RegistrationId,
    types::{Instance, TypeInfo},
};

/// Stack of the requests active in one resolution
///
/// The bottom entry is the outermost request, every nested request pushes on top of it.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<TypeInfo>,
}
impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a request, returns its depth (0 = outermost)
    pub fn push(&mut self, requested: TypeInfo) -> usize {
        self.frames.push(requested);
        self.frames.len() - 1
    }

    /// Leaves the innermost request
    pub fn pop(&mut self) -> Option<TypeInfo> {
        self.frames.pop()
    }

    /// The innermost active request
    pub fn peek(&self) -> Option<TypeInfo> {
        self.frames.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Active requests, outermost first
    pub fn path(&self) -> &[TypeInfo] {
        &self.frames
    }
}

/// Caches living for one outermost resolution
#[derive(Debug, Default)]
pub(crate) struct Scope {
    /// PerCall instances by the registration which produced them
    per_call: HashMap<RegistrationId, Instance>,
    /// Instances supplied by the caller for this resolution only
    supplied: HashMap<TypeId, Instance>,
}
impl Scope {
    /// Makes instances available for the rest of this scope, either all of them or none
    pub(crate) fn supply_all(&mut self, instances: Vec<Instance>) -> Result<(), ResolveError> {
        let mut batch = HashSet::with_capacity(instances.len());
        for instance in &instances {
            let info = instance.info;
            if self.supplied.contains_key(&info.type_id) || !batch.insert(info.type_id) {
                return Err(ResolveError::DuplicateSuppliedInstance(info));
            }
        }
        for instance in instances {
            self.supplied.insert(instance.info.type_id, instance);
        }
        Ok(())
    }

    pub(crate) fn supplied(&self, type_id: &TypeId) -> Option<&Instance> {
        self.supplied.get(type_id)
    }

    pub(crate) fn per_call(&self, registration: RegistrationId) -> Option<&Instance> {
        self.per_call.get(&registration)
    }

    /// Stores a PerCall instance, an instance stored first is kept
    pub(crate) fn store(&mut self, registration: RegistrationId, instance: Instance) -> Instance {
        self.per_call
            .entry(registration)
            .or_insert(instance)
            .clone()
    }

    /// Releases everything cached in this scope, returns the number of released instances
    pub(crate) fn teardown(&mut self) -> usize {
        let released = self.per_call.len() + self.supplied.len();
        self.per_call.clear();
        self.supplied.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct Service;
    struct Logger;

    #[test]
    fn stack_tracks_nested_requests() {
        let mut stack = ScopeStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.peek(), None);

        assert_eq!(stack.push(TypeInfo::of::<Service>()), 0);
        assert_eq!(stack.push(TypeInfo::of::<Logger>()), 1);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.peek(), Some(TypeInfo::of::<Logger>()));
        assert_eq!(
            stack.path(),
            &[TypeInfo::of::<Service>(), TypeInfo::of::<Logger>()]
        );

        assert_eq!(stack.pop(), Some(TypeInfo::of::<Logger>()));
        assert_eq!(stack.pop(), Some(TypeInfo::of::<Service>()));
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn supplying_twice_fails() {
        let mut scope = Scope::default();
        scope.supply_all(vec![Instance::of(Arc::new(1u32))]).unwrap();

        let err = scope.supply_all(vec![Instance::of(Arc::new(2u32))]).unwrap_err();
        assert_eq!(err, ResolveError::DuplicateSuppliedInstance(TypeInfo::of::<u32>()));

        let kept = scope.supplied(&TypeId::of::<u32>()).unwrap();
        assert_eq!(*kept.downcast::<u32>().unwrap(), 1);
    }

    #[test]
    fn rejected_batch_supplies_nothing() {
        let mut scope = Scope::default();
        scope.supply_all(vec![Instance::of(Arc::new(1u32))]).unwrap();

        let err = scope
            .supply_all(vec![Instance::of(Arc::new(2u8)), Instance::of(Arc::new(3u32))])
            .unwrap_err();
        assert_eq!(err, ResolveError::DuplicateSuppliedInstance(TypeInfo::of::<u32>()));
        assert!(scope.supplied(&TypeId::of::<u8>()).is_none());

        let err = scope
            .supply_all(vec![
                Instance::of(Arc::new(4u16)),
                Instance::of(Arc::new(5u8)),
                Instance::of(Arc::new(6u8)),
            ])
            .unwrap_err();
        assert_eq!(err, ResolveError::DuplicateSuppliedInstance(TypeInfo::of::<u8>()));
        assert!(scope.supplied(&TypeId::of::<u16>()).is_none());

        scope
            .supply_all(vec![Instance::of(Arc::new(7u8)), Instance::of(Arc::new(8u16))])
            .unwrap();
        assert_eq!(*scope.supplied(&TypeId::of::<u8>()).unwrap().downcast::<u8>().unwrap(), 7);
    }

    #[test]
    fn first_stored_instance_wins() {
        let mut scope = Scope::default();
        let id = RegistrationId::next();
        let first = Instance::of(Arc::new("first"));

        let stored = scope.store(id, first.clone());
        assert!(stored.ptr_eq(&first));

        let stored = scope.store(id, Instance::of(Arc::new("second")));
        assert!(stored.ptr_eq(&first));
        assert!(scope.per_call(id).unwrap().ptr_eq(&first));
    }

    #[test]
    fn teardown_releases_everything() {
        let mut scope = Scope::default();
        scope.store(RegistrationId::next(), Instance::of(Arc::new(1u8)));
        scope.supply_all(vec![Instance::of(Arc::new(2u16))]).unwrap();

        assert_eq!(scope.teardown(), 2);
        assert!(scope.supplied(&TypeId::of::<u16>()).is_none());
        assert_eq!(scope.teardown(), 0);
    }
}
