use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

use crate::{
    errors::ResolveError,
    registration::{OpenRegistration, Registration},
};

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// The bare name of the type, without module path, generic arguments or `dyn`
    ///
    /// `dyn app::services::IGreeter` and `app::List<String>` become `IGreeter` and `List`.
    pub fn short_name(&self) -> &'static str {
        let name = self.type_name;
        let name = name.strip_prefix("dyn ").unwrap_or(name);
        let name = match name.find('<') {
            Some(generics) => &name[..generics],
            None => name,
        };
        // Trait objects may carry auto traits: `dyn IGreeter + Send`
        let name = match name.find(" +") {
            Some(bounds) => &name[..bounds],
            None => name,
        };
        match name.rfind("::") {
            Some(path) => &name[path + 2..],
            None => name,
        }
    }
}

/// Builds the closed registration of a type-parametric capability out of an open registration
///
/// Returns `None` if the open registration's implementation family is unknown to the capability.
pub type Specializer = fn(&OpenRegistration) -> Option<Result<Registration, ResolveError>>;

/// Runtime description of a requestable capability
///
/// This is all the resolver knows about a type: its identity and, for closed forms of
/// type-parametric capabilities, the open definition it belongs to and how to specialize it.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    pub info: TypeInfo,
    /// Marker of the open definition this type is a closed form of
    pub definition: Option<TypeInfo>,
    specializer: Option<Specializer>,
}
impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("info", &self.info)
            .field("definition", &self.definition)
            .finish()
    }
}
impl TypeDescriptor {
    /// Describes a plain capability, only resolvable through an exact registration
    pub fn exact<T: ?Sized + 'static>() -> Self {
        TypeDescriptor {
            info: TypeInfo::of::<T>(),
            definition: None,
            specializer: None,
        }
    }

    /// Describes the closed form `T` of the open definition marked by `Definition`
    ///
    /// # Example
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use keel_di::{Capability, Component, Constructor, Implements, TypeDescriptor};
    ///
    /// pub trait Sequence<T>: Send + Sync {
    ///     fn push(&self, item: T);
    /// }
    /// /// Marks the open definition `Sequence<_>`
    /// pub struct SequenceOf;
    /// /// Marks the open implementation `List<_>`
    /// pub struct ListOf;
    ///
    /// pub struct List<T>(Mutex<Vec<T>>);
    /// impl<T: Send + 'static> Sequence<T> for List<T> {
    ///     fn push(&self, item: T) {
    ///         self.0.lock().unwrap().push(item);
    ///     }
    /// }
    /// impl<T: Send + 'static> Component for List<T> {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::from_fn(|| List(Mutex::new(Vec::new())))]
    ///     }
    /// }
    /// impl<T: Send + 'static> Implements<dyn Sequence<T>> for List<T> {
    ///     fn upcast(self: Arc<Self>) -> Arc<dyn Sequence<T>> {
    ///         self
    ///     }
    /// }
    ///
    /// impl<T: Send + 'static> Capability for dyn Sequence<T> {
    ///     fn descriptor() -> TypeDescriptor {
    ///         TypeDescriptor::parametric::<Self, SequenceOf>(|open| {
    ///             open.bind::<ListOf, Self, List<T>>()
    ///         })
    ///     }
    /// }
    /// ```
    pub fn parametric<T: ?Sized + 'static, Definition: ?Sized + 'static>(
        specializer: Specializer,
    ) -> Self {
        TypeDescriptor {
            info: TypeInfo::of::<T>(),
            definition: Some(TypeInfo::of::<Definition>()),
            specializer: Some(specializer),
        }
    }

    /// Specializes an open registration for this exact type
    pub(crate) fn specialize(
        &self,
        open: &OpenRegistration,
    ) -> Option<Result<Registration, ResolveError>> {
        self.specializer.and_then(|specializer| specializer(open))
    }
}

/// Any type which can be requested from a [Resolver](crate::Resolver)
///
/// We assume resolvers are shared between threads,
/// so anything resolvable needs to be Send + Sync + 'static.
///
/// Plain capabilities are declared with [capability!](crate::capability),
/// type-parametric capabilities override [Capability::descriptor] with [TypeDescriptor::parametric].
pub trait Capability: Send + Sync + 'static {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::exact::<Self>()
    }
}

/// Instance of a Capability
///
/// Holds an `Arc<I>` of the declared capability `I`, type erased.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
    /// Address of the wrapped value, shared by every `Arc<I>` pointing to it
    address: usize,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

impl Instance {
    /// Wraps an existing instance, declared as `I`
    pub fn of<I: ?Sized + Send + Sync + 'static>(instance: Arc<I>) -> Self {
        let address = Arc::as_ptr(&instance) as *const () as usize;
        Instance {
            info: TypeInfo::of::<I>(),
            instance: Arc::new(instance),
            address,
        }
    }

    pub fn downcast<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, &'static str> {
        match self.instance.downcast_ref::<Arc<I>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }

    /// Returns true if both point to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        self.address == other.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }
    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }
    #[allow(dead_code)]
    struct Pair<A, B>(A, B);

    #[test]
    fn short_name_strips_path_generics_and_dyn() {
        assert_eq!(TypeInfo::of::<dyn Greeter>().short_name(), "Greeter");
        assert_eq!(TypeInfo::of::<English>().short_name(), "English");
        assert_eq!(TypeInfo::of::<Pair<String, u8>>().short_name(), "Pair");
        assert_eq!(TypeInfo::of::<u32>().short_name(), "u32");
    }

    #[test]
    fn instance_downcasts_to_declared_capability() {
        let instance = Instance::of::<dyn Greeter>(Arc::new(English));

        assert_eq!(instance.info, TypeInfo::of::<dyn Greeter>());
        let greeter = instance.downcast::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");

        // The concrete type is not what was declared
        assert_eq!(
            instance.downcast::<English>().err(),
            Some(std::any::type_name::<dyn Greeter>())
        );
    }

    #[test]
    fn cloned_instances_share_the_value() {
        let a = Instance::of(Arc::new(5u8));
        let b = a.clone();
        let c = Instance::of(Arc::new(5u8));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn instances_wrapping_the_same_arc_are_equal() {
        let shared = Arc::new(English);
        let a = Instance::of::<dyn Greeter>(shared.clone());
        let b = Instance::of::<dyn Greeter>(shared.clone());
        let c = Instance::of::<English>(shared);

        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));
        assert!(!a.ptr_eq(&Instance::of::<dyn Greeter>(Arc::new(English))));
    }

    #[test]
    fn exact_descriptor_has_no_definition() {
        let descriptor = TypeDescriptor::exact::<dyn Greeter>();
        assert_eq!(descriptor.info, TypeInfo::of::<dyn Greeter>());
        assert!(descriptor.definition.is_none());
    }
}
