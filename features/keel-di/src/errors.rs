use thiserror::Error;

use crate::types::TypeInfo;

/// Errors while registering or resolving capabilities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No registration, supplied instance or open generic definition exists for the type
    #[error("The requested type '{0}' has not been registered.")]
    UnregisteredType(TypeInfo),

    /// None of the component's constructors can be satisfied
    ///
    /// `missing` names the dependency that could not be resolved,
    /// it is `None` if the component has no constructor at all.
    #[error("{}", unsatisfiable_message(.component, .missing))]
    UnsatisfiableDependency {
        component: TypeInfo,
        missing: Option<TypeInfo>,
    },

    /// The typed registration API saw a type twice
    #[error("A type has been registered twice: '{0}'")]
    DuplicateRegistration(TypeInfo),

    /// The same type was supplied twice during one resolution
    #[error("An instance of '{0}' has already been supplied to this resolution.")]
    DuplicateSuppliedInstance(TypeInfo),

    /// A required argument was empty or not usable
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

fn unsatisfiable_message(component: &TypeInfo, missing: &Option<TypeInfo>) -> String {
    match missing {
        Some(missing) => format!(
            "Dependencies of '{component}' could not be satisfied: '{missing}' is not resolvable."
        ),
        None => format!("'{component}' has no constructor to satisfy its dependencies with."),
    }
}
