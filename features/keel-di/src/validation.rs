//! Argument contract checks shared by the registration and resolution surfaces.

use crate::{
    errors::ResolveError,
    registration::{Lifecycle, Registration},
    types::TypeInfo,
};

/// Fails with [ResolveError::InvalidArgument] if `value` is empty or only whitespace
pub fn not_empty<'a>(argument: &'static str, value: &'a str) -> Result<&'a str, ResolveError> {
    if value.trim().is_empty() {
        return Err(ResolveError::InvalidArgument {
            argument,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

/// Fails if a registration which constructs its instances was asked to be `Supplied`
///
/// Supplied registrations are created from an existing instance instead.
pub fn constructible(declared: TypeInfo, lifecycle: Lifecycle) -> Result<Lifecycle, ResolveError> {
    if lifecycle == Lifecycle::Supplied {
        return Err(ResolveError::InvalidArgument {
            argument: "lifecycle",
            reason: format!(
                "'{declared}' is constructed by the resolver, it can't be registered as Supplied"
            ),
        });
    }
    Ok(lifecycle)
}

/// Fails if an open generic pair maps a definition onto itself
pub fn open_definition(definition: TypeInfo, implementation: TypeInfo) -> Result<(), ResolveError> {
    not_empty("definition", definition.type_name)?;
    not_empty("implementation", implementation.type_name)?;
    if definition == implementation {
        return Err(ResolveError::InvalidArgument {
            argument: "implementation",
            reason: format!("'{definition}' can't implement itself"),
        });
    }
    Ok(())
}

/// Fails if a specializer produced a registration for another type than was requested
pub fn specialized(requested: TypeInfo, registration: &Registration) -> Result<(), ResolveError> {
    if registration.declared() != requested {
        return Err(ResolveError::InvalidArgument {
            argument: "specializer",
            reason: format!(
                "'{requested}' was specialized as '{}'",
                registration.declared()
            ),
        });
    }
    Ok(())
}
