/// Declares plain capabilities
///
/// ```
/// use keel_di::capability;
///
/// pub trait Mailer: Send + Sync {}
/// pub struct Outbox;
/// capability!(dyn Mailer, Outbox);
/// ```
#[macro_export]
macro_rules! capability {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Capability for $ty {})+
    };
}

/// Declares the capabilities a component can be handed out as
///
/// ```
/// use keel_di::{capability, implements, Component, Constructor};
///
/// pub trait Mailer: Send + Sync {}
/// capability!(dyn Mailer);
///
/// pub struct Smtp;
/// impl Mailer for Smtp {}
/// impl Component for Smtp {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::from_fn(|| Smtp)]
///     }
/// }
/// implements!(Smtp => dyn Mailer);
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($cap:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$cap> for $concrete {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$cap> {
                    self
                }
            }
        )+
    };
}
