use std::any::Any;

use crate::EventName;

/// A payload type bound to exactly one event name.
///
/// Implementing this ties `"user.updated"` to `UserUpdated` at compile time:
/// `Dispatcher::subscribe_event::<UserUpdated>` only accepts handlers taking a
/// `&UserUpdated`, and `Dispatcher::publish_event` only publishes one.
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// pub struct UserDeleted { pub user_id: UserId }
///
/// impl DomainEvent for UserDeleted {
///     const NAME: &'static str = "user.deleted";
/// }
/// ```
///
/// An empty name is rejected when the event is first used:
///
/// ```compile_fail
/// use switchboard_events::{Context, Dispatcher, DomainEvent};
///
/// struct Nameless;
///
/// impl DomainEvent for Nameless {
///     const NAME: &'static str = "";
/// }
///
/// Dispatcher::new()
///     .publish_event(&Context::background(), &Nameless)
///     .unwrap();
/// ```
pub trait DomainEvent: Any + Send + Sync {
    /// Stable event name (e.g. "user.updated"). Must not be empty.
    const NAME: &'static str;

    #[doc(hidden)]
    const NAME_IS_VALID: () = assert!(!Self::NAME.is_empty(), "DomainEvent::NAME must not be empty");

    fn event_name() -> EventName
    where
        Self: Sized,
    {
        let () = Self::NAME_IS_VALID;
        EventName::from_static(Self::NAME)
    }
}
