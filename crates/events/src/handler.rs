//! Handler function types and the typed-payload adapter.

use std::any::Any;
use std::sync::Arc;

use crate::error::PayloadMismatch;
use crate::{Context, DomainEvent};

/// Type-erased event payload. Handlers only ever get a shared reference.
pub type Payload = dyn Any + Send + Sync;

/// What every handler returns.
pub type HandlerResult = anyhow::Result<()>;

/// A registered handler.
pub type HandlerFn = Arc<dyn Fn(&Context, &Payload) -> HandlerResult + Send + Sync>;

/// Wrap a handler for `E` so it can sit in the untyped registry.
///
/// A payload of any other type fails with `PayloadMismatch` instead of
/// panicking.
pub(crate) fn typed<E, F>(handler: F) -> impl Fn(&Context, &Payload) -> HandlerResult + Send + Sync + 'static
where
    E: DomainEvent,
    F: Fn(&Context, &E) -> HandlerResult + Send + Sync + 'static,
{
    move |ctx: &Context, payload: &Payload| match payload.downcast_ref::<E>() {
        Some(event) => handler(ctx, event),
        None => Err(PayloadMismatch {
            event: E::event_name(),
            expected: std::any::type_name::<E>(),
        }
        .into()),
    }
}
