//! In-process event delegation between domains.
//!
//! A [`Dispatcher`] maps event names to ordered handler chains. Producers
//! publish after finishing a state change; consumers subscribe during wiring.
//! Neither side holds a reference to the other.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod mode;
pub mod name;

pub use context::{CancelHandle, Context};
pub use dispatcher::{Dispatcher, SubscriptionId};
pub use error::{
    ContextError, DeliveryError, EventNameError, HandlerFailure, PayloadMismatch, PublishAllError, PublishError,
};
pub use event::DomainEvent;
pub use handler::{HandlerFn, HandlerResult, Payload};
pub use mode::{DispatchMode, ParseDispatchModeError};
pub use name::EventName;
