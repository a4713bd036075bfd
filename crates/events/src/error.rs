//! Errors produced by the dispatcher and its helpers.
//!
//! Handler failures travel as `anyhow::Error` so any domain can attach its own
//! context; the dispatcher only adds the event name and the handler position.

use thiserror::Error;

use crate::EventName;

/// Invalid event name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventNameError {
    #[error("event name must not be empty")]
    Empty,
}

/// Why a `Context` is no longer live.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A handler stopped a fail-fast publish.
///
/// Handlers after `position` were not invoked. The handler's own error is
/// available through `source()` / `handler_error()`.
#[derive(Debug, Error)]
#[error("event {event}: handler #{position} failed")]
pub struct PublishError {
    event: EventName,
    position: usize,
    #[source]
    source: anyhow::Error,
}

impl PublishError {
    pub(crate) fn new(event: EventName, position: usize, source: anyhow::Error) -> Self {
        Self {
            event,
            position,
            source,
        }
    }

    /// Name of the event whose chain failed.
    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Zero-based registration position of the failing handler.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn handler_error(&self) -> &anyhow::Error {
        &self.source
    }

    pub fn into_handler_error(self) -> anyhow::Error {
        self.source
    }
}

/// One failed handler in a best-effort publish.
#[derive(Debug)]
pub struct HandlerFailure {
    pub position: usize,
    pub error: anyhow::Error,
}

/// One or more handlers failed during a best-effort publish.
///
/// Every handler was invoked; `failures` is in registration order.
#[derive(Debug, Error)]
#[error("event {event}: {} of {attempted} handlers failed", .failures.len())]
pub struct PublishAllError {
    event: EventName,
    attempted: usize,
    failures: Vec<HandlerFailure>,
}

impl PublishAllError {
    pub(crate) fn new(event: EventName, attempted: usize, failures: Vec<HandlerFailure>) -> Self {
        Self {
            event,
            attempted,
            failures,
        }
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Number of handlers invoked (successful and failed).
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<HandlerFailure> {
        self.failures
    }
}

/// A typed handler received a payload of another type.
///
/// Only reachable when a raw `publish` sends the wrong type under a name that a
/// typed subscriber listens on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("event {event}: payload is not a {expected}")]
pub struct PayloadMismatch {
    pub event: EventName,
    pub expected: &'static str,
}

/// Failure from whichever dispatch operation a `DispatchMode` selected.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    FailFast(#[from] PublishError),
    #[error(transparent)]
    BestEffort(#[from] PublishAllError),
}

impl DeliveryError {
    pub fn event(&self) -> &EventName {
        match self {
            DeliveryError::FailFast(e) => e.event(),
            DeliveryError::BestEffort(e) => e.event(),
        }
    }
}
