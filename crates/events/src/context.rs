//! Cancellable execution context passed through `publish` to every handler.
//!
//! A `Context` carries two signals: an explicit cancellation flag and an
//! optional deadline. Derived contexts observe their parent's cancellation and
//! never extend its deadline. The dispatcher forwards the context untouched and
//! never branches on it; handlers decide when to check.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::ContextError;

#[derive(Debug)]
struct Node {
    cancelled: AtomicBool,
    /// Effective deadline (already the minimum over the ancestor chain).
    deadline: Option<Instant>,
    parent: Option<Arc<Node>>,
}

impl Node {
    fn is_cancelled(&self) -> bool {
        let mut node = Some(self);
        while let Some(n) = node {
            if n.cancelled.load(Ordering::Acquire) {
                return true;
            }
            node = n.parent.as_deref();
        }
        false
    }
}

/// Execution context (cancellation + deadline).
///
/// Cheap to clone; clones share the same signals.
#[derive(Debug, Clone, Default)]
pub struct Context {
    node: Option<Arc<Node>>,
}

impl Context {
    /// Root context: never cancelled, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child that can be cancelled through the returned handle.
    ///
    /// Cancelling the child does not affect `self`.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let node = self.derive(self.deadline());
        let handle = CancelHandle { node: node.clone() };
        (Context { node: Some(node) }, handle)
    }

    /// Derive a child that expires at `deadline` (or earlier, if the parent does).
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let effective = match self.deadline() {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Context {
            node: Some(self.derive(Some(effective))),
        }
    }

    /// Derive a child that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    fn derive(&self, deadline: Option<Instant>) -> Arc<Node> {
        Arc::new(Node {
            cancelled: AtomicBool::new(false),
            deadline,
            parent: self.node.clone(),
        })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.node.as_ref().and_then(|n| n.deadline)
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.node.as_ref().is_some_and(|n| n.is_cancelled())
    }

    /// Why this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline() {
            Some(d) if Instant::now() >= d => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// `Ok(())` while the context is live; handlers use this with `?`.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Cancels the context it was created with (and everything derived from it).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    node: Arc<Node>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.node.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.node.is_cancelled()
    }
}
