//! In-process event dispatcher (synchronous, ordered fan-out).
//!
//! Domains publish named events; other domains subscribe handlers to those
//! names. The publisher never holds a reference to a subscriber.
//!
//! ## Dispatch semantics
//!
//! - Handlers for one name run **in registration order**, one after another, on
//!   the publishing thread. `publish` returns once the chain is done.
//! - `publish` is **fail-fast**: the first failing handler stops the chain and
//!   its error comes back wrapped in a `PublishError` naming the event.
//! - `publish_all` is the **best-effort** variant: every handler runs and all
//!   failures are reported together.
//! - Publishing a name nobody subscribed to is a successful no-op.
//! - Nothing is retried, persisted or rolled back. Undoing the operation that
//!   triggered the event is the publisher's business.
//!
//! ## Concurrency
//!
//! The registry maps each name to an immutable `Arc<[Subscription]>`. A
//! subscribe builds a new list and swaps it in under the write lock; a publish
//! clones the `Arc` under the read lock and releases the lock before running
//! any handler. Readers therefore see a whole list from before or after a
//! concurrent subscribe, and handlers are free to subscribe or publish
//! themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{DeliveryError, HandlerFailure, PublishAllError, PublishError};
use crate::handler::{self, HandlerFn, HandlerResult, Payload};
use crate::{Context, DispatchMode, DomainEvent, EventName};

/// Capability to revoke one subscription.
///
/// Returned by every subscribe call. Dropping it keeps the subscription alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    event: EventName,
    seq: u64,
}

impl SubscriptionId {
    pub fn event(&self) -> &EventName {
        &self.event
    }
}

#[derive(Clone)]
struct Subscription {
    seq: u64,
    handler: HandlerFn,
}

type HandlerList = Arc<[Subscription]>;

/// Process-wide event dispatcher.
///
/// Create one at the composition root and hand out `Arc<Dispatcher>` to every
/// domain that publishes or subscribes.
pub struct Dispatcher {
    registry: RwLock<HashMap<EventName, HandlerList>>,
    next_seq: AtomicU64,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking handler never holds the lock and every write swaps a whole
    // list, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<EventName, HandlerList>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EventName, HandlerList>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, name: &EventName) -> Option<HandlerList> {
        self.read().get(name).cloned()
    }

    /// Append `handler` to the chain for `name`.
    ///
    /// The same function may be subscribed more than once; it then runs once per
    /// subscription.
    pub fn subscribe<F>(&self, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&Context, &Payload) -> HandlerResult + Send + Sync + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let subscription = Subscription {
            seq,
            handler: Arc::new(handler),
        };

        let mut registry = self.write();
        let mut list = registry
            .get(&name)
            .map(|current| current.to_vec())
            .unwrap_or_default();
        list.push(subscription);
        let len = list.len();
        registry.insert(name.clone(), list.into());
        drop(registry);

        tracing::debug!(event = %name, subscription = seq, handlers = len, "handler subscribed");
        SubscriptionId { event: name, seq }
    }

    /// Subscribe a handler for the typed event `E` under `E::NAME`.
    pub fn subscribe_event<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: DomainEvent,
        F: Fn(&Context, &E) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(E::event_name(), handler::typed::<E, F>(handler))
    }

    /// Revoke a subscription. Returns `false` if it was already gone.
    ///
    /// Publishes already in flight keep running the list they started with.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        let mut registry = self.write();
        let Some(current) = registry.get(&id.event) else {
            return false;
        };
        if !current.iter().any(|s| s.seq == id.seq) {
            return false;
        }
        let remaining: Vec<Subscription> = current
            .iter()
            .filter(|s| s.seq != id.seq)
            .cloned()
            .collect();
        registry.insert(id.event.clone(), remaining.into());
        drop(registry);

        tracing::debug!(event = %id.event, subscription = id.seq, "handler unsubscribed");
        true
    }

    /// Run every handler for `name`, in registration order, stopping at the
    /// first failure.
    pub fn publish(&self, ctx: &Context, name: &EventName, payload: &Payload) -> Result<(), PublishError> {
        let span = tracing::debug_span!("publish", event = %name);
        let _enter = span.enter();

        let Some(chain) = self.snapshot(name) else {
            tracing::debug!("no subscribers");
            return Ok(());
        };

        for (position, subscription) in chain.iter().enumerate() {
            tracing::trace!(position, subscription = subscription.seq, "invoking handler");
            if let Err(err) = (subscription.handler)(ctx, payload) {
                tracing::warn!(
                    position,
                    skipped = chain.len() - position - 1,
                    error = %err,
                    "handler failed, chain aborted"
                );
                return Err(PublishError::new(name.clone(), position, err));
            }
        }
        Ok(())
    }

    /// Run every handler for `name`, in registration order, even after a
    /// failure. All failures are returned together.
    pub fn publish_all(
        &self,
        ctx: &Context,
        name: &EventName,
        payload: &Payload,
    ) -> Result<(), PublishAllError> {
        let span = tracing::debug_span!("publish_all", event = %name);
        let _enter = span.enter();

        let Some(chain) = self.snapshot(name) else {
            tracing::debug!("no subscribers");
            return Ok(());
        };

        let mut failures = Vec::new();
        for (position, subscription) in chain.iter().enumerate() {
            tracing::trace!(position, subscription = subscription.seq, "invoking handler");
            if let Err(error) = (subscription.handler)(ctx, payload) {
                tracing::warn!(position, error = %error, "handler failed, continuing");
                failures.push(HandlerFailure { position, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishAllError::new(name.clone(), chain.len(), failures))
        }
    }

    /// Fail-fast publish of a typed event under `E::NAME`.
    pub fn publish_event<E: DomainEvent>(&self, ctx: &Context, event: &E) -> Result<(), PublishError> {
        self.publish(ctx, &E::event_name(), event)
    }

    /// Best-effort publish of a typed event under `E::NAME`.
    pub fn publish_event_all<E: DomainEvent>(
        &self,
        ctx: &Context,
        event: &E,
    ) -> Result<(), PublishAllError> {
        self.publish_all(ctx, &E::event_name(), event)
    }

    /// Publish a typed event with the operation `mode` selects.
    pub fn deliver<E: DomainEvent>(
        &self,
        mode: DispatchMode,
        ctx: &Context,
        event: &E,
    ) -> Result<(), DeliveryError> {
        match mode {
            DispatchMode::FailFast => self.publish_event(ctx, event)?,
            DispatchMode::BestEffort => self.publish_event_all(ctx, event)?,
        }
        Ok(())
    }

    /// Number of handlers currently subscribed to `name`.
    pub fn handler_count(&self, name: &EventName) -> usize {
        self.read().get(name).map_or(0, |list| list.len())
    }

    /// Every name that has (or had) a subscription, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = self.read().keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl core::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registry = self.read();
        let mut map = f.debug_map();
        for (name, list) in registry.iter() {
            map.entry(&name.as_str(), &list.len());
        }
        map.finish()
    }
}
