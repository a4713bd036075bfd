//! In-process activity feed: the most recent domain events, serialized as
//! they are published.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use switchboard_events::{Dispatcher, DomainEvent, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub topic: &'static str,
    pub payload: serde_json::Value,
}

pub const DEFAULT_ACTIVITY_CAPACITY: usize = 256;

/// Bounded feed; once full, each new entry evicts the oldest.
#[derive(Debug)]
pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ActivityEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, entry: ActivityEntry) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Record every `E` published through `dispatcher`.
    pub fn track<E>(self: &Arc<Self>, dispatcher: &Dispatcher) -> SubscriptionId
    where
        E: DomainEvent + Serialize,
    {
        let log = Arc::clone(self);
        dispatcher.subscribe_event::<E, _>(move |_ctx, event| {
            let payload = serde_json::to_value(event)?;
            log.record(ActivityEntry {
                topic: E::NAME,
                payload,
            });
            Ok(())
        })
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.lock().iter().map(|e| e.topic).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
