//! In-memory entity store backing the domain repositories (tests/dev).

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::Entity;

/// Keyed by `Entity::id`. Clones on the way in and out; callers never hold a
/// reference into the map.
#[derive(Debug)]
pub struct InMemoryStore<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStore<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: E::Id) -> Option<E> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&id).cloned()
    }

    /// Insert or replace; returns the previous value.
    pub fn upsert(&self, entity: E) -> Option<E> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(entity.id(), entity)
    }

    /// Run `f` against the whole map under one write lock.
    ///
    /// Used for check-then-write sequences (uniqueness checks) that must not
    /// interleave with other writers.
    pub fn with_write<T>(&self, f: impl FnOnce(&mut HashMap<E::Id, E>) -> T) -> T {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut map)
    }

    pub fn remove(&self, id: E::Id) -> Option<E> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(&id)
    }

    pub fn find(&self, pred: impl Fn(&E) -> bool) -> Vec<E> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().filter(|e| pred(e)).cloned().collect()
    }

    pub fn list(&self) -> Vec<E> {
        self.find(|_| true)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
