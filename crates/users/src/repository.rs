use std::sync::Arc;

use switchboard_core::{DomainError, DomainResult, InMemoryStore, UserId};

use crate::User;

/// Persistence boundary for users.
///
/// A SQL-backed implementation lives outside this workspace; the service only
/// relies on this contract.
pub trait UserRepository: Send + Sync {
    /// Store a new user. Fails with `Conflict` if the email is taken.
    fn insert(&self, user: User) -> DomainResult<()>;

    /// Replace an existing user. Fails with `NotFound` if absent and with
    /// `Conflict` if the new email belongs to someone else.
    fn update(&self, user: User) -> DomainResult<()>;

    fn get(&self, id: UserId) -> Option<User>;

    fn remove(&self, id: UserId) -> Option<User>;

    fn list(&self) -> Vec<User>;
}

impl<R> UserRepository for Arc<R>
where
    R: UserRepository + ?Sized,
{
    fn insert(&self, user: User) -> DomainResult<()> {
        (**self).insert(user)
    }

    fn update(&self, user: User) -> DomainResult<()> {
        (**self).update(user)
    }

    fn get(&self, id: UserId) -> Option<User> {
        (**self).get(id)
    }

    fn remove(&self, id: UserId) -> Option<User> {
        (**self).remove(id)
    }

    fn list(&self) -> Vec<User> {
        (**self).list()
    }
}

/// In-memory user repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: InMemoryStore<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> DomainResult<()> {
        self.users.with_write(|map| {
            if map.contains_key(&user.id()) {
                return Err(DomainError::conflict(format!("user {} already exists", user.id())));
            }
            if map.values().any(|u| u.email() == user.email()) {
                return Err(DomainError::conflict(format!("email {} is already registered", user.email())));
            }
            map.insert(user.id(), user);
            Ok(())
        })
    }

    fn update(&self, user: User) -> DomainResult<()> {
        self.users.with_write(|map| {
            if !map.contains_key(&user.id()) {
                return Err(DomainError::not_found("user", user.id()));
            }
            if map.values().any(|u| u.id() != user.id() && u.email() == user.email()) {
                return Err(DomainError::conflict(format!("email {} is already registered", user.email())));
            }
            map.insert(user.id(), user);
            Ok(())
        })
    }

    fn get(&self, id: UserId) -> Option<User> {
        self.users.get(id)
    }

    fn remove(&self, id: UserId) -> Option<User> {
        self.users.remove(id)
    }

    fn list(&self) -> Vec<User> {
        let mut users = self.users.list();
        users.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id())));
        users
    }
}
