//! User business operations.
//!
//! Every write finishes by publishing its event. The publish is part of the
//! unit of work: if a subscriber fails, the operation reports failure even
//! though the repository write has already happened. Callers that need to undo
//! the write do so themselves; the service does not compensate.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use switchboard_core::{DomainError, UserId};
use switchboard_events::{Context, ContextError, DeliveryError, DispatchMode, DomainEvent, Dispatcher};

use crate::{NewUser, User, UserChanges, UserCreated, UserDeleted, UserRepository, UserUpdated};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The caller's context was cancelled or expired before the write.
    #[error("operation aborted")]
    Aborted(#[from] ContextError),

    /// The write succeeded but a subscriber rejected the event.
    #[error("user {user_id} was saved but notifying subscribers failed")]
    Publish {
        user_id: UserId,
        #[source]
        source: DeliveryError,
    },
}

impl UserServiceError {
    /// True when the repository change is in place despite the error.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, UserServiceError::Publish { .. })
    }
}

pub struct UserService<R> {
    repo: R,
    dispatcher: Arc<Dispatcher>,
    mode: DispatchMode,
}

impl<R> UserService<R> {
    pub fn new(repo: R, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            repo,
            dispatcher,
            mode: DispatchMode::default(),
        }
    }

    /// Choose fail-fast (default) or best-effort delivery for this service's events.
    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    fn notify<E: DomainEvent>(&self, ctx: &Context, user_id: UserId, event: &E) -> Result<(), UserServiceError> {
        self.dispatcher
            .deliver(self.mode, ctx, event)
            .map_err(|source| {
                tracing::warn!(%user_id, event = E::NAME, error = %source, "subscriber rejected user event");
                UserServiceError::Publish { user_id, source }
            })
    }

    pub fn create_user(&self, ctx: &Context, input: NewUser) -> Result<User, UserServiceError> {
        ctx.check()?;
        let user = User::create(UserId::new(), &input, Utc::now())?;
        self.repo.insert(user.clone())?;
        tracing::info!(user_id = %user.id(), "user created");

        let event = UserCreated {
            user_id: user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            occurred_at: user.created_at(),
        };
        self.notify(ctx, user.id(), &event)?;
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, UserServiceError> {
        self.repo
            .get(id)
            .ok_or_else(|| DomainError::not_found("user", id).into())
    }

    pub fn list_users(&self) -> Vec<User> {
        self.repo.list()
    }

    pub fn update_user(&self, ctx: &Context, id: UserId, changes: UserChanges) -> Result<User, UserServiceError> {
        ctx.check()?;
        let current = self.get_user(id)?;
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = current.apply(&changes, Utc::now())?;
        self.repo.update(updated.clone())?;
        tracing::info!(user_id = %id, "user updated");

        let event = UserUpdated {
            user_id: id,
            name: updated.name().to_string(),
            email: updated.email().to_string(),
            occurred_at: updated.updated_at(),
        };
        self.notify(ctx, id, &event)?;
        Ok(updated)
    }

    pub fn delete_user(&self, ctx: &Context, id: UserId) -> Result<(), UserServiceError> {
        ctx.check()?;
        if self.repo.remove(id).is_none() {
            return Err(DomainError::not_found("user", id).into());
        }
        tracing::info!(user_id = %id, "user deleted");

        let event = UserDeleted {
            user_id: id,
            occurred_at: Utc::now(),
        };
        self.notify(ctx, id, &event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::{InMemoryUserRepository, USER_DELETED, USER_UPDATED};
    use switchboard_events::EventName;

    fn service() -> (UserService<Arc<InMemoryUserRepository>>, Arc<Dispatcher>) {
        let dispatcher = Arc::new(Dispatcher::new());
        let repo = Arc::new(InMemoryUserRepository::new());
        (UserService::new(repo, dispatcher.clone()), dispatcher)
    }

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn update_publishes_user_updated_with_new_state() {
        let (users, dispatcher) = service();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        dispatcher.subscribe_event::<UserUpdated, _>(move |_ctx, event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        let ctx = Context::background();
        let user = users.create_user(&ctx, alice()).unwrap();
        users
            .update_user(&ctx, user.id(), UserChanges { name: Some("Alicia".into()), email: None })
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user_id, user.id());
        assert_eq!(seen[0].name, "Alicia");
        assert_eq!(seen[0].email, "alice@example.com");
    }

    #[test]
    fn empty_update_publishes_nothing() {
        let (users, dispatcher) = service();
        dispatcher.subscribe_event::<UserUpdated, _>(|_ctx, _event| anyhow::bail!("must not run"));

        let ctx = Context::background();
        let user = users.create_user(&ctx, alice()).unwrap();
        let same = users.update_user(&ctx, user.id(), UserChanges::default()).unwrap();
        assert_eq!(same, user);
    }

    #[test]
    fn subscriber_failure_fails_the_update_but_keeps_the_write() {
        let (users, dispatcher) = service();
        dispatcher.subscribe_event::<UserUpdated, _>(|_ctx, _event| anyhow::bail!("boom"));

        let ctx = Context::background();
        let user = users.create_user(&ctx, alice()).unwrap();
        let err = users
            .update_user(&ctx, user.id(), UserChanges { name: Some("Alicia".into()), email: None })
            .unwrap_err();

        assert!(err.is_partial_success());
        match &err {
            UserServiceError::Publish { user_id, source } => {
                assert_eq!(*user_id, user.id());
                assert_eq!(source.event(), &EventName::from_static(USER_UPDATED));
            }
            other => panic!("expected Publish error, got {other:?}"),
        }
        assert_eq!(users.get_user(user.id()).unwrap().name(), "Alicia");
    }

    #[test]
    fn best_effort_mode_reports_every_failure() {
        let (users, dispatcher) = service();
        let users = users.with_dispatch_mode(DispatchMode::BestEffort);
        dispatcher.subscribe_event::<UserDeleted, _>(|_ctx, _event| anyhow::bail!("first"));
        dispatcher.subscribe_event::<UserDeleted, _>(|_ctx, _event| anyhow::bail!("second"));

        let ctx = Context::background();
        let user = users.create_user(&ctx, alice()).unwrap();
        let err = users.delete_user(&ctx, user.id()).unwrap_err();

        match err {
            UserServiceError::Publish {
                source: DeliveryError::BestEffort(all),
                ..
            } => {
                assert_eq!(all.event(), &EventName::from_static(USER_DELETED));
                assert_eq!(all.failures().len(), 2);
            }
            other => panic!("expected best-effort Publish error, got {other:?}"),
        }
        assert!(users.get_user(user.id()).unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn delete_without_subscribers_succeeds() {
        let (users, _dispatcher) = service();
        let ctx = Context::background();
        let user = users.create_user(&ctx, alice()).unwrap();
        users.delete_user(&ctx, user.id()).unwrap();
        assert!(users.list_users().is_empty());
    }

    #[test]
    fn delete_unknown_user_is_not_found_and_publishes_nothing() {
        let (users, dispatcher) = service();
        dispatcher.subscribe_event::<UserDeleted, _>(|_ctx, _event| anyhow::bail!("must not run"));

        let err = users.delete_user(&Context::background(), UserId::new()).unwrap_err();
        assert!(matches!(err, UserServiceError::Domain(ref e) if e.is_not_found()));
    }

    #[test]
    fn cancelled_context_aborts_before_writing() {
        let (users, _dispatcher) = service();
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();

        let err = users.create_user(&ctx, alice()).unwrap_err();
        assert!(matches!(err, UserServiceError::Aborted(ContextError::Cancelled)));
        assert!(users.list_users().is_empty());

        // The cause is reported by the chain, not repeated in the message.
        assert_eq!(format!("{:#}", anyhow::Error::new(err)), "operation aborted: context cancelled");
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let (users, _dispatcher) = service();
        let ctx = Context::background();
        users.create_user(&ctx, alice()).unwrap();
        let err = users.create_user(&ctx, alice()).unwrap_err();
        assert!(matches!(err, UserServiceError::Domain(DomainError::Conflict(_))));
    }
}
