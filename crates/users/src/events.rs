//! Events published by the users domain.
//!
//! These names and payload types are the public contract other domains
//! subscribe against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use switchboard_core::UserId;
use switchboard_events::DomainEvent;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

/// A user was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// A user's profile changed. Carries the state after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdated {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// A user was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for UserCreated {
    const NAME: &'static str = USER_CREATED;
}

impl DomainEvent for UserUpdated {
    const NAME: &'static str = USER_UPDATED;
}

impl DomainEvent for UserDeleted {
    const NAME: &'static str = USER_DELETED;
}
