//! Users domain module.
//!
//! Owns user records and announces changes to them (`user.created`,
//! `user.updated`, `user.deleted`) through the shared dispatcher. Other
//! domains react to those events without this crate knowing about them.

pub mod events;
pub mod repository;
pub mod service;
pub mod user;

pub use events::{USER_CREATED, USER_DELETED, USER_UPDATED, UserCreated, UserDeleted, UserUpdated};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{UserService, UserServiceError};
pub use user::{NewUser, User, UserChanges};
