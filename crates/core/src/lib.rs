//! `switchboard-core`: identifiers and error types shared by every domain.
//!
//! Nothing in here knows about events; `store` is the in-memory backing used
//! by the domain repositories in tests and the demo binary.

pub mod entity;
pub mod error;
pub mod id;
pub mod store;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ProductId, UserId};
pub use store::InMemoryStore;
