//! Composition root: configuration and wiring of the domain services around
//! one shared dispatcher.

pub mod activity;
pub mod config;
pub mod wiring;

pub use activity::{ActivityEntry, ActivityLog, DEFAULT_ACTIVITY_CAPACITY};
pub use config::{AppConfig, ConfigError};
pub use wiring::{App, ProductsService, UsersService};
