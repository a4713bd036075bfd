//! Products domain module.
//!
//! Products belong to a user and keep a denormalised copy of the owner's name.
//! The crate listens to `user.updated` and `user.deleted` to keep that copy in
//! sync and to remove orphaned products, and publishes its own
//! `product.created` / `product.deleted` events.

pub mod events;
pub mod product;
pub mod repository;
pub mod service;

pub use events::{DeletionReason, PRODUCT_CREATED, PRODUCT_DELETED, ProductCreated, ProductDeleted};
pub use product::{NewProduct, Product};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::{ProductService, ProductServiceError};
