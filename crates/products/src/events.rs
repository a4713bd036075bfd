use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use switchboard_core::{ProductId, UserId};
use switchboard_events::DomainEvent;

pub const PRODUCT_CREATED: &str = "product.created";
pub const PRODUCT_DELETED: &str = "product.deleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub owner_id: UserId,
    pub name: String,
    pub price_cents: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Why a product went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// Deleted directly through `ProductService::delete_product`.
    Requested,
    /// Removed because its owner was deleted.
    OwnerDeleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: ProductId,
    pub owner_id: UserId,
    pub reason: DeletionReason,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for ProductCreated {
    const NAME: &'static str = PRODUCT_CREATED;
}

impl DomainEvent for ProductDeleted {
    const NAME: &'static str = PRODUCT_DELETED;
}
