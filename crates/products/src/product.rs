use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use switchboard_core::{DomainError, DomainResult, Entity, ProductId, UserId};

/// A product listed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    owner_id: UserId,
    owner_name: String,
    name: String,
    price_cents: u64, // smallest currency unit
    created_at: DateTime<Utc>,
}

/// Input for `ProductService::create_product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub owner_id: UserId,
    pub owner_name: String,
    pub name: String,
    pub price_cents: u64,
}

impl Product {
    pub fn create(id: ProductId, input: &NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            owner_id: input.owner_id,
            owner_name: input.owner_name.trim().to_string(),
            name: name.to_string(),
            price_cents: input.price_cents,
            created_at: now,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn set_owner_name(&mut self, name: &str) {
        self.owner_name = name.to_string();
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}
