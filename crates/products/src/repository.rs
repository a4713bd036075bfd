use std::sync::Arc;

use switchboard_core::{DomainError, DomainResult, InMemoryStore, ProductId, UserId};

use crate::Product;

/// Persistence boundary for products.
pub trait ProductRepository: Send + Sync {
    fn insert(&self, product: Product) -> DomainResult<()>;

    fn get(&self, id: ProductId) -> Option<Product>;

    fn remove(&self, id: ProductId) -> Option<Product>;

    fn list(&self) -> Vec<Product>;

    fn list_by_owner(&self, owner_id: UserId) -> Vec<Product>;

    /// Rewrite the denormalised owner name; returns how many products changed.
    fn rename_owner(&self, owner_id: UserId, owner_name: &str) -> usize;
}

impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    fn insert(&self, product: Product) -> DomainResult<()> {
        (**self).insert(product)
    }

    fn get(&self, id: ProductId) -> Option<Product> {
        (**self).get(id)
    }

    fn remove(&self, id: ProductId) -> Option<Product> {
        (**self).remove(id)
    }

    fn list(&self) -> Vec<Product> {
        (**self).list()
    }

    fn list_by_owner(&self, owner_id: UserId) -> Vec<Product> {
        (**self).list_by_owner(owner_id)
    }

    fn rename_owner(&self, owner_id: UserId, owner_name: &str) -> usize {
        (**self).rename_owner(owner_id, owner_name)
    }
}

/// In-memory product repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: InMemoryStore<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_creation(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id())));
    products
}

impl ProductRepository for InMemoryProductRepository {
    fn insert(&self, product: Product) -> DomainResult<()> {
        self.products.with_write(|map| {
            if map.contains_key(&product.id()) {
                return Err(DomainError::conflict(format!("product {} already exists", product.id())));
            }
            map.insert(product.id(), product);
            Ok(())
        })
    }

    fn get(&self, id: ProductId) -> Option<Product> {
        self.products.get(id)
    }

    fn remove(&self, id: ProductId) -> Option<Product> {
        self.products.remove(id)
    }

    fn list(&self) -> Vec<Product> {
        by_creation(self.products.list())
    }

    fn list_by_owner(&self, owner_id: UserId) -> Vec<Product> {
        by_creation(self.products.find(|p| p.owner_id() == owner_id))
    }

    fn rename_owner(&self, owner_id: UserId, owner_name: &str) -> usize {
        self.products.with_write(|map| {
            let mut changed = 0;
            for product in map.values_mut().filter(|p| p.owner_id() == owner_id) {
                if product.owner_name() != owner_name {
                    product.set_owner_name(owner_name);
                    changed += 1;
                }
            }
            changed
        })
    }
}
