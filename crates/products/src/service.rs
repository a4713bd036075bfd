//! Product business operations and the handlers this domain subscribes.

use std::sync::{Arc, Weak};

use anyhow::Context as _;
use chrono::Utc;
use thiserror::Error;

use switchboard_core::{DomainError, ProductId, UserId};
use switchboard_events::{
    Context, ContextError, Dispatcher, HandlerResult, PublishError, SubscriptionId,
};
use switchboard_users::{UserDeleted, UserUpdated};

use crate::{DeletionReason, NewProduct, Product, ProductCreated, ProductDeleted, ProductRepository};

#[derive(Debug, Error)]
pub enum ProductServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("operation aborted")]
    Aborted(#[from] ContextError),

    /// The write succeeded but a subscriber rejected the event.
    #[error("product {product_id} was saved but notifying subscribers failed")]
    Publish {
        product_id: ProductId,
        #[source]
        source: PublishError,
    },
}

pub struct ProductService<R> {
    repo: R,
    dispatcher: Arc<Dispatcher>,
}

impl<R> ProductService<R> {
    pub fn new(repo: R, dispatcher: Arc<Dispatcher>) -> Self {
        Self { repo, dispatcher }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R> ProductService<R>
where
    R: ProductRepository + 'static,
{
    /// Subscribe this service to the user events it depends on.
    ///
    /// Handlers hold a weak reference, so the dispatcher does not keep the
    /// service alive; once the service is dropped they become no-ops.
    pub fn register_handlers(self: &Arc<Self>) -> Vec<SubscriptionId> {
        let on_updated = {
            let service = Arc::downgrade(self);
            self.dispatcher
                .subscribe_event::<UserUpdated, _>(move |ctx, event| {
                    with_service(&service, |s| s.on_user_updated(ctx, event))
                })
        };
        let on_deleted = {
            let service = Arc::downgrade(self);
            self.dispatcher
                .subscribe_event::<UserDeleted, _>(move |ctx, event| {
                    with_service(&service, |s| s.on_user_deleted(ctx, event))
                })
        };
        tracing::debug!("products subscribed to user events");
        vec![on_updated, on_deleted]
    }

    pub fn create_product(&self, ctx: &Context, input: NewProduct) -> Result<Product, ProductServiceError> {
        ctx.check()?;
        let product = Product::create(ProductId::new(), &input, Utc::now())?;
        self.repo.insert(product.clone())?;
        tracing::info!(product_id = %product.id(), owner_id = %product.owner_id(), "product created");

        let event = ProductCreated {
            product_id: product.id(),
            owner_id: product.owner_id(),
            name: product.name().to_string(),
            price_cents: product.price_cents(),
            occurred_at: product.created_at(),
        };
        self.dispatcher
            .publish_event(ctx, &event)
            .map_err(|source| ProductServiceError::Publish {
                product_id: product.id(),
                source,
            })?;
        Ok(product)
    }

    pub fn get_product(&self, id: ProductId) -> Result<Product, ProductServiceError> {
        self.repo
            .get(id)
            .ok_or_else(|| DomainError::not_found("product", id).into())
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.repo.list()
    }

    pub fn list_by_owner(&self, owner_id: UserId) -> Vec<Product> {
        self.repo.list_by_owner(owner_id)
    }

    pub fn delete_product(&self, ctx: &Context, id: ProductId) -> Result<(), ProductServiceError> {
        ctx.check()?;
        let product = self
            .repo
            .remove(id)
            .ok_or_else(|| DomainError::not_found("product", id))?;
        tracing::info!(product_id = %id, "product deleted");

        let event = ProductDeleted {
            product_id: id,
            owner_id: product.owner_id(),
            reason: DeletionReason::Requested,
            occurred_at: Utc::now(),
        };
        self.dispatcher
            .publish_event(ctx, &event)
            .map_err(|source| ProductServiceError::Publish { product_id: id, source })
    }

    /// Keep the denormalised owner name in sync.
    fn on_user_updated(&self, ctx: &Context, event: &UserUpdated) -> HandlerResult {
        ctx.check()?;
        let changed = self.repo.rename_owner(event.user_id, &event.name);
        tracing::debug!(user_id = %event.user_id, changed, "refreshed owner name on products");
        Ok(())
    }

    /// Remove the deleted user's products and announce each removal.
    ///
    /// Products go one at a time: when an announcement fails, the products
    /// not yet reached stay in the repository.
    fn on_user_deleted(&self, ctx: &Context, event: &UserDeleted) -> HandlerResult {
        let mut removed = 0usize;
        for product in self.repo.list_by_owner(event.user_id) {
            ctx.check()?;
            if self.repo.remove(product.id()).is_none() {
                continue;
            }
            let deleted = ProductDeleted {
                product_id: product.id(),
                owner_id: event.user_id,
                reason: DeletionReason::OwnerDeleted,
                occurred_at: event.occurred_at,
            };
            self.dispatcher
                .publish_event(ctx, &deleted)
                .with_context(|| format!("announcing removal of product {}", product.id()))?;
            removed += 1;
        }
        tracing::info!(user_id = %event.user_id, removed, "removed products of deleted user");
        Ok(())
    }
}

fn with_service<R>(
    service: &Weak<ProductService<R>>,
    f: impl FnOnce(&ProductService<R>) -> HandlerResult,
) -> HandlerResult {
    match service.upgrade() {
        Some(service) => f(&service),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use switchboard_events::{DomainEvent, EventName};
    use switchboard_users::{InMemoryUserRepository, NewUser, UserChanges, UserService, UserServiceError};

    use crate::InMemoryProductRepository;

    struct Fixture {
        dispatcher: Arc<Dispatcher>,
        users: UserService<Arc<InMemoryUserRepository>>,
        products: Arc<ProductService<Arc<InMemoryProductRepository>>>,
    }

    fn fixture() -> Fixture {
        let dispatcher = Arc::new(Dispatcher::new());
        let users = UserService::new(Arc::new(InMemoryUserRepository::new()), dispatcher.clone());
        let products = Arc::new(ProductService::new(
            Arc::new(InMemoryProductRepository::new()),
            dispatcher.clone(),
        ));
        products.register_handlers();
        Fixture {
            dispatcher,
            users,
            products,
        }
    }

    fn lamp(owner_id: UserId, owner_name: &str) -> NewProduct {
        NewProduct {
            owner_id,
            owner_name: owner_name.to_string(),
            name: "Lamp".to_string(),
            price_cents: 2500,
        }
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn register_handlers_subscribes_to_user_events() {
        let fx = fixture();
        assert_eq!(fx.dispatcher.handler_count(&UserUpdated::event_name()), 1);
        assert_eq!(fx.dispatcher.handler_count(&UserDeleted::event_name()), 1);
    }

    #[test]
    fn user_rename_propagates_to_owned_products() {
        let fx = fixture();
        let ctx = Context::background();
        let alice = fx.users.create_user(&ctx, new_user("Alice", "alice@example.com")).unwrap();
        let product = fx.products.create_product(&ctx, lamp(alice.id(), alice.name())).unwrap();

        fx.users
            .update_user(&ctx, alice.id(), UserChanges { name: Some("Alicia".into()), email: None })
            .unwrap();

        assert_eq!(fx.products.get_product(product.id()).unwrap().owner_name(), "Alicia");
    }

    #[test]
    fn user_deletion_removes_products_and_announces_each() {
        let fx = fixture();
        let announced = Arc::new(Mutex::new(Vec::new()));
        let sink = announced.clone();
        fx.dispatcher.subscribe_event::<ProductDeleted, _>(move |_ctx, event| {
            sink.lock().unwrap().push((event.product_id, event.reason));
            Ok(())
        });

        let ctx = Context::background();
        let alice = fx.users.create_user(&ctx, new_user("Alice", "alice@example.com")).unwrap();
        let bob = fx.users.create_user(&ctx, new_user("Bob", "bob@example.com")).unwrap();
        let a1 = fx.products.create_product(&ctx, lamp(alice.id(), "Alice")).unwrap();
        let a2 = fx.products.create_product(&ctx, lamp(alice.id(), "Alice")).unwrap();
        let b1 = fx.products.create_product(&ctx, lamp(bob.id(), "Bob")).unwrap();

        fx.users.delete_user(&ctx, alice.id()).unwrap();

        assert!(fx.products.list_by_owner(alice.id()).is_empty());
        assert_eq!(fx.products.list_products(), vec![b1]);
        let mut announced = announced.lock().unwrap().clone();
        announced.sort();
        let mut expected = vec![
            (a1.id(), DeletionReason::OwnerDeleted),
            (a2.id(), DeletionReason::OwnerDeleted),
        ];
        expected.sort();
        assert_eq!(announced, expected);
    }

    #[test]
    fn failing_downstream_handler_fails_user_deletion() {
        let fx = fixture();
        fx.dispatcher
            .subscribe_event::<ProductDeleted, _>(|_ctx, _event| anyhow::bail!("audit log unavailable"));

        let ctx = Context::background();
        let alice = fx.users.create_user(&ctx, new_user("Alice", "alice@example.com")).unwrap();
        fx.products.create_product(&ctx, lamp(alice.id(), "Alice")).unwrap();

        let err = fx.users.delete_user(&ctx, alice.id()).unwrap_err();
        assert!(err.is_partial_success());
        let chain: Vec<String> = std::iter::successors(
            Some(&err as &(dyn std::error::Error + 'static)),
            |e| e.source(),
        )
        .map(|e| e.to_string())
        .collect();
        assert!(chain.iter().any(|m| m.contains("user.deleted")));
        assert!(chain.iter().any(|m| m.contains("announcing removal of product")));
        assert!(chain.iter().any(|m| m == "audit log unavailable"));
        assert!(matches!(err, UserServiceError::Publish { .. }));
    }

    #[test]
    fn failed_announcement_leaves_remaining_products_for_a_retry() {
        let fx = fixture();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let announced = Arc::new(Mutex::new(Vec::new()));
        {
            let calls = calls.clone();
            let announced = announced.clone();
            fx.dispatcher.subscribe_event::<ProductDeleted, _>(move |_ctx, event| {
                if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    anyhow::bail!("audit log unavailable");
                }
                announced.lock().unwrap().push(event.product_id);
                Ok(())
            });
        }

        let ctx = Context::background();
        let alice = fx.users.create_user(&ctx, new_user("Alice", "alice@example.com")).unwrap();
        let products: Vec<Product> = (0..3)
            .map(|_| fx.products.create_product(&ctx, lamp(alice.id(), "Alice")).unwrap())
            .collect();

        let err = fx.users.delete_user(&ctx, alice.id()).unwrap_err();
        assert!(err.is_partial_success());
        // Only the product whose announcement failed is gone.
        assert_eq!(fx.products.list_by_owner(alice.id()).len(), 2);
        assert!(announced.lock().unwrap().is_empty());

        let retry = UserDeleted {
            user_id: alice.id(),
            occurred_at: Utc::now(),
        };
        fx.dispatcher.publish_event(&ctx, &retry).unwrap();

        assert!(fx.products.list_by_owner(alice.id()).is_empty());
        let mut announced = announced.lock().unwrap().clone();
        announced.sort();
        announced.dedup();
        assert_eq!(announced.len(), 2);
        assert!(announced.iter().all(|id| products.iter().any(|p| p.id() == *id)));
    }

    #[test]
    fn cancelled_context_stops_cascade() {
        let fx = fixture();
        let ctx = Context::background();
        let alice = fx.users.create_user(&ctx, new_user("Alice", "alice@example.com")).unwrap();
        fx.products.create_product(&ctx, lamp(alice.id(), "Alice")).unwrap();

        // Handler-level check: the user write happens, the product handler refuses.
        let (cancelled, cancel) = ctx.with_cancel();
        let event = UserDeleted {
            user_id: alice.id(),
            occurred_at: Utc::now(),
        };
        cancel.cancel();
        let err = fx.dispatcher.publish_event(&cancelled, &event).unwrap_err();
        assert_eq!(
            err.handler_error().downcast_ref::<ContextError>(),
            Some(&ContextError::Cancelled)
        );
        assert_eq!(fx.products.list_by_owner(alice.id()).len(), 1);
    }

    #[test]
    fn dropped_service_handlers_become_no_ops() {
        let fx = fixture();
        let dispatcher = fx.dispatcher.clone();
        drop(fx);

        let event = UserDeleted {
            user_id: UserId::new(),
            occurred_at: Utc::now(),
        };
        dispatcher
            .publish_event(&Context::background(), &event)
            .unwrap();
    }

    #[test]
    fn delete_product_publishes_requested_deletion() {
        let fx = fixture();
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = reasons.clone();
        fx.dispatcher.subscribe(
            EventName::from_static(crate::PRODUCT_DELETED),
            move |_ctx: &Context, payload: &switchboard_events::Payload| {
                let event = payload
                    .downcast_ref::<ProductDeleted>()
                    .ok_or_else(|| anyhow::anyhow!("unexpected payload"))?;
                sink.lock().unwrap().push(event.reason);
                Ok(())
            },
        );

        let ctx = Context::background();
        let product = fx.products.create_product(&ctx, lamp(UserId::new(), "Alice")).unwrap();
        fx.products.delete_product(&ctx, product.id()).unwrap();

        assert_eq!(*reasons.lock().unwrap(), vec![DeletionReason::Requested]);
        assert!(fx.products.get_product(product.id()).is_err());
    }

    #[test]
    fn delete_missing_product_is_not_found() {
        let fx = fixture();
        let err = fx
            .products
            .delete_product(&Context::background(), ProductId::new())
            .unwrap_err();
        assert!(matches!(err, ProductServiceError::Domain(ref e) if e.is_not_found()));
    }
}
