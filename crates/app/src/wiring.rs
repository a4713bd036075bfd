//! Builds the services and connects them through one dispatcher.

use std::sync::Arc;

use switchboard_events::{Context, Dispatcher};
use switchboard_products::{InMemoryProductRepository, ProductCreated, ProductDeleted, ProductService};
use switchboard_users::{InMemoryUserRepository, UserCreated, UserDeleted, UserService, UserUpdated};

use crate::{ActivityLog, AppConfig};

pub type UsersService = UserService<Arc<InMemoryUserRepository>>;
pub type ProductsService = ProductService<Arc<InMemoryProductRepository>>;

pub struct App {
    config: AppConfig,
    dispatcher: Arc<Dispatcher>,
    users: UsersService,
    products: Arc<ProductsService>,
    activity: Arc<ActivityLog>,
}

impl App {
    /// Wire the in-memory services.
    ///
    /// Subscription order is dispatch order: products reacts to user events
    /// before the activity feed records them.
    pub fn wire(config: &AppConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::new());

        let users = UserService::new(Arc::new(InMemoryUserRepository::new()), dispatcher.clone())
            .with_dispatch_mode(config.dispatch_mode);

        let products = Arc::new(ProductService::new(
            Arc::new(InMemoryProductRepository::new()),
            dispatcher.clone(),
        ));
        products.register_handlers();

        let activity = Arc::new(ActivityLog::with_capacity(config.activity_capacity));
        activity.track::<UserCreated>(&dispatcher);
        activity.track::<UserUpdated>(&dispatcher);
        activity.track::<UserDeleted>(&dispatcher);
        activity.track::<ProductCreated>(&dispatcher);
        activity.track::<ProductDeleted>(&dispatcher);

        tracing::info!(
            dispatch_mode = %config.dispatch_mode,
            events = ?dispatcher.event_names(),
            "application wired"
        );

        Self {
            config: config.clone(),
            dispatcher,
            users,
            products,
            activity,
        }
    }

    /// A fresh context for one operation, carrying the configured deadline.
    pub fn operation_context(&self) -> Context {
        let root = Context::background();
        match self.config.operation_timeout {
            Some(timeout) => root.with_timeout(timeout),
            None => root,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn users(&self) -> &UsersService {
        &self.users
    }

    pub fn products(&self) -> &ProductsService {
        &self.products
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }
}
