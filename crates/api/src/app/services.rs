//! Service wiring: stores, collaborators and background workers.

use std::sync::Arc;

use tracing::info;

use storefront_core::{Clock, SystemClock};
use storefront_infra::catalog::{demo_products, InMemoryProductCatalog};
use storefront_infra::config::StorefrontConfig;
use storefront_infra::lifecycle::{
    SchedulerStatsReader, StatusAdvancer, StatusSchedulerHandle, StatusSchedulerRunner,
};
use storefront_infra::locks::UserLocks;
use storefront_infra::notify::{LogNotifier, NotificationDispatcher, NotificationDispatcherHandle, OrderNotifier};
use storefront_infra::store::InMemoryStore;
use storefront_infra::{CartService, CheckoutService};

pub type Store = Arc<InMemoryStore>;
pub type Catalog = Arc<InMemoryProductCatalog>;

/// Everything request handlers need.
pub struct AppServices {
    pub carts: CartService<Store, Catalog>,
    pub checkout: CheckoutService<Store>,
    pub catalog: Catalog,
    pub scheduler_stats: SchedulerStatsReader,
}

/// Background threads owned by the process; stop them with [`BackgroundWorkers::shutdown`].
#[derive(Debug)]
pub struct BackgroundWorkers {
    scheduler: StatusSchedulerHandle,
    notifications: NotificationDispatcherHandle,
}

impl BackgroundWorkers {
    /// Stop the scheduler first, then drain pending confirmations.
    pub fn shutdown(self) {
        self.scheduler.shutdown();
        self.notifications.shutdown();
        info!("background workers stopped");
    }
}

/// Build in-memory services with the log notifier and the system clock.
pub fn build_services(config: &StorefrontConfig) -> std::io::Result<(Arc<AppServices>, BackgroundWorkers)> {
    build_services_with(config, Arc::new(SystemClock), Arc::new(LogNotifier))
}

/// Build services with an explicit clock and notifier.
pub fn build_services_with<N>(
    config: &StorefrontConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<N>,
) -> std::io::Result<(Arc<AppServices>, BackgroundWorkers)>
where
    N: OrderNotifier,
{
    let store: Store = InMemoryStore::arc();
    let catalog: Catalog = Arc::new(InMemoryProductCatalog::new());
    if config.seed_demo_products {
        let products = demo_products();
        info!(count = products.len(), "seeding demo catalog");
        for p in products {
            catalog.upsert(p);
        }
    }

    let locks = Arc::new(UserLocks::new());
    let notifications = NotificationDispatcher::spawn("order-notifications", notifier)?;

    let advancer = Arc::new(StatusAdvancer::new(store.clone(), clock.clone(), &config.lifecycle));
    let scheduler = StatusSchedulerRunner::new(config.lifecycle.tick_interval)
        .spawn("order-status-scheduler", advancer)?;

    let services = AppServices {
        carts: CartService::new(store.clone(), catalog.clone(), locks.clone(), clock.clone()),
        checkout: CheckoutService::new(
            store,
            locks,
            clock,
            config.lifecycle.pipeline.clone(),
            notifications.sender(),
        ),
        catalog,
        scheduler_stats: scheduler.stats_reader(),
    };

    Ok((
        Arc::new(services),
        BackgroundWorkers {
            scheduler,
            notifications,
        },
    ))
}
