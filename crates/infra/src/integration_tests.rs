//! Integration tests for the order lifecycle.
//!
//! Tests: Cart service → Checkout → Store → Status advancer
//!
//! Verifies:
//! - Checkout snapshots the cart and empties it in one commit
//! - Concurrent cart mutation and checkout never lose or duplicate items
//! - Status advancement depends only on elapsed time, one step per run
//! - Store and notifier failures stay isolated

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use storefront_cart::Cart;
    use storefront_core::{AggregateRoot, Clock, ManualClock, OrderId, ProductId, UserId};
    use storefront_orders::{Order, OrderStatus, PaymentStatus, StatusPipeline};

    use crate::catalog::{InMemoryProductCatalog, ProductInfo};
    use crate::error::ServiceError;
    use crate::lifecycle::{CancellationFlag, LifecycleConfig, RunError, StatusAdvancer};
    use crate::locks::UserLocks;
    use crate::notify::{NotificationDispatcher, NotificationDispatcherHandle, RecordingNotifier};
    use crate::store::{CartStore, CheckoutStore, InMemoryStore, OrderStore, StoreError};
    use crate::{CartService, CheckoutService};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    }

    fn lifecycle() -> LifecycleConfig {
        LifecycleConfig {
            dwell_threshold: std::time::Duration::from_secs(10),
            ..LifecycleConfig::default()
        }
    }

    struct Shop<S> {
        store: S,
        clock: Arc<ManualClock>,
        catalog: Arc<InMemoryProductCatalog>,
        carts: CartService<S, Arc<InMemoryProductCatalog>>,
        checkout: CheckoutService<S>,
        notifier: Arc<RecordingNotifier>,
        dispatcher: NotificationDispatcherHandle,
    }

    fn shop_with<S>(store: S) -> Shop<S>
    where
        S: CheckoutStore + Clone,
    {
        let clock = Arc::new(ManualClock::new(t0()));
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let locks = Arc::new(UserLocks::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::spawn("test-dispatcher", notifier.clone()).unwrap();

        let carts = CartService::new(store.clone(), catalog.clone(), locks.clone(), clock.clone());
        let checkout = CheckoutService::new(
            store.clone(),
            locks,
            clock.clone(),
            StatusPipeline::default(),
            dispatcher.sender(),
        );

        Shop {
            store,
            clock,
            catalog,
            carts,
            checkout,
            notifier,
            dispatcher,
        }
    }

    fn shop() -> Shop<Arc<InMemoryStore>> {
        shop_with(InMemoryStore::arc())
    }

    fn priced_product(catalog: &InMemoryProductCatalog, price: u64) -> ProductId {
        let id = ProductId::new();
        catalog.upsert(ProductInfo {
            id,
            title: format!("Product @{price}"),
            price: Some(price),
        });
        id
    }

    fn placed_order(user_id: UserId, at: DateTime<Utc>) -> Order {
        let mut cart = Cart::new(user_id, at);
        cart.add_item(ProductId::new(), 1, Some(100), at).unwrap();
        Order::place_from_cart(&cart, OrderId::new(), "pay_1", "X", at, &StatusPipeline::default())
            .unwrap()
    }

    fn advancer_over<S: OrderStore>(store: S, clock: &Arc<ManualClock>) -> StatusAdvancer<S> {
        StatusAdvancer::new(store, clock.clone(), &lifecycle())
    }

    // ----- checkout -----

    #[test]
    fn cash_on_delivery_checkout_scenario() {
        let shop = shop();
        let user = UserId::new();
        let p1 = priced_product(&shop.catalog, 10);

        let cart = shop.carts.add_item(user, p1, 2).unwrap();
        assert_eq!(cart.total_price(), 20);
        let cart = shop.carts.add_item(user, p1, 1).unwrap();
        assert_eq!(cart.item(p1).unwrap().quantity, 3);
        assert_eq!(cart.total_price(), 30);

        let order = shop.checkout.create_order(user, "COD", "X").unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].product_id, p1);
        assert_eq!(order.items()[0].quantity, 3);
        assert_eq!(order.items()[0].unit_price, Some(10));
        assert_eq!(order.total_amount(), 30);
        assert_eq!(order.status(), &OrderStatus::Placed);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.order_placed_at(), t0());
        assert_eq!(order.status_changed_at(), Some(t0()));

        let cart = shop.carts.get_or_create_cart(user).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), 0);

        assert_eq!(shop.checkout.get_user_orders(user).unwrap(), vec![order.clone()]);

        shop.dispatcher.shutdown();
        let sent = shop.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, user);
        assert!(sent[0].1.subject.contains(&order.id_typed().to_string()));
    }

    #[test]
    fn non_cod_payment_is_paid() {
        let shop = shop();
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 5);
        shop.carts.add_item(user, p, 1).unwrap();

        let order = shop.checkout.create_order(user, "pay_9x", "Main St").unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert_eq!(order.payment_ref(), "pay_9x");
    }

    #[test]
    fn second_checkout_on_emptied_cart_fails() {
        let shop = shop();
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 5);
        shop.carts.add_item(user, p, 1).unwrap();

        shop.checkout.create_order(user, "COD", "X").unwrap();
        let err = shop.checkout.create_order(user, "COD", "X").unwrap_err();
        assert_eq!(err, ServiceError::InvalidState("cart empty".to_string()));
        assert_eq!(shop.checkout.get_user_orders(user).unwrap().len(), 1);
    }

    #[test]
    fn checkout_without_any_cart_fails() {
        let shop = shop();
        let err = shop.checkout.create_order(UserId::new(), "COD", "X").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn blank_shipping_address_leaves_cart_untouched() {
        let shop = shop();
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 5);
        shop.carts.add_item(user, p, 2).unwrap();

        let err = shop.checkout.create_order(user, "COD", "  ").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(shop.carts.get_or_create_cart(user).unwrap().total_price(), 10);
    }

    #[test]
    fn orders_of_other_users_are_not_visible() {
        let shop = shop();
        let alice = UserId::new();
        let bob = UserId::new();
        let p = priced_product(&shop.catalog, 5);

        shop.carts.add_item(alice, p, 1).unwrap();
        shop.checkout.create_order(alice, "COD", "A").unwrap();

        assert!(shop.checkout.get_user_orders(bob).unwrap().is_empty());
        assert_eq!(shop.checkout.get_user_orders(alice).unwrap().len(), 1);
    }

    /// Store whose checkout commit always fails.
    #[derive(Clone, Default)]
    struct FailingCommitStore {
        inner: Arc<InMemoryStore>,
    }

    impl CartStore for FailingCommitStore {
        fn load_cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
            self.inner.load_cart(user_id)
        }

        fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
            self.inner.save_cart(cart)
        }
    }

    impl OrderStore for FailingCommitStore {
        fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(order_id)
        }

        fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(order)
        }

        fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
            self.inner.update_order(order, expected_version)
        }

        fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
            self.inner.list_orders()
        }

        fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.orders_for_user(user_id)
        }
    }

    impl CheckoutStore for FailingCommitStore {
        fn commit_checkout(&self, _order: &Order, _cart: &Cart) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }
    }

    #[test]
    fn failed_commit_leaves_cart_intact() {
        let shop = shop_with(FailingCommitStore::default());
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 7);
        shop.carts.add_item(user, p, 3).unwrap();

        let err = shop.checkout.create_order(user, "COD", "X").unwrap_err();
        assert!(err.is_retryable());

        let cart = shop.store.load_cart(user).unwrap().unwrap();
        assert_eq!(cart.item(p).unwrap().quantity, 3);
        assert_eq!(cart.total_price(), 21);
        assert!(shop.store.list_orders().unwrap().is_empty());

        shop.dispatcher.shutdown();
        assert!(shop.notifier.sent().is_empty());
    }

    #[test]
    fn notification_failure_does_not_fail_checkout() {
        let shop = shop();
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 5);
        shop.carts.add_item(user, p, 1).unwrap();
        shop.notifier.fail_deliveries(true);

        let order = shop.checkout.create_order(user, "COD", "X").unwrap();
        assert_eq!(shop.store.get_order(order.id_typed()).unwrap(), Some(order));
        assert!(shop.store.load_cart(user).unwrap().unwrap().is_empty());

        shop.dispatcher.shutdown();
        assert!(shop.notifier.sent().is_empty());
    }

    #[test]
    fn stopped_dispatcher_does_not_fail_checkout() {
        let Shop {
            catalog,
            carts,
            checkout,
            dispatcher,
            ..
        } = shop();
        dispatcher.shutdown();

        let user = UserId::new();
        let p = priced_product(&catalog, 5);
        carts.add_item(user, p, 1).unwrap();
        assert!(checkout.create_order(user, "COD", "X").is_ok());
    }

    #[test]
    fn concurrent_adds_and_checkouts_never_lose_items() {
        const ADDERS: usize = 4;
        const ADDS_EACH: usize = 50;

        let shop = Arc::new(shop());
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 3);

        let adders: Vec<_> = (0..ADDERS)
            .map(|_| {
                let shop = shop.clone();
                thread::spawn(move || {
                    for _ in 0..ADDS_EACH {
                        shop.carts.add_item(user, p, 1).unwrap();
                    }
                })
            })
            .collect();

        let checkouts = {
            let shop = shop.clone();
            thread::spawn(move || {
                let mut placed = 0;
                for _ in 0..40 {
                    match shop.checkout.create_order(user, "COD", "X") {
                        Ok(_) => placed += 1,
                        Err(ServiceError::InvalidState(_)) => {}
                        Err(e) => panic!("unexpected checkout error: {e}"),
                    }
                    thread::yield_now();
                }
                placed
            })
        };

        for a in adders {
            a.join().unwrap();
        }
        let placed = checkouts.join().unwrap();

        let orders = shop.checkout.get_user_orders(user).unwrap();
        assert_eq!(orders.len(), placed);

        let ordered: u64 = orders
            .iter()
            .flat_map(|o| o.items())
            .map(|i| u64::from(i.quantity))
            .sum();
        let cart = shop.carts.get_or_create_cart(user).unwrap();
        let in_cart = cart.item(p).map(|i| u64::from(i.quantity)).unwrap_or(0);
        assert_eq!(ordered + in_cart, (ADDERS * ADDS_EACH) as u64);
        assert_eq!(cart.total_price(), in_cart * 3);

        for o in &orders {
            assert!(!o.items().is_empty());
            assert_eq!(o.total_amount(), u64::from(o.items()[0].quantity) * 3);
        }
        let ids: HashSet<_> = orders.iter().map(|o| o.id_typed()).collect();
        assert_eq!(ids.len(), orders.len());
    }

    // ----- status advancement -----

    #[test]
    fn order_advances_only_after_dwell() {
        let store = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0()));
        let order = placed_order(UserId::new(), t0());
        store.insert_order(&order).unwrap();
        let advancer = advancer_over(store.clone(), &clock);
        let cancel = CancellationFlag::new();

        clock.set(t0() + Duration::seconds(5));
        let report = advancer.run_once(&cancel).unwrap();
        assert_eq!(report.advanced, 0);
        assert_eq!(report.not_due, 1);
        let stored = store.get_order(order.id_typed()).unwrap().unwrap();
        assert_eq!(stored.status(), &OrderStatus::Placed);

        clock.set(t0() + Duration::seconds(11));
        let report = advancer.run_once(&cancel).unwrap();
        assert_eq!(report.advanced, 1);
        let stored = store.get_order(order.id_typed()).unwrap().unwrap();
        assert_eq!(stored.status(), &OrderStatus::OnTheWay);
        assert_eq!(stored.status_changed_at(), Some(t0() + Duration::seconds(11)));
    }

    #[test]
    fn repeated_runs_without_elapsed_time_are_idempotent() {
        let store = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(30)));
        let order = placed_order(UserId::new(), t0());
        store.insert_order(&order).unwrap();
        let advancer = advancer_over(store.clone(), &clock);
        let cancel = CancellationFlag::new();

        let first = advancer.run_once(&cancel).unwrap();
        let second = advancer.run_once(&cancel).unwrap();
        assert_eq!(first.advanced + second.advanced, 1);
        assert_eq!(
            store.get_order(order.id_typed()).unwrap().unwrap().status(),
            &OrderStatus::OnTheWay
        );
    }

    #[test]
    fn late_runs_still_move_one_step_at_a_time() {
        let store = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0()));
        let order = placed_order(UserId::new(), t0() - Duration::seconds(25));
        store.insert_order(&order).unwrap();
        let advancer = advancer_over(store.clone(), &clock);
        let cancel = CancellationFlag::new();

        let mut seen = vec![OrderStatus::Placed];
        for _ in 0..3 {
            let report = advancer.run_once(&cancel).unwrap();
            assert_eq!(report.advanced, 1);
            seen.push(store.get_order(order.id_typed()).unwrap().unwrap().status().clone());
            clock.advance(Duration::seconds(10));
        }
        assert_eq!(seen.as_slice(), StatusPipeline::default().stages());

        // Delivered is terminal.
        clock.advance(Duration::hours(1));
        assert_eq!(advancer.run_once(&cancel).unwrap().advanced, 0);
    }

    #[test]
    fn cancelled_and_unrecognized_statuses_are_left_alone() {
        let store = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::hours(1)));

        let mut cancelled = placed_order(UserId::new(), t0());
        cancelled.mark_cancelled(t0()).unwrap();
        store.insert_order(&cancelled).unwrap();

        let mut legacy = serde_json::to_value(placed_order(UserId::new(), t0())).unwrap();
        legacy["status"] = serde_json::json!("Returned");
        let legacy: Order = serde_json::from_value(legacy).unwrap();
        store.insert_order(&legacy).unwrap();

        let report = advancer_over(store.clone(), &clock)
            .run_once(&CancellationFlag::new())
            .unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(report.advanced, 0);
        assert_eq!(
            store.get_order(legacy.id_typed()).unwrap().unwrap().status().as_str(),
            "Returned"
        );
    }

    /// Store that refuses to update one specific order.
    struct FlakyUpdateStore {
        inner: Arc<InMemoryStore>,
        broken: OrderId,
    }

    impl OrderStore for FlakyUpdateStore {
        fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(order_id)
        }

        fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(order)
        }

        fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
            if order.id_typed() == self.broken {
                return Err(StoreError::Unavailable("replica lag".to_string()));
            }
            self.inner.update_order(order, expected_version)
        }

        fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
            self.inner.list_orders()
        }

        fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.orders_for_user(user_id)
        }
    }

    #[test]
    fn one_failing_update_does_not_block_the_others() {
        let inner = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(20)));
        let orders: Vec<_> = (0..3)
            .map(|i| placed_order(UserId::new(), t0() + Duration::milliseconds(i)))
            .collect();
        for o in &orders {
            inner.insert_order(o).unwrap();
        }
        let broken = orders[0].id_typed();
        let store = FlakyUpdateStore {
            inner: inner.clone(),
            broken,
        };

        let report = advancer_over(store, &clock)
            .run_once(&CancellationFlag::new())
            .unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.advanced, 2);
        assert_eq!(report.failed, 1);

        assert_eq!(inner.get_order(broken).unwrap().unwrap().status(), &OrderStatus::Placed);
        for o in &orders[1..] {
            assert_eq!(
                inner.get_order(o.id_typed()).unwrap().unwrap().status(),
                &OrderStatus::OnTheWay
            );
        }
    }

    /// Store whose `list_orders` parks until released, to hold a run open.
    struct GatedStore {
        inner: Arc<InMemoryStore>,
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl OrderStore for GatedStore {
        fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(order_id)
        }

        fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(order)
        }

        fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
            self.inner.update_order(order, expected_version)
        }

        fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            self.inner.list_orders()
        }

        fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.orders_for_user(user_id)
        }
    }

    #[test]
    fn overlapping_runs_are_rejected() {
        let inner = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(20)));
        let order = placed_order(UserId::new(), t0());
        inner.insert_order(&order).unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = GatedStore {
            inner: inner.clone(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let advancer = Arc::new(advancer_over(store, &clock));

        let first = {
            let advancer = advancer.clone();
            thread::spawn(move || advancer.run_once(&CancellationFlag::new()))
        };
        entered_rx.recv().unwrap();
        assert!(advancer.is_running());

        assert_eq!(
            advancer.run_once(&CancellationFlag::new()),
            Err(RunError::AlreadyRunning)
        );

        release_tx.send(()).unwrap();
        let report = first.join().unwrap().unwrap();
        assert_eq!(report.advanced, 1);
        assert!(!advancer.is_running());
    }

    #[test]
    fn cancelled_run_stops_before_touching_orders() {
        let store = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(20)));
        let order = placed_order(UserId::new(), t0());
        store.insert_order(&order).unwrap();

        let cancel = CancellationFlag::new();
        cancel.cancel();
        let report = advancer_over(store.clone(), &clock).run_once(&cancel).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.examined, 0);
        assert_eq!(
            store.get_order(order.id_typed()).unwrap().unwrap().status(),
            &OrderStatus::Placed
        );
    }

    /// Store that cancels every order right after handing out the listing,
    /// as if an operator cancelled them while the run was in flight.
    struct CancelAfterListStore {
        inner: Arc<InMemoryStore>,
        cancelled_at: DateTime<Utc>,
    }

    impl OrderStore for CancelAfterListStore {
        fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(order_id)
        }

        fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(order)
        }

        fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
            self.inner.update_order(order, expected_version)
        }

        fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
            let listed = self.inner.list_orders()?;
            for order in &listed {
                let mut stored = order.clone();
                stored.mark_cancelled(self.cancelled_at).unwrap();
                self.inner.update_order(&stored, order.version()).unwrap();
            }
            Ok(listed)
        }

        fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.orders_for_user(user_id)
        }
    }

    #[test]
    fn cancellation_during_a_run_is_not_overwritten() {
        let inner = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(20)));
        let order = placed_order(UserId::new(), t0());
        inner.insert_order(&order).unwrap();

        let store = CancelAfterListStore {
            inner: inner.clone(),
            cancelled_at: t0() + Duration::seconds(15),
        };
        let report = advancer_over(store, &clock)
            .run_once(&CancellationFlag::new())
            .unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.advanced, 0);
        assert_eq!(report.failed, 1);

        let stored = inner.get_order(order.id_typed()).unwrap().unwrap();
        assert_eq!(stored.status(), &OrderStatus::Cancelled);
        assert_eq!(stored.status_changed_at(), Some(t0() + Duration::seconds(15)));

        // The next run sees the stored state and leaves the order alone.
        let report = advancer_over(inner.clone(), &clock)
            .run_once(&CancellationFlag::new())
            .unwrap();
        assert_eq!(report.advanced, 0);
        assert_eq!(
            inner.get_order(order.id_typed()).unwrap().unwrap().status(),
            &OrderStatus::Cancelled
        );
    }

    /// Store that raises the cancellation flag on the first write.
    struct CancelOnUpdateStore {
        inner: Arc<InMemoryStore>,
        cancel: CancellationFlag,
    }

    impl OrderStore for CancelOnUpdateStore {
        fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(order_id)
        }

        fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(order)
        }

        fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
            self.cancel.cancel();
            self.inner.update_order(order, expected_version)
        }

        fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
            self.inner.list_orders()
        }

        fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.orders_for_user(user_id)
        }
    }

    #[test]
    fn cancellation_mid_run_stops_before_the_next_order() {
        let inner = InMemoryStore::arc();
        let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(20)));
        let first = placed_order(UserId::new(), t0());
        let second = placed_order(UserId::new(), t0() + Duration::seconds(1));
        inner.insert_order(&first).unwrap();
        inner.insert_order(&second).unwrap();

        let cancel = CancellationFlag::new();
        let store = CancelOnUpdateStore {
            inner: inner.clone(),
            cancel: cancel.clone(),
        };
        let report = advancer_over(store, &clock).run_once(&cancel).unwrap();

        assert!(report.cancelled);
        assert_eq!(report.examined, 1);
        assert_eq!(report.advanced, 1);
        assert_eq!(
            inner.get_order(first.id_typed()).unwrap().unwrap().status(),
            &OrderStatus::OnTheWay
        );
        assert_eq!(
            inner.get_order(second.id_typed()).unwrap().unwrap().status(),
            &OrderStatus::Placed
        );
    }

    #[test]
    fn checkout_then_scheduler_end_to_end() {
        let shop = shop();
        let user = UserId::new();
        let p = priced_product(&shop.catalog, 10);
        shop.carts.add_item(user, p, 1).unwrap();
        let order = shop.checkout.create_order(user, "pay_1", "X").unwrap();

        let advancer = advancer_over(shop.store.clone(), &shop.clock);
        let cancel = CancellationFlag::new();
        for expected in ["On the Way", "Shipped", "Delivered"] {
            shop.clock.advance(Duration::seconds(10));
            advancer.run_once(&cancel).unwrap();
            let stored = shop.store.get_order(order.id_typed()).unwrap().unwrap();
            assert_eq!(stored.status().as_str(), expected);
            assert_eq!(stored.status_changed_at(), Some(shop.clock.now()));
        }
    }
}
