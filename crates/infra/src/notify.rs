//! Order confirmation delivery.
//!
//! Checkout hands confirmed orders to a [`NotificationSender`]; a dedicated
//! worker thread calls the configured [`OrderNotifier`] and logs failures. The
//! checkout path never waits on delivery and never sees its outcome.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use storefront_core::UserId;
use storefront_orders::Order;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("notification dispatcher is not running")]
    DispatcherStopped,
}

/// Outbound order-confirmation channel (e-mail, SMS, ...).
///
/// Implementations doing network IO must bound it with their own timeouts.
pub trait OrderNotifier: Send + Sync + 'static {
    fn send_order_confirmation(&self, user_id: UserId, order: &Order) -> Result<(), NotifyError>;
}

/// Rendered confirmation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub subject: String,
    pub body: String,
}

impl OrderConfirmation {
    pub fn render(order: &Order) -> Self {
        let mut body = String::new();
        let _ = writeln!(body, "Thank you for your order!");
        let _ = writeln!(body, "Order ID: {}", order.id_typed());
        let _ = writeln!(body, "Placed at: {}", order.order_placed_at().to_rfc3339());
        let _ = writeln!(body, "Shipping address: {}", order.shipping_address());
        let _ = writeln!(body, "Payment: {:?}", order.payment_status());
        for item in order.items() {
            let price = item
                .unit_price
                .map(format_amount)
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(body, "  {} x{} @ {}", item.product_id, item.quantity, price);
        }
        let _ = writeln!(body, "Total amount: {}", format_amount(order.total_amount()));
        let _ = write!(body, "We will notify you when your order is shipped!");

        Self {
            subject: format!("Order Confirmation - Order #{}", order.id_typed()),
            body,
        }
    }
}

fn format_amount(minor_units: u64) -> String {
    format!("{}.{:02}", minor_units / 100, minor_units % 100)
}

/// Notifier that renders the confirmation and writes it to the log.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogNotifier;

impl OrderNotifier for LogNotifier {
    fn send_order_confirmation(&self, user_id: UserId, order: &Order) -> Result<(), NotifyError> {
        let message = OrderConfirmation::render(order);
        info!(
            user_id = %user_id,
            order_id = %order.id_typed(),
            subject = %message.subject,
            "order confirmation sent"
        );
        Ok(())
    }
}

/// Notifier that keeps every message in memory, for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, OrderConfirmation)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (or succeed again).
    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(UserId, OrderConfirmation)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl OrderNotifier for RecordingNotifier {
    fn send_order_confirmation(&self, user_id: UserId, order: &Order) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".to_string()));
        }
        let message = OrderConfirmation::render(order);
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("recording notifier poisoned".to_string()))?
            .push((user_id, message));
        Ok(())
    }
}

enum Dispatch {
    Confirm { user_id: UserId, order: Box<Order> },
    Shutdown,
}

/// Cloneable, non-blocking handle used by checkout to queue confirmations.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Dispatch>,
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::Confirm { user_id, order } => f
                .debug_struct("Confirm")
                .field("user_id", user_id)
                .field("order_id", &order.id_typed())
                .finish(),
            Dispatch::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl NotificationSender {
    /// Queue a confirmation. Returns immediately.
    pub fn enqueue(&self, user_id: UserId, order: Order) -> Result<(), NotifyError> {
        self.tx
            .send(Dispatch::Confirm {
                user_id,
                order: Box::new(order),
            })
            .map_err(|_| NotifyError::DispatcherStopped)
    }
}

/// Handle to the running dispatcher thread.
#[derive(Debug)]
pub struct NotificationDispatcherHandle {
    sender: NotificationSender,
    join: Option<thread::JoinHandle<()>>,
}

impl NotificationDispatcherHandle {
    pub fn sender(&self) -> NotificationSender {
        self.sender.clone()
    }

    /// Deliver everything queued so far, then stop the worker and wait for it.
    pub fn shutdown(mut self) {
        let _ = self.sender.tx.send(Dispatch::Shutdown);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background worker delivering order confirmations.
#[derive(Debug)]
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    pub fn spawn<N>(name: &'static str, notifier: Arc<N>) -> std::io::Result<NotificationDispatcherHandle>
    where
        N: OrderNotifier + ?Sized,
    {
        let (tx, rx) = mpsc::channel::<Dispatch>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || dispatcher_loop(name, rx, notifier))?;

        Ok(NotificationDispatcherHandle {
            sender: NotificationSender { tx },
            join: Some(join),
        })
    }
}

fn dispatcher_loop<N>(name: &'static str, rx: mpsc::Receiver<Dispatch>, notifier: Arc<N>)
where
    N: OrderNotifier + ?Sized,
{
    debug!(dispatcher = name, "notification dispatcher started");

    while let Ok(msg) = rx.recv() {
        match msg {
            Dispatch::Confirm { user_id, order } => {
                if let Err(e) = notifier.send_order_confirmation(user_id, &order) {
                    warn!(
                        dispatcher = name,
                        user_id = %user_id,
                        order_id = %order.id_typed(),
                        error = %e,
                        "failed to send order confirmation"
                    );
                }
            }
            Dispatch::Shutdown => break,
        }
    }

    debug!(dispatcher = name, "notification dispatcher stopped");
}
