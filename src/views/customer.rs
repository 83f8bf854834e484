use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::cart::Cart;
use crate::clock::{time_label, Clock};
use crate::daily_reset::{check_daily_reset, DailyResetTimer, ResetOutcome};
use crate::error::{AppError, Result};
use crate::forms::CheckoutForm;
use crate::menu::MenuHolder;
use crate::models::{Menu, Order, ReadyNotice};
use crate::notifications::{check_order_notifications, track_order_for_notification};
use crate::orders::{OrderBook, SubmitOrder};
use crate::stats::track_site_visit;
use crate::store::{SessionStore, SharedStore, StoreKey};
use crate::sync::{ChangeNotification, ChangeSubscription};

pub const PAUSE_BANNER: &str =
    "💤 Le service est temporairement en pause. Nous revenons très vite !";

const PICKUP_LEAD_MINUTES: i64 = 10;

/// Keys that make the customer view start over.
const RELOAD_KEYS: [StoreKey; 3] = [
    StoreKey::MenuData,
    StoreKey::Broadcast,
    StoreKey::ServicePaused,
];

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSnapshot {
    pub menu: Arc<Menu>,
    pub banner: Option<String>,
    pub paused: bool,
    pub customer: Option<String>,
    pub notices: Vec<ReadyNotice>,
    #[serde(skip)]
    pub reset: ResetOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum CustomerReaction {
    /// Menu, broadcast or pause changed: state was rebuilt and the cart lost.
    Reloaded(CustomerSnapshot),
    /// Orders changed: tracked orders were re-checked.
    OrdersChanged(Vec<ReadyNotice>),
    Ignored,
}

/// One customer-facing window. Owns its cart and session store.
pub struct CustomerView {
    store: Arc<SharedStore>,
    clock: Arc<dyn Clock>,
    orders: OrderBook,
    menu: MenuHolder,
    session: SessionStore,
    cart: Cart,
    changes: ChangeSubscription,
    reset_timer: Option<DailyResetTimer>,
}

impl CustomerView {
    pub fn open(store: Arc<SharedStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let menu = MenuHolder::load_or_bootstrap(&store)?;
        let changes = store.subscribe_keys(&[
            StoreKey::MenuData,
            StoreKey::Broadcast,
            StoreKey::ServicePaused,
            StoreKey::Orders,
        ]);
        Ok(Self {
            orders: OrderBook::new(store.clone(), clock.clone()),
            store,
            clock,
            menu,
            session: SessionStore::new(),
            cart: Cart::new(),
            changes,
            reset_timer: None,
        })
    }

    /// Page-load work: notification check, daily reset and one counted visit.
    pub fn load(&mut self) -> Result<CustomerSnapshot> {
        let notices = check_order_notifications(&self.session, &self.store)?;
        let reset = check_daily_reset(&self.store, self.clock.as_ref())?;
        track_site_visit(&self.store, self.clock.as_ref())?;
        // Our own writes above are not news to us.
        self.changes.drain();

        Ok(CustomerSnapshot {
            menu: self.menu.current()?,
            banner: self.banner()?,
            paused: self.store.service_paused()?,
            customer: self.store.user_identity()?,
            notices,
            reset,
        })
    }

    /// Start the per-minute daily reset check. Needs a tokio runtime.
    pub fn start_reset_timer(&mut self, period: Duration) {
        if self.reset_timer.is_none() {
            self.reset_timer = Some(DailyResetTimer::start(
                self.store.clone(),
                self.clock.clone(),
                period,
            ));
        }
    }

    pub async fn close(mut self) {
        if let Some(timer) = self.reset_timer.take() {
            timer.stop().await;
        }
    }

    pub fn menu(&self) -> Result<Arc<Menu>> {
        self.menu.current()
    }

    /// Broadcast message, or the pause notice when paused without one.
    pub fn banner(&self) -> Result<Option<String>> {
        if let Some(message) = self.store.broadcast()? {
            return Ok(Some(message));
        }
        if self.store.service_paused()? {
            return Ok(Some(PAUSE_BANNER.to_string()));
        }
        Ok(None)
    }

    // ---------------------------------------------------------------------
    // Cart
    // ---------------------------------------------------------------------

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns `false` when the item is not on the menu.
    pub fn add_to_cart(&mut self, item_id: &str) -> Result<bool> {
        if self.store.service_paused()? {
            return Err(AppError::ServicePaused);
        }
        let menu = self.menu.current()?;
        let Some(item) = menu.find_item(item_id) else {
            return Ok(false);
        };
        self.cart.add_item(&item.id, &item.name, item.price);
        Ok(true)
    }

    pub fn update_qty(&mut self, index: usize, delta: i32) {
        self.cart.update_qty(index, delta);
    }

    pub fn set_note(&mut self, index: usize, note: &str) {
        self.cart.set_note(index, note);
    }

    /// Default pickup slot offered at checkout.
    pub fn suggested_pickup_time(&self) -> String {
        let at = self.clock.now() + chrono::Duration::minutes(PICKUP_LEAD_MINUTES);
        time_label(&at)
    }

    /// Turn the cart into an order. The cart is kept on failure.
    pub fn submit(&mut self, checkout: &CheckoutForm) -> Result<Order> {
        let order = self.orders.create_order(SubmitOrder {
            lines: self.cart.lines(),
            checkout,
            customer: self.store.user_identity()?,
        })?;
        track_order_for_notification(&self.session, &order.id)?;
        self.cart.clear();
        Ok(order)
    }

    // ---------------------------------------------------------------------
    // Orders and identity
    // ---------------------------------------------------------------------

    pub fn check_notifications(&self) -> Result<Vec<ReadyNotice>> {
        check_order_notifications(&self.session, &self.store)
    }

    pub fn tracked_orders(&self) -> Result<Vec<String>> {
        self.session.tracked_orders()
    }

    /// Orders this window submitted, plus any placed under the signed-in name.
    pub fn my_orders(&self) -> Result<Vec<Order>> {
        let tracked = self.session.tracked_orders()?;
        let identity = self.store.user_identity()?;
        Ok(self
            .orders
            .list()?
            .into_iter()
            .filter(|order| {
                tracked.contains(&order.id) || identity.as_deref() == Some(order.customer.as_str())
            })
            .collect())
    }

    pub fn sign_in(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(crate::forms::FormError::EmptyField("name").into());
        }
        self.store.set_user_identity(name)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.clear_user_identity()
    }

    // ---------------------------------------------------------------------
    // Synchronization
    // ---------------------------------------------------------------------

    /// Start over as a fresh page load would: menu re-read, cart dropped.
    pub fn reload(&mut self) -> Result<CustomerSnapshot> {
        self.menu.reload(&self.store)?;
        self.cart.clear();
        self.load()
    }

    pub fn handle_change(&mut self, notification: &ChangeNotification) -> Result<CustomerReaction> {
        if RELOAD_KEYS.contains(&notification.key) {
            info!(key = notification.key.as_str(), "shared data changed, reloading customer view");
            return Ok(CustomerReaction::Reloaded(self.reload()?));
        }
        if notification.key == StoreKey::Orders {
            return Ok(CustomerReaction::OrdersChanged(self.check_notifications()?));
        }
        debug!(key = notification.key.as_str(), "change ignored by customer view");
        Ok(CustomerReaction::Ignored)
    }

    /// Handle everything published since the last poll. A burst collapses:
    /// at most one reload, or one order re-check.
    pub fn poll_changes(&mut self) -> Result<Option<CustomerReaction>> {
        let pending = self.changes.drain();
        if let Some(reload) = pending.iter().find(|n| RELOAD_KEYS.contains(&n.key)) {
            return self.handle_change(reload).map(Some);
        }
        match pending.iter().find(|n| n.key == StoreKey::Orders) {
            Some(orders) => self.handle_change(orders).map(Some),
            None => Ok(None),
        }
    }
}
