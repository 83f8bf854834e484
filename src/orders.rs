//! Order lifecycle: `Pending -> Ready`, or removal.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::activity::log_activity;
use crate::clock::Clock;
use crate::daily_reset::next_order_id;
use crate::error::{AppError, Result};
use crate::forms::{CheckoutForm, TotalForm};
use crate::models::{Order, OrderLine, OrderStatus, GUEST_NAME};
use crate::store::SharedStore;

pub const MANUAL_ORDER_PRICE: f64 = 5.0;

pub struct SubmitOrder<'a> {
    pub lines: &'a [OrderLine],
    pub checkout: &'a CheckoutForm,
    pub customer: Option<String>,
}

#[derive(Clone)]
pub struct OrderBook {
    store: Arc<SharedStore>,
    clock: Arc<dyn Clock>,
}

impl OrderBook {
    pub fn new(store: Arc<SharedStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn list(&self) -> Result<Vec<Order>> {
        self.store.orders()
    }

    pub fn get(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.store.orders()?.into_iter().find(|order| order.id == id))
    }

    /// Customer checkout. Nothing is allocated or written when validation
    /// fails.
    pub fn create_order(&self, request: SubmitOrder<'_>) -> Result<Order> {
        if self.store.service_paused()? {
            return Err(AppError::ServicePaused);
        }
        if request.lines.is_empty() {
            return Err(AppError::EmptyCart);
        }
        let pickup_time = request.checkout.validate().map_err(|e| match e {
            crate::forms::FormError::EmptyField(_) => AppError::MissingPickupTime,
            other => AppError::Form(other),
        })?;

        let customer = request
            .customer
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| GUEST_NAME.to_string());
        let items = request.lines.to_vec();
        let total = items.iter().map(OrderLine::subtotal).sum();

        let order = self.insert(customer, Some(pickup_time), items, total)?;
        info!(order_id = %order.id, customer = %order.customer, total = order.total, "Order submitted");
        Ok(order)
    }

    /// Staff shortcut: a single placeholder line, no cart or pickup time.
    pub fn create_manual_order(&self) -> Result<Order> {
        let items = vec![OrderLine {
            id: "manual".to_string(),
            name: "Commande Manuelle".to_string(),
            price: MANUAL_ORDER_PRICE,
            qty: 1,
            note: String::new(),
        }];
        let order = self.insert(GUEST_NAME.to_string(), None, items, MANUAL_ORDER_PRICE)?;
        info!(order_id = %order.id, "Manual order created");
        Ok(order)
    }

    fn insert(
        &self,
        customer: String,
        pickup_time: Option<String>,
        items: Vec<OrderLine>,
        total: f64,
    ) -> Result<Order> {
        let id = next_order_id(&self.store, self.clock.as_ref())?;
        let order = Order {
            id,
            customer,
            date: self.clock.now().with_timezone(&Utc),
            pickup_time,
            items,
            total,
            status: OrderStatus::Pending,
        };

        let mut orders = self.store.orders()?;
        orders.insert(0, order.clone());
        self.store.set_orders(&orders)?;
        Ok(order)
    }

    /// Returns `None` when no order has this id; the store is left untouched.
    pub fn set_status(&self, id: &str, status: OrderStatus) -> Result<Option<Order>> {
        let mut orders = self.store.orders()?;
        let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
            return Ok(None);
        };

        if order.status == status {
            return Ok(Some(order.clone()));
        }
        if order.status == OrderStatus::Ready && status == OrderStatus::Pending {
            return Err(AppError::InvalidTransition {
                id: id.to_string(),
                from: order.status,
                to: status,
            });
        }

        order.status = status;
        let updated = order.clone();
        self.store.set_orders(&orders)?;
        log_activity(
            &self.store,
            self.clock.as_ref(),
            &format!("Commande {id} marquée comme: {status}"),
        )?;
        info!(order_id = %id, status = %status, "Order status changed");
        Ok(Some(updated))
    }

    /// Staff override of the total. Items are not touched, so the total may
    /// stop matching them.
    pub fn set_total(&self, id: &str, form: &TotalForm) -> Result<Option<Order>> {
        let total = form.validate()?;

        let mut orders = self.store.orders()?;
        let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
            return Ok(None);
        };
        order.total = total;
        let updated = order.clone();
        self.store.set_orders(&orders)?;
        info!(order_id = %id, total, "Order total overridden");
        Ok(Some(updated))
    }

    /// Confirmation is the caller's job.
    pub fn delete_order(&self, id: &str) -> Result<bool> {
        let mut orders = self.store.orders()?;
        let before = orders.len();
        orders.retain(|order| order.id != id);
        if orders.len() == before {
            warn!(order_id = %id, "delete requested for unknown order");
            return Ok(false);
        }
        self.store.set_orders(&orders)?;
        info!(order_id = %id, "Order deleted");
        Ok(true)
    }

    /// Orders as the counter screen shows them.
    pub fn sorted_for_display(&self) -> Result<Vec<Order>> {
        let mut orders = self.store.orders()?;
        orders.sort_by(display_order);
        Ok(orders)
    }
}

/// Pending before Ready; pending orders by pickup time (`HH:MM` compares
/// correctly as a string); everything else newest first.
pub fn display_order(a: &Order, b: &Order) -> Ordering {
    if a.status != b.status {
        return if a.status == OrderStatus::Pending {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    // Pending orders without a slot (manual orders) go after the scheduled ones.
    let by_pickup = match (a.status, &a.pickup_time, &b.pickup_time) {
        (OrderStatus::Pending, Some(pa), Some(pb)) => pa.cmp(pb),
        (OrderStatus::Pending, Some(_), None) => Ordering::Less,
        (OrderStatus::Pending, None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    };
    by_pickup.then_with(|| b.date.cmp(&a.date))
}
