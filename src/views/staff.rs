use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::activity::{log_activity, recent_activity, ACTIVITY_FEED_LEN};
use crate::clock::Clock;
use crate::daily_reset::{check_daily_reset, DailyResetTimer, ResetOutcome};
use crate::error::Result;
use crate::forms::{BroadcastForm, CategoryForm, MenuItemForm, TotalForm};
use crate::menu::MenuHolder;
use crate::models::{ActivityLine, DashboardStats, DrinkCount, Menu, Order, OrderStatus};
use crate::orders::OrderBook;
use crate::stats::{dashboard_stats, drink_breakdown, visit_flux};
use crate::store::{SharedStore, StoreKey};
use crate::sync::{ChangeNotification, ChangeSubscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionCheck {
    Authorized,
    RedirectToLogin,
}

/// Everything that depends on the orders list.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBoard {
    pub orders: Vec<Order>,
    pub activity: Vec<ActivityLine>,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceState {
    pub broadcast: Option<String>,
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum StaffReaction {
    OrdersChanged(OrderBoard),
    MenuChanged(Arc<Menu>),
    ServiceChanged(ServiceState),
    SessionEnded,
    Ignored,
}

/// The counter dashboard.
pub struct StaffDashboard {
    store: Arc<SharedStore>,
    clock: Arc<dyn Clock>,
    orders: OrderBook,
    menu: MenuHolder,
    changes: ChangeSubscription,
    reset_timer: Option<DailyResetTimer>,
}

impl StaffDashboard {
    pub fn open(store: Arc<SharedStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let menu = MenuHolder::load_or_bootstrap(&store)?;
        let changes = store.subscribe();
        Ok(Self {
            orders: OrderBook::new(store.clone(), clock.clone()),
            store,
            clock,
            menu,
            changes,
            reset_timer: None,
        })
    }

    /// Without a staff session flag the caller must send the user to the
    /// login page.
    pub fn check_session(&self) -> Result<SessionCheck> {
        Ok(if self.store.staff_session()? {
            SessionCheck::Authorized
        } else {
            SessionCheck::RedirectToLogin
        })
    }

    pub fn logout(&self) -> Result<()> {
        info!("staff logged out");
        self.store.clear_staff_session()
    }

    pub fn load(&mut self) -> Result<(ResetOutcome, OrderBoard)> {
        let reset = check_daily_reset(&self.store, self.clock.as_ref())?;
        self.changes.drain();
        Ok((reset, self.board()?))
    }

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

    pub fn board(&self) -> Result<OrderBoard> {
        Ok(OrderBoard {
            orders: self.orders.sorted_for_display()?,
            activity: recent_activity(&self.store, ACTIVITY_FEED_LEN)?,
            stats: dashboard_stats(&self.store, self.clock.as_ref())?,
        })
    }

    // ---------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------

    pub fn orders(&self) -> Result<Vec<Order>> {
        self.orders.sorted_for_display()
    }

    pub fn create_manual_order(&self) -> Result<Order> {
        self.orders.create_manual_order()
    }

    pub fn mark_ready(&self, id: &str) -> Result<Option<Order>> {
        self.orders.set_status(id, OrderStatus::Ready)
    }

    pub fn set_status(&self, id: &str, status: OrderStatus) -> Result<Option<Order>> {
        self.orders.set_status(id, status)
    }

    pub fn set_total(&self, id: &str, form: &TotalForm) -> Result<Option<Order>> {
        self.orders.set_total(id, form)
    }

    pub fn delete_order(&self, id: &str) -> Result<bool> {
        self.orders.delete_order(id)
    }

    // ---------------------------------------------------------------------
    // Menu editing
    // ---------------------------------------------------------------------

    pub fn menu(&self) -> Result<Arc<Menu>> {
        self.menu.current()
    }

    /// `<prefix>-<millis>`, bumped until unused.
    fn fresh_id(&self, prefix: &str, menu: &Menu) -> String {
        let mut millis = self.clock.now().timestamp_millis();
        loop {
            let id = format!("{prefix}-{millis}");
            let taken = menu.categories.iter().any(|c| c.id == id)
                || menu.find_item(&id).is_some();
            if !taken {
                return id;
            }
            millis += 1;
        }
    }

    pub fn add_category(&self, form: &CategoryForm) -> Result<Arc<Menu>> {
        let label = form.validate()?;
        let id = self.fresh_id("cat", &*self.menu.current()?);
        info!(category_id = %id, label = %label, "category added");
        self.menu
            .apply(&self.store, |menu| menu.with_category(id, label))
    }

    pub fn delete_category(&self, category_id: &str) -> Result<Arc<Menu>> {
        info!(category_id, "category deleted");
        self.menu
            .apply(&self.store, |menu| menu.without_category(category_id))
    }

    pub fn add_menu_item(&self, category_id: &str, form: &MenuItemForm) -> Result<Arc<Menu>> {
        let item = form.validate()?;
        let id = self.fresh_id("item", &*self.menu.current()?);
        info!(category_id, item_id = %id, name = %item.name, "menu item added");
        self.menu
            .apply(&self.store, |menu| menu.with_item(category_id, id, &item))
    }

    pub fn update_menu_item(
        &self,
        category_id: &str,
        item_id: &str,
        form: &MenuItemForm,
    ) -> Result<Arc<Menu>> {
        let item = form.validate()?;
        info!(category_id, item_id, "menu item updated");
        self.menu.apply(&self.store, |menu| {
            menu.with_item_updated(category_id, item_id, &item)
        })
    }

    pub fn delete_menu_item(&self, category_id: &str, item_id: &str) -> Result<Arc<Menu>> {
        info!(category_id, item_id, "menu item deleted");
        self.menu
            .apply(&self.store, |menu| menu.without_item(category_id, item_id))
    }

    pub fn reorder_categories(&self, category_ids: &[String]) -> Result<Arc<Menu>> {
        self.menu
            .apply(&self.store, |menu| menu.reordered(category_ids))
    }

    // ---------------------------------------------------------------------
    // Broadcast and service
    // ---------------------------------------------------------------------

    pub fn service_state(&self) -> Result<ServiceState> {
        Ok(ServiceState {
            broadcast: self.store.broadcast()?,
            paused: self.store.service_paused()?,
        })
    }

    pub fn post_broadcast(&self, form: &BroadcastForm) -> Result<()> {
        let message = form.validate()?;
        self.store.set_broadcast(&message)?;
        log_activity(
            &self.store,
            self.clock.as_ref(),
            &format!("Message broadcast mis à jour: \"{message}\""),
        )
    }

    pub fn clear_broadcast(&self) -> Result<()> {
        self.store.clear_broadcast()?;
        log_activity(&self.store, self.clock.as_ref(), "Message broadcast supprimé")
    }

    /// Flip the pause flag. Returns the new state.
    pub fn toggle_service(&self) -> Result<bool> {
        let paused = !self.store.service_paused()?;
        self.store.set_service_paused(paused)?;
        log_activity(
            &self.store,
            self.clock.as_ref(),
            if paused {
                "Service mis en PAUSE"
            } else {
                "Service RELANCÉ"
            },
        )?;
        info!(paused, "service toggled");
        Ok(paused)
    }

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    pub fn stats(&self) -> Result<DashboardStats> {
        dashboard_stats(&self.store, self.clock.as_ref())
    }

    pub fn drink_breakdown(&self) -> Result<Vec<DrinkCount>> {
        drink_breakdown(&self.store)
    }

    pub fn visit_flux(&self) -> Result<[u32; 24]> {
        visit_flux(&self.store, self.clock.as_ref())
    }

    pub fn activity(&self, limit: usize) -> Result<Vec<ActivityLine>> {
        recent_activity(&self.store, limit)
    }

    // ---------------------------------------------------------------------
    // Synchronization
    // ---------------------------------------------------------------------

    pub fn handle_change(&mut self, notification: &ChangeNotification) -> Result<StaffReaction> {
        Ok(match notification.key {
            StoreKey::Orders | StoreKey::ActivityLog | StoreKey::VisitStats => {
                StaffReaction::OrdersChanged(self.board()?)
            }
            StoreKey::MenuData => StaffReaction::MenuChanged(self.menu.reload(&self.store)?),
            StoreKey::Broadcast | StoreKey::ServicePaused => {
                StaffReaction::ServiceChanged(self.service_state()?)
            }
            StoreKey::StaffSession if notification.new_value.is_none() => {
                StaffReaction::SessionEnded
            }
            other => {
                debug!(key = other.as_str(), "change ignored by dashboard");
                StaffReaction::Ignored
            }
        })
    }

    /// Handle everything published since the last poll, one reaction per
    /// kind of change.
    pub fn poll_changes(&mut self) -> Result<Vec<StaffReaction>> {
        let pending = self.changes.drain();
        let mut seen: Vec<&'static str> = Vec::new();
        let mut reactions = Vec::new();
        for notification in &pending {
            let reaction = self.handle_change(notification)?;
            let kind = match &reaction {
                StaffReaction::OrdersChanged(_) => "orders",
                StaffReaction::MenuChanged(_) => "menu",
                StaffReaction::ServiceChanged(_) => "service",
                StaffReaction::SessionEnded => "session",
                StaffReaction::Ignored => continue,
            };
            if !seen.contains(&kind) {
                seen.push(kind);
                reactions.push(reaction);
            }
        }
        Ok(reactions)
    }
}
