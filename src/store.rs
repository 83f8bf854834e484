use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::{ActivityEntry, Menu, Order, VisitStats};
use crate::sync::{ChangeBus, ChangeNotification, ChangeSubscription};

/// Every slot of the shared store, with the name it is persisted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKey {
    #[serde(rename = "cafeOrders")]
    Orders,
    #[serde(rename = "cafeMenuData")]
    MenuData,
    #[serde(rename = "cafeBroadcast")]
    Broadcast,
    #[serde(rename = "cafeServicePaused")]
    ServicePaused,
    #[serde(rename = "cafeLastOrderDate")]
    LastOrderDate,
    #[serde(rename = "cafeOrderCounter")]
    OrderCounter,
    #[serde(rename = "cafeSystemLogs")]
    ActivityLog,
    #[serde(rename = "cafeVisitStats")]
    VisitStats,
    #[serde(rename = "cafeStaffSession")]
    StaffSession,
    #[serde(rename = "cafeUserIdentity")]
    UserIdentity,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Orders => "cafeOrders",
            StoreKey::MenuData => "cafeMenuData",
            StoreKey::Broadcast => "cafeBroadcast",
            StoreKey::ServicePaused => "cafeServicePaused",
            StoreKey::LastOrderDate => "cafeLastOrderDate",
            StoreKey::OrderCounter => "cafeOrderCounter",
            StoreKey::ActivityLog => "cafeSystemLogs",
            StoreKey::VisitStats => "cafeVisitStats",
            StoreKey::StaffSession => "cafeStaffSession",
            StoreKey::UserIdentity => "cafeUserIdentity",
        }
    }
}

/// Typed access to the shared store. All views in a process hold the same
/// instance; writes fan out on the [`ChangeBus`].
///
/// There is no locking across read-modify-write sequences. Two writers that
/// interleave (say, two counters allocating an order id) are last-writer-wins.
pub struct SharedStore {
    backend: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
}

impl SharedStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            bus: ChangeBus::new(),
        }
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        self.bus.subscribe()
    }

    pub fn subscribe_keys(&self, keys: &[StoreKey]) -> ChangeSubscription {
        self.bus.subscribe_keys(keys)
    }

    pub fn raw(&self, key: StoreKey) -> Result<Option<String>> {
        self.backend.get(key.as_str())
    }

    /// Write a raw value. Unchanged values are not rewritten and raise no
    /// notification.
    pub fn write_raw(&self, key: StoreKey, value: &str) -> Result<()> {
        if self.backend.get(key.as_str())?.as_deref() == Some(value) {
            return Ok(());
        }
        self.backend.set(key.as_str(), value)?;
        debug!(key = key.as_str(), "shared store updated");
        self.bus.publish(ChangeNotification {
            key,
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    pub fn remove_raw(&self, key: StoreKey) -> Result<()> {
        if self.backend.get(key.as_str())?.is_none() {
            return Ok(());
        }
        self.backend.remove(key.as_str())?;
        debug!(key = key.as_str(), "shared store key removed");
        self.bus.publish(ChangeNotification {
            key,
            new_value: None,
        });
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>> {
        let Some(raw) = self.raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key.as_str(), "ignoring malformed stored value: {e}");
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.write_raw(key, &raw)
    }

    // ---------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------

    /// Newest first, as stored.
    pub fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.read_json(StoreKey::Orders)?.unwrap_or_default())
    }

    pub fn set_orders(&self, orders: &[Order]) -> Result<()> {
        self.write_json(StoreKey::Orders, orders)
    }

    // ---------------------------------------------------------------------
    // Menu
    // ---------------------------------------------------------------------

    pub fn menu(&self) -> Result<Option<Menu>> {
        self.read_json(StoreKey::MenuData)
    }

    pub fn set_menu(&self, menu: &Menu) -> Result<()> {
        self.write_json(StoreKey::MenuData, menu)
    }

    // ---------------------------------------------------------------------
    // Broadcast and service pause
    // ---------------------------------------------------------------------

    pub fn broadcast(&self) -> Result<Option<String>> {
        Ok(self.raw(StoreKey::Broadcast)?.filter(|msg| !msg.is_empty()))
    }

    pub fn set_broadcast(&self, message: &str) -> Result<()> {
        self.write_raw(StoreKey::Broadcast, message)
    }

    pub fn clear_broadcast(&self) -> Result<()> {
        self.remove_raw(StoreKey::Broadcast)
    }

    pub fn service_paused(&self) -> Result<bool> {
        Ok(self.raw(StoreKey::ServicePaused)?.as_deref() == Some("true"))
    }

    pub fn set_service_paused(&self, paused: bool) -> Result<()> {
        self.write_raw(StoreKey::ServicePaused, if paused { "true" } else { "false" })
    }

    // ---------------------------------------------------------------------
    // Daily counter
    // ---------------------------------------------------------------------

    pub fn last_order_date(&self) -> Result<Option<String>> {
        self.raw(StoreKey::LastOrderDate)
    }

    pub fn set_last_order_date(&self, day: &str) -> Result<()> {
        self.write_raw(StoreKey::LastOrderDate, day)
    }

    pub fn order_counter(&self) -> Result<u32> {
        let raw = self.raw(StoreKey::OrderCounter)?;
        Ok(match raw.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(value, "order counter is not a number, treating as 0: {e}");
                0
            }),
        })
    }

    pub fn set_order_counter(&self, counter: u32) -> Result<()> {
        self.write_raw(StoreKey::OrderCounter, &counter.to_string())
    }

    // ---------------------------------------------------------------------
    // Activity log and visit statistics
    // ---------------------------------------------------------------------

    pub fn activity_log(&self) -> Result<Vec<ActivityEntry>> {
        Ok(self.read_json(StoreKey::ActivityLog)?.unwrap_or_default())
    }

    pub fn set_activity_log(&self, entries: &[ActivityEntry]) -> Result<()> {
        self.write_json(StoreKey::ActivityLog, entries)
    }

    pub fn visit_stats(&self) -> Result<VisitStats> {
        Ok(self.read_json(StoreKey::VisitStats)?.unwrap_or_default())
    }

    pub fn set_visit_stats(&self, stats: &VisitStats) -> Result<()> {
        self.write_json(StoreKey::VisitStats, stats)
    }

    // ---------------------------------------------------------------------
    // Identities
    // ---------------------------------------------------------------------

    pub fn staff_session(&self) -> Result<bool> {
        Ok(self.raw(StoreKey::StaffSession)?.is_some())
    }

    /// Normally done by the login page.
    pub fn set_staff_session(&self) -> Result<()> {
        self.write_raw(StoreKey::StaffSession, "true")
    }

    pub fn clear_staff_session(&self) -> Result<()> {
        self.remove_raw(StoreKey::StaffSession)
    }

    pub fn user_identity(&self) -> Result<Option<String>> {
        Ok(self
            .raw(StoreKey::UserIdentity)?
            .filter(|name| !name.trim().is_empty()))
    }

    pub fn set_user_identity(&self, name: &str) -> Result<()> {
        self.write_raw(StoreKey::UserIdentity, name)
    }

    pub fn clear_user_identity(&self) -> Result<()> {
        self.remove_raw(StoreKey::UserIdentity)
    }
}

/// In-process key/value map. Backs the per-tab session store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}

const TRACKED_ORDERS_KEY: &str = "myActiveOrders";

/// Per-tab session storage. Not shared between views and gone with the view.
#[derive(Default)]
pub struct SessionStore {
    backend: MemoryStore,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_orders(&self) -> Result<Vec<String>> {
        let Some(raw) = self.backend.get(TRACKED_ORDERS_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("ignoring malformed tracked order list: {e}");
            Vec::new()
        }))
    }

    pub fn set_tracked_orders(&self, ids: &[String]) -> Result<()> {
        self.backend
            .set(TRACKED_ORDERS_KEY, &serde_json::to_string(ids)?)
    }
}
