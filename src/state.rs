use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tauri::{AppHandle, Emitter, Manager};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::store::SharedStore;
use crate::views::{CustomerView, StaffDashboard};

pub const STORE_CHANGED_EVENT: &str = "store-changed";

/// Tauri managed state: the shared store plus one view object per window.
pub struct AppState {
    pub config: Config,
    pub store: Arc<SharedStore>,
    pub clock: Arc<dyn Clock>,
    pub dashboard: Mutex<StaffDashboard>,
    pub customers: Mutex<HashMap<String, CustomerView>>,
}

impl AppState {
    pub fn init(config: Config, db_path: PathBuf) -> Result<Self> {
        let db = Database::open(&db_path)?;
        db.initialize()?;

        let store = Arc::new(SharedStore::new(Arc::new(db)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut dashboard = StaffDashboard::open(store.clone(), clock.clone())?;
        dashboard.load()?;

        Ok(Self {
            config,
            store,
            clock,
            dashboard: Mutex::new(dashboard),
            customers: Mutex::new(HashMap::new()),
        })
    }

    /// Drop the view of a closed window and stop its timer.
    pub fn close_customer(&self, label: &str) {
        let view = match self.customers.lock() {
            Ok(mut customers) => customers.remove(label),
            Err(e) => {
                warn!("customer views lock poisoned: {e}");
                None
            }
        };
        if let Some(view) = view {
            info!(window = label, "customer view closed");
            tauri::async_runtime::spawn(view.close());
        }
    }
}

/// Relay every store change to all windows as `store-changed`.
pub fn spawn_change_forwarder(app: AppHandle, store: Arc<SharedStore>) {
    let mut changes = store.subscribe();
    tauri::async_runtime::spawn(async move {
        while let Some(notification) = changes.next().await {
            if let Err(e) = app.emit(STORE_CHANGED_EVENT, &notification) {
                warn!("failed to emit store change: {e}");
            }
        }
    });
}

pub trait StateExt {
    fn cafe(&self) -> &AppState;
}

impl StateExt for AppHandle {
    fn cafe(&self) -> &AppState {
        self.state::<AppState>().inner()
    }
}
