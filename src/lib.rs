//! Café counter: customer ordering and staff back office over one shared
//! key/value store.
//!
//! Views ([`views::CustomerView`], [`views::StaffDashboard`]) never talk to
//! each other directly. They write through [`store::SharedStore`] and learn
//! about other views' writes from its change bus.

pub mod activity;
pub mod cart;
pub mod clock;
pub mod config;
pub mod daily_reset;
pub mod db;
pub mod error;
pub mod forms;
pub mod logging;
pub mod menu;
pub mod models;
pub mod notifications;
pub mod orders;
pub mod stats;
pub mod store;
pub mod sync;
pub mod views;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
pub mod state;

#[cfg(test)]
mod tests;

#[cfg(feature = "desktop")]
use commands::{categories, customer, orders, products, reports, staff};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use state::{spawn_change_forwarder, AppState, StateExt};
    use tauri::{Manager, WindowEvent};

    logging::init(&config::log_filter());
    let config = config::Config::load();

    tauri::Builder::default()
        .setup(move |app| {
            let data_dir = app.path().app_data_dir()?;
            let state = AppState::init(config.clone(), config.db_path_in(data_dir))?;

            {
                let mut dashboard = state
                    .dashboard
                    .lock()
                    .map_err(|e| e.to_string())?;
                let period = state.config.reset_interval;
                tauri::async_runtime::block_on(async { dashboard.start_reset_timer(period) });
            }

            spawn_change_forwarder(app.handle().clone(), state.store.clone());
            app.manage(state);
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                window.app_handle().cafe().close_customer(window.label());
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Orders
            orders::get_orders,
            orders::create_manual_order,
            orders::update_order_status,
            orders::update_order_total,
            orders::delete_order,
            // Menu
            categories::get_menu,
            categories::create_category,
            categories::delete_category,
            categories::reorder_categories,
            products::create_menu_item,
            products::update_menu_item,
            products::delete_menu_item,
            // Reports
            reports::get_dashboard_stats,
            reports::get_drink_breakdown,
            reports::get_visit_flux,
            reports::get_activity,
            reports::dashboard_poll_changes,
            // Staff
            staff::check_staff_session,
            staff::staff_logout,
            staff::get_service_state,
            staff::post_broadcast,
            staff::clear_broadcast,
            staff::toggle_service,
            // Customer
            customer::customer_load,
            customer::get_cart,
            customer::add_to_cart,
            customer::update_cart_qty,
            customer::update_cart_note,
            customer::suggested_pickup_time,
            customer::submit_order,
            customer::get_my_orders,
            customer::check_order_notifications,
            customer::customer_poll_changes,
            customer::customer_sign_in,
            customer::customer_sign_out,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
