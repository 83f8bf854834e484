use crate::forms::TotalForm;
use crate::models::{Order, OrderStatus};
use crate::state::StateExt;
use tauri::AppHandle;

#[tauri::command]
pub fn get_orders(app: AppHandle) -> Result<Vec<Order>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.orders().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_manual_order(app: AppHandle) -> Result<Order, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.create_manual_order().map_err(|e| e.to_string())
}

/// Unknown ids resolve to `None` rather than an error.
#[tauri::command]
pub fn update_order_status(
    app: AppHandle,
    id: String,
    status: OrderStatus,
) -> Result<Option<Order>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.set_status(&id, status).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_order_total(
    app: AppHandle,
    id: String,
    form: TotalForm,
) -> Result<Option<Order>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.set_total(&id, &form).map_err(|e| e.to_string())
}

/// The frontend asks for confirmation before calling this.
#[tauri::command]
pub fn delete_order(app: AppHandle, id: String) -> Result<bool, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.delete_order(&id).map_err(|e| e.to_string())
}
