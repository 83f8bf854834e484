use crate::forms::BroadcastForm;
use crate::state::StateExt;
use crate::views::{ServiceState, SessionCheck};
use tauri::AppHandle;

#[tauri::command]
pub fn check_staff_session(app: AppHandle) -> Result<SessionCheck, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.check_session().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn staff_logout(app: AppHandle) -> Result<(), String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.logout().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_service_state(app: AppHandle) -> Result<ServiceState, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.service_state().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn post_broadcast(app: AppHandle, form: BroadcastForm) -> Result<(), String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.post_broadcast(&form).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn clear_broadcast(app: AppHandle) -> Result<(), String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.clear_broadcast().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn toggle_service(app: AppHandle) -> Result<bool, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.toggle_service().map_err(|e| e.to_string())
}
