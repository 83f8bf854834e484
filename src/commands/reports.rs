use crate::models::{ActivityLine, DashboardStats, DrinkCount};
use crate::state::StateExt;
use crate::views::StaffReaction;
use tauri::AppHandle;

#[tauri::command]
pub fn get_dashboard_stats(app: AppHandle) -> Result<DashboardStats, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.stats().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_drink_breakdown(app: AppHandle) -> Result<Vec<DrinkCount>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.drink_breakdown().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_visit_flux(app: AppHandle) -> Result<Vec<u32>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .visit_flux()
        .map(|flux| flux.to_vec())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_activity(app: AppHandle, limit: Option<usize>) -> Result<Vec<ActivityLine>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .activity(limit.unwrap_or(crate::activity::ACTIVITY_FEED_LEN))
        .map_err(|e| e.to_string())
}

/// Called by the dashboard window on `store-changed`.
#[tauri::command]
pub fn dashboard_poll_changes(app: AppHandle) -> Result<Vec<StaffReaction>, String> {
    let mut dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.poll_changes().map_err(|e| e.to_string())
}
