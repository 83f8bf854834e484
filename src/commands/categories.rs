use std::sync::Arc;

use crate::forms::CategoryForm;
use crate::models::Menu;
use crate::state::StateExt;
use tauri::AppHandle;

#[tauri::command]
pub fn get_menu(app: AppHandle) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.menu().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_category(app: AppHandle, form: CategoryForm) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard.add_category(&form).map_err(|e| e.to_string())
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn delete_category(app: AppHandle, categoryId: String) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .delete_category(&categoryId)
        .map_err(|e| e.to_string())
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn reorder_categories(app: AppHandle, categoryIds: Vec<String>) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .reorder_categories(&categoryIds)
        .map_err(|e| e.to_string())
}
