use std::sync::Arc;

use crate::forms::MenuItemForm;
use crate::models::Menu;
use crate::state::StateExt;
use tauri::AppHandle;

#[tauri::command]
#[allow(non_snake_case)]
pub fn create_menu_item(
    app: AppHandle,
    categoryId: String,
    form: MenuItemForm,
) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .add_menu_item(&categoryId, &form)
        .map_err(|e| e.to_string())
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn update_menu_item(
    app: AppHandle,
    categoryId: String,
    itemId: String,
    form: MenuItemForm,
) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .update_menu_item(&categoryId, &itemId, &form)
        .map_err(|e| e.to_string())
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn delete_menu_item(
    app: AppHandle,
    categoryId: String,
    itemId: String,
) -> Result<Arc<Menu>, String> {
    let dashboard = app.cafe().dashboard.lock().map_err(|e| e.to_string())?;
    dashboard
        .delete_menu_item(&categoryId, &itemId)
        .map_err(|e| e.to_string())
}
