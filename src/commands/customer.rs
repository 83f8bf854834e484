use crate::cart::Cart;
use crate::error::Result as AppResult;
use crate::forms::CheckoutForm;
use crate::models::{Order, ReadyNotice};
use crate::state::StateExt;
use crate::views::{CustomerReaction, CustomerSnapshot, CustomerView};
use tauri::{AppHandle, Window};

/// Run `f` against the view owned by the calling window.
fn with_view<T>(
    app: &AppHandle,
    window: &Window,
    f: impl FnOnce(&mut CustomerView) -> AppResult<T>,
) -> Result<T, String> {
    let mut customers = app.cafe().customers.lock().map_err(|e| e.to_string())?;
    let view = customers
        .get_mut(window.label())
        .ok_or_else(|| format!("No customer view for window {}", window.label()))?;
    f(view).map_err(|e| e.to_string())
}

/// Page load. Async so the reset timer lands on the async runtime.
#[tauri::command]
pub async fn customer_load(app: AppHandle, window: Window) -> Result<CustomerSnapshot, String> {
    let state = app.cafe();
    let mut customers = state.customers.lock().map_err(|e| e.to_string())?;

    let label = window.label().to_string();
    if !customers.contains_key(&label) {
        let mut view = CustomerView::open(state.store.clone(), state.clock.clone())
            .map_err(|e| e.to_string())?;
        view.start_reset_timer(state.config.reset_interval);
        customers.insert(label.clone(), view);
    }

    let view = customers
        .get_mut(&label)
        .ok_or_else(|| format!("No customer view for window {label}"))?;
    view.load().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_cart(app: AppHandle, window: Window) -> Result<Cart, String> {
    with_view(&app, &window, |view| Ok(view.cart().clone()))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn add_to_cart(app: AppHandle, window: Window, itemId: String) -> Result<Cart, String> {
    with_view(&app, &window, |view| {
        view.add_to_cart(&itemId)?;
        Ok(view.cart().clone())
    })
}

#[tauri::command]
pub fn update_cart_qty(
    app: AppHandle,
    window: Window,
    index: usize,
    delta: i32,
) -> Result<Cart, String> {
    with_view(&app, &window, |view| {
        view.update_qty(index, delta);
        Ok(view.cart().clone())
    })
}

#[tauri::command]
pub fn update_cart_note(
    app: AppHandle,
    window: Window,
    index: usize,
    note: String,
) -> Result<Cart, String> {
    with_view(&app, &window, |view| {
        view.set_note(index, &note);
        Ok(view.cart().clone())
    })
}

#[tauri::command]
pub fn suggested_pickup_time(app: AppHandle, window: Window) -> Result<String, String> {
    with_view(&app, &window, |view| Ok(view.suggested_pickup_time()))
}

#[tauri::command]
pub fn submit_order(app: AppHandle, window: Window, form: CheckoutForm) -> Result<Order, String> {
    with_view(&app, &window, |view| view.submit(&form))
}

#[tauri::command]
pub fn get_my_orders(app: AppHandle, window: Window) -> Result<Vec<Order>, String> {
    with_view(&app, &window, |view| view.my_orders())
}

#[tauri::command]
pub fn check_order_notifications(
    app: AppHandle,
    window: Window,
) -> Result<Vec<ReadyNotice>, String> {
    with_view(&app, &window, |view| view.check_notifications())
}

/// Called by customer windows on `store-changed`.
#[tauri::command]
pub fn customer_poll_changes(
    app: AppHandle,
    window: Window,
) -> Result<Option<CustomerReaction>, String> {
    with_view(&app, &window, |view| view.poll_changes())
}

#[tauri::command]
pub fn customer_sign_in(app: AppHandle, window: Window, name: String) -> Result<(), String> {
    with_view(&app, &window, |view| view.sign_in(&name))
}

#[tauri::command]
pub fn customer_sign_out(app: AppHandle, window: Window) -> Result<(), String> {
    with_view(&app, &window, |view| view.sign_out())
}
