use tracing::info;

use crate::error::Result;
use crate::models::{OrderStatus, ReadyNotice};
use crate::store::{SessionStore, SharedStore};

pub fn track_order_for_notification(session: &SessionStore, order_id: &str) -> Result<()> {
    let mut tracked = session.tracked_orders()?;
    tracked.push(order_id.to_string());
    session.set_tracked_orders(&tracked)
}

/// Announce tracked orders that became ready, then stop tracking them.
///
/// Each ready transition is announced once per session. Tracked ids whose
/// order no longer exists are dropped silently.
pub fn check_order_notifications(
    session: &SessionStore,
    store: &SharedStore,
) -> Result<Vec<ReadyNotice>> {
    let tracked = session.tracked_orders()?;
    if tracked.is_empty() {
        return Ok(Vec::new());
    }

    let orders = store.orders()?;
    let mut still_pending = Vec::new();
    let mut notices = Vec::new();

    for order_id in tracked {
        let Some(order) = orders.iter().find(|order| order.id == order_id) else {
            continue;
        };
        if order.status == OrderStatus::Ready {
            info!(order_id = %order.id, "order ready, notifying customer");
            notices.push(ReadyNotice {
                order_id: order.id.clone(),
                message: format!(
                    "Votre commande {} est prête ! Venez la chercher au comptoir.",
                    order.id
                ),
            });
        } else {
            still_pending.push(order_id);
        }
    }

    session.set_tracked_orders(&still_pending)?;
    Ok(notices)
}
