use std::collections::HashMap;

use tracing::debug;

use crate::clock::{day_key, hour_key, Clock};
use crate::error::Result;
use crate::models::{DashboardStats, DrinkCount};
use crate::store::SharedStore;

/// Count one customer page load in today's hourly bucket.
pub fn track_site_visit(store: &SharedStore, clock: &dyn Clock) -> Result<()> {
    let now = clock.now();
    let mut stats = store.visit_stats()?;
    let hours = stats.entry(day_key(&now)).or_default();
    let count = hours.entry(hour_key(&now)).or_insert(0);
    *count += 1;
    debug!(visits = *count, "site visit tracked");
    store.set_visit_stats(&stats)
}

pub fn dashboard_stats(store: &SharedStore, clock: &dyn Clock) -> Result<DashboardStats> {
    let orders = store.orders()?;
    let visits = store.visit_stats()?;
    let today = day_key(&clock.now());

    Ok(DashboardStats {
        revenue_today: orders.iter().map(|order| order.total).sum(),
        clients: orders.len(),
        items_served: orders.iter().map(|order| order.item_count()).sum(),
        visits_today: visits
            .get(&today)
            .map(|hours| hours.values().sum())
            .unwrap_or(0),
    })
}

/// Quantity served per item name, most served first.
pub fn drink_breakdown(store: &SharedStore) -> Result<Vec<DrinkCount>> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for order in store.orders()? {
        for item in order.items {
            *totals.entry(item.name).or_insert(0) += item.qty;
        }
    }

    let mut breakdown: Vec<DrinkCount> = totals
        .into_iter()
        .map(|(name, qty)| DrinkCount { name, qty })
        .collect();
    breakdown.sort_by(|a, b| b.qty.cmp(&a.qty).then_with(|| a.name.cmp(&b.name)));
    Ok(breakdown)
}

/// Today's visits per hour, index 0 = midnight.
pub fn visit_flux(store: &SharedStore, clock: &dyn Clock) -> Result<[u32; 24]> {
    let visits = store.visit_stats()?;
    let today = day_key(&clock.now());
    let mut flux = [0u32; 24];

    if let Some(hours) = visits.get(&today) {
        for (hour, count) in hours {
            if let Some(slot) = hour.parse::<usize>().ok().and_then(|h| flux.get_mut(h)) {
                *slot = *count;
            }
        }
    }
    Ok(flux)
}
