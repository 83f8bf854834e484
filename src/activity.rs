use chrono::{Local, TimeZone};
use tracing::debug;

use crate::clock::{time_label, Clock};
use crate::error::Result;
use crate::models::{ActivityEntry, ActivityLine};
use crate::store::SharedStore;

pub const ACTIVITY_LOG_CAP: usize = 50;
pub const ACTIVITY_FEED_LEN: usize = 10;

/// Prepend an entry to the staff activity log, keeping the newest 50.
pub fn log_activity(store: &SharedStore, clock: &dyn Clock, text: &str) -> Result<()> {
    let mut entries = store.activity_log()?;
    entries.insert(
        0,
        ActivityEntry {
            text: text.to_string(),
            timestamp: clock.now().timestamp_millis(),
        },
    );
    entries.truncate(ACTIVITY_LOG_CAP);
    debug!(text, "activity logged");
    store.set_activity_log(&entries)
}

/// Dashboard feed: order creations and logged events, newest first.
pub fn recent_activity(store: &SharedStore, limit: usize) -> Result<Vec<ActivityLine>> {
    let orders = store.orders()?;
    let logs = store.activity_log()?;

    let mut lines: Vec<ActivityLine> = orders
        .iter()
        .map(|order| {
            let items = order
                .items
                .iter()
                .map(|item| format!("{}x {}", item.qty, item.name))
                .collect::<Vec<_>>()
                .join(", ");
            line_at(
                order.date.timestamp_millis(),
                format!("Nouvelle commande ({}): {}", order.id, items),
            )
        })
        .chain(
            logs.into_iter()
                .map(|entry| line_at(entry.timestamp, entry.text)),
        )
        .collect();

    lines.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    lines.truncate(limit);
    Ok(lines)
}

fn line_at(timestamp: i64, text: String) -> ActivityLine {
    let time = Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|instant| time_label(&instant))
        .unwrap_or_default();
    ActivityLine {
        timestamp,
        time,
        text,
    }
}
