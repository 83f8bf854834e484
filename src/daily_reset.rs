use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clock::{day_key, Clock};
use crate::config::DEFAULT_RESET_INTERVAL_SECS;
use crate::error::Result;
use crate::store::SharedStore;

const DEFAULT_RESET_PERIOD: Duration = Duration::from_secs(DEFAULT_RESET_INTERVAL_SECS);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// No date was ever recorded; today's date is now stored, nothing wiped.
    FirstRun,
    /// Stored date is today.
    Unchanged,
    /// A new day started: orders, activity log and counter were wiped.
    Wiped { previous_day: String },
}

/// Wipe the day's ephemeral data if the calendar date moved on.
///
/// Destructive: nothing is archived before the wipe. Safe to call any number
/// of times; only the first call after a rollover wipes.
pub fn check_daily_reset(store: &SharedStore, clock: &dyn Clock) -> Result<ResetOutcome> {
    let today = day_key(&clock.now());
    let last = store.last_order_date()?;

    let outcome = match last {
        None => ResetOutcome::FirstRun,
        Some(day) if day == today => ResetOutcome::Unchanged,
        Some(day) => {
            info!(previous_day = %day, today = %today, "new day detected, wiping daily data");
            store.set_orders(&[])?;
            store.set_activity_log(&[])?;
            store.set_order_counter(0)?;
            ResetOutcome::Wiped { previous_day: day }
        }
    };

    store.set_last_order_date(&today)?;
    Ok(outcome)
}

/// Allocate the next order id for today: `#1`, `#2`, ...
///
/// Runs the daily reset first so the first id of a new day is `#1`. The read
/// and the write are separate store operations, so two callers racing across
/// views can both observe the same counter and hand out the same id.
pub fn next_order_id(store: &SharedStore, clock: &dyn Clock) -> Result<String> {
    // With no recorded day the stored counter cannot be trusted either.
    if check_daily_reset(store, clock)? == ResetOutcome::FirstRun {
        store.set_order_counter(0)?;
    }
    let counter = store.order_counter()? + 1;
    store.set_order_counter(counter)?;
    Ok(format!("#{counter}"))
}

/// Periodic daily-reset check owned by a view. Cancelled on [`stop`] or drop.
///
/// [`stop`]: DailyResetTimer::stop
pub struct DailyResetTimer {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl DailyResetTimer {
    /// Must be called from inside a tokio runtime. A zero period falls back
    /// to one minute.
    pub fn start(store: Arc<SharedStore>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let period = if period.is_zero() {
            warn!(
                fallback_secs = DEFAULT_RESET_PERIOD.as_secs(),
                "zero reset period, using fallback"
            );
            DEFAULT_RESET_PERIOD
        } else {
            period
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; views already checked on load.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = check_daily_reset(&store, clock.as_ref()) {
                            error!("daily reset check failed: {err}");
                        }
                    }
                    _ = token.cancelled() => {
                        info!("daily reset timer stopped");
                        break;
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
            cancel_token,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn stop(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!("daily reset timer failed to join: {err}");
            }
        }
    }
}

impl Drop for DailyResetTimer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
