use std::sync::Mutex;

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to. Used to simulate day rollovers.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Local>) {
        let mut guard = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = *guard + by;
        *guard = next;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Calendar day in French locale format, e.g. `18/10/2026`.
///
/// Rollover follows the local calendar date, so a timezone change mid-session
/// moves the boundary with it.
pub fn day_key(instant: &DateTime<Local>) -> String {
    instant.format("%d/%m/%Y").to_string()
}

pub fn hour_key(instant: &DateTime<Local>) -> String {
    instant.format("%H").to_string()
}

pub fn time_label(instant: &DateTime<Local>) -> String {
    instant.format("%H:%M").to_string()
}
