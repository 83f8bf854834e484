use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_RESET_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_LOG_FILTER: &str = "info,cafe_counter_lib=debug";
const DB_FILE_NAME: &str = "cafe_counter.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit database location; `None` means the app data directory.
    pub db_path: Option<PathBuf>,
    pub reset_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            reset_interval: Duration::from_secs(DEFAULT_RESET_INTERVAL_SECS),
        }
    }
}

impl Config {
    /// Call after [`crate::logging::init`] so fallbacks get logged.
    pub fn load() -> Self {
        Self {
            db_path: var("CAFE_DB_PATH").ok().map(PathBuf::from),
            reset_interval: reset_interval(try_load(
                "CAFE_RESET_INTERVAL_SECS",
                DEFAULT_RESET_INTERVAL_SECS,
            )),
        }
    }

    pub fn db_path_in(&self, data_dir: PathBuf) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME))
    }
}

/// Filter for the log subscriber, read before any subscriber exists.
pub fn log_filter() -> String {
    log_filter_or_default(env::var("CAFE_LOG").ok())
}

fn log_filter_or_default(raw: Option<String>) -> String {
    raw.map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn reset_interval(secs: u64) -> Duration {
    if secs == 0 {
        warn!("CAFE_RESET_INTERVAL_SECS must be positive, using default: {DEFAULT_RESET_INTERVAL_SECS}");
        return Duration::from_secs(DEFAULT_RESET_INTERVAL_SECS);
    }
    Duration::from_secs(secs)
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("{key} not set, using default");
    })
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?} ({e}), using default: {default}");
            default
        }),
        Err(()) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_defaults_to_data_dir() {
        let config = Config::default();
        assert_eq!(
            config.db_path_in(PathBuf::from("/data")),
            PathBuf::from("/data").join("cafe_counter.db")
        );
        assert_eq!(config.reset_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/other.db")),
            ..Config::default()
        };
        assert_eq!(
            config.db_path_in(PathBuf::from("/data")),
            PathBuf::from("/tmp/other.db")
        );
    }

    #[test]
    fn test_zero_reset_interval_falls_back_to_default() {
        assert_eq!(reset_interval(0), Duration::from_secs(DEFAULT_RESET_INTERVAL_SECS));
        assert_eq!(reset_interval(15), Duration::from_secs(15));
    }

    #[test]
    fn test_log_filter_falls_back_to_default() {
        assert_eq!(log_filter_or_default(None), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter_or_default(Some("  ".to_string())), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter_or_default(Some("warn".to_string())), "warn");
    }
}
