use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub mod slot;

pub use slot::{GranularityError, SlotGranularity};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slot_granularity: SlotGranularity,
    pub store_timeout_ms: u64,
    pub lock_timeout_ms: u64,
    pub max_write_retries: u32,
    pub data_dir: Option<PathBuf>,
    pub bind_addr: String,
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slot_granularity: SlotGranularity::default(),
            store_timeout_ms: 2_000,
            lock_timeout_ms: 5_000,
            max_write_retries: 3,
            data_dir: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            seed_sample_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let slot_minutes = parse_env("SLOT_MINUTES", defaults.slot_granularity.minutes());
        let slot_granularity = SlotGranularity::new(slot_minutes).unwrap_or_else(|e| {
            warn!("SLOT_MINUTES rejected ({}), using {} minutes", e, SlotGranularity::DEFAULT_MINUTES);
            SlotGranularity::default()
        });

        let config = Self {
            slot_granularity,
            store_timeout_ms: parse_env("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            lock_timeout_ms: parse_env("LOCK_TIMEOUT_MS", defaults.lock_timeout_ms),
            max_write_retries: parse_env("MAX_WRITE_RETRIES", defaults.max_write_retries),
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            seed_sample_data: parse_env("SEED_SAMPLE_DATA", defaults.seed_sample_data),
        };

        if !config.is_persistent() {
            warn!("DATA_DIR not set, appointments will only be kept in memory");
        }

        config
    }

    pub fn is_persistent(&self) -> bool {
        self.data_dir.is_some()
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Snapshot file for a table, when persistence is enabled.
    pub fn table_path(&self, table: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", table)))
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
