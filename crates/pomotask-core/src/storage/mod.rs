//! Durable key-value storage.
//!
//! Everything the core persists (timer settings, the session counter, the
//! task list, presentation preferences) lives under a handful of string keys
//! in a [`Store`]. Values are plain strings; structured values are JSON.

mod config;
pub mod database;
mod memory;
pub mod preferences;

pub use config::{Config, NotificationsConfig, StatsConfig, TimerSettings};
pub use database::Database;
pub use memory::MemoryStore;
pub use preferences::Preferences;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Store keys shared by every component.
pub mod keys {
    pub const FOCUS_TIME: &str = "focusTime";
    pub const BREAK_TIME: &str = "breakTime";
    pub const COMPLETED_SESSIONS: &str = "completedSessions";
    pub const TASKS: &str = "pomodoroTasks";
    pub const ACTIVE_TASK_ID: &str = "activeTaskId";
    pub const DARK_MODE: &str = "darkMode";
    pub const MUSIC_ENABLED: &str = "musicEnabled";
    pub const MUSIC_VOLUME: &str = "musicVolume";
}

/// String-keyed durable storage.
///
/// Writes are last-write-wins. Implementations must be shareable so the
/// timer engine and the task registry can hold the same handle.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Store handle held by the components.
pub type SharedStore = Arc<dyn Store>;

/// Read and parse a scalar value (`"1500"`, `"true"`).
pub fn read_parsed<T>(store: &dyn Store, key: &str) -> Result<Option<T>, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match store.get(key)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Read and deserialize a JSON value.
pub fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Serialize a value as JSON and store it.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn Store,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &json)
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTASK_DATA_DIR` wins when set. Otherwise `~/.config/pomotask/`, or
/// `~/.config/pomotask-dev/` with `POMOTASK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("POMOTASK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTASK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotask-dev")
            } else {
                base_dir.join("pomotask")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
