//! Presentation preferences kept alongside the core state.
//!
//! The core never reads these; they live in the same store so a front end
//! finds them under the familiar keys.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{keys, read_parsed, Store};
use crate::error::{CoreError, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub dark_mode: bool,
    pub music_enabled: bool,
    /// 0.0 ..= 1.0
    pub music_volume: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            music_enabled: false,
            music_volume: 0.5,
        }
    }
}

impl Preferences {
    /// Read preferences, substituting defaults for missing or corrupt keys.
    pub fn load(store: &dyn Store) -> Self {
        let defaults = Self::default();
        Self {
            dark_mode: load_or(store, keys::DARK_MODE, defaults.dark_mode),
            music_enabled: load_or(store, keys::MUSIC_ENABLED, defaults.music_enabled),
            music_volume: load_volume(store, defaults.music_volume),
        }
    }

    /// Update one preference by its store key and persist it.
    ///
    /// # Errors
    ///
    /// Rejects unknown keys and values that don't parse. A failing store is
    /// reported as [`CoreError::Store`].
    pub fn set(&mut self, store: &dyn Store, key: &str, value: &str) -> Result<()> {
        let invalid = |message: &str| {
            CoreError::from(ValidationError::InvalidValue {
                field: key.to_string(),
                message: message.to_string(),
            })
        };

        match key {
            keys::DARK_MODE => {
                self.dark_mode = value.parse().map_err(|_| invalid("expected true or false"))?;
                store.set(key, &self.dark_mode.to_string())?;
            }
            keys::MUSIC_ENABLED => {
                self.music_enabled =
                    value.parse().map_err(|_| invalid("expected true or false"))?;
                store.set(key, &self.music_enabled.to_string())?;
            }
            keys::MUSIC_VOLUME => {
                let volume: f64 = value.parse().map_err(|_| invalid("expected a number"))?;
                if !(0.0..=1.0).contains(&volume) {
                    return Err(invalid("must be between 0 and 1"));
                }
                self.music_volume = volume;
                store.set(key, &volume.to_string())?;
            }
            _ => return Err(invalid("unknown preference")),
        }
        Ok(())
    }
}

fn load_volume(store: &dyn Store, default: f64) -> f64 {
    let volume = load_or(store, keys::MUSIC_VOLUME, default);
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        warn!(key = keys::MUSIC_VOLUME, value = %volume, "ignoring non-finite stored preference");
        default
    }
}

fn load_or<T>(store: &dyn Store, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match read_parsed(store, key) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            warn!(key, error = %e, "ignoring stored preference");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_when_store_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn reads_browser_style_values() {
        let store = MemoryStore::new();
        store.set(keys::DARK_MODE, "true").unwrap();
        store.set(keys::MUSIC_VOLUME, "0.3").unwrap();
        let prefs = Preferences::load(&store);
        assert!(prefs.dark_mode);
        assert!(!prefs.music_enabled);
        assert!((prefs.music_volume - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_volume_falls_back_to_default() {
        let store = MemoryStore::new();
        for bad in ["NaN", "inf", "-inf"] {
            store.set(keys::MUSIC_VOLUME, bad).unwrap();
            let prefs = Preferences::load(&store);
            assert_eq!(prefs.music_volume, Preferences::default().music_volume);
        }
        store.set(keys::MUSIC_VOLUME, "7").unwrap();
        assert_eq!(Preferences::load(&store).music_volume, 1.0);
    }

    #[test]
    fn set_persists_and_validates() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::default();
        prefs.set(&store, keys::MUSIC_ENABLED, "true").unwrap();
        assert_eq!(store.get(keys::MUSIC_ENABLED).unwrap().as_deref(), Some("true"));

        assert!(prefs.set(&store, keys::MUSIC_VOLUME, "1.5").is_err());
        assert!(prefs.set(&store, keys::MUSIC_VOLUME, "NaN").is_err());
        assert!(prefs.set(&store, "fontSize", "12").is_err());
        assert!(prefs.set(&store, keys::DARK_MODE, "yes").is_err());
        assert!(!prefs.dark_mode);
    }
}
