// RegSift - app/session.rs
//
// Preference persistence: view mode and interface locale survive restarts.
//
// - Stored under a fixed key in the key-value store (preferences.json on
//   disk), written atomically by the store.
// - Load problems never surface to the user: a missing, corrupt or
//   version-mismatched value means defaults.

use crate::platform::fs::KeyValueStore;
use crate::util::constants::{LOCALES, PREFERENCES_KEY, VIEW_MODES};
use crate::util::error::PersistenceError;
use serde::{Deserialize, Serialize};

/// Version stamp for forward-compatibility checks.
///
/// Bump when `Preferences` changes incompatibly; mismatches are discarded.
pub const PREFERENCES_VERSION: u32 = 1;

/// How the record list is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn key(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!(
                "unknown view mode '{other}' (expected {})",
                VIEW_MODES.join(" or ")
            )),
        }
    }
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    Sv,
}

impl Locale {
    pub fn key(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::Sv => "sv",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "sv" => Ok(Locale::Sv),
            other => Err(format!(
                "unknown locale '{other}' (expected {})",
                LOCALES.join(" or ")
            )),
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Must equal `PREFERENCES_VERSION` to be accepted.
    pub version: u32,

    #[serde(default)]
    pub view_mode: ViewMode,

    #[serde(default)]
    pub locale: Locale,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            view_mode: ViewMode::default(),
            locale: Locale::default(),
        }
    }
}

impl Preferences {
    /// Load saved preferences. `None` means "use defaults".
    pub fn load<S: KeyValueStore>(store: &S) -> Option<Self> {
        let raw = match store.read(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No saved preferences");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read preferences, using defaults");
                return None;
            }
        };

        let prefs: Preferences = serde_json::from_str(&raw)
            .map_err(|e| {
                tracing::warn!(error = %e, "Preferences are malformed, using defaults");
            })
            .ok()?;

        if prefs.version != PREFERENCES_VERSION {
            tracing::warn!(
                found = prefs.version,
                expected = PREFERENCES_VERSION,
                "Preferences version mismatch, using defaults"
            );
            return None;
        }

        tracing::debug!(view_mode = %prefs.view_mode, locale = %prefs.locale, "Preferences loaded");
        Some(prefs)
    }

    /// Saved preferences, or defaults seeded with the configured view mode.
    pub fn load_or_default<S: KeyValueStore>(store: &S, configured_view: Option<ViewMode>) -> Self {
        Self::load(store).unwrap_or_else(|| Self {
            view_mode: configured_view.unwrap_or_default(),
            ..Default::default()
        })
    }

    pub fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Encode {
            key: PREFERENCES_KEY.to_string(),
            source: e,
        })?;
        store.write(PREFERENCES_KEY, &json)?;
        tracing::info!(view_mode = %self.view_mode, locale = %self.locale, "Preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fs::{FileKvStore, MemoryKvStore};
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore::new(dir.path());
        let prefs = Preferences {
            view_mode: ViewMode::List,
            locale: Locale::Sv,
            ..Default::default()
        };
        prefs.save(&store).unwrap();
        assert!(dir.path().join("preferences.json").exists());
        assert_eq!(Preferences::load(&store), Some(prefs));
    }

    #[test]
    fn test_missing_returns_none() {
        assert_eq!(Preferences::load(&MemoryKvStore::new()), None);
    }

    #[test]
    fn test_malformed_returns_none() {
        let store = MemoryKvStore::with_value(PREFERENCES_KEY, "{{{");
        assert_eq!(Preferences::load(&store), None);
    }

    #[test]
    fn test_wrong_version_returns_none() {
        let store = MemoryKvStore::with_value(
            PREFERENCES_KEY,
            r#"{"version": 99, "view_mode": "list", "locale": "sv"}"#,
        );
        assert_eq!(Preferences::load(&store), None);
    }

    #[test]
    fn test_configured_view_seeds_defaults() {
        let prefs = Preferences::load_or_default(&MemoryKvStore::new(), Some(ViewMode::List));
        assert_eq!(prefs.view_mode, ViewMode::List);
        assert_eq!(prefs.locale, Locale::Ru);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("LIST".parse::<ViewMode>(), Ok(ViewMode::List));
        assert_eq!("sv".parse::<Locale>(), Ok(Locale::Sv));
        assert!("en".parse::<Locale>().is_err());
    }
}
