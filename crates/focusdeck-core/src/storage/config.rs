//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Display options (completed tasks, theme)
//! - Focus mode defaults
//! - Backup retention
//!
//! Configuration is stored at `~/.config/focusdeck/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::focus::AlertInterval;

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

/// Focus mode configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Alert interval offered when none is given, in minutes.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: u32,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Previous documents kept as snapshots.
    #[serde(default = "default_backup_limit")]
    pub backup_limit: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusdeck/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_true() -> bool {
    true
}
fn default_interval_minutes() -> u32 {
    10
}
fn default_check_interval_secs() -> u64 {
    10
}
fn default_backup_limit() -> u32 {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_completed: true,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            default_interval_minutes: default_interval_minutes(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backup_limit: default_backup_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory. Call [`Config::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        if key == "focus.default_interval_minutes" {
            AlertInterval::new(updated.focus.default_interval_minutes)
                .map_err(|e| invalid(e.to_string()))?;
        }
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// The configured default alert interval, or the built-in default when
    /// the file holds an out-of-range value.
    pub fn default_interval(&self) -> AlertInterval {
        AlertInterval::new(self.focus.default_interval_minutes).unwrap_or_default()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.focus.check_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.display.show_completed);
        assert_eq!(parsed.focus.default_interval_minutes, 10);
        assert_eq!(parsed.storage.backup_limit, 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[display]\nshow_completed = false\n").unwrap();
        assert!(!parsed.display.show_completed);
        assert_eq!(parsed.focus.check_interval_secs, 10);
    }

    #[test]
    fn retired_keys_in_old_files_are_ignored() {
        let parsed: Config = toml::from_str("[display]\ndark_mode = true\n").unwrap();
        assert!(parsed.display.show_completed);
        assert!(parsed.get("display.dark_mode").is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("display.show_completed").as_deref(), Some("true"));
        assert_eq!(cfg.get("focus.default_interval_minutes").as_deref(), Some("10"));
        assert!(cfg.get("display.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("display.show_completed", "false").unwrap();
        cfg.set("storage.backup_limit", "3").unwrap();
        assert!(!cfg.display.show_completed);
        assert_eq!(cfg.storage.backup_limit, 3);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("display.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("display", "x"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("display.show_completed", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("storage.backup_limit", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_validates_interval_range() {
        let mut cfg = Config::default();
        assert!(cfg.set("focus.default_interval_minutes", "16").is_err());
        assert_eq!(cfg.focus.default_interval_minutes, 10);
        cfg.set("focus.default_interval_minutes", "15").unwrap();
        assert_eq!(cfg.default_interval().minutes(), 15);
    }

    #[test]
    fn out_of_range_interval_in_file_falls_back() {
        let parsed: Config = toml::from_str("[focus]\ndefault_interval_minutes = 0\n").unwrap();
        assert_eq!(parsed.default_interval(), AlertInterval::default());
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"display.show_completed".to_string()));
        assert!(keys.contains(&"storage.backup_limit".to_string()));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(cfg.display.show_completed);

        let mut cfg = cfg;
        cfg.set("display.show_completed", "false").unwrap();
        cfg.save_to(&path).unwrap();
        assert!(!Config::load_from(&path).unwrap().display.show_completed);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "display = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
