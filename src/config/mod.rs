use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    errors::CalendarError,
    ledger::DEFAULT_STARTING_BALANCE,
    utils::paths::{self, write_atomic},
};

/// Longest projection horizon accepted from configuration (about 100 years).
pub const MAX_HORIZON_DAYS: i64 = 36_525;

/// User preferences persisted next to the budget data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Balance used when no saved data exists.
    pub default_starting_balance: f64,
    /// Quiet period before a pending change is written.
    pub save_delay_ms: u64,
    /// How long the "Saved" indicator lingers.
    pub status_reset_ms: u64,
    /// Day offsets projected alongside the end-of-month balance.
    pub horizon_days: Vec<i64>,
    /// Overrides the budget data location; relative paths resolve against the data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_starting_balance: DEFAULT_STARTING_BALANCE,
            save_delay_ms: 5000,
            status_reset_ms: 2500,
            horizon_days: vec![30, 60],
            data_file: None,
        }
    }
}

impl Config {
    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn status_reset(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }

    /// Location of the budget data file for the data directory `base`.
    pub fn data_path(&self, base: &Path) -> PathBuf {
        match &self.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => paths::data_file_in(base),
        }
    }

    fn validate(&self) -> Result<(), CalendarError> {
        if !self.default_starting_balance.is_finite() {
            return Err(CalendarError::Validation(
                "defaultStartingBalance must be a finite number".into(),
            ));
        }
        if let Some(days) = self
            .horizon_days
            .iter()
            .find(|days| !(0..=MAX_HORIZON_DAYS).contains(*days))
        {
            return Err(CalendarError::Validation(format!(
                "horizon days must be between 0 and {MAX_HORIZON_DAYS}, got {days}"
            )));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = paths::config_file_in(&base);
        Self { base, path }
    }

    /// Reads the stored configuration, falling back to defaults when none exists.
    pub fn load(&self) -> Result<Config, CalendarError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file; using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), CalendarError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.save_delay(), Duration::from_secs(5));
        assert_eq!(config.status_reset(), Duration::from_millis(2500));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        let config = Config {
            default_starting_balance: 250.0,
            horizon_days: vec![7, 14, 90],
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert!(manager.path().ends_with("config/config.json"));
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        fs::create_dir_all(manager.path().parent().unwrap()).unwrap();
        fs::write(manager.path(), r#"{ "saveDelayMs": 100 }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.save_delay_ms, 100);
        assert_eq!(config.default_starting_balance, 1000.0);
        assert_eq!(config.horizon_days, vec![30, 60]);
    }

    #[test]
    fn out_of_range_horizons_are_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        for days in [-1, MAX_HORIZON_DAYS + 1, 200_000_000] {
            let config = Config {
                horizon_days: vec![30, days],
                ..Config::default()
            };
            assert!(matches!(
                manager.save(&config),
                Err(CalendarError::Validation(_))
            ));
        }
    }

    #[test]
    fn huge_horizon_in_file_fails_to_load() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        fs::create_dir_all(manager.path().parent().unwrap()).unwrap();
        fs::write(manager.path(), r#"{ "horizonDays": [200000000] }"#).unwrap();
        assert!(matches!(manager.load(), Err(CalendarError::Validation(_))));
    }

    #[test]
    fn data_path_resolves_relative_overrides() {
        let base = PathBuf::from("/data");
        let mut config = Config::default();
        assert_eq!(config.data_path(&base), base.join("budgetcal-data.json"));
        config.data_file = Some(PathBuf::from("alt.json"));
        assert_eq!(config.data_path(&base), base.join("alt.json"));
    }
}
