use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    chart::NARROW_BREAKPOINT_PX,
    errors::{Result, TrackerError},
    storage::{
        json_backend::{tmp_path, write_atomic},
        EXPENSES_KEY,
    },
    utils::{app_data_dir, config_file_in},
};

const DEFAULT_QUIET_WINDOW_MS: u64 = 250;
const DATA_DIR: &str = "data";

/// Tunables for storage location, resize debouncing, and chart breakpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_storage_key")]
    pub storage_key: String,
    #[serde(default = "Config::default_quiet_window_ms")]
    pub resize_quiet_window_ms: u64,
    #[serde(default = "Config::default_breakpoint_px")]
    pub narrow_breakpoint_px: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding the persisted slots. Defaults to `<app dir>/data`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: Self::default_storage_key(),
            resize_quiet_window_ms: Self::default_quiet_window_ms(),
            narrow_breakpoint_px: Self::default_breakpoint_px(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_storage_key() -> String {
        EXPENSES_KEY.into()
    }

    pub fn default_quiet_window_ms() -> u64 {
        DEFAULT_QUIET_WINDOW_MS
    }

    pub fn default_breakpoint_px() -> u32 {
        NARROW_BREAKPOINT_PX
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| base.join(DATA_DIR))
    }

    pub fn quiet_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.resize_quiet_window_ms.min(i64::MAX as u64) as i64)
    }
}

/// Loads and saves [`Config`] as JSON inside the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at `$EXPENSE_CORE_HOME` or `~/.expense_core`.
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| TrackerError::Config(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.resolve_data_dir(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.storage_key, "expenses_v1");
        assert_eq!(cfg.resize_quiet_window_ms, 250);
        assert_eq!(cfg.narrow_breakpoint_px, 576);
        assert_eq!(cfg.quiet_window(), chrono::Duration::milliseconds(250));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"resize_quiet_window_ms": 100}"#).unwrap();
        assert_eq!(cfg.resize_quiet_window_ms, 100);
        assert_eq!(cfg.storage_key, "expenses_v1");
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().join("home")).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());

        let cfg = Config {
            resize_quiet_window_ms: 400,
            narrow_breakpoint_px: 640,
            data_dir: Some(temp.path().join("elsewhere")),
            ..Config::default()
        };
        manager.save(&cfg).unwrap();

        assert_eq!(manager.load().unwrap(), cfg);
        assert_eq!(manager.data_dir(&cfg), temp.path().join("elsewhere"));
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "not json").unwrap();

        assert!(matches!(manager.load(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn data_dir_defaults_under_base() {
        let cfg = Config::default();
        assert_eq!(
            cfg.resolve_data_dir(Path::new("/tmp/app")),
            PathBuf::from("/tmp/app/data")
        );
    }
}
