use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::system::ColorSchemeSource;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub page: PageConfig,
    pub behavior: BehaviorConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the persisted preference.
    pub path: PathBuf,
}

/// Which parts of the toggle control the page carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub toggle: bool,
    pub sun_icon: bool,
    pub moon_icon: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Also re-sync the icons when an OS color-scheme change is applied.
    pub sync_icons_on_os_change: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub color_scheme: ColorSchemeSource,
    /// How often `auto` asks the OS again while running.
    pub poll_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "themeswitch", "themeswitch");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("themeswitch"));
        Self {
            path: data_dir.join("preferences.sqlite3"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorSchemeSource::Auto,
            poll_interval_ms: 1000,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            toggle: true,
            sun_icon: true,
            moon_icon: true,
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "themeswitch", "themeswitch")
        .context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = Config::default();
        save(&cfg, Some(&path)).context("write default config")?;
        tracing::debug!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
