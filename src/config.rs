// ⚙️ Configuration - ~/.dexbinder/ and config.toml
// Missing file means defaults; the [filters] table seeds the view.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::FilterSettings;
use crate::transport::ImportMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file override (defaults to ~/.dexbinder/collection.db)
    pub database: Option<PathBuf>,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_level: String,
    /// What a CSV import replaces
    pub import_mode: ImportMode,
    /// Initial filter settings for a session
    pub filters: FilterSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            log_level: "warn".to_string(),
            import_mode: ImportMode::default(),
            filters: FilterSettings::default(),
        }
    }
}

/// Returns the path to the dexbinder home directory (~/.dexbinder)
pub fn dexbinder_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".dexbinder"))
}

pub struct DexbinderPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub db_file: PathBuf,
}

impl DexbinderPaths {
    pub fn new() -> Result<Self> {
        Ok(Self::at(&dexbinder_home()?))
    }

    /// Paths rooted somewhere other than the home directory
    pub fn at(root: &Path) -> Self {
        Self {
            config: root.join("config.toml"),
            db_file: root.join("collection.db"),
            root: root.to_path_buf(),
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root).context("Failed to create dexbinder root")?;
        Ok(())
    }
}

impl Config {
    /// Database file to open, honoring the override
    pub fn database_path(&self, paths: &DexbinderPaths) -> PathBuf {
        self.database.clone().unwrap_or_else(|| paths.db_file.clone())
    }
}

/// Load configuration from a file; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).context("Failed to read config.toml")?;
    toml::from_str(&content).context("Failed to parse config.toml")
}

/// Load configuration from ~/.dexbinder/config.toml
pub fn load_config() -> Result<Config> {
    let paths = DexbinderPaths::new()?;
    load_config_from(&paths.config)
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config.toml")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.import_mode, ImportMode::FullReplace);
        assert!(config.filters.rank_slots_by_rarity);
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "import_mode = \"records-only\"\n\n[filters]\nshow_trainers = false\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.import_mode, ImportMode::RecordsOnly);
        assert!(!config.filters.show_trainers);
        assert!(config.filters.show_owned);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DexbinderPaths::at(dir.path());
        let mut config = Config::default();
        config.database = Some(dir.path().join("other.db"));

        save_config(&config, &paths.config).unwrap();
        let loaded = load_config_from(&paths.config).unwrap();
        assert_eq!(loaded.database_path(&paths), dir.path().join("other.db"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "import_mode = 3").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
