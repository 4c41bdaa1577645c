//! Where the reader keeps its writable data and where it finds the bundled
//! assets.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bible-hymnal";
/// Environment variable overriding the assets directory.
pub const ASSETS_ENV: &str = "BIBLE_HYMNAL_ASSETS";
/// Assets directory used when the override is unset, relative to the working
/// directory.
const DEFAULT_ASSETS_DIR: &str = "assets";
const PREFERENCES_FILE_NAME: &str = "preferences.sqlite";
const LOG_FILE_NAME: &str = "bible-hymnal.log";

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
    assets_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Resolve the data directory inside the user's home and the assets
    /// directory from `BIBLE_HYMNAL_ASSETS` or `./assets`.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let assets_dir = env::var_os(ASSETS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));
        Ok(Self::new(
            base_dirs.home_dir().join(DATA_DIR_NAME),
            assets_dir,
        ))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn databases_dir(&self) -> PathBuf {
        self.data_dir.join("databases")
    }

    pub fn bundled_databases_dir(&self) -> PathBuf {
        self.assets_dir.join("databases")
    }

    pub fn seed_dir(&self) -> PathBuf {
        self.assets_dir.join("bible")
    }

    pub fn hymnal_file(&self) -> PathBuf {
        self.assets_dir.join("hymnal").join("hymns.json")
    }

    pub fn scores_dir(&self) -> PathBuf {
        self.assets_dir.join("scores")
    }

    pub fn music_dir(&self) -> PathBuf {
        self.assets_dir.join("music")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}
