//! Path management for Swipeify
//!
//! This module manages the filesystem paths used by the server.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Parent directory of config folder
    config_parent: PathBuf,
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    /// Get the global paths instance
    pub fn get() -> Result<Arc<Paths>> {
        PATHS.get().map(Arc::clone).context("Paths not initialized")
    }

    pub(crate) fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let config_parent = if let Some(ref path) = config_override {
            path.clone()
        } else {
            directories::ProjectDirs::from("", "", "swipeify")
                .map(|dirs| {
                    dirs.config_dir()
                        .parent()
                        .unwrap_or(Path::new("."))
                        .to_path_buf()
                })
                .unwrap_or_else(|| PathBuf::from("."))
        };

        // dot-prefixed when living directly in the home directory
        let config_dir_name = if is_home_dir(&config_parent) {
            ".swipeify"
        } else {
            "swipeify"
        };

        let config_dir = config_parent.join(config_dir_name);

        let paths = Self {
            config_parent,
            config_dir,
        };

        std::fs::create_dir_all(&paths.config_dir).with_context(|| {
            format!(
                "Failed to create config directory {}",
                paths.config_dir.display()
            )
        })?;

        Ok(paths)
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the config parent directory
    pub fn config_parent(&self) -> &Path {
        &self.config_parent
    }

    /// Get the database path
    pub fn app_db_path(&self) -> PathBuf {
        self.config_dir.join("swipeify.db")
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Check if a path is exactly the user's home directory
fn is_home_dir(path: &Path) -> bool {
    directories::UserDirs::new()
        .map(|dirs| path == dirs.home_dir())
        .unwrap_or(false)
}
