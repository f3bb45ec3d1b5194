//! Application paths and environment configuration.
//!
//! Everything Resuma writes lives under one data directory:
//!   Linux:   ~/.local/share/com.resuma.desktop/
//!   macOS:   ~/Library/Application Support/com.resuma.desktop/
//!   Windows: %APPDATA%/com.resuma.desktop/
//!
//! `RESUMA_DATA_DIR` overrides the location (useful for portable installs
//! and tests). `.env` files are honoured via dotenvy at startup.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Bundle identifier, also the data directory name.
pub const APP_ID: &str = "com.resuma.desktop";

pub const DATA_DIR_ENV: &str = "RESUMA_DATA_DIR";
pub const MODEL_CATALOG_ENV: &str = "RESUMA_MODEL_CATALOG";
pub const RUNTIME_CATALOG_ENV: &str = "RESUMA_RUNTIME_CATALOG";

const SETTINGS_FILE: &str = "settings.resuma";

/// Resolved on-disk layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// Root the layout at an explicit directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve from `RESUMA_DATA_DIR`, falling back to the platform data dir.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }
        dirs::data_dir()
            .map(|base| Self::new(base.join(APP_ID)))
            .ok_or(Error::NoDataDir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }

    pub fn runtimes_dir(&self) -> PathBuf {
        self.data_dir.join("runtimes")
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.data_dir.join("resumes")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

/// Load `.env` if present. Missing files are not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring malformed .env: {}", e),
    }
}

/// Catalog file override from the environment, if set.
pub fn catalog_override(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_at_data_dir() {
        let paths = AppPaths::new("/data/resuma");
        assert_eq!(paths.models_dir(), PathBuf::from("/data/resuma/models"));
        assert_eq!(paths.runtimes_dir(), PathBuf::from("/data/resuma/runtimes"));
        assert_eq!(paths.resumes_dir(), PathBuf::from("/data/resuma/resumes"));
        assert_eq!(
            paths.settings_file(),
            PathBuf::from("/data/resuma/settings.resuma")
        );
    }

    #[test]
    fn unset_catalog_override_is_none() {
        assert!(catalog_override("RESUMA_TEST_UNSET_CATALOG_VAR").is_none());
    }
}
