//! Environment/runtime helpers
//!
//! Loads `.env` and resolves the directories documents are stored under.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Load `.env` from the working directory if present, so `RUST_LOG`,
/// `CONFIG_PATH` and the directory overrides take effect.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring unreadable .env"),
    }
}

/// Resolved base directories for the two storage roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirs {
    pub config: PathBuf,
    pub data: PathBuf,
}

impl RootDirs {
    /// Platform directories joined with `app_name`; explicit overrides are used as-is.
    pub fn resolve(app_name: &str, config_override: Option<PathBuf>, data_override: Option<PathBuf>) -> Self {
        let config = config_override.unwrap_or_else(|| platform_dir(dirs::config_dir(), app_name));
        let data = data_override.unwrap_or_else(|| platform_dir(dirs::data_dir(), app_name));
        Self { config, data }
    }

    /// Both roots under one directory, e.g. a test's temp dir.
    pub fn under(base: &Path) -> Self {
        Self { config: base.join("config"), data: base.join("data") }
    }
}

fn platform_dir(base: Option<PathBuf>, app_name: &str) -> PathBuf {
    match base {
        Some(dir) => dir.join(app_name),
        None => {
            warn!(app_name, "no platform directory; using working directory");
            PathBuf::from(".").join(app_name)
        }
    }
}
