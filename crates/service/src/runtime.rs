//! Runtime environment helpers
//!
//! Thin mapping from `configs::AppConfig` onto store settings and directories,
//! so binaries can open a registry without depending on `common` directly.

use std::path::Path;

use common::env::RootDirs;
use configs::{AppConfig, StorageConfig};
use models::StorageRoot;

use crate::storage::persistent_store::StoreSettings;

/// Resolve the config and data directories for `storage`.
pub fn root_dirs(storage: &StorageConfig) -> RootDirs {
    RootDirs::resolve(&storage.app_name, storage.config_dir.clone(), storage.data_dir.clone())
}

pub fn store_settings(cfg: &AppConfig) -> StoreSettings {
    StoreSettings::from_config(&cfg.persistence)
}

/// Directory a document bound to `root` lives in.
pub fn dir_for(dirs: &RootDirs, root: StorageRoot) -> &Path {
    match root {
        StorageRoot::AppConfig => &dirs.config,
        StorageRoot::AppData => &dirs.data,
    }
}
