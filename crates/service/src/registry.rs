use std::sync::Arc;

use common::env::RootDirs;
use configs::AppConfig;
use models::{Document, TimerData, UserConfig};
use tracing::{info, warn};

use crate::errors::StoreError;
use crate::runtime::{dir_for, root_dirs, store_settings};
use crate::storage::cell::ObservableCell;
use crate::storage::fs::{FileSystem, TokioFs};
use crate::storage::persistent_store::{PersistentStore, StoreSettings};

/// Outcome of [`StoreRegistry::flush_all`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub flushed: usize,
    pub failed: usize,
}

impl FlushReport {
    fn record(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.flushed += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Application context owning one store per persisted document.
///
/// Built once at startup and handed to whatever needs the documents; the
/// exit path calls [`flush_all`](Self::flush_all).
#[derive(Clone)]
pub struct StoreRegistry {
    config: PersistentStore<UserConfig>,
    data: PersistentStore<TimerData>,
}

impl StoreRegistry {
    pub async fn open(dirs: &RootDirs, fs: Arc<dyn FileSystem>, settings: StoreSettings) -> Self {
        let (config, data) = tokio::join!(
            open_store::<UserConfig>(dirs, &fs, &settings),
            open_store::<TimerData>(dirs, &fs, &settings)
        );
        Self { config, data }
    }

    /// Open on the local disk with directories and timing from `cfg`.
    pub async fn from_config(cfg: &AppConfig) -> Self {
        Self::open(&root_dirs(&cfg.storage), Arc::new(TokioFs), store_settings(cfg)).await
    }

    pub fn config(&self) -> ObservableCell<UserConfig> {
        self.config.observe()
    }

    pub fn data(&self) -> ObservableCell<TimerData> {
        self.data.observe()
    }

    pub fn config_store(&self) -> &PersistentStore<UserConfig> {
        &self.config
    }

    pub fn data_store(&self) -> &PersistentStore<TimerData> {
        &self.data
    }

    /// Pre-exit hook: write every document's current value now. Failures are
    /// already logged by the stores and only counted here.
    pub async fn flush_all(&self) -> FlushReport {
        let mut report = FlushReport::default();
        report.record(self.config.flush_current().await);
        report.record(self.data.flush_current().await);
        if report.failed > 0 {
            warn!(flushed = report.flushed, failed = report.failed, "some documents could not be flushed");
        } else {
            info!(flushed = report.flushed, "all documents flushed");
        }
        report
    }
}

async fn open_store<T: Document>(dirs: &RootDirs, fs: &Arc<dyn FileSystem>, settings: &StoreSettings) -> PersistentStore<T> {
    PersistentStore::open(dir_for(dirs, T::ROOT), Arc::clone(fs), settings.clone()).await
}
