use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use configs::PersistenceConfig;
use models::{decode_document, encode_document, Document, StorageRoot};
use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::storage::cell::{CellSubscriber, ObservableCell};
use crate::storage::fs::FileSystem;
use crate::storage::pending::PendingWrite;
use crate::storage::retry::{retry_with_policy, RetryPolicy};

/// Timing and failure policy for one store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Quiet period after the last mutation before the document is written.
    pub debounce: Duration,
    pub retry: RetryPolicy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(500), retry: RetryPolicy::default() }
    }
}

impl StoreSettings {
    pub fn from_config(cfg: &PersistenceConfig) -> Self {
        Self { debounce: cfg.debounce(), retry: RetryPolicy::from_config(&cfg.retry) }
    }
}

struct WriteState<T> {
    pending: PendingWrite<T>,
    /// Cell revisions up to here were settled by a flush or a reload and are
    /// never written by the debouncer.
    flushed_through: u64,
    /// Last value read from or written to the file.
    last_persisted: Option<T>,
}

struct StoreInner<T> {
    dir: PathBuf,
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    settings: StoreSettings,
    // guards the pending write and every file operation of this store
    state: Mutex<WriteState<T>>,
    completed_writes: AtomicU64,
    failed_writes: AtomicU64,
}

/// One JSON document bound to one file, mirrored in an [`ObservableCell`].
///
/// Opening loads the file (creating it with defaults when absent) and starts a
/// background task that subscribes to the cell. Each mutation restarts the
/// debounce timer; only the value present when the timer fires is written.
/// [`flush_now`](Self::flush_now) writes immediately and cancels the timer.
///
/// Persistence failures never reach consumers: loads degrade to defaults and
/// failed writes are logged, counted and leave the cell untouched.
#[derive(Clone)]
pub struct PersistentStore<T: Document> {
    inner: Arc<StoreInner<T>>,
    cell: ObservableCell<T>,
}

impl<T: Document> PersistentStore<T> {
    /// Open the store for `T` inside `dir`. Must be called inside a tokio runtime.
    pub async fn open(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, settings: StoreSettings) -> Self {
        let dir = dir.into();
        let path = dir.join(T::FILE_NAME);
        let inner = Arc::new(StoreInner {
            dir,
            path,
            fs,
            settings,
            state: Mutex::new(WriteState { pending: PendingWrite::Idle, flushed_through: 0, last_persisted: None }),
            completed_writes: AtomicU64::new(0),
            failed_writes: AtomicU64::new(0),
        });

        // seeded with defaults so the cell never holds an unset value
        let cell = ObservableCell::new(T::default());
        cell.set(inner.load().await);

        tokio::spawn(run_writer(Arc::clone(&inner), cell.subscribe()));
        info!(store = T::FILE_NAME, root = %T::ROOT, path = %inner.path.display(), "store opened");

        Self { inner, cell }
    }

    /// Read the document from disk. Never fails: any problem is logged and
    /// the default document is returned. A missing file is created with defaults.
    pub async fn load(&self) -> T {
        self.inner.load().await
    }

    /// Load again and publish the result into the cell.
    ///
    /// The file wins: a pending debounced write is dropped and the published
    /// value is not written back, so a corrupt file stays on disk.
    pub async fn reload(&self) -> T {
        let mut state = self.inner.state.lock().await;
        let doc = self.inner.load_locked(&mut state).await;
        if state.pending.cancel().is_some() {
            debug!(store = T::FILE_NAME, "pending write dropped by reload");
        }
        let revision = self.cell.set(doc.clone());
        state.flushed_through = state.flushed_through.max(revision);
        doc
    }

    /// Handle to the shared cell.
    pub fn observe(&self) -> ObservableCell<T> {
        self.cell.clone()
    }

    /// Write `value` now, cancelling any pending debounced write.
    ///
    /// Cell changes made before this call are treated as superseded by
    /// `value` and will not be written later by the debouncer. The error is
    /// returned for reporting only; it has already been logged.
    pub async fn flush_now(&self, value: T) -> Result<(), StoreError> {
        let revision = self.cell.revision();
        self.inner.flush(value, revision).await
    }

    /// Flush the cell's current value.
    pub async fn flush_current(&self) -> Result<(), StoreError> {
        let (revision, value) = self.cell.snapshot();
        self.inner.flush(value, revision).await
    }

    pub async fn has_pending_write(&self) -> bool {
        self.inner.state.lock().await.pending.is_pending()
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn root(&self) -> StorageRoot {
        T::ROOT
    }

    pub fn completed_writes(&self) -> u64 {
        self.inner.completed_writes.load(Ordering::Relaxed)
    }

    /// Writes that were given up on after exhausting the retry policy.
    pub fn failed_writes(&self) -> u64 {
        self.inner.failed_writes.load(Ordering::Relaxed)
    }
}

impl<T: Document> StoreInner<T> {
    async fn load(&self) -> T {
        let mut state = self.state.lock().await;
        self.load_locked(&mut state).await
    }

    async fn load_locked(&self, state: &mut WriteState<T>) -> T {
        match self.try_load().await {
            Ok(doc) => {
                state.last_persisted = Some(doc.clone());
                doc
            }
            Err(e) => {
                state.last_persisted = None;
                warn!(store = T::FILE_NAME, path = %self.path.display(), error = %e, "could not load document; using defaults");
                T::default()
            }
        }
    }

    async fn try_load(&self) -> Result<T, StoreError> {
        self.fs.create_dir_all(&self.dir).await.map_err(|source| StoreError::io(&self.dir, source))?;

        let exists = self.fs.exists(&self.path).await.map_err(|source| StoreError::io(&self.path, source))?;
        if !exists {
            info!(store = T::FILE_NAME, path = %self.path.display(), "document not found; writing defaults");
            let doc = T::default();
            self.write_text(&encode_document(&doc)?).await?;
            return Ok(doc);
        }

        let raw = self.fs.read_to_string(&self.path).await.map_err(|source| StoreError::io(&self.path, source))?;
        Ok(decode_document(&raw)?)
    }

    async fn schedule(&self, revision: u64, value: T) {
        let mut state = self.state.lock().await;
        if revision <= state.flushed_through {
            debug!(store = T::FILE_NAME, revision, "change already flushed");
            return;
        }
        if !state.pending.is_pending() && state.last_persisted.as_ref() == Some(&value) {
            debug!(store = T::FILE_NAME, revision, "value matches file; write skipped");
            return;
        }
        let coalesced = state.pending.schedule(value, Instant::now() + self.settings.debounce);
        debug!(store = T::FILE_NAME, revision, coalesced, "write scheduled");
    }

    async fn write_due(&self) {
        let mut state = self.state.lock().await;
        if let Some(value) = state.pending.take_due(Instant::now()) {
            if self.persist(&value).await.is_ok() {
                state.last_persisted = Some(value);
            }
        }
    }

    async fn flush(&self, value: T, revision: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.pending.cancel().is_some() {
            debug!(store = T::FILE_NAME, "pending write cancelled by flush");
        }
        self.persist(&value).await?;
        state.flushed_through = state.flushed_through.max(revision);
        state.last_persisted = Some(value);
        info!(store = T::FILE_NAME, path = %self.path.display(), "document flushed");
        Ok(())
    }

    /// Write whatever is pending once the cell is gone.
    async fn drain(&self) {
        let mut state = self.state.lock().await;
        if let Some(value) = state.pending.cancel() {
            debug!(store = T::FILE_NAME, "cell closed; writing pending value");
            if self.persist(&value).await.is_ok() {
                state.last_persisted = Some(value);
            }
        }
    }

    // callers hold `state`
    async fn persist(&self, doc: &T) -> Result<(), StoreError> {
        let result = match encode_document(doc) {
            Ok(body) => retry_with_policy(&self.settings.retry, || self.write_text(&body)).await,
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(()) => {
                self.completed_writes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                let failed = self.failed_writes.fetch_add(1, Ordering::Relaxed) + 1;
                error!(
                    store = T::FILE_NAME,
                    path = %self.path.display(),
                    error = %e,
                    failed,
                    "document write failed; keeping in-memory value"
                );
            }
        }
        result
    }

    async fn write_text(&self, body: &str) -> Result<(), StoreError> {
        self.fs.write_text(&self.path, body).await.map_err(|source| StoreError::io(&self.path, source))
    }
}

async fn run_writer<T: Document>(inner: Arc<StoreInner<T>>, mut cell: CellSubscriber<T>) {
    loop {
        let deadline = inner.state.lock().await.pending.deadline();
        tokio::select! {
            changed = cell.changed() => {
                if changed.is_err() {
                    inner.drain().await;
                    break;
                }
                let (revision, value) = cell.latest();
                inner.schedule(revision, value).await;
            }
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                inner.write_due().await;
            }
        }
    }
    debug!(store = T::FILE_NAME, "writer stopped");
}
