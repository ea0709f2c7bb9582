#![cfg(test)]
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::storage::fs::FileSystem;

/// One successful write, stamped with the (possibly paused) tokio clock.
#[derive(Debug, Clone)]
pub struct WriteRecord {
    pub path: PathBuf,
    pub contents: String,
    pub at: Instant,
}

/// In-memory filesystem that records writes and can be told to fail.
#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<HashSet<PathBuf>>,
    writes: Mutex<Vec<WriteRecord>>,
    failing_writes: AtomicU32,
    failing_dirs: AtomicBool,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.lock().unwrap().insert(parent.to_path_buf());
        }
        self.files.lock().unwrap().insert(path, contents.to_string());
        self
    }

    /// Fail the next `n` writes.
    pub fn fail_next_writes(&self, n: u32) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    pub fn fail_dir_creation(&self, fail: bool) {
        self.failing_dirs.store(fail, Ordering::SeqCst);
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().unwrap().clone()
    }

    pub fn writes_to(&self, path: &Path) -> Vec<WriteRecord> {
        self.writes().into_iter().filter(|w| w.path == path).collect()
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path) || self.dirs.lock().unwrap().contains(path))
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.failing_dirs.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only root"));
        }
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.file(path).ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    async fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        self.writes.lock().unwrap().push(WriteRecord {
            path: path.to_path_buf(),
            contents: contents.to_string(),
            at: Instant::now(),
        });
        Ok(())
    }
}
