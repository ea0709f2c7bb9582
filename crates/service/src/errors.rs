use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document error: {0}")]
    Document(#[from] models::errors::ModelError),
}

impl StoreError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    /// I/O failures may be transient; a document that cannot be encoded never will be.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
