//! Persistence layer keeping JSON documents and their in-memory cells in sync.
//! - `storage` holds the generic debounced store and its building blocks.
//! - `registry` owns one store per document and the exit-time flush.
//! - `runtime` maps runtime configuration onto store settings and directories.

pub mod errors;
pub mod storage;
pub mod registry;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use errors::StoreError;
pub use registry::{FlushReport, StoreRegistry};
pub use storage::{
    cell::{CellSubscriber, ObservableCell},
    fs::{FileSystem, TokioFs},
    persistent_store::{PersistentStore, StoreSettings},
    retry::RetryPolicy,
};
