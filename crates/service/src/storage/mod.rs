//! Storage abstractions for the service layer
//!
//! `PersistentStore` binds one document to one file; the other modules are the
//! pieces it is assembled from.

pub mod cell;
pub mod fs;
pub mod pending;
pub mod persistent_store;
pub mod retry;
