//! Persisted document schemas.
//! - `document` defines what a store needs from a schema and the shallow default-fill.
//! - `user_config` and `timer_data` are the two documents the application keeps on disk.

pub mod errors;
pub mod document;
pub mod user_config;
pub mod timer_data;

pub use document::{decode_document, encode_document, fill_defaults, Document, StorageRoot};
pub use timer_data::{PomodoroState, Task, TimerData};
pub use user_config::{Theme, UserConfig};
