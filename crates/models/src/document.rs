use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::ModelError;

/// Base directory category a document lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageRoot {
    /// Per-application configuration directory.
    AppConfig,
    /// Per-application data directory.
    AppData,
}

impl fmt::Display for StorageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRoot::AppConfig => f.write_str("app-config"),
            StorageRoot::AppData => f.write_str("app-data"),
        }
    }
}

/// A JSON document persisted by a store.
///
/// `Default` is the compiled-in document: it is written on first run, used as
/// the fallback when the file cannot be read, and is the source of per-field
/// defaults when an older file lacks fields.
pub trait Document:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// File name inside the storage root, e.g. `config.json`.
    const FILE_NAME: &'static str;

    /// Root the file is bound to.
    const ROOT: StorageRoot;

    /// Repair values that parse but break the schema's invariants.
    fn normalize(&mut self) {}
}

/// Fill every top-level field of `loaded` that is missing or `null` with the
/// matching field of `defaults`. Nested values are left untouched.
///
/// Returns how many fields were filled. Non-object inputs are left as they are.
pub fn fill_defaults(loaded: &mut Value, defaults: &Value) -> usize {
    let (Some(target), Some(defaults)) = (loaded.as_object_mut(), defaults.as_object()) else {
        return 0;
    };
    let mut filled = 0;
    for (key, default) in defaults {
        match target.get(key) {
            None => {
                target.insert(key.clone(), default.clone());
                filled += 1;
            }
            Some(Value::Null) if !default.is_null() => {
                target.insert(key.clone(), default.clone());
                filled += 1;
            }
            Some(_) => {}
        }
    }
    filled
}

/// Parse raw file contents into a fully populated document.
pub fn decode_document<T: Document>(raw: &str) -> Result<T, ModelError> {
    let mut value: Value = serde_json::from_str(raw).map_err(ModelError::Parse)?;
    let defaults = serde_json::to_value(T::default()).map_err(ModelError::Serialize)?;
    let filled = fill_defaults(&mut value, &defaults);
    if filled > 0 {
        debug!(document = T::FILE_NAME, filled, "filled missing fields with defaults");
    }
    let mut doc: T = serde_json::from_value(value).map_err(ModelError::Parse)?;
    doc.normalize();
    Ok(doc)
}

/// Serialize a document the way it is stored on disk (2-space pretty JSON).
pub fn encode_document<T: Document>(doc: &T) -> Result<String, ModelError> {
    serde_json::to_string_pretty(doc).map_err(ModelError::Serialize)
}
