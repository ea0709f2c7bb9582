use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
