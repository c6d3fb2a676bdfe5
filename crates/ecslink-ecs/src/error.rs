//! ECS payload error types.

use thiserror::Error;

/// Errors from decoding an ECS payload.
#[derive(Debug, Error)]
pub enum EcsError {
    /// The payload did not match the expected shape.
    #[error("invalid ECS payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for EcsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<bson::de::Error> for EcsError {
    fn from(e: bson::de::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
