//! Error types for layer synchronization

use thiserror::Error;

/// Failure reported by a [`MapEngine`](crate::engine::MapEngine) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced to the host by the layer controller.
///
/// Engine failures are never retried or swallowed; they come back tagged with
/// the engine call that produced them.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum LayerError {
    #[error("engine call `{call}` failed: {source}")]
    Engine {
        call: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("source not found: {0}")]
    MissingSource(String),

    #[error("layer is already mounted")]
    AlreadyMounted,

    #[error("layer is not mounted")]
    NotMounted,

    #[error("invalid layer config: {0}")]
    Config(String),
}

impl LayerError {
    pub(crate) fn engine(call: &'static str) -> impl FnOnce(EngineError) -> LayerError {
        move |source| LayerError::Engine { call, source }
    }
}

impl From<serde_json::Error> for LayerError {
    fn from(err: serde_json::Error) -> Self {
        LayerError::Config(err.to_string())
    }
}
