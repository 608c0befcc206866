//! Error types for the projection pipeline.

use thiserror::Error;

/// Errors that can occur while projecting registrar events.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to encode {kind} '{id}': {reason}")]
    Encoding {
        kind: &'static str,
        id: String,
        reason: String,
    },

    /// An entity that an earlier flow must have created is absent.
    #[error("Missing {kind} '{id}': expected to exist before this event")]
    MissingEntity { kind: &'static str, id: String },

    #[error("Cannot decode '{schema}' event: {reason}")]
    Decode { schema: String, reason: String },

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

impl IndexerError {
    /// Returns `true` if the error means an upstream ordering or integrity
    /// assumption was broken (the event cannot be projected as delivered).
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::MissingEntity { .. })
    }

    pub(crate) fn decode(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}
