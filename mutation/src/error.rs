//! Mutation error types.

use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur while building mutation instructions.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Cannot serialize value for column {column}: {message}")]
    Serialize { column: String, message: String },

    #[error("Encoder failed: {message}")]
    Encode { message: String },

    #[error("Cannot decode serialized value: {message}")]
    Decode { message: String },

    #[error("Transform failed: {message}")]
    Transform { message: String },
}

impl MutationError {
    pub fn serialize(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Error for a transform that decided the row cannot be mutated.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }
}
