//! Error types for encoding detection and transcoding.
//!
//! Detection never fails and malformed input is handled by the active
//! [`TranscodePolicy`](crate::TranscodePolicy), so the variants here only cover
//! requests the engine cannot serve at all.

use thiserror::Error;

/// Result type for encoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during encoding operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested encoding label is not in the supported set
    #[error("unsupported encoding '{name}'")]
    UnsupportedEncoding {
        /// The label that failed to resolve
        name: String,
    },

    /// Character cannot be encoded in the target encoding
    #[error("cannot encode character {character:?} at position {position} in {encoding}")]
    Unmappable {
        /// The unmappable character
        character: char,
        /// Byte offset of the character in the source text
        position: usize,
        /// Target encoding name
        encoding: &'static str,
    },

    /// A reference language model was rejected while loading
    #[error("invalid reference model: {0}")]
    InvalidModel(String),

    /// JSON (de)serialization failed
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new unsupported-encoding error
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedEncoding { name: name.into() }
    }

    /// Creates a new invalid-model error
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }
}
