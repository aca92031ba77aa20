use thiserror::Error;

/// Unified error type for the mnemo workspace.
///
/// Out-of-range importance, queries with no usable tokens, and unknown ids are
/// absorbed by the memory layer and never surface here.
#[derive(Error, Debug)]
pub enum MnemoError {
    // ── Storage errors ─────────────────────────────────────────
    #[error("storage error: {0}")]
    Storage(String),

    // ── Input errors ───────────────────────────────────────────
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MnemoError {
    /// Wrap any displayable persistence failure as a storage error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        MnemoError::Storage(err.to_string())
    }

    /// Whether this error originated in the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, MnemoError::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, MnemoError>;
