//! Error types for seed-chain runs.

use thiserror::Error;

/// Common trait for errors raised by oracle backends.
///
/// Each backend error type implements this trait so that failures can be
/// reported uniformly, whichever oracle produced them:
/// - Stable error codes for programmatic handling
/// - Human-readable messages
/// - Wrapping into [`OracleError`] without the core depending on backends
///
/// # Example
///
/// ```ignore
/// use msong_chain::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Stable code such as "REFERENCE_001".
    fn code(&self) -> &'static str;

    /// Human-readable message; defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Category used to group related errors, e.g. "reference" or "chain".
    fn category(&self) -> &'static str;
}

/// An error returned by a beat oracle.
///
/// Captures the code, message, and category from any [`BackendError`]
/// implementor so that the core can carry oracle failures without knowing
/// the backend's concrete error type.
#[derive(Debug)]
pub struct OracleError {
    /// The error code (e.g., "REFERENCE_001", "STUB_001").
    pub code: &'static str,
    /// The human-readable error message.
    pub message: String,
    /// The error category.
    pub category: &'static str,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl OracleError {
    /// Wraps a backend error.
    pub fn from_backend<E: BackendError + Send + Sync + 'static>(err: E) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            category: err.category(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates an oracle error without an underlying backend error
    /// (e.g., a stub oracle or a transport timeout).
    pub fn new(code: &'static str, message: impl Into<String>, category: &'static str) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            source: None,
        }
    }
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Top-level error type for seed-chain operations.
///
/// Every variant raised inside the token loop aborts the run: a skipped token
/// would desynchronize the running note digest from any replay.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The oracle call for a token failed or timed out.
    #[error("oracle failed at token index {index}: {source}")]
    OracleFailure {
        /// Index of the token whose oracle call failed.
        index: u32,
        #[source]
        source: OracleError,
    },

    /// A digest did not reduce to exactly 32 bytes.
    #[error("malformed digest input: {0}")]
    MalformedDigestInput(String),

    /// The configured vocabulary differs from the fixed word list.
    #[error("vocabulary mismatch: {0}")]
    VocabularyMismatch(String),

    /// The oracle's notation fragment disagrees with its beat.
    #[error("notation mismatch at token index {index}: expected {expected:?}, oracle returned {actual:?}")]
    NotationMismatch {
        index: u32,
        expected: String,
        actual: String,
    },

    /// The run configuration is unusable.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    /// A checkpoint failed validation against the run configuration.
    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// The run was stepped after an earlier error or after its last token.
    #[error("run cannot advance: {0}")]
    RunState(String),

    /// An artifact could not be finalized or written.
    #[error("failed to serialize {artifact}: {source}")]
    SerializationFailure {
        /// Artifact file name or description.
        artifact: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration or checkpoint file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ChainError {
    /// Builds a serialization failure for the named artifact.
    pub fn serialization(
        artifact: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ChainError::SerializationFailure {
            artifact: artifact.into(),
            source: source.into(),
        }
    }

    /// Index of the token that failed, if the error is tied to one.
    pub fn token_index(&self) -> Option<u32> {
        match self {
            ChainError::OracleFailure { index, .. } | ChainError::NotationMismatch { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

impl BackendError for ChainError {
    fn code(&self) -> &'static str {
        match self {
            ChainError::OracleFailure { .. } => "CHAIN_001",
            ChainError::MalformedDigestInput(_) => "CHAIN_002",
            ChainError::VocabularyMismatch(_) => "CHAIN_003",
            ChainError::SerializationFailure { .. } => "CHAIN_004",
            ChainError::NotationMismatch { .. } => "CHAIN_005",
            ChainError::InvalidConfig(_) => "CHAIN_006",
            ChainError::InvalidCheckpoint(_) => "CHAIN_007",
            ChainError::RunState(_) => "CHAIN_008",
            ChainError::Read { .. } => "CHAIN_009",
            ChainError::JsonParse(_) => "CHAIN_010",
        }
    }

    fn category(&self) -> &'static str {
        "chain"
    }
}
