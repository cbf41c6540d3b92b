//! Error types for the reference oracle.

use msong_chain::BackendError;
use thiserror::Error;

/// Errors raised by [`ReferenceOracle`](crate::ReferenceOracle).
#[derive(Debug, Error)]
pub enum ReferenceOracleError {
    /// The beat index exceeds the replay limit.
    #[error("beat index {index} exceeds the replay limit of {limit}")]
    BeatIndexOutOfRange { index: u32, limit: u32 },
}

impl BackendError for ReferenceOracleError {
    fn code(&self) -> &'static str {
        match self {
            ReferenceOracleError::BeatIndexOutOfRange { .. } => "REFERENCE_001",
        }
    }

    fn category(&self) -> &'static str {
        "reference"
    }
}
