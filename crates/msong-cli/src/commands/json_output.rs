//! Structured JSON output for `--json` mode.
//!
//! Every command prints one pretty-printed object with a `success` flag, a
//! list of [`JsonError`]s, and a command-specific `result`.

use anyhow::{Context, Result};
use msong_chain::{BackendError, ChainError};
use serde::{Deserialize, Serialize};

/// Stable CLI error codes.
pub mod error_codes {
    /// A configuration or checkpoint could not be loaded.
    pub const CONFIG_LOAD: &str = "CLI_001";
    /// A digest argument could not be parsed.
    pub const INVALID_DIGEST: &str = "CLI_002";
    /// The run failed before completing.
    pub const GENERATION: &str = "CLI_003";
    /// Regenerated artifacts differ from the files on disk.
    pub const ARTIFACT_MISMATCH: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "CHAIN_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Token index the run failed at (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_index: Option<u32>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            token_index: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the failing token index.
    pub fn with_token_index(mut self, index: u32) -> Self {
        self.token_index = Some(index);
        self
    }

    /// Converts a command error, preferring the chain error's own code.
    pub fn from_error(err: &anyhow::Error, fallback_code: &str) -> Self {
        match err.downcast_ref::<ChainError>() {
            Some(chain) => {
                let json = JsonError::new(chain.code(), format!("{:#}", err));
                match chain.token_index() {
                    Some(index) => json.with_token_index(index),
                    None => json,
                }
            }
            None => JsonError::new(fallback_code, format!("{:#}", err)),
        }
    }
}

/// JSON envelope shared by all commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput<T> {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> CommandOutput<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// A result that was produced but did not pass (e.g., a verify mismatch).
    pub fn rejected(result: T, errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: Some(result),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{}", json);
    Ok(())
}
