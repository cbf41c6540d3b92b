//! Run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::hash::{collection_salt, Digest};
use crate::seed::AuxDigestPolicy;
use crate::words::{default_vocabulary, validate_vocabulary};

/// Collection phrase used when none is configured.
pub const DEFAULT_COLLECTION_PHRASE: &str = "half the battle's just gettin outta bed";
pub const DEFAULT_START_YEAR: u32 = 2026;
pub const DEFAULT_NUM_TOKENS: u32 = 1000;
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 100;

/// Parameters of one run.
///
/// Every field has a default, so `{}` is a complete configuration for the
/// canonical 1000-token collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Phrase hashed into the collection salt.
    pub collection_phrase: String,
    /// Reveal year of token 0.
    pub start_year: u32,
    /// Number of tokens N (at least 1).
    pub num_tokens: u32,
    /// Word list; must equal the fixed vocabulary in length and order.
    pub vocabulary: Vec<String>,
    /// Source of the fifth seed field.
    pub aux_digest: AuxDigestPolicy,
    /// Fail the run when an oracle fragment disagrees with its beat.
    pub verify_notation: bool,
    /// Tokens between `info`-level progress events.
    pub progress_interval: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            collection_phrase: DEFAULT_COLLECTION_PHRASE.to_string(),
            start_year: DEFAULT_START_YEAR,
            num_tokens: DEFAULT_NUM_TOKENS,
            vocabulary: default_vocabulary(),
            aux_digest: AuxDigestPolicy::default(),
            verify_notation: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl RunConfig {
    /// Default configuration with a different phrase and token count.
    pub fn new(collection_phrase: impl Into<String>, num_tokens: u32) -> Self {
        Self {
            collection_phrase: collection_phrase.into(),
            num_tokens,
            ..Self::default()
        }
    }

    /// Sets the start year.
    pub fn with_start_year(mut self, start_year: u32) -> Self {
        self.start_year = start_year;
        self
    }

    /// Sets the auxiliary digest policy.
    pub fn with_aux_digest(mut self, policy: AuxDigestPolicy) -> Self {
        self.aux_digest = policy;
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ChainError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ChainError> {
        let json = std::fs::read_to_string(path).map_err(|source| ChainError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks the configuration before any token is processed.
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_vocabulary(&self.vocabulary)?;

        if self.num_tokens == 0 {
            return Err(ChainError::InvalidConfig(
                "num_tokens must be at least 1".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(ChainError::InvalidConfig(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        if self.start_year.checked_add(self.num_tokens - 1).is_none() {
            return Err(ChainError::InvalidConfig(format!(
                "reveal year overflows: start_year {} with {} tokens",
                self.start_year, self.num_tokens
            )));
        }

        Ok(())
    }

    /// `keccak256(collection_phrase)`.
    pub fn collection_salt(&self) -> Digest {
        collection_salt(&self.collection_phrase)
    }

    /// Reveal year of the last token.
    pub fn end_year(&self) -> u32 {
        self.start_year
            .saturating_add(self.num_tokens.saturating_sub(1))
    }
}
