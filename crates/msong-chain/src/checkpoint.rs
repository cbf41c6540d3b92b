//! Resumable run checkpoints.
//!
//! A checkpoint is the run's only persistent state: the next token index, the
//! running note digest, and every completed record (so the output builders can
//! be rebuilt). Loading never trusts the stored digest; it is recomputed from
//! the records and must match.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chain::NoteChain;
use crate::config::RunConfig;
use crate::error::ChainError;
use crate::hash::Digest;
use crate::notation::{beat_fragment, fragments_agree};
use crate::seed::derive_seed;
use crate::token::{TokenOrdinal, TokenRecord};
use crate::words::{select_words_from_digest, seven_words_digest};

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serialized state of a partially completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkpoint {
    pub version: u32,
    pub collection_salt: Digest,
    /// Index of the first token not yet processed.
    pub next_index: u32,
    /// Running note digest after token `next_index - 1`.
    pub running_digest: Digest,
    pub records: Vec<TokenRecord>,
}

impl Checkpoint {
    /// Builds a checkpoint from a run's state.
    pub fn new(collection_salt: Digest, chain: &NoteChain, records: Vec<TokenRecord>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            collection_salt,
            next_index: chain.folded(),
            running_digest: chain.digest(),
            records,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ChainError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reads a checkpoint file. Does not validate it.
    pub fn load(path: &Path) -> Result<Self, ChainError> {
        let json = std::fs::read_to_string(path).map_err(|source| ChainError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json).map_err(|e| ChainError::InvalidCheckpoint(e.to_string()))
    }

    /// Writes the checkpoint atomically: a temporary file in the same
    /// directory is renamed over `path` once fully written.
    pub fn save(&self, path: &Path) -> Result<(), ChainError> {
        let artifact = path.display().to_string();
        let json = self
            .to_json_pretty()
            .map_err(|e| ChainError::serialization(artifact.clone(), e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| ChainError::serialization(artifact.clone(), e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ChainError::serialization(artifact.clone(), e))?;
        tmp.persist(path)
            .map_err(|e| ChainError::serialization(artifact, e.error))?;

        tracing::debug!(path = %path.display(), next_index = self.next_index, "saved checkpoint");
        Ok(())
    }

    /// Checks the checkpoint against the configuration it will resume.
    ///
    /// Every record is re-derived from the configuration: words, auxiliary
    /// digest, prior digest, and seeds must all match what a fresh run would
    /// produce for the same beats. Returns the replayed note chain on success.
    pub fn validate(&self, config: &RunConfig) -> Result<NoteChain, ChainError> {
        let invalid = |msg: String| Err(ChainError::InvalidCheckpoint(msg));

        if self.version != CHECKPOINT_VERSION {
            return invalid(format!(
                "unsupported version {} (expected {})",
                self.version, CHECKPOINT_VERSION
            ));
        }
        if self.collection_salt != config.collection_salt() {
            return invalid(format!(
                "collection salt {} does not match the configured phrase",
                self.collection_salt
            ));
        }
        if self.next_index > config.num_tokens {
            return invalid(format!(
                "next_index {} exceeds num_tokens {}",
                self.next_index, config.num_tokens
            ));
        }
        if self.records.len() != self.next_index as usize {
            return invalid(format!(
                "{} records stored but next_index is {}",
                self.records.len(),
                self.next_index
            ));
        }

        let salt = config.collection_salt();
        let mut chain = NoteChain::new();
        for (i, record) in self.records.iter().enumerate() {
            let index = i as u32;
            let expected = TokenOrdinal::new(index, config.start_year);
            if expected != Some(record.ordinal) {
                return invalid(format!(
                    "record {} has ordinal {:?}, expected {:?}",
                    i, record.ordinal, expected
                ));
            }
            if record.prior_digest != chain.digest() {
                return invalid(format!(
                    "record {} prior digest {} does not match replayed digest {}",
                    i,
                    record.prior_digest,
                    chain.digest()
                ));
            }

            let words_digest = seven_words_digest(record.ordinal.token_id);
            if record.words_digest != words_digest
                || record.seven_words != select_words_from_digest(&words_digest)
            {
                return invalid(format!("record {} words do not match token {}", i, record.ordinal.token_id));
            }

            let aux_digest = config.aux_digest.digest_for(index);
            if record.aux_digest != aux_digest {
                return invalid(format!(
                    "record {} aux digest {} does not match the configured policy ({})",
                    i, record.aux_digest, aux_digest
                ));
            }

            let seed = derive_seed(&salt, record.ordinal.token_id, &words_digest, &chain.digest(), &aux_digest);
            if record.final_seed != seed.final_seed || record.working_seed != seed.working_seed {
                return invalid(format!(
                    "record {} final seed {} does not match derived seed {}",
                    i, record.final_seed, seed.final_seed
                ));
            }

            if config.verify_notation && !fragments_agree(&beat_fragment(&record.beat), &record.fragment) {
                return invalid(format!("record {} fragment does not match its beat", i));
            }

            chain.fold(&record.beat);
        }

        if chain.digest() != self.running_digest {
            return invalid(format!(
                "running digest {} does not match replayed digest {}",
                self.running_digest,
                chain.digest()
            ));
        }

        Ok(chain)
    }
}
