//! The sequential token loop.
//!
//! A [`Run`] owns the running note digest and the output builders for one
//! collection. Tokens are processed strictly in order; each step derives the
//! seed from the digest left by the previous step, calls the oracle, folds the
//! beat, and only then records it.
//!
//! ```text
//! Idle --step--> Running(1) --step--> ... --> Complete --finalize--> RunArtifacts
//!   \______________ any step error ______________/
//!                        v
//!                    Failed(i)
//! ```

use crate::aggregate::RunAggregator;
use crate::artifacts::RunArtifacts;
use crate::chain::NoteChain;
use crate::checkpoint::Checkpoint;
use crate::config::RunConfig;
use crate::error::ChainError;
use crate::hash::Digest;
use crate::notation::{beat_fragment, fragments_agree};
use crate::oracle::BeatOracle;
use crate::seed::derive_seed;
use crate::token::{TokenOrdinal, TokenRecord};
use crate::words::{select_words_from_digest, seven_words_digest};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No token processed yet.
    Idle,
    /// The next token to process.
    Running(u32),
    /// Every token processed; ready to finalize.
    Complete,
    /// A step failed at this token index. The run cannot continue.
    Failed(u32),
}

/// One collection run.
pub struct Run<O> {
    config: RunConfig,
    collection_salt: Digest,
    oracle: O,
    chain: NoteChain,
    aggregator: RunAggregator,
    records: Vec<TokenRecord>,
    failed_at: Option<u32>,
}

impl<O: BeatOracle> Run<O> {
    /// Starts a fresh run. The configuration is validated first.
    pub fn new(config: RunConfig, oracle: O) -> Result<Self, ChainError> {
        config.validate()?;
        let collection_salt = config.collection_salt();

        tracing::info!(
            phrase = %config.collection_phrase,
            salt = %collection_salt,
            tokens = config.num_tokens,
            start_year = config.start_year,
            "starting run"
        );

        Ok(Self {
            aggregator: RunAggregator::new(&config.collection_phrase, config.start_year),
            collection_salt,
            oracle,
            chain: NoteChain::new(),
            records: Vec::with_capacity(config.num_tokens as usize),
            failed_at: None,
            config,
        })
    }

    /// Continues a run from a validated checkpoint.
    pub fn resume(config: RunConfig, oracle: O, checkpoint: Checkpoint) -> Result<Self, ChainError> {
        config.validate()?;
        let chain = checkpoint.validate(&config)?;

        let mut aggregator = RunAggregator::new(&config.collection_phrase, config.start_year);
        for record in &checkpoint.records {
            aggregator.record(record);
        }

        tracing::info!(
            phrase = %config.collection_phrase,
            next_index = checkpoint.next_index,
            tokens = config.num_tokens,
            "resuming run"
        );

        let mut records = checkpoint.records;
        records.reserve(config.num_tokens as usize - records.len());

        Ok(Self {
            collection_salt: checkpoint.collection_salt,
            oracle,
            chain,
            aggregator,
            records,
            failed_at: None,
            config,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn collection_salt(&self) -> Digest {
        self.collection_salt
    }

    /// The running note digest, as the next token's seed will read it.
    pub fn running_digest(&self) -> Digest {
        self.chain.digest()
    }

    /// Records of every completed token, in order.
    pub fn records(&self) -> &[TokenRecord] {
        &self.records
    }

    pub fn phase(&self) -> RunPhase {
        if let Some(index) = self.failed_at {
            return RunPhase::Failed(index);
        }
        match self.chain.folded() {
            0 => RunPhase::Idle,
            n if n >= self.config.num_tokens => RunPhase::Complete,
            n => RunPhase::Running(n),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == RunPhase::Complete
    }

    /// Snapshot of the run's state for [`Run::resume`].
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.collection_salt, &self.chain, self.records.clone())
    }

    /// Processes the next token.
    ///
    /// Any error marks the run failed; later calls return `RunState`.
    pub fn step(&mut self) -> Result<&TokenRecord, ChainError> {
        let index = match self.phase() {
            RunPhase::Idle => 0,
            RunPhase::Running(index) => index,
            RunPhase::Complete => {
                return Err(ChainError::RunState(format!(
                    "all {} tokens already processed",
                    self.config.num_tokens
                )))
            }
            RunPhase::Failed(index) => {
                return Err(ChainError::RunState(format!(
                    "run failed at token index {}",
                    index
                )))
            }
        };

        let record = match self.process(index) {
            Ok(record) => record,
            Err(e) => {
                self.failed_at = Some(index);
                tracing::error!(index, error = %e, "token failed; run aborted");
                return Err(e);
            }
        };

        tracing::debug!(
            index,
            token_id = record.ordinal.token_id,
            working_seed = record.working_seed,
            lead = record.beat.lead.pitch,
            bass = record.beat.bass.pitch,
            "token complete"
        );
        let done = index + 1;
        if done % self.config.progress_interval == 0 {
            tracing::info!("generated {}/{} tokens", done, self.config.num_tokens);
        }

        self.aggregator.record(&record);
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Derives, generates, and folds token `index` without touching the
    /// builders. The chain is only advanced once every check has passed.
    fn process(&mut self, index: u32) -> Result<TokenRecord, ChainError> {
        let ordinal = TokenOrdinal::new(index, self.config.start_year).ok_or_else(|| {
            ChainError::InvalidConfig(format!("reveal year overflows at token index {}", index))
        })?;

        let words_digest = seven_words_digest(ordinal.token_id);
        let seven_words = select_words_from_digest(&words_digest);
        let prior_digest = self.chain.digest();
        let aux_digest = self.config.aux_digest.digest_for(index);
        let seed = derive_seed(
            &self.collection_salt,
            ordinal.token_id,
            &words_digest,
            &prior_digest,
            &aux_digest,
        );

        let beat = self
            .oracle
            .generate_beat(index, seed.working_seed)
            .map_err(|source| ChainError::OracleFailure { index, source })?;
        let fragment = self
            .oracle
            .generate_abc_beat(index, seed.working_seed)
            .map_err(|source| ChainError::OracleFailure { index, source })?;

        if self.config.verify_notation {
            let expected = beat_fragment(&beat);
            if !fragments_agree(&expected, &fragment) {
                return Err(ChainError::NotationMismatch {
                    index,
                    expected,
                    actual: fragment,
                });
            }
        }

        self.chain.fold(&beat);

        Ok(TokenRecord {
            ordinal,
            seven_words,
            words_digest,
            prior_digest,
            aux_digest,
            final_seed: seed.final_seed,
            working_seed: seed.working_seed,
            beat,
            fragment,
        })
    }

    /// Steps until every token is processed.
    pub fn run_to_end(&mut self) -> Result<(), ChainError> {
        self.run_to_end_with(|_| Ok(()))
    }

    /// Steps until every token is processed, calling `after_token` between
    /// tokens (for checkpointing or progress display).
    pub fn run_to_end_with<F>(&mut self, mut after_token: F) -> Result<(), ChainError>
    where
        F: FnMut(&Self) -> Result<(), ChainError>,
    {
        while !self.is_complete() {
            self.step()?;
            after_token(self)?;
        }
        Ok(())
    }

    /// Produces the artifacts of a completed run.
    pub fn finalize(self) -> Result<RunArtifacts, ChainError> {
        match self.phase() {
            RunPhase::Complete => {}
            phase => {
                return Err(ChainError::RunState(format!(
                    "cannot finalize a run in phase {:?}",
                    phase
                )))
            }
        }

        let artifacts = self.aggregator.finalize()?;
        tracing::info!(
            tokens = self.records.len(),
            final_digest = %self.chain.digest(),
            fingerprint = %artifacts.fingerprint(),
            "run finalized"
        );
        Ok(artifacts)
    }
}

/// Runs a whole collection and returns its artifacts.
///
/// # Example
/// ```ignore
/// use msong_chain::{generate_collection, RunConfig};
///
/// let artifacts = generate_collection(RunConfig::new("test phrase", 3), &oracle)?;
/// artifacts.write_to_dir(Path::new("out"))?;
/// ```
pub fn generate_collection<O: BeatOracle>(config: RunConfig, oracle: O) -> Result<RunArtifacts, ChainError> {
    let mut run = Run::new(config, oracle)?;
    run.run_to_end()?;
    run.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::oracle::{Beat, NoteEvent};
    use crate::seed::AuxDigestPolicy;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// `lead = (60 + i, 4)`, `bass = (36 + i, 4)`.
    struct LinearOracle;

    impl BeatOracle for LinearOracle {
        fn generate_beat(&self, index: u32, _seed: u32) -> Result<Beat, OracleError> {
            Ok(Beat::new(
                NoteEvent::new(60 + index as u8, 4),
                NoteEvent::new(36 + index as u8, 4),
            ))
        }

        fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
            Ok(beat_fragment(&self.generate_beat(index, seed)?))
        }
    }

    /// Fails on one index and counts calls.
    struct FailAt {
        index: u32,
        calls: Cell<u32>,
    }

    impl BeatOracle for FailAt {
        fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
            self.calls.set(self.calls.get() + 1);
            if index == self.index {
                return Err(OracleError::new("STUB_001", "execution reverted", "stub"));
            }
            LinearOracle.generate_beat(index, seed)
        }

        fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
            LinearOracle.generate_abc_beat(index, seed)
        }
    }

    /// Returns a fragment one semitone off from its beat.
    struct DisagreeingOracle;

    impl BeatOracle for DisagreeingOracle {
        fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
            LinearOracle.generate_beat(index, seed)
        }

        fn generate_abc_beat(&self, _index: u32, _seed: u32) -> Result<String, OracleError> {
            Ok("[V:1] B |\n[V:2] C |".to_string())
        }
    }

    #[test]
    fn test_three_token_vectors() {
        let mut run = Run::new(RunConfig::new("test phrase", 3), LinearOracle).unwrap();
        assert_eq!(run.phase(), RunPhase::Idle);

        run.run_to_end().unwrap();
        assert_eq!(run.phase(), RunPhase::Complete);

        let seeds: Vec<String> = run.records().iter().map(|r| r.final_seed.to_hex()).collect();
        assert_eq!(
            seeds,
            vec![
                "5c92beeb907a7a18394c489539f30c4f612a1c787a0c3049a4e343dc329cfa21",
                "df4936c6a8be9285116ba038ba988e0dab5a56bf4e5192c6df327e1cad8e0dbe",
                "f5f91c3804cdbdfbd0641f590f1dc0ee253cf4952cb37454f48a23c12835cc9b",
            ]
        );
        let working: Vec<u32> = run.records().iter().map(|r| r.working_seed).collect();
        assert_eq!(working, vec![1_553_121_003, 3_746_117_318, 4_126_743_608]);
        assert_eq!(
            run.running_digest().to_hex(),
            "1f848deb49cf91f82f353738eb07905934d5e00580fe06632fd5be40525a0c0a"
        );
        assert!(run.records()[0].prior_digest.is_zero());
        assert_eq!(
            run.records()[1].prior_digest,
            crate::chain::fold_notes(&Digest::ZERO, 60, 36)
        );
    }

    #[test]
    fn test_step_phases() {
        let mut run = Run::new(RunConfig::new("test phrase", 2), LinearOracle).unwrap();
        assert_eq!(run.step().unwrap().ordinal.token_id, 1000);
        assert_eq!(run.phase(), RunPhase::Running(1));
        assert_eq!(run.step().unwrap().ordinal.token_id, 1007);
        assert_eq!(run.phase(), RunPhase::Complete);
        assert!(matches!(run.step(), Err(ChainError::RunState(_))));
    }

    #[test]
    fn test_oracle_failure_aborts_run() {
        let oracle = FailAt {
            index: 1,
            calls: Cell::new(0),
        };
        let mut run = Run::new(RunConfig::new("test phrase", 5), &oracle).unwrap();
        let err = run.run_to_end().unwrap_err();

        assert!(matches!(err, ChainError::OracleFailure { index: 1, .. }));
        assert_eq!(err.token_index(), Some(1));
        assert_eq!(run.phase(), RunPhase::Failed(1));
        assert_eq!(run.records().len(), 1);
        assert_eq!(oracle.calls.get(), 2);

        // No retry, no skipping ahead.
        assert!(matches!(run.step(), Err(ChainError::RunState(_))));
        assert_eq!(oracle.calls.get(), 2);
        assert!(matches!(run.finalize(), Err(ChainError::RunState(_))));
    }

    #[test]
    fn test_notation_mismatch_fails_run() {
        let mut run = Run::new(RunConfig::new("test phrase", 2), DisagreeingOracle).unwrap();
        let err = run.step().unwrap_err();
        match err {
            ChainError::NotationMismatch {
                index,
                expected,
                actual,
            } => {
                assert_eq!(index, 0);
                assert_eq!(expected, "[V:1] c/2 |\n[V:2] C,/2 |");
                assert_eq!(actual, "[V:1] B |\n[V:2] C |");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The chain did not advance past the rejected beat.
        assert!(run.running_digest().is_zero());
    }

    #[test]
    fn test_notation_check_can_be_disabled() {
        let mut config = RunConfig::new("test phrase", 2);
        config.verify_notation = false;
        let artifacts = generate_collection(config, DisagreeingOracle).unwrap();
        assert!(artifacts.notation().contains("% Token 1000 - Year 2026 - Beat 0\n[V:1] B |\n"));
    }

    #[test]
    fn test_invalid_config_rejected_before_oracle() {
        let oracle = FailAt {
            index: 0,
            calls: Cell::new(0),
        };
        let mut config = RunConfig::new("test phrase", 3);
        config.vocabulary.reverse();
        assert!(matches!(
            Run::new(config, &oracle),
            Err(ChainError::VocabularyMismatch(_))
        ));
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn test_resume_matches_uninterrupted_run() {
        let config = RunConfig::new("test phrase", 4);
        let full = generate_collection(config.clone(), LinearOracle).unwrap();

        let mut first = Run::new(config.clone(), LinearOracle).unwrap();
        first.step().unwrap();
        first.step().unwrap();
        let checkpoint = first.checkpoint();
        assert_eq!(checkpoint.next_index, 2);

        let mut resumed = Run::resume(config, LinearOracle, checkpoint).unwrap();
        assert_eq!(resumed.phase(), RunPhase::Running(2));
        resumed.run_to_end().unwrap();
        let artifacts = resumed.finalize().unwrap();

        assert_eq!(artifacts, full);
    }

    #[test]
    fn test_aux_policy_changes_seeds() {
        let default = generate_collection(RunConfig::new("test phrase", 1), LinearOracle).unwrap();
        let zero = generate_collection(
            RunConfig::new("test phrase", 1).with_aux_digest(AuxDigestPolicy::Zero),
            LinearOracle,
        )
        .unwrap();
        assert_ne!(default.tabular(), zero.tabular());
        assert_eq!(default.notation(), zero.notation());
    }

    #[test]
    fn test_after_token_hook_sees_each_step() {
        let mut run = Run::new(RunConfig::new("test phrase", 3), LinearOracle).unwrap();
        let mut seen = Vec::new();
        run.run_to_end_with(|run| {
            seen.push(run.records().len());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
