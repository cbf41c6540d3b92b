//! Stub oracles and temp-directory fixtures for integration tests.

use msong_chain::notation::beat_fragment;
use msong_chain::{generate_collection, Beat, BeatOracle, NoteEvent, OracleError, RunArtifacts, RunConfig};
use std::path::Path;
use tempfile::TempDir;

/// Phrase used by the stub scenarios.
pub const STUB_PHRASE: &str = "test phrase";

/// A stub run of `num_tokens` tokens under [`STUB_PHRASE`].
pub fn stub_config(num_tokens: u32) -> RunConfig {
    RunConfig::new(STUB_PHRASE, num_tokens)
}

/// Oracle whose beat depends only on the token index:
/// lead `(60 + i, 4)`, bass `(36 + i, 4)`, wrapping every 24 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubOracle;

impl StubOracle {
    pub fn beat(index: u32) -> Beat {
        let step = (index % 24) as u8;
        Beat::new(NoteEvent::new(60 + step, 4), NoteEvent::new(36 + step, 4))
    }
}

impl BeatOracle for StubOracle {
    fn generate_beat(&self, index: u32, _seed: u32) -> Result<Beat, OracleError> {
        Ok(Self::beat(index))
    }

    fn generate_abc_beat(&self, index: u32, _seed: u32) -> Result<String, OracleError> {
        Ok(beat_fragment(&Self::beat(index)))
    }
}

/// [`StubOracle`] that fails every call for one token index.
#[derive(Debug, Clone, Copy)]
pub struct FailingOracle {
    pub fail_at: u32,
}

impl BeatOracle for FailingOracle {
    fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
        if index == self.fail_at {
            return Err(OracleError::new(
                "STUB_001",
                format!("stub oracle unavailable for token {}", index),
                "stub",
            ));
        }
        StubOracle.generate_beat(index, seed)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        Ok(beat_fragment(&self.generate_beat(index, seed)?))
    }
}

/// [`StubOracle`] whose lead at one token index is transposed up a tone.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedOracle {
    pub shift_at: u32,
}

impl BeatOracle for ShiftedOracle {
    fn generate_beat(&self, index: u32, _seed: u32) -> Result<Beat, OracleError> {
        let mut beat = StubOracle::beat(index);
        if index == self.shift_at {
            beat.lead.pitch += 2;
        }
        Ok(beat)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        Ok(beat_fragment(&self.generate_beat(index, seed)?))
    }
}

/// A temp directory holding the artifacts of one run.
pub struct RunDirFixture {
    pub root: TempDir,
    pub artifacts: RunArtifacts,
}

impl RunDirFixture {
    /// Generates a run and writes its artifacts into a fresh temp directory.
    pub fn generate<O: BeatOracle>(config: RunConfig, oracle: O) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let artifacts = generate_collection(config, oracle).expect("Run failed");
        artifacts
            .write_to_dir(root.path())
            .expect("Failed to write artifacts");
        Self { root, artifacts }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Reads one written artifact as text.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read artifact")
    }
}
