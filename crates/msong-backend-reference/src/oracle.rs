//! The reference beat oracle.

use msong_chain::notation::beat_fragment;
use msong_chain::{Beat, BeatOracle, OracleError};

use crate::error::ReferenceOracleError;
use crate::rng::mix_seeds;
use crate::voice::{bass_step, lead_step, BassState, LeadState};

/// Default upper bound on beat indices. Generating beat `n` replays `n`
/// earlier steps, so this also bounds the cost of one call.
pub const DEFAULT_MAX_BEATS: u32 = 100_000;

/// Salt distinguishing the bass voice's per-beat seed from the lead's.
const BASS_SEED_SALT: u32 = 0x7777;

/// A local, deterministic beat oracle.
///
/// Each call rebuilds both voices from their initial state by replaying
/// beats `0..index` under the same token seed, then generates beat `index`.
/// The result depends only on `(index, seed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceOracle {
    max_beats: u32,
}

impl Default for ReferenceOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceOracle {
    pub fn new() -> Self {
        Self {
            max_beats: DEFAULT_MAX_BEATS,
        }
    }

    /// Sets the number of beat indices accepted (`0..max_beats`).
    pub fn with_max_beats(mut self, max_beats: u32) -> Self {
        self.max_beats = max_beats;
        self
    }

    pub fn max_beats(&self) -> u32 {
        self.max_beats
    }

    /// Generates the beat at `index` for a token seed.
    pub fn beat(&self, index: u32, seed: u32) -> Result<Beat, ReferenceOracleError> {
        if index >= self.max_beats {
            return Err(ReferenceOracleError::BeatIndexOutOfRange {
                index,
                limit: self.max_beats,
            });
        }

        let mut lead = LeadState::default();
        let mut bass = BassState::default();
        for position in 0..index {
            let beat_seed = mix_seeds(seed, position);
            lead_step(position, beat_seed, &mut lead);
            bass_step(position, beat_seed ^ BASS_SEED_SALT, &mut bass);
        }

        let beat_seed = mix_seeds(seed, index);
        Ok(Beat::new(
            lead_step(index, beat_seed, &mut lead),
            bass_step(index, beat_seed ^ BASS_SEED_SALT, &mut bass),
        ))
    }
}

impl BeatOracle for ReferenceOracle {
    fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
        self.beat(index, seed).map_err(OracleError::from_backend)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        let beat = self.beat(index, seed).map_err(OracleError::from_backend)?;
        Ok(beat_fragment(&beat))
    }
}
