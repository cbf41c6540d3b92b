//! The beat oracle interface.
//!
//! The oracle is an external, deterministic generator: given a token index and
//! a 32-bit working seed it returns one lead note and one bass note, plus the
//! same beat as an ABC notation fragment. The core never looks inside it; any
//! implementation (the on-chain contract behind an RPC client, the local
//! reference backend, a test stub) plugs in through [`BeatOracle`].

use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Pitch value the oracle uses for a rest. Not a valid MIDI note.
pub const REST_PITCH: u8 = 0xFF;

/// One voice's note for a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch, or [`REST_PITCH`] for a rest.
    pub pitch: u8,
    /// Duration in ticks (480 per quarter note).
    pub duration: u32,
}

impl NoteEvent {
    pub const fn new(pitch: u8, duration: u32) -> Self {
        Self { pitch, duration }
    }

    pub const fn rest(duration: u32) -> Self {
        Self {
            pitch: REST_PITCH,
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch == REST_PITCH
    }
}

/// The oracle's output for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Beat {
    pub lead: NoteEvent,
    pub bass: NoteEvent,
}

impl Beat {
    pub const fn new(lead: NoteEvent, bass: NoteEvent) -> Self {
        Self { lead, bass }
    }
}

/// A deterministic beat generator.
///
/// Both calls must be pure functions of `(index, seed)`. For a given pair,
/// [`generate_abc_beat`](BeatOracle::generate_abc_beat) must describe the same
/// notes as [`generate_beat`](BeatOracle::generate_beat); the run reports a
/// disagreement rather than choosing one.
///
/// Implementations that reach a remote execution environment block inside
/// these calls; the run does not proceed to the fold until they return.
pub trait BeatOracle {
    /// Generates the lead/bass pair for a token.
    fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError>;

    /// Generates the ABC notation fragment for the same beat.
    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError>;
}

impl<O: BeatOracle + ?Sized> BeatOracle for &O {
    fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
        (**self).generate_beat(index, seed)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        (**self).generate_abc_beat(index, seed)
    }
}

impl<O: BeatOracle + ?Sized> BeatOracle for Box<O> {
    fn generate_beat(&self, index: u32, seed: u32) -> Result<Beat, OracleError> {
        (**self).generate_beat(index, seed)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        (**self).generate_abc_beat(index, seed)
    }
}
