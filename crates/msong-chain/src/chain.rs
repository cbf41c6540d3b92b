//! The running note digest.
//!
//! ```text
//! next = keccak256(prior (32 bytes) || lead_pitch (1 byte) || bass_pitch (1 byte))
//! ```
//!
//! The digest after token `i` depends only on the digest before it and the
//! pitches of beat `i`. Seeds, words, and durations never enter the fold, so
//! the whole chain can be replayed from the oracle's outputs alone.

use crate::hash::{keccak256_concat, Digest};
use crate::oracle::Beat;

/// Folds one beat's pitches into the running digest.
pub fn fold_notes(prior: &Digest, lead_pitch: u8, bass_pitch: u8) -> Digest {
    keccak256_concat(&[&prior.as_bytes()[..], &[lead_pitch, bass_pitch][..]])
}

/// Accumulator for the running note digest of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChain {
    digest: Digest,
    folded: u32,
}

impl Default for NoteChain {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteChain {
    /// A fresh chain at the all-zero digest.
    pub fn new() -> Self {
        Self {
            digest: Digest::ZERO,
            folded: 0,
        }
    }

    /// Replays a chain over beats in token order.
    pub fn replay<'a>(beats: impl IntoIterator<Item = &'a Beat>) -> Self {
        let mut chain = Self::new();
        for beat in beats {
            chain.fold(beat);
        }
        chain
    }

    /// Current digest: the state the next token's seed derivation reads.
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Number of beats folded so far.
    pub fn folded(&self) -> u32 {
        self.folded
    }

    /// Folds `beat` and returns the new digest.
    pub fn fold(&mut self, beat: &Beat) -> Digest {
        self.digest = fold_notes(&self.digest, beat.lead.pitch, beat.bass.pitch);
        self.folded += 1;
        self.digest
    }
}
