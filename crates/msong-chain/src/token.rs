//! Token ordinals and per-token derivation records.

use serde::{Deserialize, Serialize};

use crate::hash::Digest;
use crate::oracle::Beat;
use crate::words::SevenWords;

/// Token id of the first token in a run.
pub const FIRST_TOKEN_ID: u64 = 1000;

/// Spacing between consecutive token ids.
pub const TOKEN_ID_STRIDE: u64 = 7;

/// Position of a token in the reveal sequence.
///
/// Everything here is computed from the index and the start year; nothing is
/// stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenOrdinal {
    /// Reveal index `i` in `[0, N)`; also the beat index passed to the oracle.
    pub index: u32,
    /// `1000 + 7 * i`.
    pub token_id: u64,
    /// `start_year + i`.
    pub reveal_year: u32,
}

impl TokenOrdinal {
    /// Computes the ordinal for reveal index `index`.
    ///
    /// Returns `None` if the reveal year overflows.
    pub fn new(index: u32, start_year: u32) -> Option<Self> {
        Some(Self {
            index,
            token_id: FIRST_TOKEN_ID + TOKEN_ID_STRIDE * u64::from(index),
            reveal_year: start_year.checked_add(index)?,
        })
    }
}

/// Everything derived for one completed token.
///
/// Records are the single input to every output builder and to checkpoints;
/// the seed fields are kept so a record can be audited against a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub ordinal: TokenOrdinal,
    pub seven_words: SevenWords,
    pub words_digest: Digest,
    /// Running note digest before this token's fold.
    pub prior_digest: Digest,
    pub aux_digest: Digest,
    pub final_seed: Digest,
    pub working_seed: u32,
    pub beat: Beat,
    /// Notation fragment returned by the oracle.
    pub fragment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_sequence() {
        let ids: Vec<u64> = (0..3)
            .map(|i| TokenOrdinal::new(i, 2026).unwrap().token_id)
            .collect();
        assert_eq!(ids, vec![1000, 1007, 1014]);
    }

    #[test]
    fn test_reveal_year() {
        let ordinal = TokenOrdinal::new(999, 2026).unwrap();
        assert_eq!(ordinal.reveal_year, 3025);
        assert_eq!(ordinal.token_id, 1000 + 7 * 999);
    }

    #[test]
    fn test_reveal_year_overflow() {
        assert!(TokenOrdinal::new(2, u32::MAX - 1).is_none());
    }
}
