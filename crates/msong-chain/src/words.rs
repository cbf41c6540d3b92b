//! Seven-word selection from the fixed vocabulary.
//!
//! ```text
//! words_digest = keccak256(utf8("seven_words_" || decimal(token_id)))
//! word[j]      = VOCABULARY[words_digest[j] % 44]    for j in 0..7
//! ```
//!
//! The vocabulary order is load-bearing: the contract indexes the same list,
//! so reordering it changes every token's words.

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::hash::{keccak256, Digest};

/// Number of words selected per token.
pub const WORDS_PER_TOKEN: usize = 7;

/// The fixed word bank, in contract order.
pub const VOCABULARY: [&str; 44] = [
    "harmony",
    "melody",
    "rhythm",
    "crescendo",
    "allegro",
    "andante",
    "forte",
    "piano",
    "symphony",
    "sonata",
    "chord",
    "scale",
    "tempo",
    "timbre",
    "resonance",
    "cadence",
    "vibrato",
    "staccato",
    "legato",
    "diminuendo",
    "accelerando",
    "ritardando",
    "sforzando",
    "passage",
    "phrase",
    "movement",
    "composition",
    "arrangement",
    "improvisation",
    "modulation",
    "transpose",
    "chromatic",
    "diatonic",
    "enharmonic",
    "counterpoint",
    "polyphony",
    "monophony",
    "octave",
    "interval",
    "consonance",
    "dissonance",
    "resolution",
    "suspension",
    "ornament",
];

/// The ordered words chosen for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SevenWords([String; WORDS_PER_TOKEN]);

impl SevenWords {
    /// The words in selection order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Words joined with `" | "`, as they appear in token metadata.
    pub fn joined(&self) -> String {
        self.0.join(" | ")
    }
}

/// Returns the vocabulary as owned strings, for configuration defaults.
pub fn default_vocabulary() -> Vec<String> {
    VOCABULARY.iter().map(|w| w.to_string()).collect()
}

/// Checks that a configured vocabulary matches the fixed word list exactly.
///
/// Selection indexes by position, so the check covers length and order, not
/// just set membership.
pub fn validate_vocabulary(vocabulary: &[String]) -> Result<(), ChainError> {
    if vocabulary.len() != VOCABULARY.len() {
        return Err(ChainError::VocabularyMismatch(format!(
            "expected {} words, got {}",
            VOCABULARY.len(),
            vocabulary.len()
        )));
    }

    if let Some((index, (got, expected))) = vocabulary
        .iter()
        .zip(VOCABULARY.iter())
        .enumerate()
        .find(|(_, (got, expected))| got.as_str() != **expected)
    {
        return Err(ChainError::VocabularyMismatch(format!(
            "word {} is '{}', expected '{}'",
            index, got, expected
        )));
    }

    Ok(())
}

/// The digest that seeds word selection for `token_id`.
pub fn seven_words_digest(token_id: u64) -> Digest {
    keccak256(format!("seven_words_{}", token_id).as_bytes())
}

/// Selects the seven words encoded by a words digest.
pub fn select_words_from_digest(digest: &Digest) -> SevenWords {
    let bytes = digest.as_bytes();
    SevenWords(std::array::from_fn(|j| {
        VOCABULARY[bytes[j] as usize % VOCABULARY.len()].to_string()
    }))
}

/// Selects the seven words for a token id.
///
/// # Example
/// ```
/// use msong_chain::words::select_words;
///
/// let words = select_words(1000);
/// assert_eq!(words.as_slice()[0], "suspension");
/// assert_eq!(words, select_words(1000));
/// ```
pub fn select_words(token_id: u64) -> SevenWords {
    select_words_from_digest(&seven_words_digest(token_id))
}
