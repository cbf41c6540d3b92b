//! Diatonic harmony in Eb major.
//!
//! A chord is encoded as a single byte: `(root_pitch_class << 1) | minor`.
//! Only the seven chords of [`DIATONIC_CHORDS`] are ever produced.

use crate::rng::lcg_advance;

/// Phrase length in beats.
pub const PHRASE_LEN: u32 = 8;

/// Eb major (I).
pub const TONIC: u8 = 6;

/// The chord cycle. Neighbor moves step around this order.
pub const DIATONIC_CHORDS: [u8; 7] = [
    6,  // Eb
    9,  // Em
    11, // Fm
    16, // Ab
    20, // Bb
    1,  // Cm
    5,  // Dm
];

/// I, IV, and V.
const STRONG_CHORDS: [u8; 3] = [6, 16, 20];

const MAX_NEIGHBORS: usize = 6;

/// Section of the phrase grammar `A A' B A A' C A`, repeating every 56 beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhraseType {
    A,
    APrime,
    B,
    C,
}

impl PhraseType {
    /// Phrase type of the phrase containing `position`.
    pub fn at(position: u32) -> Self {
        match (position / PHRASE_LEN) % 7 {
            0 | 3 | 6 => PhraseType::A,
            1 | 4 => PhraseType::APrime,
            2 => PhraseType::B,
            _ => PhraseType::C,
        }
    }

    /// Chords this phrase gravitates toward.
    pub fn preferred_areas(self) -> [u8; 3] {
        match self {
            PhraseType::A => [6, 20, 16],
            PhraseType::APrime => [6, 1, 11],
            PhraseType::B => [9, 20, 1],
            PhraseType::C => [16, 6, 20],
        }
    }

    /// Octave of the lead voice.
    pub fn lead_octave(self) -> u8 {
        match self {
            PhraseType::A | PhraseType::B => 5,
            PhraseType::APrime | PhraseType::C => 6,
        }
    }

    /// Octave of the bass voice.
    pub fn bass_octave(self) -> u8 {
        match self {
            PhraseType::APrime => 5,
            _ => 4,
        }
    }
}

/// Chords reachable from `chord` in one move.
///
/// Two steps either way around the diatonic cycle, plus functional pulls
/// from I, IV, and V. The result is ascending, deduplicated, and at most six
/// long. Non-diatonic input is treated as the tonic.
pub fn neighbors(chord: u8) -> Vec<u8> {
    let len = DIATONIC_CHORDS.len();
    let pos = DIATONIC_CHORDS
        .iter()
        .position(|&c| c == chord)
        .unwrap_or(0);

    let mut out: Vec<u8> = [len - 2, len - 1, 1, 2]
        .iter()
        .map(|offset| DIATONIC_CHORDS[(pos + offset) % len])
        .collect();
    match chord {
        6 => out.extend_from_slice(&[9, 16, 20, 1]),
        20 => out.extend_from_slice(&[6, 1]),
        16 => out.extend_from_slice(&[6, 20]),
        _ => {}
    }

    out.sort_unstable();
    out.dedup();
    out.truncate(MAX_NEIGHBORS);
    out
}

fn pick(candidates: &[u8], state: u32) -> u8 {
    candidates[state as usize % candidates.len()]
}

/// Chooses the next chord for a phrase's motion style.
///
/// Returns the chord and the advanced RNG state.
pub fn choose_harmonic_movement(current: u8, phrase: PhraseType, rng: u32, seed: u32) -> (u8, u32) {
    let nbrs = neighbors(current);
    let state = lcg_advance(rng, seed);
    if nbrs.is_empty() {
        return (current, state);
    }

    let next = match phrase {
        // Stable: move one time in eight, preferring the phrase's areas.
        PhraseType::A => {
            if state & 7 == 0 {
                let preferred = phrase.preferred_areas();
                let matches: Vec<u8> = nbrs
                    .iter()
                    .copied()
                    .filter(|n| preferred.contains(n))
                    .collect();
                if matches.is_empty() {
                    pick(&nbrs, state)
                } else {
                    pick(&matches, state)
                }
            } else {
                current
            }
        }
        // Ornate: move one time in four.
        PhraseType::APrime => {
            if state & 3 == 0 {
                pick(&nbrs, state)
            } else {
                current
            }
        }
        // Exploratory: always move.
        PhraseType::B => pick(&nbrs, state),
        // Conclusive: always move, toward I, IV, or V when possible.
        PhraseType::C => {
            let strong: Vec<u8> = nbrs
                .iter()
                .copied()
                .filter(|n| STRONG_CHORDS.contains(n))
                .collect();
            if strong.is_empty() {
                pick(&nbrs, state)
            } else {
                pick(&strong, state)
            }
        }
    };

    (next, state)
}

fn root_and_quality(chord: u8) -> (u8, bool) {
    (chord >> 1, chord & 1 == 1)
}

/// Root, third, and fifth of a chord in the given octave.
///
/// Upper tones wrap within the octave rather than rising above it.
pub fn chord_tones(chord: u8, octave: u8) -> [u8; 3] {
    let (root, minor) = root_and_quality(chord);
    let base = octave * 12;
    let third = if minor { 3 } else { 4 };
    [
        base + root,
        base + (root + third) % 12,
        base + (root + 7) % 12,
    ]
}

/// Extended bass tones in preference-table order: root, fourth, fifth, sixth,
/// second, tritone, third, minor seventh.
pub fn bass_tones(chord: u8, octave: u8) -> [u8; 8] {
    let (root, minor) = root_and_quality(chord);
    let base = octave * 12;
    let third = if minor { 3 } else { 4 };
    [0, 5, 7, 9, 2, 6, third, 10].map(|interval| base + (root + interval) % 12)
}
