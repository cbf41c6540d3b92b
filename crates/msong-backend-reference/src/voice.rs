//! Lead and bass step generators.
//!
//! Each voice carries its own chord and RNG state from beat to beat. A step
//! consumes the state left by the previous beat, so producing beat `n`
//! requires replaying beats `0..n` first.

use msong_chain::notation::{DOTTED_QUARTER, EIGHTH, HALF, QUARTER, SIXTEENTH};
use msong_chain::NoteEvent;

use crate::harmony::{
    bass_tones, choose_harmonic_movement, chord_tones, neighbors, PhraseType, PHRASE_LEN, TONIC,
};
use crate::rng::lcg_advance;

/// Initial RNG state of the lead voice.
pub const LEAD_RNG_INIT: u32 = 0xCAFE_BABE;
/// Initial RNG state of the bass voice.
pub const BASS_RNG_INIT: u32 = 0xDEAF_BEEF;

/// Every this many beats both voices snap back to the tonic.
const STRUCTURAL_RESET: u32 = 50;
const CADENCE_EVERY: u32 = 4;

const MIN_NOTES_BEFORE_REST: u32 = 4;
const MAX_NOTES_BEFORE_REST: u32 = 8;

const RESET_SALT: u32 = 0x5050;
const CADENCE_SALT: u32 = 0x1234;

/// Bass weights for root, fourth, fifth, sixth, second, tritone, third, seventh.
const BASS_TONE_WEIGHTS: [u32; 8] = [8, 6, 7, 4, 2, 1, 2, 1];
/// Out of 16.
const BASS_REPEAT_CHANCE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadState {
    pub chord: u8,
    pub rng: u32,
    pub notes_since_rest: u32,
}

impl Default for LeadState {
    fn default() -> Self {
        Self {
            chord: TONIC,
            rng: LEAD_RNG_INIT,
            notes_since_rest: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BassState {
    pub chord: u8,
    pub rng: u32,
    pub previous_pitch: Option<u8>,
}

impl Default for BassState {
    fn default() -> Self {
        Self {
            chord: TONIC,
            rng: BASS_RNG_INIT,
            previous_pitch: None,
        }
    }
}

/// Tonic reset every 50 beats, otherwise a neighbor move every 4 beats.
/// Shared by both voices before their harmonic movement.
fn cadence(position: u32, seed: u32, chord: &mut u8, rng: &mut u32) {
    if position % STRUCTURAL_RESET == 0 {
        *chord = TONIC;
        *rng = lcg_advance(*rng, seed ^ RESET_SALT);
    } else if position % PHRASE_LEN == 0 || position % CADENCE_EVERY == 0 {
        *rng = lcg_advance(*rng, seed ^ CADENCE_SALT);
        let nbrs = neighbors(*chord);
        if !nbrs.is_empty() {
            *chord = nbrs[*rng as usize % nbrs.len()];
        }
    }
}

fn should_rest(phrase: PhraseType, pos_in_phrase: u32, notes_since_rest: u32, rng: u32) -> bool {
    if notes_since_rest >= MAX_NOTES_BEFORE_REST {
        return true;
    }
    if notes_since_rest < MIN_NOTES_BEFORE_REST {
        return false;
    }

    let chance: u32 = match pos_in_phrase {
        3 => 6,
        7 => 3,
        _ => match phrase {
            PhraseType::A => 12,
            PhraseType::APrime => 16,
            PhraseType::B => 10,
            PhraseType::C => 8,
        },
    };
    // Used as a bit mask, not a modulus, even when `chance` is not a power of two.
    rng & (chance - 1) == 0
}

fn rest_duration(phrase: PhraseType, rng: u32) -> u32 {
    let r = rng & 3;
    match phrase {
        PhraseType::B | PhraseType::C => [QUARTER, DOTTED_QUARTER, HALF][(r % 3) as usize],
        PhraseType::A | PhraseType::APrime => {
            if r & 1 == 0 {
                QUARTER
            } else {
                DOTTED_QUARTER
            }
        }
    }
}

fn lead_duration(phrase: PhraseType, rng: u32) -> u32 {
    match phrase {
        PhraseType::A => match rng % 6 {
            0..=2 => QUARTER,
            3 | 4 => EIGHTH,
            _ => DOTTED_QUARTER,
        },
        PhraseType::APrime => [EIGHTH, QUARTER, DOTTED_QUARTER][(rng % 3) as usize],
        PhraseType::B => [SIXTEENTH, EIGHTH, QUARTER, HALF][(rng % 4) as usize],
        PhraseType::C => [QUARTER, DOTTED_QUARTER, HALF][(rng % 3) as usize],
    }
}

/// Half, quarter, half, eighth, repeating.
pub fn bass_duration(position: u32) -> u32 {
    [HALF, QUARTER, HALF, EIGHTH][(position % 4) as usize]
}

/// Index into the chord's three tones for a non-B phrase.
fn lead_tone_index(pos_in_phrase: u32, rng: u32) -> usize {
    let r = rng & 7;
    match pos_in_phrase {
        0 => match r {
            0..=3 => 0,
            4 | 5 => 2,
            _ => 1,
        },
        1 if r == 0 => 2,
        p if p == PHRASE_LEN - 1 => {
            if r & 1 == 0 {
                0
            } else {
                2
            }
        }
        _ => (r % 3) as usize,
    }
}

/// Phrase B leans toward the upper chord tones.
fn lead_tone_index_b(rng: u32) -> usize {
    match rng & 7 {
        0 | 1 => 0,
        2..=4 => 1,
        _ => 2,
    }
}

/// Generates one lead event and advances `state`.
///
/// A rest returns before any harmonic or RNG update.
pub fn lead_step(position: u32, seed: u32, state: &mut LeadState) -> NoteEvent {
    let phrase = PhraseType::at(position);
    let pos_in_phrase = position % PHRASE_LEN;

    if should_rest(phrase, pos_in_phrase, state.notes_since_rest, state.rng) {
        state.notes_since_rest = 0;
        return NoteEvent::rest(rest_duration(phrase, state.rng));
    }

    cadence(position, seed, &mut state.chord, &mut state.rng);
    let (chord, rng) = choose_harmonic_movement(state.chord, phrase, state.rng, seed);
    state.chord = chord;
    state.rng = lcg_advance(rng, seed.wrapping_mul(2));

    let tones = chord_tones(state.chord, phrase.lead_octave());
    let index = match phrase {
        PhraseType::B => lead_tone_index_b(state.rng),
        _ => lead_tone_index(pos_in_phrase, state.rng),
    };

    state.notes_since_rest += 1;
    NoteEvent::new(tones[index % 3], lead_duration(phrase, state.rng))
}

fn choose_bass_tone(rng: u32, previous: Option<u8>, tones: &[u8; 8]) -> u8 {
    if let Some(prev) = previous {
        if tones.contains(&prev) && (rng & 15) < BASS_REPEAT_CHANCE {
            return prev;
        }
    }

    let total: u32 = BASS_TONE_WEIGHTS.iter().sum();
    let target = (rng >> 4) % total;
    let mut cumulative = 0;
    for (tone, weight) in tones.iter().zip(BASS_TONE_WEIGHTS) {
        cumulative += weight;
        if target < cumulative {
            return *tone;
        }
    }
    tones[0]
}

/// Generates one bass event and advances `state`. The bass never rests.
pub fn bass_step(position: u32, seed: u32, state: &mut BassState) -> NoteEvent {
    let phrase = PhraseType::at(position);

    cadence(position, seed, &mut state.chord, &mut state.rng);
    let (chord, rng) = choose_harmonic_movement(state.chord, phrase, state.rng, seed);
    state.chord = chord;
    state.rng = lcg_advance(rng, seed.wrapping_mul(2));

    let tones = bass_tones(state.chord, phrase.bass_octave());
    let pitch = choose_bass_tone(state.rng, state.previous_pitch, &tones);
    state.previous_pitch = Some(pitch);
    NoteEvent::new(pitch, bass_duration(position))
}
