//! ABC notation rendering for beats and the combined document.
//!
//! Spelling follows the Eb major key signature (flats for the black keys).
//! Octave 4 is uppercase, octave 5 lowercase; each octave below 4 adds a `,`
//! and each octave above 5 adds a `'`. The unit note length is an eighth.

use crate::oracle::{Beat, NoteEvent, REST_PITCH};

/// Ticks per quarter note.
pub const TICKS_PER_QUARTER: u32 = 480;
pub const SIXTEENTH: u32 = 120;
pub const EIGHTH: u32 = 240;
pub const QUARTER: u32 = 480;
pub const DOTTED_QUARTER: u32 = 720;
pub const HALF: u32 = 960;
pub const WHOLE: u32 = 1920;

const NOTE_NAMES_EB: [&str; 12] = [
    "C", "_D", "D", "_E", "E", "F", "_G", "G", "_A", "A", "_B", "B",
];

/// ABC spelling of a MIDI pitch (`z` for a rest).
///
/// # Examples
/// ```
/// use msong_chain::notation::pitch_to_abc;
///
/// assert_eq!(pitch_to_abc(60), "c");
/// assert_eq!(pitch_to_abc(51), "_E");
/// assert_eq!(pitch_to_abc(36), "C,");
/// assert_eq!(pitch_to_abc(75), "_e'");
/// ```
pub fn pitch_to_abc(pitch: u8) -> String {
    if pitch == REST_PITCH {
        return "z".to_string();
    }

    let octave = pitch / 12;
    let mut note = NOTE_NAMES_EB[(pitch % 12) as usize].to_string();
    match octave {
        0..=3 => note.push_str(&",".repeat((4 - octave) as usize)),
        4 => {}
        5 => note = note.to_lowercase(),
        _ => {
            note = note.to_lowercase();
            note.push_str(&"'".repeat((octave - 5) as usize));
        }
    }
    note
}

/// ABC length suffix for a duration in ticks.
pub fn duration_to_abc(ticks: u32) -> &'static str {
    if ticks >= WHOLE {
        "8"
    } else if ticks >= HALF {
        "4"
    } else if ticks >= DOTTED_QUARTER {
        "3"
    } else if ticks >= QUARTER {
        "2"
    } else if ticks >= EIGHTH {
        ""
    } else {
        "/2"
    }
}

fn event_to_abc(event: &NoteEvent) -> String {
    format!("{}{}", pitch_to_abc(event.pitch), duration_to_abc(event.duration))
}

/// Canonical two-voice fragment for a beat.
///
/// ```text
/// [V:1] {lead} |
/// [V:2] {bass} |
/// ```
pub fn beat_fragment(beat: &Beat) -> String {
    format!(
        "[V:1] {} |\n[V:2] {} |",
        event_to_abc(&beat.lead),
        event_to_abc(&beat.bass)
    )
}

/// Whether an oracle fragment describes the same notes as the rendered one.
///
/// Surrounding whitespace is ignored; everything else must match exactly.
pub fn fragments_agree(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}

/// Header block of the combined notation document.
pub fn document_header(collection_phrase: &str) -> String {
    format!(
        "X:1\n\
         T:Millennium Song - Blockchain Simulation\n\
         C:Collection: \"{}\"\n\
         M:4/4\n\
         L:1/8\n\
         K:Eb\n\
         V:1 clef=treble name=\"Lead\"\n\
         V:2 clef=bass name=\"Bass\"\n",
        collection_phrase
    )
}

/// Comment line that introduces each token's fragment.
pub fn token_comment(token_id: u64, reveal_year: u32, index: u32) -> String {
    format!("% Token {} - Year {} - Beat {}", token_id, reveal_year, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pitch_spelling_by_octave() {
        assert_eq!(pitch_to_abc(24), "C,,");
        assert_eq!(pitch_to_abc(37), "_D,");
        assert_eq!(pitch_to_abc(48), "C");
        assert_eq!(pitch_to_abc(58), "_B");
        assert_eq!(pitch_to_abc(67), "g");
        assert_eq!(pitch_to_abc(72), "c'");
        assert_eq!(pitch_to_abc(84), "c''");
        assert_eq!(pitch_to_abc(0), "C,,,,");
    }

    #[test]
    fn test_rest_is_z() {
        assert_eq!(pitch_to_abc(REST_PITCH), "z");
    }

    #[test]
    fn test_duration_thresholds() {
        assert_eq!(duration_to_abc(4), "/2");
        assert_eq!(duration_to_abc(SIXTEENTH), "/2");
        assert_eq!(duration_to_abc(EIGHTH), "");
        assert_eq!(duration_to_abc(QUARTER), "2");
        assert_eq!(duration_to_abc(DOTTED_QUARTER), "3");
        assert_eq!(duration_to_abc(HALF), "4");
        assert_eq!(duration_to_abc(WHOLE), "8");
        assert_eq!(duration_to_abc(5000), "8");
    }

    #[test]
    fn test_beat_fragment() {
        let beat = Beat::new(NoteEvent::new(60, 4), NoteEvent::new(36, 4));
        assert_eq!(beat_fragment(&beat), "[V:1] c/2 |\n[V:2] C,/2 |");

        let beat = Beat::new(NoteEvent::rest(DOTTED_QUARTER), NoteEvent::new(51, HALF));
        assert_eq!(beat_fragment(&beat), "[V:1] z3 |\n[V:2] _E4 |");
    }

    #[test]
    fn test_fragments_agree_ignores_outer_whitespace() {
        assert!(fragments_agree("[V:1] c |\n[V:2] C |", "  [V:1] c |\n[V:2] C |\n"));
        assert!(!fragments_agree("[V:1] c |", "[V:1] d |"));
    }

    #[test]
    fn test_document_header() {
        let header = document_header("test phrase");
        assert!(header.starts_with("X:1\nT:Millennium Song - Blockchain Simulation\n"));
        assert!(header.contains("C:Collection: \"test phrase\"\n"));
        assert!(header.ends_with("V:2 clef=bass name=\"Bass\"\n"));
        assert_eq!(header.lines().count(), 8);
    }

    #[test]
    fn test_token_comment() {
        assert_eq!(
            token_comment(1007, 2027, 1),
            "% Token 1007 - Year 2027 - Beat 1"
        );
    }
}
