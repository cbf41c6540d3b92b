//! Standard MIDI File rendering of the event list.
//!
//! Format 1, three tracks: a conductor track (name, key, meter, tempo), then
//! one track per voice. All multi-byte fields are big-endian.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

use crate::aggregate::{BeatEvent, EventListDocument};
use crate::error::ChainError;
use crate::notation::TICKS_PER_QUARTER;
use crate::oracle::NoteEvent;

/// File name used in serialization errors.
pub const MIDI_FILE: &str = "combined-sequence.mid";

const HEADER_MAGIC: &[u8; 4] = b"MThd";
const TRACK_MAGIC: &[u8; 4] = b"MTrk";
const FORMAT_MULTI_TRACK: u16 = 1;
const TRACK_COUNT: u16 = 3;

/// Microseconds per quarter note (120 BPM).
pub const TEMPO_US_PER_QUARTER: u32 = 500_000;

/// Key signature meta event body: three flats, major.
const KEY_SIGNATURE_EB_MAJOR: [u8; 2] = [0xFD, 0x00];
/// Time signature meta event body: 4/4, 24 clocks per click, 8 32nds per quarter.
const TIME_SIGNATURE_4_4: [u8; 4] = [0x04, 0x02, 0x18, 0x08];

const META: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_END_OF_TRACK: u8 = 0x2F;
const META_TEMPO: u8 = 0x51;
const META_TIME_SIGNATURE: u8 = 0x58;
const META_KEY_SIGNATURE: u8 = 0x59;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const PROGRAM_CHANGE: u8 = 0xC0;

/// Playback settings for one voice track.
#[derive(Debug, Clone, Copy)]
struct Voice {
    name: &'static str,
    channel: u8,
    program: u8,
    velocity: u8,
}

const LEAD: Voice = Voice {
    name: "Lead",
    channel: 0,
    program: 0,
    velocity: 80,
};

const BASS: Voice = Voice {
    name: "Bass",
    channel: 1,
    program: 32,
    velocity: 70,
};

/// Writes a variable-length quantity.
pub fn write_vlq<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    let mut buf = [0u8; 5];
    let mut pos = buf.len() - 1;
    let mut v = value;
    buf[pos] = (v & 0x7F) as u8;
    v >>= 7;
    while v > 0 {
        pos -= 1;
        buf[pos] = ((v & 0x7F) as u8) | 0x80;
        v >>= 7;
    }
    writer.write_all(&buf[pos..])
}

fn write_meta<W: Write>(writer: &mut W, delta: u32, kind: u8, data: &[u8]) -> io::Result<()> {
    write_vlq(writer, delta)?;
    writer.write_u8(META)?;
    writer.write_u8(kind)?;
    write_vlq(writer, data.len() as u32)?;
    writer.write_all(data)
}

fn write_chunk<W: Write>(writer: &mut W, magic: &[u8; 4], data: &[u8]) -> io::Result<()> {
    writer.write_all(magic)?;
    writer.write_u32::<BigEndian>(data.len() as u32)?;
    writer.write_all(data)
}

fn conductor_track(collection: &str) -> io::Result<Vec<u8>> {
    let mut track = Vec::new();
    let name = format!("Millennium Song - {}", collection);
    write_meta(&mut track, 0, META_TRACK_NAME, name.as_bytes())?;
    write_meta(&mut track, 0, META_KEY_SIGNATURE, &KEY_SIGNATURE_EB_MAJOR)?;
    write_meta(&mut track, 0, META_TIME_SIGNATURE, &TIME_SIGNATURE_4_4)?;
    let tempo = TEMPO_US_PER_QUARTER.to_be_bytes();
    write_meta(&mut track, 0, META_TEMPO, &tempo[1..])?;
    write_meta(&mut track, 0, META_END_OF_TRACK, &[])?;
    Ok(track)
}

fn voice_track<'a>(
    voice: Voice,
    notes: impl Iterator<Item = (u32, &'a NoteEvent)>,
) -> Result<Vec<u8>, ChainError> {
    let io_err = |e: io::Error| ChainError::serialization(MIDI_FILE, e);

    let mut track = Vec::new();
    write_meta(&mut track, 0, META_TRACK_NAME, voice.name.as_bytes()).map_err(io_err)?;
    write_vlq(&mut track, 0).map_err(io_err)?;
    track
        .write_all(&[PROGRAM_CHANGE | voice.channel, voice.program])
        .map_err(io_err)?;

    // Rests have no events of their own; their length is carried as the
    // delta of whatever comes next.
    let mut pending: u32 = 0;
    for (beat, note) in notes {
        if note.is_rest() {
            pending = pending.saturating_add(note.duration);
            continue;
        }
        if note.pitch > 0x7F {
            return Err(ChainError::serialization(
                MIDI_FILE,
                format!(
                    "{} pitch {} at beat {} is outside the MIDI note range",
                    voice.name, note.pitch, beat
                ),
            ));
        }

        write_vlq(&mut track, pending).map_err(io_err)?;
        track
            .write_all(&[NOTE_ON | voice.channel, note.pitch, voice.velocity])
            .map_err(io_err)?;
        write_vlq(&mut track, note.duration).map_err(io_err)?;
        track
            .write_all(&[NOTE_OFF | voice.channel, note.pitch, 0])
            .map_err(io_err)?;
        pending = 0;
    }

    write_meta(&mut track, pending, META_END_OF_TRACK, &[]).map_err(io_err)?;
    Ok(track)
}

/// Renders the event list as a Standard MIDI File.
pub fn render(document: &EventListDocument) -> Result<Vec<u8>, ChainError> {
    let io_err = |e: io::Error| ChainError::serialization(MIDI_FILE, e);
    let events: &[BeatEvent] = &document.events;

    let conductor = conductor_track(&document.metadata.collection).map_err(io_err)?;
    let lead = voice_track(LEAD, events.iter().map(|e| (e.beat, &e.lead)))?;
    let bass = voice_track(BASS, events.iter().map(|e| (e.beat, &e.bass)))?;

    let mut out = Vec::with_capacity(14 + 24 + conductor.len() + lead.len() + bass.len());
    let mut header = Vec::with_capacity(6);
    header.write_u16::<BigEndian>(FORMAT_MULTI_TRACK).map_err(io_err)?;
    header.write_u16::<BigEndian>(TRACK_COUNT).map_err(io_err)?;
    header
        .write_u16::<BigEndian>(TICKS_PER_QUARTER as u16)
        .map_err(io_err)?;

    write_chunk(&mut out, HEADER_MAGIC, &header).map_err(io_err)?;
    for track in [&conductor, &lead, &bass] {
        write_chunk(&mut out, TRACK_MAGIC, track).map_err(io_err)?;
    }
    Ok(out)
}
