//! Finished run artifacts and the directory writer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::EventListDocument;
use crate::error::ChainError;

pub const NOTATION_FILE: &str = "combined-sequence.abc";
pub const EVENT_LIST_FILE: &str = "combined-midi-info.json";
pub const TABULAR_FILE: &str = "token_metadata.csv";
pub const SUMMARY_FILE: &str = "README.md";
pub const MIDI_FILE: &str = crate::midi::MIDI_FILE;

/// The four text artifacts plus the rendered MIDI file.
///
/// Immutable once built. A failed write leaves the value untouched, so it can
/// be written again elsewhere. The MIDI file is derived from the event list and
/// may be unrenderable (pitches above 127); the text artifacts never depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    notation: String,
    event_list: EventListDocument,
    event_list_json: String,
    tabular: String,
    summary: String,
    /// Rendered bytes, or the reason rendering failed.
    midi: Result<Vec<u8>, String>,
}

impl RunArtifacts {
    pub(crate) fn new(
        notation: String,
        event_list: EventListDocument,
        event_list_json: String,
        tabular: String,
        summary: String,
        midi: Result<Vec<u8>, String>,
    ) -> Self {
        Self {
            notation,
            event_list,
            event_list_json,
            tabular,
            summary,
            midi,
        }
    }

    /// The combined ABC document.
    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn event_list(&self) -> &EventListDocument {
        &self.event_list
    }

    /// The event list as written to disk.
    pub fn event_list_json(&self) -> &str {
        &self.event_list_json
    }

    /// CSV token metadata.
    pub fn tabular(&self) -> &str {
        &self.tabular
    }

    /// Markdown summary.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Standard MIDI File bytes, or `SerializationFailure` if the event
    /// list could not be rendered.
    pub fn midi(&self) -> Result<&[u8], ChainError> {
        match &self.midi {
            Ok(bytes) => Ok(bytes.as_slice()),
            Err(reason) => Err(ChainError::serialization(MIDI_FILE, reason.clone())),
        }
    }

    /// File names and contents, in write order. The MIDI file is left out
    /// when it could not be rendered.
    pub fn files(&self) -> Vec<(&'static str, &[u8])> {
        let mut files = vec![
            (NOTATION_FILE, self.notation.as_bytes()),
            (EVENT_LIST_FILE, self.event_list_json.as_bytes()),
            (TABULAR_FILE, self.tabular.as_bytes()),
            (SUMMARY_FILE, self.summary.as_bytes()),
        ];
        if let Ok(midi) = &self.midi {
            files.push((MIDI_FILE, midi.as_slice()));
        }
        files
    }

    /// BLAKE3 fingerprint over every file name and its contents.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (name, contents) in self.files() {
            hasher.update(name.as_bytes());
            hasher.update(&(contents.len() as u64).to_le_bytes());
            hasher.update(contents);
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Writes every artifact into `dir`, creating it if needed.
    ///
    /// Returns the written paths in write order. An unrenderable MIDI file is
    /// reported as `SerializationFailure` after the text artifacts are written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, ChainError> {
        fs::create_dir_all(dir)
            .map_err(|e| ChainError::serialization(dir.display().to_string(), e))?;

        let mut written = Vec::with_capacity(5);
        for (name, contents) in self.files() {
            let path = dir.join(name);
            fs::write(&path, contents).map_err(|e| ChainError::serialization(name, e))?;
            tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
            written.push(path);
        }
        self.midi()?;
        Ok(written)
    }
}

/// Artifact files that differ between a directory and a set of artifacts.
///
/// Missing files count as differing.
pub fn diff_against_dir(artifacts: &RunArtifacts, dir: &Path) -> Result<Vec<&'static str>, ChainError> {
    let mut differing = Vec::new();
    for (name, expected) in artifacts.files() {
        let path = dir.join(name);
        match fs::read(&path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => differing.push(name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => differing.push(name),
            Err(source) => {
                return Err(ChainError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
    Ok(differing)
}
