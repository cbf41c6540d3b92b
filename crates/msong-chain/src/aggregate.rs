//! Output builders fed once per token.
//!
//! Each builder is append-only and reads nothing but the [`TokenRecord`] it is
//! given; none of them can reach the running digest or influence a seed.
//! [`RunAggregator`] drives all of them and is consumed by `finalize`.

use serde::{Deserialize, Serialize};

use crate::artifacts::RunArtifacts;
use crate::error::ChainError;
use crate::midi;
use crate::notation::{document_header, token_comment};
use crate::oracle::NoteEvent;
use crate::token::TokenRecord;

/// Key named in the event-list metadata.
pub const KEY_NAME: &str = "Eb major";

/// Header line of the tabular document.
pub const CSV_HEADER: &str = "token_id,reveal_index,reveal_year,seven_words,lead_pitch,lead_duration,bass_pitch,bass_duration,final_seed_preview,collection_phrase";

/// Quotes a CSV field if it contains a comma, quote, or line break.
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Accumulates the combined notation document.
#[derive(Debug, Clone)]
pub struct NotationBuilder {
    header: String,
    body: String,
}

impl NotationBuilder {
    pub fn new(collection_phrase: &str) -> Self {
        Self {
            header: document_header(collection_phrase),
            body: String::new(),
        }
    }

    pub fn push(&mut self, record: &TokenRecord) {
        let ordinal = &record.ordinal;
        self.body.push_str(&token_comment(
            ordinal.token_id,
            ordinal.reveal_year,
            ordinal.index,
        ));
        self.body.push('\n');
        self.body.push_str(&record.fragment);
        self.body.push('\n');
    }

    pub fn finish(self) -> String {
        self.header + &self.body
    }
}

/// One entry of the event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatEvent {
    pub beat: u32,
    pub lead: NoteEvent,
    pub bass: NoteEvent,
}

/// Metadata block of the event-list document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListMetadata {
    pub collection: String,
    pub key: String,
    #[serde(rename = "numTokens")]
    pub num_tokens: u32,
}

/// The structured event-list document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListDocument {
    pub metadata: EventListMetadata,
    pub events: Vec<BeatEvent>,
}

impl EventListDocument {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a document previously written by [`to_json_pretty`](Self::to_json_pretty).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Accumulates beat events in token order.
#[derive(Debug, Clone, Default)]
pub struct EventListBuilder {
    events: Vec<BeatEvent>,
}

impl EventListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &TokenRecord) {
        self.events.push(BeatEvent {
            beat: record.ordinal.index,
            lead: record.beat.lead,
            bass: record.beat.bass,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finish(self, collection_phrase: &str) -> EventListDocument {
        EventListDocument {
            metadata: EventListMetadata {
                collection: collection_phrase.to_string(),
                key: KEY_NAME.to_string(),
                num_tokens: self.events.len() as u32,
            },
            events: self.events,
        }
    }
}

/// Accumulates token metadata rows.
#[derive(Debug, Clone)]
pub struct TabularBuilder {
    phrase_field: String,
    rows: Vec<String>,
}

impl TabularBuilder {
    pub fn new(collection_phrase: &str) -> Self {
        Self {
            phrase_field: csv_escape(collection_phrase),
            rows: vec![CSV_HEADER.to_string()],
        }
    }

    pub fn push(&mut self, record: &TokenRecord) {
        let ordinal = &record.ordinal;
        let beat = &record.beat;
        self.rows.push(format!(
            "{},{},{},\"{}\",{},{},{},{},{},{}",
            ordinal.token_id,
            ordinal.index,
            ordinal.reveal_year,
            record.seven_words.joined().replace('"', "\"\""),
            beat.lead.pitch,
            beat.lead.duration,
            beat.bass.pitch,
            beat.bass.duration,
            record.final_seed.preview(),
            self.phrase_field,
        ));
    }

    /// Rows joined by `\n`, header first, no trailing newline.
    pub fn finish(self) -> String {
        self.rows.join("\n")
    }
}

/// Markdown summary of a finished run.
pub fn compose_summary(collection_phrase: &str, num_tokens: u32, start_year: u32, end_year: u32) -> String {
    format!(
        "# Blockchain Simulation Output\n\
         \n\
         **Collection:** {}\n\
         **Tokens:** {}\n\
         **Years:** {} to {}\n\
         \n\
         ## Files\n\
         - `combined-sequence.abc` - ABC notation\n\
         - `combined-midi-info.json` - Beat events (lead and bass pitch/duration)\n\
         - `token_metadata.csv` - Token metadata\n\
         - `combined-sequence.mid` - Standard MIDI file rendered from the beat events\n",
        collection_phrase, num_tokens, start_year, end_year
    )
}

/// Feeds every builder from each completed token.
#[derive(Debug, Clone)]
pub struct RunAggregator {
    collection_phrase: String,
    start_year: u32,
    last_year: Option<u32>,
    notation: NotationBuilder,
    events: EventListBuilder,
    table: TabularBuilder,
}

impl RunAggregator {
    pub fn new(collection_phrase: &str, start_year: u32) -> Self {
        Self {
            collection_phrase: collection_phrase.to_string(),
            start_year,
            last_year: None,
            notation: NotationBuilder::new(collection_phrase),
            events: EventListBuilder::new(),
            table: TabularBuilder::new(collection_phrase),
        }
    }

    /// Appends one token to every builder.
    pub fn record(&mut self, record: &TokenRecord) {
        self.notation.push(record);
        self.events.push(record);
        self.table.push(record);
        self.last_year = Some(record.ordinal.reveal_year);
    }

    /// Number of tokens recorded.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Produces the finished artifacts.
    ///
    /// Fails with `RunState` if nothing was recorded, or with
    /// `SerializationFailure` if an artifact cannot be encoded.
    pub fn finalize(self) -> Result<RunArtifacts, ChainError> {
        let end_year = self
            .last_year
            .ok_or_else(|| ChainError::RunState("no tokens were recorded".to_string()))?;
        let num_tokens = self.events.len() as u32;

        let event_list = self.events.finish(&self.collection_phrase);
        let event_list_json = event_list
            .to_json_pretty()
            .map_err(|e| ChainError::serialization(crate::artifacts::EVENT_LIST_FILE, e))?;
        let midi = midi::render(&event_list).map_err(|e| {
            tracing::warn!(error = %e, "MIDI rendering failed; text artifacts are unaffected");
            match e {
                ChainError::SerializationFailure { source, .. } => source.to_string(),
                other => other.to_string(),
            }
        });

        Ok(RunArtifacts::new(
            self.notation.finish(),
            event_list,
            event_list_json,
            self.table.finish(),
            compose_summary(&self.collection_phrase, num_tokens, self.start_year, end_year),
            midi,
        ))
    }
}
