//! Millennium Song Seed Chain
//!
//! This crate derives one deterministic seed per token of a fixed-size
//! collection, obtains a two-voice beat for each seed from a pluggable oracle,
//! and folds every beat back into a running digest that feeds the next
//! token's seed. The completed run is serialized into notation, event-list,
//! tabular, summary, and MIDI artifacts.
//!
//! # Overview
//!
//! For token `i` (token id `1000 + 7i`, reveal year `start_year + i`):
//!
//! 1. Select seven words from `keccak256("seven_words_{id}")`.
//! 2. Derive the final seed from the collection salt, token id, words digest,
//!    running note digest, and auxiliary digest.
//! 3. Ask the [`BeatOracle`] for a beat and its notation fragment.
//! 4. Fold the beat's pitches into the running digest.
//! 5. Record the token in every output builder.
//!
//! # Example
//!
//! ```
//! use msong_chain::{generate_collection, Beat, BeatOracle, NoteEvent, OracleError, RunConfig};
//! use msong_chain::notation::beat_fragment;
//!
//! struct Stub;
//!
//! impl BeatOracle for Stub {
//!     fn generate_beat(&self, index: u32, _seed: u32) -> Result<Beat, OracleError> {
//!         Ok(Beat::new(NoteEvent::new(60 + index as u8, 4), NoteEvent::new(36 + index as u8, 4)))
//!     }
//!
//!     fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
//!         Ok(beat_fragment(&self.generate_beat(index, seed)?))
//!     }
//! }
//!
//! let artifacts = generate_collection(RunConfig::new("test phrase", 3), Stub).unwrap();
//! assert_eq!(artifacts.tabular().lines().count(), 4);
//! assert_eq!(artifacts.event_list().events.len(), 3);
//! ```
//!
//! # Modules
//!
//! - [`hash`]: Keccak-256 digests
//! - [`words`]: Seven-word selection
//! - [`seed`]: Final and working seed derivation
//! - [`oracle`]: The beat oracle interface
//! - [`chain`]: The running note digest
//! - [`notation`]: ABC rendering
//! - [`aggregate`]: Output builders
//! - [`artifacts`]: Finished artifacts and the directory writer
//! - [`midi`]: Standard MIDI File rendering
//! - [`checkpoint`]: Resumable run state
//! - [`run`]: The token loop

pub mod aggregate;
pub mod artifacts;
pub mod chain;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod hash;
pub mod midi;
pub mod notation;
pub mod oracle;
pub mod run;
pub mod seed;
pub mod token;
pub mod words;

pub use aggregate::{BeatEvent, EventListDocument, EventListMetadata, RunAggregator};
pub use artifacts::{diff_against_dir, RunArtifacts};
pub use chain::{fold_notes, NoteChain};
pub use checkpoint::{Checkpoint, CHECKPOINT_VERSION};
pub use config::RunConfig;
pub use error::{BackendError, ChainError, OracleError};
pub use hash::{collection_salt, keccak256, Digest};
pub use oracle::{Beat, BeatOracle, NoteEvent, REST_PITCH};
pub use run::{generate_collection, Run, RunPhase};
pub use seed::{derive_seed, AuxDigestPolicy, DerivedSeed};
pub use token::{TokenOrdinal, TokenRecord};
pub use words::{select_words, SevenWords, VOCABULARY};
