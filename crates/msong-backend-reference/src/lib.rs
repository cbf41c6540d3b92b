//! Millennium Song Reference Oracle
//!
//! A local, deterministic implementation of the beat oracle interface. It
//! generates a lead and a bass voice in Eb major from a 32-bit token seed,
//! following the same music library the on-chain generator was modeled on:
//!
//! - **Phrase grammar**: 8-beat phrases in the order A A' B A A' C A
//! - **Harmony**: a seven-chord cycle with neighbor moves, tonic resets every
//!   50 beats, and per-phrase motion styles
//! - **Lead**: chord tones with phrase-dependent rhythm and rests
//! - **Bass**: weighted extended chord tones on a half/quarter/half/eighth
//!   pattern, never resting
//!
//! It makes no claim of bit parity with the deployed contract. Use it to run
//! the full pipeline offline.
//!
//! # Example
//!
//! ```
//! use msong_backend_reference::ReferenceOracle;
//! use msong_chain::BeatOracle;
//!
//! let oracle = ReferenceOracle::new();
//! let beat = oracle.generate_beat(0, 12345).unwrap();
//! assert_eq!(beat.bass.duration, 960);
//! ```

pub mod error;
pub mod harmony;
pub mod oracle;
pub mod rng;
pub mod voice;

pub use error::ReferenceOracleError;
pub use oracle::{ReferenceOracle, DEFAULT_MAX_BEATS};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "msong-backend-reference";
