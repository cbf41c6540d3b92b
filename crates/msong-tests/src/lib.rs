//! Millennium Song End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the seed-chain pipeline:
//!
//! - Runs: configuration -> token loop -> five artifacts
//! - Chain dependency: every seed after token k depends on token k's notes
//! - **Determinism**: byte-identical artifacts across repeated runs
//! - Checkpoints: resumed runs match uninterrupted ones
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p msong-tests
//! ```
//!
//! ## Determinism Testing
//!
//! ```rust,ignore
//! use msong_tests::determinism::verify_determinism;
//! use msong_tests::fixtures::{stub_config, StubOracle};
//!
//! let result = verify_determinism(
//!     || generate_collection(stub_config(3), StubOracle).unwrap().midi().unwrap().to_vec(),
//!     3,
//! );
//! result.assert_deterministic();
//! ```

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{
    artifact_hashes, compute_hash, verify_determinism, verify_hash_determinism, DeterminismResult,
    DiffInfo,
};
pub use fixtures::{stub_config, FailingOracle, RunDirFixture, ShiftedOracle, StubOracle};
