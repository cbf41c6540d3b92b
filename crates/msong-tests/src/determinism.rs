//! Determinism checks over generated artifacts.
//!
//! A run is a pure function of its configuration and oracle: repeating it
//! must reproduce every artifact byte for byte.

use msong_chain::RunArtifacts;
use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the reference output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the reference output.
    pub hash: String,
    /// First difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// The first byte difference found between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the difference.
    pub offset: usize,
    /// Byte from the first run (`None` past its end).
    pub expected: Option<u8>,
    /// Byte from the differing run (`None` past its end).
    pub actual: Option<u8>,
    /// Which run (0-indexed) differed.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| match b {
            Some(b) => format!("0x{:02X}", b),
            None => "<eof>".to_string(),
        };
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            show(self.expected),
            show(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Runs `generate_fn` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference_bytes = reference.as_ref();
    let hash = compute_hash(reference_bytes);

    for run_index in 1..runs {
        let output = generate_fn();
        if let Some(diff) = find_first_difference(reference_bytes, output.as_ref(), run_index) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference_bytes.len(),
                hash,
                diff_info: Some(diff),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference_bytes.len(),
        hash,
        diff_info: None,
    }
}

fn find_first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let len = expected.len().max(actual.len());
    (0..len)
        .find(|&i| expected.get(i) != actual.get(i))
        .map(|offset| DiffInfo {
            offset,
            expected: expected.get(offset).copied(),
            actual: actual.get(offset).copied(),
            run_index,
        })
}

/// Whether every hash equals the first.
pub fn verify_hash_determinism(hashes: &[String]) -> bool {
    match hashes.first() {
        Some(reference) => hashes.iter().all(|h| h == reference),
        None => true,
    }
}

/// Compute BLAKE3 hash of data.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// BLAKE3 hash of each artifact, keyed by file name.
pub fn artifact_hashes(artifacts: &RunArtifacts) -> Vec<(&'static str, String)> {
    artifacts
        .files()
        .iter()
        .map(|(name, bytes)| (*name, compute_hash(bytes)))
        .collect()
}
