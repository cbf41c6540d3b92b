//! Verify command implementation
//!
//! Regenerates a run from its configuration and compares every artifact
//! byte-for-byte with a directory written earlier.

use anyhow::{Context, Result};
use colored::Colorize;
use msong_backend_reference::ReferenceOracle;
use msong_chain::{diff_against_dir, generate_collection, RunArtifacts};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, print_json, CommandOutput, JsonError};
use super::{exit_status_for, resolve_config, EXIT_CONFIG, EXIT_GENERATION};
use crate::cli_args::RunOverrides;

/// Outcome of comparing a regenerated run with a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub dir: String,
    /// Fingerprint of the regenerated artifacts.
    pub fingerprint: String,
    /// Artifact file names that were compared.
    pub checked: Vec<String>,
    /// Artifact file names that are missing or differ.
    pub mismatched: Vec<String>,
}

impl VerifyResult {
    pub fn passed(&self) -> bool {
        self.mismatched.is_empty()
    }
}

/// Run the verify command.
///
/// Exits 0 when every artifact matches and 2 when any differs.
pub fn run(dir: &str, overrides: &RunOverrides, json: bool) -> Result<ExitCode> {
    if json {
        run_json(dir, overrides)
    } else {
        run_human(dir, overrides)
    }
}

fn run_human(dir: &str, overrides: &RunOverrides) -> Result<ExitCode> {
    let config = resolve_config(overrides)?;
    println!("{} {}", "Verifying:".cyan().bold(), dir);
    println!(
        "{} {} ({} tokens)",
        "Collection:".cyan().bold(),
        config.collection_phrase,
        config.num_tokens
    );

    let result = execute(dir, overrides)?;

    println!();
    for name in &result.checked {
        if result.mismatched.contains(name) {
            println!("  {} {}", "x".red(), name);
        } else {
            println!("  {} {}", "ok".green(), name);
        }
    }
    println!("{} {}", "Fingerprint:".dimmed(), result.fingerprint);

    if result.passed() {
        println!("\n{} {}", "Result:".cyan().bold(), "PASSED".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} {} ({} of {} artifacts differ)",
            "Result:".cyan().bold(),
            "FAILED".red().bold(),
            result.mismatched.len(),
            result.checked.len()
        );
        Ok(ExitCode::from(EXIT_GENERATION))
    }
}

fn run_json(dir: &str, overrides: &RunOverrides) -> Result<ExitCode> {
    match execute(dir, overrides) {
        Ok(result) if result.passed() => {
            print_json(&CommandOutput::success(result))?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(result) => {
            let errors = result
                .mismatched
                .iter()
                .map(|name| {
                    JsonError::new(error_codes::ARTIFACT_MISMATCH, "artifact differs from regenerated output")
                        .with_file(name.as_str())
                })
                .collect();
            print_json(&CommandOutput::rejected(result, errors))?;
            Ok(ExitCode::from(EXIT_GENERATION))
        }
        Err(e) => {
            let status = exit_status_for(&e);
            let code = if status == EXIT_CONFIG {
                error_codes::CONFIG_LOAD
            } else {
                error_codes::GENERATION
            };
            let output: CommandOutput<VerifyResult> =
                CommandOutput::failure(vec![JsonError::from_error(&e, code).with_file(dir)]);
            print_json(&output)?;
            Ok(ExitCode::from(status))
        }
    }
}

/// Regenerates the configured run and diffs it against `dir`.
pub fn execute(dir: &str, overrides: &RunOverrides) -> Result<VerifyResult> {
    let config = resolve_config(overrides)?;
    let artifacts = generate_collection(config, ReferenceOracle::new())
        .context("Failed to regenerate run")?;
    compare(&artifacts, dir)
}

fn compare(artifacts: &RunArtifacts, dir: &str) -> Result<VerifyResult> {
    let mismatched = diff_against_dir(artifacts, Path::new(dir))
        .with_context(|| format!("Failed to read artifacts from {}", dir))?;

    Ok(VerifyResult {
        dir: dir.to_string(),
        fingerprint: artifacts.fingerprint(),
        checked: artifacts.files().iter().map(|(name, _)| name.to_string()).collect(),
        mismatched: mismatched.into_iter().map(str::to_string).collect(),
    })
}
