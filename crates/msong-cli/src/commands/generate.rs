//! Generate command implementation
//!
//! Runs a full collection against the reference oracle and writes the five
//! artifacts. With `--checkpoint`, an existing checkpoint is resumed and the
//! file is rewritten every `progress_interval` tokens and at the end.

use anyhow::{Context, Result};
use colored::Colorize;
use msong_backend_reference::ReferenceOracle;
use msong_chain::{Checkpoint, Digest, Run, RunConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use super::json_output::{error_codes, print_json, CommandOutput, JsonError};
use super::{default_out_dir, exit_status_for, resolve_config};
use crate::cli_args::RunOverrides;

/// Result payload of a completed generate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub collection: String,
    pub collection_salt: Digest,
    pub num_tokens: u32,
    pub start_year: u32,
    pub end_year: u32,
    pub out_dir: String,
    /// Paths of the written artifacts, in write order.
    pub files: Vec<String>,
    /// Running note digest after the last token.
    pub final_digest: Digest,
    /// blake3 fingerprint over all artifact bytes.
    pub fingerprint: String,
    /// Token index the run was resumed at, when a checkpoint was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumed_from: Option<u32>,
}

/// Run the generate command.
///
/// # Arguments
/// * `overrides` - Config file and flag overrides
/// * `out_dir` - Output directory (default: `./OUTPUTS/<phrase slug>`)
/// * `checkpoint` - Optional checkpoint file to resume from and update
/// * `json` - Print a JSON envelope instead of colored text
pub fn run(
    overrides: &RunOverrides,
    out_dir: Option<&str>,
    checkpoint: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    if json {
        run_json(overrides, out_dir, checkpoint)
    } else {
        run_human(overrides, out_dir, checkpoint)
    }
}

fn run_human(overrides: &RunOverrides, out_dir: Option<&str>, checkpoint: Option<&str>) -> Result<ExitCode> {
    let start = Instant::now();
    let config = resolve_config(overrides)?;
    let out_dir = resolve_out_dir(&config, out_dir);

    println!("{} {}", "Collection:".cyan().bold(), config.collection_phrase);
    println!("{} {}", "Salt:".dimmed(), config.collection_salt());
    println!(
        "{} {} ({}-{})",
        "Tokens:".cyan().bold(),
        config.num_tokens,
        config.start_year,
        config.end_year()
    );
    println!("{} {}", "Output:".cyan().bold(), out_dir.display());
    if let Some(path) = checkpoint {
        println!("{} {}", "Checkpoint:".dimmed(), path);
    }

    let result = execute(config, &out_dir, checkpoint.map(Path::new))?;

    if let Some(index) = result.resumed_from {
        println!("{} resumed at token index {}", "Checkpoint:".dimmed(), index);
    }
    println!(
        "\n{} wrote {} files in {:.2}s",
        "SUCCESS".green().bold(),
        result.files.len(),
        start.elapsed().as_secs_f64()
    );
    for file in &result.files {
        println!("  {}", file);
    }
    println!("{} {}", "Final digest:".dimmed(), result.final_digest);
    println!("{} {}", "Fingerprint:".dimmed(), result.fingerprint);

    Ok(ExitCode::SUCCESS)
}

fn run_json(overrides: &RunOverrides, out_dir: Option<&str>, checkpoint: Option<&str>) -> Result<ExitCode> {
    let outcome = resolve_config(overrides).and_then(|config| {
        let out_dir = resolve_out_dir(&config, out_dir);
        execute(config, &out_dir, checkpoint.map(Path::new))
    });

    match outcome {
        Ok(result) => {
            print_json(&CommandOutput::success(result))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let code = if exit_status_for(&e) == super::EXIT_CONFIG {
                error_codes::CONFIG_LOAD
            } else {
                error_codes::GENERATION
            };
            let output: CommandOutput<GenerateResult> =
                CommandOutput::failure(vec![JsonError::from_error(&e, code)]);
            print_json(&output)?;
            Ok(ExitCode::from(exit_status_for(&e)))
        }
    }
}

fn resolve_out_dir(config: &RunConfig, out_dir: Option<&str>) -> PathBuf {
    match out_dir {
        Some(dir) => PathBuf::from(dir),
        None => default_out_dir(&config.collection_phrase),
    }
}

/// Runs the collection, checkpointing along the way, and writes artifacts.
pub fn execute(config: RunConfig, out_dir: &Path, checkpoint: Option<&Path>) -> Result<GenerateResult> {
    let oracle = ReferenceOracle::new();

    let (mut run, resumed_from) = match checkpoint.filter(|path| path.exists()) {
        Some(path) => {
            let saved = Checkpoint::load(path)
                .with_context(|| format!("Failed to load checkpoint: {}", path.display()))?;
            let next_index = saved.next_index;
            let run = Run::resume(config, oracle, saved)
                .with_context(|| format!("Checkpoint does not match this run: {}", path.display()))?;
            tracing::info!(next_index, path = %path.display(), "resuming from checkpoint");
            (run, Some(next_index))
        }
        None => (Run::new(config, oracle)?, None),
    };

    let interval = run.config().progress_interval as usize;
    run.run_to_end_with(|run| match checkpoint {
        Some(path) if run.is_complete() || run.records().len() % interval == 0 => {
            run.checkpoint().save(path)
        }
        _ => Ok(()),
    })?;

    let collection = run.config().collection_phrase.clone();
    let collection_salt = run.collection_salt();
    let num_tokens = run.config().num_tokens;
    let start_year = run.config().start_year;
    let end_year = run.config().end_year();
    let final_digest = run.running_digest();

    let artifacts = run.finalize()?;
    let written = artifacts.write_to_dir(out_dir)?;

    Ok(GenerateResult {
        collection,
        collection_salt,
        num_tokens,
        start_year,
        end_year,
        out_dir: out_dir.display().to_string(),
        files: written.iter().map(|p| p.display().to_string()).collect(),
        final_digest,
        fingerprint: artifacts.fingerprint(),
        resumed_from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use msong_chain::artifacts::{EVENT_LIST_FILE, MIDI_FILE, NOTATION_FILE, SUMMARY_FILE, TABULAR_FILE};
    use msong_chain::generate_collection;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn small_config(n: u32) -> RunConfig {
        let mut config = RunConfig::new("test phrase", n);
        config.progress_interval = 2;
        config
    }

    #[test]
    fn test_execute_writes_all_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");

        let result = execute(small_config(3), &out, None).unwrap();
        assert_eq!(result.files.len(), 5);
        assert_eq!(result.num_tokens, 3);
        assert_eq!(result.end_year, 2028);
        assert!(result.resumed_from.is_none());
        for name in [NOTATION_FILE, EVENT_LIST_FILE, TABULAR_FILE, SUMMARY_FILE, MIDI_FILE] {
            assert!(out.join(name).is_file(), "missing {}", name);
        }

        let expected = generate_collection(small_config(3), ReferenceOracle::new()).unwrap();
        assert_eq!(result.fingerprint, expected.fingerprint());
        assert_eq!(fs::read_to_string(out.join(TABULAR_FILE)).unwrap(), expected.tabular());
    }

    #[test]
    fn test_execute_saves_and_resumes_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt = tmp.path().join("run.ckpt.json");

        let first = execute(small_config(5), &tmp.path().join("a"), Some(&ckpt)).unwrap();
        let saved = Checkpoint::load(&ckpt).unwrap();
        assert_eq!(saved.next_index, 5);
        assert_eq!(saved.running_digest, first.final_digest);

        let second = execute(small_config(5), &tmp.path().join("b"), Some(&ckpt)).unwrap();
        assert_eq!(second.resumed_from, Some(5));
        assert_eq!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn test_execute_resumes_partial_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt = tmp.path().join("partial.json");

        let mut partial = Run::new(small_config(4), ReferenceOracle::new()).unwrap();
        partial.step().unwrap();
        partial.step().unwrap();
        partial.checkpoint().save(&ckpt).unwrap();

        let resumed = execute(small_config(4), &tmp.path().join("out"), Some(&ckpt)).unwrap();
        let fresh = execute(small_config(4), &tmp.path().join("fresh"), None).unwrap();
        assert_eq!(resumed.resumed_from, Some(2));
        assert_eq!(resumed.fingerprint, fresh.fingerprint);
        assert_eq!(resumed.final_digest, fresh.final_digest);
    }

    #[test]
    fn test_execute_rejects_foreign_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt = tmp.path().join("other.json");
        execute(RunConfig::new("other phrase", 2), &tmp.path().join("a"), Some(&ckpt)).unwrap();

        let err = execute(small_config(2), &tmp.path().join("b"), Some(&ckpt)).unwrap_err();
        assert_eq!(exit_status_for(&err), super::super::EXIT_CONFIG);
    }
}
