//! CLI command implementations

pub mod generate;
pub mod json_output;
pub mod seed;
pub mod verify;
pub mod words;

use anyhow::{Context, Result};
use msong_chain::{ChainError, RunConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli_args::RunOverrides;

/// Exit code for configuration and input errors.
pub const EXIT_CONFIG: u8 = 1;

/// Exit code for failures while generating, writing, or verifying a run.
pub const EXIT_GENERATION: u8 = 2;

/// Root under which default output directories are created.
pub const DEFAULT_OUTPUT_ROOT: &str = "OUTPUTS";

/// Whether a chain error stems from bad input rather than a failed run.
pub fn is_config_error(err: &ChainError) -> bool {
    matches!(
        err,
        ChainError::InvalidConfig(_)
            | ChainError::VocabularyMismatch(_)
            | ChainError::InvalidCheckpoint(_)
            | ChainError::MalformedDigestInput(_)
            | ChainError::Read { .. }
            | ChainError::JsonParse(_)
    )
}

/// Maps a command error to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status_for(err))
}

pub(crate) fn exit_status_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ChainError>() {
        Some(chain) if is_config_error(chain) => EXIT_CONFIG,
        _ => EXIT_GENERATION,
    }
}

/// Builds the run configuration from an optional config file plus flags.
///
/// Flags take precedence over file values. The result is validated.
pub fn resolve_config(overrides: &RunOverrides) -> Result<RunConfig> {
    let mut config = match &overrides.config {
        Some(path) => RunConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load run configuration: {}", path))?,
        None => RunConfig::default(),
    };

    if let Some(phrase) = &overrides.phrase {
        config.collection_phrase = phrase.clone();
    }
    if let Some(start_year) = overrides.start_year {
        config.start_year = start_year;
    }
    if let Some(tokens) = overrides.tokens {
        config.num_tokens = tokens;
    }

    config.validate()?;
    Ok(config)
}

/// Lowercase, dash-separated form of a phrase for directory names.
pub fn phrase_slug(phrase: &str) -> String {
    let mut slug = String::with_capacity(phrase.len());
    for c in phrase.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "collection".to_string()
    } else {
        slug
    }
}

/// `./OUTPUTS/<phrase slug>`
pub fn default_out_dir(phrase: &str) -> PathBuf {
    Path::new(DEFAULT_OUTPUT_ROOT).join(phrase_slug(phrase))
}
