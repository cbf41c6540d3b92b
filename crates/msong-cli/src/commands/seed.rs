//! Seed command implementation
//!
//! Derives one token's final and working seed outside of a run, given the
//! running note digest the token would see.

use anyhow::{Context, Result};
use colored::Colorize;
use msong_chain::seed::global_label_digest;
use msong_chain::words::seven_words_digest;
use msong_chain::{collection_salt, derive_seed, Digest};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

use super::json_output::{error_codes, print_json, CommandOutput, JsonError};
use super::EXIT_CONFIG;

/// Every input and output of one seed derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResult {
    pub collection_salt: Digest,
    pub token_id: u64,
    pub index: u32,
    pub words_digest: Digest,
    pub running_digest: Digest,
    pub aux_digest: Digest,
    pub final_seed: Digest,
    pub working_seed: u32,
}

impl SeedResult {
    pub fn derive(phrase: &str, token_id: u64, index: u32, running_digest: Digest) -> Self {
        let salt = collection_salt(phrase);
        let words_digest = seven_words_digest(token_id);
        let aux_digest = global_label_digest(index);
        let seed = derive_seed(&salt, token_id, &words_digest, &running_digest, &aux_digest);
        Self {
            collection_salt: salt,
            token_id,
            index,
            words_digest,
            running_digest,
            aux_digest,
            final_seed: seed.final_seed,
            working_seed: seed.working_seed,
        }
    }
}

/// Run the seed command.
pub fn run(phrase: &str, token_id: u64, index: u32, running_digest: &str, json: bool) -> Result<ExitCode> {
    let parsed = Digest::from_hex(running_digest);

    if json {
        let output = match parsed {
            Ok(digest) => CommandOutput::success(SeedResult::derive(phrase, token_id, index, digest)),
            Err(e) => {
                print_json(&CommandOutput::<SeedResult>::failure(vec![JsonError::new(
                    error_codes::INVALID_DIGEST,
                    e.to_string(),
                )]))?;
                return Ok(ExitCode::from(EXIT_CONFIG));
            }
        };
        print_json(&output)?;
        return Ok(ExitCode::SUCCESS);
    }

    let digest = parsed.context("Invalid --running-digest")?;
    let result = SeedResult::derive(phrase, token_id, index, digest);

    println!("{} {}", "Collection salt:".cyan().bold(), result.collection_salt);
    println!("{} {} (index {})", "Token:".cyan().bold(), result.token_id, result.index);
    println!("{} {}", "Words digest:".dimmed(), result.words_digest);
    println!("{} {}", "Running digest:".dimmed(), result.running_digest);
    println!("{} {}", "Aux digest:".dimmed(), result.aux_digest);
    println!("{} {}", "Final seed:".green().bold(), result.final_seed);
    println!("{} {}", "Working seed:".green().bold(), result.working_seed);

    Ok(ExitCode::SUCCESS)
}
