//! Words command implementation

use anyhow::Result;
use colored::Colorize;
use msong_chain::words::{select_words_from_digest, seven_words_digest};
use msong_chain::Digest;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

use super::json_output::{print_json, CommandOutput};

/// The seven words of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsResult {
    pub token_id: u64,
    /// `keccak256("seven_words_{token_id}")`
    pub words_digest: Digest,
    pub words: Vec<String>,
    /// Words joined with `" | "`, as they appear in the CSV.
    pub joined: String,
}

impl WordsResult {
    pub fn for_token(token_id: u64) -> Self {
        let words_digest = seven_words_digest(token_id);
        let words = select_words_from_digest(&words_digest);
        Self {
            token_id,
            words_digest,
            words: words.as_slice().to_vec(),
            joined: words.joined(),
        }
    }
}

/// Run the words command.
pub fn run(token_id: u64, json: bool) -> Result<ExitCode> {
    let result = WordsResult::for_token(token_id);

    if json {
        print_json(&CommandOutput::success(result))?;
    } else {
        println!("{} {}", "Token:".cyan().bold(), result.token_id);
        println!("{} {}", "Digest:".dimmed(), result.words_digest);
        for (i, word) in result.words.iter().enumerate() {
            println!("  {} {}", format!("{}.", i + 1).dimmed(), word);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_words_for_first_token() {
        let result = WordsResult::for_token(1000);
        assert_eq!(result.words.len(), 7);
        assert_eq!(result.joined, result.words.join(" | "));
        assert_eq!(result.words_digest, seven_words_digest(1000));
    }

    #[test]
    fn test_words_result_json_shape() {
        let value = serde_json::to_value(WordsResult::for_token(1007)).unwrap();
        assert_eq!(value["token_id"], 1007);
        assert_eq!(
            value["joined"],
            "diatonic | scale | transpose | polyphony | allegro | symphony | ornament"
        );
        assert!(value["words_digest"].as_str().unwrap().starts_with("0x"));
    }
}
