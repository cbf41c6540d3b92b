//! CLI argument definitions for the msong command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};

/// msong - Millennium Song seed-chain generator
#[derive(Parser)]
#[command(name = "msong")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Run configuration flags shared by `generate` and `verify`.
///
/// Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    /// Path to a JSON run configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Collection phrase (hashed into the collection salt)
    #[arg(short, long)]
    pub phrase: Option<String>,

    /// Reveal year of the first token
    #[arg(long)]
    pub start_year: Option<u32>,

    /// Number of tokens to generate
    #[arg(short = 'n', long)]
    pub tokens: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the seed chain with the reference oracle and write all artifacts
    Generate {
        #[command(flatten)]
        run: RunOverrides,

        /// Output directory (default: ./OUTPUTS/<phrase slug>)
        #[arg(short, long)]
        out_dir: Option<String>,

        /// Checkpoint file; resumed from if present, updated as the run progresses
        #[arg(long)]
        checkpoint: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the seven words for a token id
    Words {
        /// Token id (1000, 1007, ...)
        #[arg(short, long)]
        token_id: u64,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive the final and working seed for one token
    Seed {
        /// Collection phrase
        #[arg(short, long)]
        phrase: String,

        /// Token id
        #[arg(short, long)]
        token_id: u64,

        /// Reveal index (selects the default auxiliary digest)
        #[arg(short, long)]
        index: u32,

        /// Running note digest before this token (64 hex characters, optional 0x)
        #[arg(short, long, default_value = "0x0000000000000000000000000000000000000000000000000000000000000000")]
        running_digest: String,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate a run and compare it byte-for-byte with a directory
    Verify {
        /// Directory holding previously written artifacts
        #[arg(short, long)]
        dir: String,

        #[command(flatten)]
        run: RunOverrides,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}
