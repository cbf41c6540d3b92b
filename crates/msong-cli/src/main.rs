//! msong - Command-line interface for Millennium Song seed-chain runs
//!
//! This binary runs collections against the reference oracle, derives
//! single-token seeds and words, and verifies previously written artifacts.

use clap::Parser;
use std::process::ExitCode;

use msong_cli::cli_args::{Cli, Commands};
use msong_cli::{commands, logging};

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            run,
            out_dir,
            checkpoint,
            json,
        } => commands::generate::run(&run, out_dir.as_deref(), checkpoint.as_deref(), json),
        Commands::Words { token_id, json } => commands::words::run(token_id, json),
        Commands::Seed {
            phrase,
            token_id,
            index,
            running_digest,
            json,
        } => commands::seed::run(&phrase, token_id, index, &running_digest, json),
        Commands::Verify { dir, run, json } => commands::verify::run(&dir, &run, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            commands::exit_code_for(&e)
        }
    }
}
