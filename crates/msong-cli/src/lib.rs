//! Millennium Song CLI library.
//!
//! Argument definitions and command implementations for the `msong` binary:
//! running a seed chain against the reference oracle, inspecting single-token
//! derivations, and re-verifying written artifacts.

pub mod cli_args;
pub mod commands;
pub mod logging;
