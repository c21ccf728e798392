#![forbid(unsafe_code)]

//! `aidsec` command line host.
//!
//! Runs the security-incidents page without a browser: widgets draw into a
//! JSON-lines renderer, so every chart the page would show comes out as one
//! frame per line. CSV text comes from disk or over HTTP.

pub mod cli;
pub mod error;
pub mod logging;
pub mod source;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};
