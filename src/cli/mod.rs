//! CLI module for placegraph
//!
//! Provides command-line interface for:
//! - migrate: Install schema definitions into a store
//! - validate: Validate one document
//! - check: Validate every stored Place
//! - schema: Print built-in schema definitions

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, migrate, run, run_command, schema, validate};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, read_document, write_error, write_response};
