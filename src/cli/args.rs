//! CLI argument definitions using clap
//!
//! Commands:
//! - placegraph migrate --config <path>
//! - placegraph validate --config <path> [--kind <kind>] [--file <path>]
//! - placegraph check --config <path>
//! - placegraph schema [--kind <kind>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::EntityKind;

/// placegraph - schema and relationship validator for Place graphs
#[derive(Parser, Debug)]
#[command(name = "placegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install schema definitions into the store (idempotent)
    Migrate {
        /// Path to configuration file
        #[arg(long, default_value = "./placegraph.json")]
        config: PathBuf,
    },

    /// Validate one document against the store
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./placegraph.json")]
        config: PathBuf,

        /// Entity kind of the document
        #[arg(long, default_value = "place")]
        kind: EntityKind,

        /// Document file; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate every Place in the store
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./placegraph.json")]
        config: PathBuf,
    },

    /// Print built-in schema definitions
    Schema {
        /// Only this entity kind
        #[arg(long)]
        kind: Option<EntityKind>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
