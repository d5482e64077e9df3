//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for fitmatch.

use clap::{Parser, Subcommand};

use crate::coordinator::LockScope;
use crate::dataset::OutputFormat;

/// FitMatch - personality-aware team formation
///
/// Reads a participant CSV, forms balanced teams under leadership and
/// diversity constraints, and writes the result as CSV or JSON.
#[derive(Parser, Debug)]
#[command(name = "fitmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Form teams from a participant CSV
    Form(FormArgs),

    /// Write a 20-participant sample CSV
    Sample {
        /// Where to write the sample file
        #[arg(short, long, default_value = "participants_sample.csv")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Classify a personality score or a set of survey answers
    Classify {
        /// Personality score (20-100)
        #[arg(required_unless_present = "responses", conflicts_with = "responses", allow_negative_numbers = true)]
        score: Option<i32>,

        /// Five survey answers on a 1-5 scale, comma separated
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        responses: Option<Vec<i32>>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Options for `fitmatch form`; unset values fall back to configuration
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// Participant CSV file
    #[arg(short, long)]
    pub input: Option<String>,

    /// Members per team (minimum 3)
    #[arg(short = 's', long)]
    pub team_size: Option<usize>,

    /// Write teams to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output file format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Form teams on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Worker threads (0 = one per logical core)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Span of the shared pool lock during concurrent formation
    #[arg(long, value_enum)]
    pub lock_scope: Option<LockScope>,

    /// Path to configuration file
    #[arg(short, long, env = "FITMATCH_CONFIG")]
    pub config: Option<String>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
