//! Command-line interface definition for mnemo
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for saving turns, inspecting history and stats,
//! and managing stored sessions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mnemo - Hybrid conversation memory engine
///
/// Persists per-session conversation state: a token-budgeted recent
/// buffer, a rolling summary of older turns, and an append-only
/// transcript.
#[derive(Parser, Debug, Clone)]
#[command(name = "mnemo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the database path from config
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for mnemo
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Record one completed turn for a session
    Save {
        /// Session identifier; a fresh one is generated when omitted
        #[arg(short, long)]
        session: Option<String>,

        /// User message of the turn
        #[arg(short, long)]
        message: String,

        /// Agent response of the turn
        #[arg(short, long)]
        response: String,

        /// Optional JSON object attached to the transcript entry
        #[arg(long)]
        tags: Option<String>,
    },

    /// Show the most recent transcript entries for a session
    History {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Maximum number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Leave out the rolling summary
        #[arg(long)]
        no_summary: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show diagnostic counters and metadata for a session
    Stats {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List stored sessions
    Sessions,

    /// Delete all stored state for a session
    Clear {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            db: None,
            command: Commands::Sessions,
        }
    }
}
