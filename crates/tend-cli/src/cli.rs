//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tend - Tiny daily practices for caregivers
#[derive(Parser)]
#[command(name = "tend")]
#[command(about = "Caregiver micro-practice recommender", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tend.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TEND_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and built-in focus areas
    Init,

    /// Load an action catalog (built-in catalog if no file given)
    Seed {
        /// Catalog JSON file to import
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Log the outcome of an action
    Log {
        /// Focus area id (e.g. independence, emotion_skills)
        #[arg(short, long)]
        focus: String,

        /// Action template id (see `tend suggest`)
        #[arg(short, long)]
        template: String,

        /// Duration variant that was attempted, in minutes
        #[arg(short = 'm', long)]
        duration: u32,

        /// Outcome: done, snoozed, skipped
        #[arg(short, long, default_value = "done")]
        status: String,

        /// How it felt: light, ok, hard
        #[arg(long)]
        difficulty: Option<String>,

        /// Free-form note about the moment
        #[arg(short, long)]
        note: Option<String>,

        /// When it happened (RFC 3339; defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show today's suggested actions for a focus
    Suggest {
        /// Focus area id
        #[arg(short, long, default_value = "independence")]
        focus: String,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Review a week and optionally confirm an adjustment
    Week {
        /// Focus area id
        #[arg(short, long, default_value = "independence")]
        focus: String,

        /// Monday of the week to review (YYYY-MM-DD; defaults to this week)
        #[arg(short, long)]
        week_start: Option<String>,

        /// Confirm a decision: keep, scale_down, scale_up
        #[arg(short, long)]
        apply: Option<String>,
    },

    /// List focus areas and their pinned micro-skills
    Focus {
        #[command(subcommand)]
        action: Option<FocusAction>,
    },

    /// Show database status (encryption, size, counts)
    Status,
}

#[derive(Subcommand)]
pub enum FocusAction {
    /// List focus areas
    List,

    /// Pin a micro-skill title so matching actions rank higher
    Pin {
        /// Focus area id
        #[arg(short, long)]
        focus: String,

        /// Micro-skill title to pin
        #[arg(short, long)]
        title: String,
    },

    /// Unpin a micro-skill title
    Unpin {
        /// Focus area id
        #[arg(short, long)]
        focus: String,

        /// Micro-skill title to unpin
        #[arg(short, long)]
        title: String,
    },
}
