//! Tend CLI - Caregiver micro-practice recommender
//!
//! Usage:
//!   tend init                 Initialize database
//!   tend seed                 Load the built-in action catalog
//!   tend suggest              Show today's suggested actions
//!   tend log --focus ... --template ... --duration 5
//!   tend week --apply keep    Review the week and confirm a decision

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Seed { file } => {
            commands::cmd_seed(&cli.db, file.as_deref(), cli.no_encrypt)
        }
        Commands::Log {
            focus,
            template,
            duration,
            status,
            difficulty,
            note,
            date,
        } => commands::cmd_log(
            &cli.db,
            cli.no_encrypt,
            &focus,
            &template,
            duration,
            &status,
            difficulty.as_deref(),
            note,
            date.as_deref(),
        ),
        Commands::Suggest { focus, json } => {
            commands::cmd_suggest(&cli.db, cli.no_encrypt, &focus, json)
        }
        Commands::Week {
            focus,
            week_start,
            apply,
        } => commands::cmd_week(
            &cli.db,
            cli.no_encrypt,
            &focus,
            week_start.as_deref(),
            apply.as_deref(),
        ),
        Commands::Focus { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(FocusAction::List) => commands::cmd_focus_list(&db),
                Some(FocusAction::Pin { focus, title }) => {
                    commands::cmd_focus_pin(&db, &focus, &title, true)
                }
                Some(FocusAction::Unpin { focus, title }) => {
                    commands::cmd_focus_pin(&db, &focus, &title, false)
                }
            }
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
