// markclean/src/lib.rs
//! # markclean CLI Application
//!
//! This crate provides the command-line front end for `markclean-core`: argument
//! parsing, the file-backed settings store, the `comrak` Markdown renderer, the
//! clipboard and vault file sinks, and terminal output.

pub mod cli;
pub mod commands;
pub mod host;
pub mod logger;
pub mod ui;
pub mod utils;

pub use commands::Session;

use anyhow::Result;

use crate::cli::Commands;
use crate::commands::allow_list::AllowListKind;

/// Dispatches a parsed command.
pub async fn run_command(command: &Commands, session: &Session) -> Result<()> {
    match command {
        Commands::Export(cmd) => commands::export::run_export(cmd, session).await,
        Commands::Clean(cmd) => commands::clean::run_clean(cmd, session),
        Commands::Profiles(cmd) => commands::profiles::run_profiles(cmd, session),
        Commands::Rules(cmd) => commands::rules::run_rules(cmd, session),
        Commands::Attributes(cmd) => commands::allow_list::run_allow_list(AllowListKind::Attributes, cmd, session),
        Commands::Classes(cmd) => commands::allow_list::run_allow_list(AllowListKind::Classes, cmd, session),
    }
}
