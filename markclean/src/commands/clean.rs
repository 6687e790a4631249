// markclean/src/commands/clean.rs
//! `markclean clean`: one-shot cleanup of an HTML fragment.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io::{self, Write};

use markclean_core::{headless_clean_with_summary, HeadlessEngineType};

use super::{read_input, Session};
use crate::cli::CleanCommand;
use crate::ui::{diff_viewer, tables};

pub fn run_clean(cmd: &CleanCommand, session: &Session) -> Result<()> {
    let input = read_input(cmd.input_file.as_deref())?;
    let mut store = session.load()?;
    let before = store.clone();
    let (name, profile) = store.resolve(cmd.profile.as_deref())?;
    let (name, profile) = (name, profile.clone());
    if store != before {
        session.save(&store)?;
    }

    let engine_type = if cmd.dirty { HeadlessEngineType::Raw } else { HeadlessEngineType::for_profile(&profile) };
    info!("Cleaning {} byte(s) with profile '{}' ({:?}).", input.len(), name, engine_type);

    let (cleaned, summary) =
        headless_clean_with_summary(&profile, &input, engine_type).context("Cleanup failed")?;
    debug!("Cleaned length: {} (input {}).", cleaned.len(), input.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cmd.diff {
        let supports_color = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        diff_viewer::print_diff(&input, &cleaned, &mut out, supports_color)?;
    } else {
        writeln!(out, "{}", cleaned)?;
    }
    out.flush()?;

    if cmd.summary {
        eprintln!("{}", tables::summary_table(&summary));
    }
    Ok(())
}
