// markclean/src/commands/export.rs
//! `markclean export`: render a note, let the render settle, clean it and route
//! the result to the profile's export targets.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::time::Duration;

use markclean_core::{normalize_logical_path, DebounceMode, ExportOrchestrator, Profile, RenderRequest, SinkOutcome};

use super::{read_input, Session};
use crate::cli::ExportCommand;
use crate::host::files::VaultFileSink;
use crate::host::notice::StderrNotifier;
use crate::host::render::ComrakRenderer;

/// Applies the command-line overrides to a copy of the stored profile.
pub fn apply_overrides(cmd: &ExportCommand, profile: &mut Profile) {
    let targets = &mut profile.targets;
    if cmd.clipboard {
        targets.clipboard = true;
    }
    if cmd.no_clipboard {
        targets.clipboard = false;
    }
    if let Some(output) = &cmd.output {
        targets.file = true;
        targets.file_path = output.clone();
    }
    if cmd.dirty {
        targets.dirty = true;
    }
    if cmd.resolve_links {
        targets.resolve_internal_links = true;
    }
}

/// Logical path of the note: relative to the vault when it lives inside it.
fn source_path(input: Option<&Path>, vault: &Path) -> String {
    let Some(input) = input else {
        return String::new();
    };
    let relative = input
        .strip_prefix(vault)
        .ok()
        .or_else(|| if input.is_relative() { Some(input) } else { None })
        .or_else(|| input.file_name().map(Path::new))
        .unwrap_or(input);
    normalize_logical_path(&relative.to_string_lossy())
}

pub async fn run_export(cmd: &ExportCommand, session: &Session) -> Result<()> {
    let markdown = read_input(cmd.input_file.as_deref())?;
    let mut store = session.load()?;
    let before = store.clone();
    let (name, stored) = store.resolve(cmd.profile.as_deref())?;
    let (name, mut profile) = (name, stored.clone());
    if store != before {
        session.save(&store)?;
    }
    apply_overrides(cmd, &mut profile);
    debug!("Export targets for '{}': {:?}", name, profile.targets);

    let mut orchestrator =
        ExportOrchestrator::new(Arc::new(ComrakRenderer::new()), Arc::new(StderrNotifier::new(session.quiet)))
            .with_file_sink(Arc::new(VaultFileSink::new(&cmd.vault)));
    #[cfg(feature = "clipboard")]
    {
        orchestrator = orchestrator.with_clipboard(Arc::new(crate::host::clipboard::ArboardClipboard));
    }
    if let Some(ms) = cmd.delay_ms {
        orchestrator = orchestrator.with_settle_delay(Duration::from_millis(ms), DebounceMode::Trailing);
    }

    let request = RenderRequest { markdown, source_path: source_path(cmd.input_file.as_deref(), &cmd.vault) };
    orchestrator.begin_export(request, &name, profile);
    let report = orchestrator.run_until_settled().await.context("Export failed")?;
    info!(
        "Export {} done: {} pass(es), {} link(s) resolved, input {}.",
        report.generation, report.passes, report.links_resolved, report.input_hash
    );

    if cmd.print {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", report.html)?;
        out.flush()?;
    }

    if let SinkOutcome::Failed(reason) = &report.file {
        bail!("Could not write {}: {}", report.file_path.as_deref().unwrap_or("export file"), reason);
    }
    if let SinkOutcome::Failed(reason) = &report.clipboard {
        session.warn(format!("Clipboard export failed: {}", reason));
    }
    Ok(())
}
