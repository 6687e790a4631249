// markclean-core/src/export/orchestrator.rs
//! The export orchestrator.
//!
//! Each call to [`ExportOrchestrator::begin_export`] opens a new generation with a
//! fresh scratch document and spawns the renderer. Render passes for the current
//! generation are appended to the scratch document and re-arm the settle debounce;
//! passes from any earlier generation are dropped without touching the document or
//! the timer. When the debounce fires the settled document is cleaned once and the
//! result is routed to the profile's sinks.

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::dom::Document;
use crate::export::debounce::{DebounceMode, Debouncer};
use crate::export::links::resolve_internal_links;
use crate::export::paths::{default_export_path, normalize_logical_path};
use crate::export::{
    ClipboardSink, ExportReport, FileSink, MarkdownRenderer, Notifier, RenderEvent, RenderPass, RenderRequest,
    ScratchWriter, SinkOutcome, EXPORT_SETTLE_DELAY, NOTICE_CLIPBOARD_FAILED, NOTICE_CLIPBOARD_OK, NOTICE_TIMEOUT,
};
use crate::headless::{engine_for, HeadlessEngineType};
use crate::profiles::Profile;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State of the export currently being assembled.
struct Scratch {
    generation: u64,
    profile_name: String,
    profile: Profile,
    source_path: String,
    document: Document,
    raw: String,
    passes: usize,
    render_done: bool,
}

enum Step {
    Event(Option<RenderEvent>),
    Settled,
}

pub struct ExportOrchestrator {
    renderer: Arc<dyn MarkdownRenderer>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    files: Option<Arc<dyn FileSink>>,
    notifier: Arc<dyn Notifier>,
    debouncer: Debouncer,
    generation: u64,
    scratch: Option<Scratch>,
    /// Set when a leading-mode signal asked for an immediate export.
    fire_now: bool,
    events_tx: mpsc::Sender<RenderEvent>,
    events_rx: mpsc::Receiver<RenderEvent>,
}

impl ExportOrchestrator {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>, notifier: Arc<dyn Notifier>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            renderer,
            clipboard: None,
            files: None,
            notifier,
            debouncer: Debouncer::trailing(EXPORT_SETTLE_DELAY),
            generation: 0,
            scratch: None,
            fire_now: false,
            events_tx,
            events_rx,
        }
    }

    pub fn with_clipboard(mut self, sink: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(sink);
        self
    }

    pub fn with_file_sink(mut self, sink: Arc<dyn FileSink>) -> Self {
        self.files = Some(sink);
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration, mode: DebounceMode) -> Self {
        self.debouncer = Debouncer::new(delay, mode);
        self
    }

    /// Generation of the export in progress, if any.
    pub fn current_generation(&self) -> Option<u64> {
        self.scratch.as_ref().map(|s| s.generation)
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Starts a new export, superseding any export still in progress, and spawns
    /// the renderer for it. Returns the new generation.
    pub fn begin_export(&mut self, request: RenderRequest, profile_name: &str, profile: Profile) -> u64 {
        let generation = self.open_scratch(profile_name, profile, &request.source_path);
        let renderer = Arc::clone(&self.renderer);
        let writer = ScratchWriter::new(generation, self.events_tx.clone());
        tokio::spawn(async move {
            let result = renderer.render(request, writer.clone()).await;
            writer.finish(result).await;
        });
        generation
    }

    fn open_scratch(&mut self, profile_name: &str, profile: Profile, source_path: &str) -> u64 {
        if let Some(previous) = &self.scratch {
            debug!("Export {} superseded after {} pass(es).", previous.generation, previous.passes);
        }
        self.generation += 1;
        self.debouncer.reset();
        self.fire_now = false;
        self.scratch = Some(Scratch {
            generation: self.generation,
            profile_name: profile_name.to_string(),
            profile,
            source_path: source_path.to_string(),
            document: Document::new(),
            raw: String::new(),
            passes: 0,
            render_done: false,
        });
        info!("Export {} started with profile '{}'.", self.generation, profile_name);
        self.generation
    }

    /// Appends a render pass to the current export. Returns `false` for passes that
    /// belong to another generation, which are dropped.
    pub fn accept_pass(&mut self, pass: RenderPass, now: Instant) -> bool {
        let Some(scratch) = self.scratch.as_mut().filter(|s| s.generation == pass.generation) else {
            debug!("Dropping stale render pass from export {}.", pass.generation);
            return false;
        };
        let nodes = scratch.document.append_html(scratch.document.root(), &pass.html);
        scratch.raw.push_str(&pass.html);
        scratch.passes += 1;
        debug!("Export {}: pass {} appended {} node(s).", scratch.generation, scratch.passes, nodes);
        self.fire_now |= self.debouncer.signal(now);
        true
    }

    /// Records that the renderer for `generation` returned.
    pub fn render_finished(&mut self, generation: u64, error: Option<String>, now: Instant) -> Result<()> {
        let Some(scratch) = self.scratch.as_mut().filter(|s| s.generation == generation) else {
            return Ok(());
        };
        scratch.render_done = true;
        if let Some(message) = error {
            error!("Export {}: rendering failed: {}", generation, message);
            if scratch.passes == 0 {
                self.scratch = None;
                self.debouncer.reset();
                bail!("Rendering failed: {}", message);
            }
        }
        // nothing rendered: settle with an empty document
        if scratch.passes == 0 {
            self.fire_now |= self.debouncer.signal(now);
        }
        Ok(())
    }

    /// Advances the settle clock. Returns `true` once the current export is ready
    /// for [`ExportOrchestrator::finish`]: when a trailing window has elapsed, or
    /// right after the signal that opened a leading window.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.scratch.is_none() {
            return false;
        }
        if std::mem::take(&mut self.fire_now) {
            return true;
        }
        self.debouncer.poll(now)
    }

    /// Drives the current export until it settles and then finishes it.
    pub async fn run_until_settled(&mut self) -> Result<ExportReport> {
        loop {
            if self.scratch.is_none() {
                bail!("No export in progress");
            }
            let step = match self.debouncer.deadline() {
                Some(deadline) => tokio::select! {
                    event = self.events_rx.recv() => Step::Event(event),
                    _ = tokio::time::sleep_until(deadline) => Step::Settled,
                },
                None => Step::Event(self.events_rx.recv().await),
            };

            match step {
                Step::Settled => {
                    if self.poll(Instant::now()) {
                        return self.finish().await;
                    }
                }
                Step::Event(Some(RenderEvent::Pass(pass))) => {
                    if self.accept_pass(pass, Instant::now()) && self.poll(Instant::now()) {
                        return self.finish().await;
                    }
                }
                Step::Event(Some(RenderEvent::Finished { generation, error })) => {
                    self.render_finished(generation, error, Instant::now())?;
                    if self.poll(Instant::now()) {
                        return self.finish().await;
                    }
                }
                Step::Event(None) => bail!("Render channel closed unexpectedly"),
            }
        }
    }

    /// Exports already rendered markup, skipping the render and settle phases.
    pub async fn export_rendered(&mut self, profile_name: &str, profile: Profile, source_path: &str, html: &str) -> Result<ExportReport> {
        let generation = self.open_scratch(profile_name, profile, source_path);
        self.accept_pass(RenderPass { generation, html: html.to_string() }, Instant::now());
        self.finish().await
    }

    /// Cleans the settled document and routes it to the enabled sinks.
    pub async fn finish(&mut self) -> Result<ExportReport> {
        let mut scratch = self.scratch.take().ok_or_else(|| anyhow!("No export in progress"))?;
        self.debouncer.reset();
        self.fire_now = false;
        if !scratch.render_done && scratch.passes > 0 {
            debug!("Export {} settled while the renderer was still running.", scratch.generation);
        }

        let targets = scratch.profile.targets.clone();
        let input_hash = hex::encode(Sha256::digest(scratch.raw.as_bytes()));

        let links_resolved = if targets.resolve_internal_links {
            resolve_internal_links(&mut scratch.document)
        } else {
            0
        };

        let engine = engine_for(&scratch.profile, HeadlessEngineType::for_profile(&scratch.profile))?;
        let (html, summary) = engine.sanitize(&mut scratch.document)?;

        if targets.remote {
            warn!("Profile '{}' asks for remote export, which is not available; skipping.", scratch.profile_name);
        }
        if !targets.any_sink() {
            debug!("Export {}: no export target enabled.", scratch.generation);
        }

        let clipboard = if targets.clipboard { self.write_clipboard(&html).await } else { SinkOutcome::Disabled };

        let (file, file_path) = if targets.file {
            let path = if targets.file_path.trim().is_empty() {
                default_export_path(&scratch.source_path)
            } else {
                normalize_logical_path(&targets.file_path)
            };
            (self.write_file(&path, &html).await, Some(path))
        } else {
            (SinkOutcome::Disabled, None)
        };

        info!(
            "Export {} finished: {} pass(es), {} byte(s) with the '{}' engine.",
            scratch.generation,
            scratch.passes,
            html.len(),
            engine.name()
        );

        Ok(ExportReport {
            generation: scratch.generation,
            profile: scratch.profile_name,
            engine: engine.name().to_string(),
            html,
            summary,
            passes: scratch.passes,
            links_resolved,
            clipboard,
            file,
            file_path,
            input_hash,
            exported_at: Utc::now(),
        })
    }

    async fn write_clipboard(&self, html: &str) -> SinkOutcome {
        let Some(sink) = &self.clipboard else {
            warn!("Clipboard export is enabled but no clipboard is available.");
            self.notifier.notify(NOTICE_CLIPBOARD_FAILED, NOTICE_TIMEOUT);
            return SinkOutcome::Failed("no clipboard available".to_string());
        };
        match sink.write_text(html).await {
            Ok(()) => {
                self.notifier.notify(NOTICE_CLIPBOARD_OK, NOTICE_TIMEOUT);
                SinkOutcome::Written
            }
            Err(e) => {
                error!("Clipboard write failed: {:#}", e);
                self.notifier.notify(NOTICE_CLIPBOARD_FAILED, NOTICE_TIMEOUT);
                SinkOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    async fn write_file(&self, path: &str, html: &str) -> SinkOutcome {
        let Some(sink) = &self.files else {
            warn!("File export is enabled but no file sink is configured.");
            self.notifier.notify(&format!("Couldn't write html to {}", path), NOTICE_TIMEOUT);
            return SinkOutcome::Failed("no file sink configured".to_string());
        };
        match sink.create_or_overwrite(path, html).await {
            Ok(()) => {
                self.notifier.notify(&format!("HTML written to {}", path), NOTICE_TIMEOUT);
                SinkOutcome::Written
            }
            Err(e) => {
                error!("Writing '{}' failed: {:#}", path, e);
                self.notifier.notify(&format!("Couldn't write html to {}", path), NOTICE_TIMEOUT);
                SinkOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}
