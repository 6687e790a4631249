// markclean-core/src/export/mod.rs
//! Export pipeline: host collaborator traits and the values passed between them.
//!
//! The host supplies a [`MarkdownRenderer`], optional [`ClipboardSink`] and
//! [`FileSink`] implementations and a [`Notifier`]. The
//! [`orchestrator::ExportOrchestrator`] drives them: it starts a render, collects
//! the passes the renderer emits, waits for them to settle and routes the cleaned
//! HTML to the enabled sinks.
//!
//! License: MIT OR APACHE 2.0

pub mod debounce;
pub mod links;
pub mod orchestrator;
pub mod paths;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::summary::CleanupSummary;

/// Quiet period after the last render pass before an export is considered settled.
pub const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// How long transient notifications stay visible.
pub const NOTICE_TIMEOUT: Duration = Duration::from_millis(3500);

pub const NOTICE_CLIPBOARD_OK: &str = "Cleaned HTML copied to the clipboard";
pub const NOTICE_CLIPBOARD_FAILED: &str = "Couldn't copy html to the clipboard";

/// What to render.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub markdown: String,
    /// Logical path of the note, used for the default export file name.
    pub source_path: String,
}

/// One chunk of rendered markup, stamped with the export it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    pub generation: u64,
    pub html: String,
}

/// Messages from render tasks to the orchestrator.
#[derive(Debug)]
pub enum RenderEvent {
    Pass(RenderPass),
    Finished { generation: u64, error: Option<String> },
}

/// Handle a renderer uses to append markup to the export that requested it.
///
/// Every pass carries the writer's generation, so output from a superseded export
/// can be recognized and dropped downstream.
#[derive(Debug, Clone)]
pub struct ScratchWriter {
    generation: u64,
    tx: mpsc::Sender<RenderEvent>,
}

impl ScratchWriter {
    pub fn new(generation: u64, tx: mpsc::Sender<RenderEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn append(&self, html: impl Into<String>) -> Result<()> {
        let pass = RenderPass { generation: self.generation, html: html.into() };
        self.tx
            .send(RenderEvent::Pass(pass))
            .await
            .map_err(|_| anyhow!("export {} is no longer listening for render output", self.generation))
    }

    pub(crate) async fn finish(&self, result: Result<()>) {
        let error = result.err().map(|e| format!("{:#}", e));
        let _ = self.tx.send(RenderEvent::Finished { generation: self.generation, error }).await;
    }
}

#[async_trait]
pub trait MarkdownRenderer: Send + Sync {
    /// Renders `request`, appending markup through `writer` in one or more passes.
    async fn render(&self, request: RenderRequest, writer: ScratchWriter) -> Result<()>;
}

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

#[async_trait]
pub trait FileSink: Send + Sync {
    /// Writes `content` to the logical `path`, replacing any existing file.
    async fn create_or_overwrite(&self, path: &str, content: &str) -> Result<()>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, timeout: Duration);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SinkOutcome {
    Disabled,
    Written,
    Failed(String),
}

impl SinkOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Result of one completed export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub generation: u64,
    pub profile: String,
    pub engine: String,
    pub html: String,
    pub summary: CleanupSummary,
    pub passes: usize,
    pub links_resolved: usize,
    pub clipboard: SinkOutcome,
    pub file: SinkOutcome,
    pub file_path: Option<String>,
    /// SHA-256 of the settled, uncleaned markup.
    pub input_hash: String,
    pub exported_at: DateTime<Utc>,
}
