// markclean/src/host/clipboard.rs
//! System clipboard sink backed by `arboard`.

use anyhow::{Context, Result};
use async_trait::async_trait;

use markclean_core::ClipboardSink;

#[derive(Debug, Default)]
pub struct ArboardClipboard;

#[async_trait]
impl ClipboardSink for ArboardClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        // arboard blocks on some platforms while the clipboard owner responds.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
            clipboard.set_text(text).context("Failed to set clipboard text")?;
            Ok(())
        })
        .await
        .context("Clipboard task panicked")?
    }
}
