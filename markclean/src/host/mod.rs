// markclean/src/host/mod.rs
//! Concrete collaborators for the export pipeline: the Markdown renderer, the
//! system clipboard, the vault file sink and the stderr notifier.

#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod files;
pub mod notice;
pub mod render;
