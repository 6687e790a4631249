//! HTML cleanup pipeline for markclean.
//!
//! This module compiles a profile's [`CleanupConfig`] and runs the four cleanup
//! passes over a parsed [`Document`]: attribute filtering, class filtering, tag
//! renaming and line-indentation collapsing, always in that order. The result is
//! the serialized inner HTML of the document root.
//!
//! The passes never drop elements or text. Elements that end up empty stay in the
//! tree, and no attribute outside the allow-lists survives.

pub mod compiler;
pub mod passes;

use log::debug;

use crate::config::CleanupConfig;
use crate::dom::Document;
use crate::errors::MarkcleanError;
use crate::summary::CleanupSummary;
use compiler::{compile_cleanup, CompiledCleanup};

/// Runs every pass over `document` with an already compiled configuration and
/// returns the serialized result.
pub fn sanitize_compiled(document: &mut Document, compiled: &CompiledCleanup, summary: &mut CleanupSummary) -> String {
    passes::filter_attributes(document, compiled, summary);
    passes::filter_classes(document, compiled, summary);
    passes::apply_rename_rules(document, compiled, summary);
    passes::collapse_line_indentation(document, summary);
    debug!(
        "Cleanup finished: {} attribute(s), {} class token(s), {} rename(s).",
        summary.attributes_removed,
        summary.class_tokens_removed,
        summary.total_renames()
    );
    document.inner_html(document.root())
}

/// Cleans `document` in place according to `config` and returns its serialized
/// inner HTML together with a summary of what changed.
///
/// # Errors
///
/// Fails only when a rule's replacement is not a valid tag name.
pub fn sanitize(document: &mut Document, config: &CleanupConfig) -> Result<(String, CleanupSummary), MarkcleanError> {
    let compiled = compile_cleanup(config)?;
    let mut summary = CleanupSummary::default();
    let html = sanitize_compiled(document, &compiled, &mut summary);
    Ok((html, summary))
}

/// Parses `html` as a fragment and cleans it.
pub fn sanitize_html(html: &str, config: &CleanupConfig) -> Result<String, MarkcleanError> {
    let mut document = Document::parse_fragment(html);
    sanitize(&mut document, config).map(|(html, _)| html)
}
