// markclean-core/src/engine.rs
//! Defines the core CleanupEngine trait.
//!
//! The `CleanupEngine` trait is the seam between the export pipeline and the
//! concrete ways of turning a settled document into the exported string: the
//! full cleanup engine and the "dirty" pass-through engine. The orchestrator only
//! ever talks to this trait.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;

use crate::config::CleanupConfig;
use crate::dom::Document;
use crate::summary::CleanupSummary;

/// A trait that defines how a settled document is turned into export output.
pub trait CleanupEngine: Send + Sync {
    /// Consumes the document and returns the serialized output with a summary of
    /// the changes made to it.
    ///
    /// # Arguments
    /// * `document` - The parsed document. Engines may mutate it in place.
    fn sanitize(&self, document: &mut Document) -> Result<(String, CleanupSummary)>;

    /// Parses `html` as a fragment and runs [`CleanupEngine::sanitize`] on it.
    fn sanitize_html(&self, html: &str) -> Result<(String, CleanupSummary)> {
        let mut document = Document::parse_fragment(html);
        self.sanitize(&mut document)
    }

    /// Returns the configuration the engine was built from.
    fn config(&self) -> &CleanupConfig;

    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;
}
