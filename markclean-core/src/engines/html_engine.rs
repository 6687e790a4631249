// markclean-core/src/engines/html_engine.rs
//! A `CleanupEngine` that runs the full cleanup pipeline.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::debug;

use crate::config::CleanupConfig;
use crate::dom::Document;
use crate::engine::CleanupEngine;
use crate::sanitizers::compiler::{compile_cleanup, CompiledCleanup};
use crate::sanitizers::sanitize_compiled;
use crate::summary::CleanupSummary;

#[derive(Debug, Clone)]
pub struct HtmlCleanEngine {
    compiled: CompiledCleanup,
    config: CleanupConfig,
}

impl HtmlCleanEngine {
    /// Compiles `config` up front so a bad rule is reported before any export runs.
    pub fn new(config: CleanupConfig) -> Result<Self> {
        let compiled = compile_cleanup(&config).context("Failed to compile cleanup rules for HtmlCleanEngine")?;
        debug!(
            "HtmlCleanEngine ready: {} attribute(s), {} class(es), {} active rule(s).",
            compiled.attributes.len(),
            compiled.classes.len(),
            compiled.rules.len()
        );
        Ok(Self { compiled, config })
    }

    pub fn compiled(&self) -> &CompiledCleanup {
        &self.compiled
    }
}

impl CleanupEngine for HtmlCleanEngine {
    fn sanitize(&self, document: &mut Document) -> Result<(String, CleanupSummary)> {
        let mut summary = CleanupSummary::default();
        let html = sanitize_compiled(document, &self.compiled, &mut summary);
        Ok((html, summary))
    }

    fn config(&self) -> &CleanupConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "html"
    }
}
