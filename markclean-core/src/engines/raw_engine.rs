// markclean-core/src/engines/raw_engine.rs
//! A `CleanupEngine` that exports the rendered markup without touching it.
//! License: MIT OR APACHE 2.0

use anyhow::Result;

use crate::config::CleanupConfig;
use crate::dom::Document;
use crate::engine::CleanupEngine;
use crate::summary::CleanupSummary;

#[derive(Debug, Clone, Default)]
pub struct RawEngine {
    config: CleanupConfig,
}

impl RawEngine {
    pub fn new(config: CleanupConfig) -> Self {
        Self { config }
    }
}

impl CleanupEngine for RawEngine {
    fn sanitize(&self, document: &mut Document) -> Result<(String, CleanupSummary)> {
        Ok((document.inner_html(document.root()), CleanupSummary::default()))
    }

    fn config(&self) -> &CleanupConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "raw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_kept() {
        let engine = RawEngine::default();
        let (html, summary) = engine.sanitize_html("<div class=\"x\" data-a=\"1\">\n  t</div>").unwrap();
        assert_eq!(html, "<div class=\"x\" data-a=\"1\">\n  t</div>");
        assert!(summary.is_noop());
    }
}
