// markclean-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot cleanup of an HTML string, outside of the
//! debounced export pipeline.
//!
//! Supports selecting between the full cleanup engine and the raw pass-through.

use anyhow::Result;

use crate::engine::CleanupEngine;
use crate::engines::html_engine::HtmlCleanEngine;
use crate::engines::raw_engine::RawEngine;
use crate::profiles::Profile;
use crate::summary::CleanupSummary;

/// Enum to select which engine to use in headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessEngineType {
    Clean,
    Raw,
}

impl HeadlessEngineType {
    /// Picks the engine a profile's `dirty` flag asks for.
    pub fn for_profile(profile: &Profile) -> Self {
        if profile.targets.dirty { Self::Raw } else { Self::Clean }
    }
}

/// Builds the engine for `profile` behind the trait object the orchestrator uses.
pub fn engine_for(profile: &Profile, engine_type: HeadlessEngineType) -> Result<Box<dyn CleanupEngine>> {
    let config = profile.cleanup.clone();
    Ok(match engine_type {
        HeadlessEngineType::Clean => Box::new(HtmlCleanEngine::new(config)?),
        HeadlessEngineType::Raw => Box::new(RawEngine::new(config)),
    })
}

/// Cleans an HTML fragment with `profile` and returns the result with its summary.
pub fn headless_clean_with_summary(
    profile: &Profile,
    html: &str,
    engine_type: HeadlessEngineType,
) -> Result<(String, CleanupSummary)> {
    engine_for(profile, engine_type)?.sanitize_html(html)
}

/// Fully cleans an HTML fragment with the given profile.
/// This function is the primary entry point for non-interactive use.
pub fn headless_clean_string(profile: &Profile, html: &str, engine_type: HeadlessEngineType) -> Result<String> {
    headless_clean_with_summary(profile, html, engine_type).map(|(html, _)| html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_headless_clean_string_default_preset() -> Result<()> {
        let profile = Profile::default_preset();
        let out = headless_clean_string(
            &profile,
            r#"<div class="callout" id="n" style="x"><img src="a.png" alt="a" loading="lazy"></div>"#,
            HeadlessEngineType::Clean,
        )?;
        assert_eq!(out, r#"<p id="n"><img src="a.png" alt="a"></p>"#);
        Ok(())
    }

    #[test]
    fn test_headless_raw_keeps_everything() -> Result<()> {
        let mut profile = Profile::default_preset();
        profile.targets.dirty = true;
        let html = r#"<div class="callout">t</div>"#;
        let out = headless_clean_string(&profile, html, HeadlessEngineType::for_profile(&profile))?;
        assert_eq!(out, html);
        Ok(())
    }
}
