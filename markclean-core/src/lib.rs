// markclean-core/src/lib.rs
//! # markclean Core Library
//!
//! `markclean-core` turns rendered note markup into clean HTML for export. It defines
//! the cleanup configuration carried by named profiles, an owned DOM arena with an
//! HTML serializer, the cleanup engine that filters attributes and classes and
//! renames tags, and the export orchestrator that waits for a multi-pass render to
//! settle before handing the result to the clipboard or a file.
//!
//! The library never touches a real clipboard, filesystem or renderer itself. Those
//! are host collaborators expressed as traits in [`export`] and [`settings`]; the
//! `markclean` binary provides the concrete implementations.
//!
//! ## Modules
//!
//! * `dom`: Owned node arena, HTML fragment parsing and serialization.
//! * `config`: `CleanupRule`, the ordered `RuleSet` and `CleanupConfig`.
//! * `sanitizers`: The rule compiler and the four cleanup passes.
//! * `engine`: The `CleanupEngine` trait.
//! * `engines`: `HtmlCleanEngine` and the pass-through `RawEngine`.
//! * `profiles`: Profiles, export targets and the `ProfileStore`.
//! * `settings`: Versioned settings blob, legacy migration and the debounced writer.
//! * `export`: Host traits, debounce state machine, link and path helpers, and the
//!   `ExportOrchestrator`.
//! * `headless`: One-shot cleanup helpers.
//! * `summary`: Reporting types for a cleanup run.
//!
//! ## Usage Example
//!
//! ```rust
//! use markclean_core::{headless_clean_string, HeadlessEngineType, Profile};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let profile = Profile::default_preset();
//!     let html = r#"<div class="callout" id="intro" data-line="3">Hello</div>"#;
//!
//!     let cleaned = headless_clean_string(&profile, html, HeadlessEngineType::Clean)?;
//!     assert_eq!(cleaned, r#"<p id="intro">Hello</p>"#);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Store and rule operations return [`MarkcleanError`] so callers can match on the
//! failure; component boundaries use `anyhow::Result` with context.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod dom;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod export;
pub mod headless;
pub mod profiles;
pub mod sanitizers;
pub mod settings;
pub mod summary;

/// Re-exports the cleanup configuration types.
pub use config::{parse_list_input, CleanupConfig, CleanupRule, RuleSet};

/// Re-exports the custom error type for clear error reporting.
pub use errors::MarkcleanError;

pub use dom::{Document, NodeId};

/// Re-exports the engine trait and its implementations.
pub use engine::CleanupEngine;
pub use engines::html_engine::HtmlCleanEngine;
pub use engines::raw_engine::RawEngine;

pub use profiles::{
    load_profile_file, profile_to_yaml, ExportTargets, Profile, ProfileExchange, ProfileStore, DEFAULT_ATTRIBUTES,
    DEFAULT_PROFILE,
};

pub use settings::{
    is_settings_blob, load_store, load_store_from_json, save_store, store_to_json, SettingsBackend, SettingsWriter,
    SETTINGS_SCHEMA_VERSION, SETTINGS_WRITE_DELAY,
};

pub use export::debounce::{DebounceMode, DebounceState, Debouncer};
pub use export::orchestrator::ExportOrchestrator;
pub use export::paths::normalize_logical_path;
pub use export::{
    ClipboardSink, ExportReport, FileSink, MarkdownRenderer, Notifier, RenderPass, RenderRequest, ScratchWriter,
    SinkOutcome, EXPORT_SETTLE_DELAY,
};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_clean_string, headless_clean_with_summary, HeadlessEngineType};

pub use sanitizers::compiler::{compile_cleanup, compile_rules, CompiledCleanup, CompiledRule};
pub use sanitizers::{sanitize, sanitize_html};
pub use summary::{CleanupSummary, RuleSummaryItem};
