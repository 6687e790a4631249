//! errors.rs - Custom error types for the markclean-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that callers can match on (for example to
//! fall back to the `default` profile on `ProfileNotFound`).
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `markclean-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MarkcleanError {
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("Profile '{0}' already exists")]
    ProfileAlreadyExists(String),

    #[error("Invalid profile name '{0}'")]
    InvalidProfileName(String),

    #[error("Rule index {index} is out of range (rule count: {len})")]
    RuleIndexOutOfRange { index: usize, len: usize },

    #[error("Rule #{index}: '{name}' is not a valid tag name")]
    InvalidTagName { index: usize, name: String },

    #[error("Rule #{index}: '{name}' is a void element and cannot keep the children of '{match_name}'")]
    VoidReplacement { index: usize, match_name: String, name: String },

    #[error("Failed to serialize settings: {0}")]
    SerializationError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
