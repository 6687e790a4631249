// markclean-core/src/engines/mod.rs
//! Implementations of the `CleanupEngine` trait.
//!
//! * `html_engine`: the full cleanup pipeline.
//! * `raw_engine`: serializes the document unchanged, used for "dirty" exports.
//!
//! License: MIT OR APACHE 2.0

pub mod html_engine;
pub mod raw_engine;
