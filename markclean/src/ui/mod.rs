// markclean/src/ui/mod.rs
//! Terminal output helpers.

pub mod diff_viewer;
pub mod output_format;
pub mod tables;
