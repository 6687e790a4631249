// markclean/src/logger.rs
//! Logging setup for the `markclean` binary.
//!
//! `RUST_LOG` is honoured unless an explicit level is passed in, in which case that
//! level applies to the workspace crates and everything else stays at `warn`.
//! Calling [`init_logger`] more than once is harmless.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const WORKSPACE_CRATES: [&str; 2] = ["markclean", "markclean_core"];

pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = Builder::new();
            builder.filter_level(LevelFilter::Warn.min(level));
            for krate in WORKSPACE_CRATES {
                builder.filter_module(krate, level);
            }
            builder
        }
        None => Builder::from_env(Env::default().default_filter_or("warn")),
    };

    builder
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .target(env_logger::Target::Stderr);

    // A logger may already be installed, e.g. by a test harness.
    let _ = builder.try_init();
}

/// Picks the level implied by the global flags. `None` defers to `RUST_LOG`.
pub fn level_from_flags(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_everything() {
        assert_eq!(level_from_flags(true, true, false), Some(LevelFilter::Off));
        assert_eq!(level_from_flags(false, true, true), Some(LevelFilter::Info));
        assert_eq!(level_from_flags(false, true, false), Some(LevelFilter::Debug));
        assert_eq!(level_from_flags(false, false, false), None);
    }
}
