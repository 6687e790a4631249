// markclean/src/host/notice.rs
//! Notifications shown on stderr. The timeout is meaningless in a terminal and
//! only logged.

use log::debug;
use tokio::time::Duration;

use markclean_core::Notifier;

use crate::ui::output_format::{stderr_msg, MessageKind};

#[derive(Debug, Default)]
pub struct StderrNotifier {
    quiet: bool,
}

impl StderrNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str, timeout: Duration) {
        debug!("Notice ({} ms): {}", timeout.as_millis(), message);
        if self.quiet {
            return;
        }
        let kind = if message.starts_with("Couldn't") { MessageKind::Warn } else { MessageKind::Info };
        stderr_msg(kind, message);
    }
}
