// markclean-core/src/export/debounce.rs
//! Debounce state machine.
//!
//! The debouncer owns no timer. Callers feed it `Instant`s through
//! [`Debouncer::signal`] and [`Debouncer::poll`], which keeps it deterministic under
//! synthetic clocks and under tokio's paused test clock alike.

use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceMode {
    /// Fire once the signals have been quiet for the whole window.
    Trailing,
    /// Fire on the first signal, then ignore signals until the window has passed.
    Leading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { deadline: Instant },
    Fired,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    mode: DebounceMode,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(delay: Duration, mode: DebounceMode) -> Self {
        Self { delay, mode, state: DebounceState::Idle }
    }

    pub fn trailing(delay: Duration) -> Self {
        Self::new(delay, DebounceMode::Trailing)
    }

    pub fn leading(delay: Duration) -> Self {
        Self::new(delay, DebounceMode::Leading)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Records an event at `now`. Returns `true` when the caller should act right
    /// away, which only happens in leading mode outside a suppression window.
    pub fn signal(&mut self, now: Instant) -> bool {
        match self.mode {
            DebounceMode::Trailing => {
                self.state = DebounceState::Pending { deadline: now + self.delay };
                false
            }
            DebounceMode::Leading => match self.state {
                DebounceState::Pending { deadline } if now < deadline => false,
                _ => {
                    self.state = DebounceState::Pending { deadline: now + self.delay };
                    true
                }
            },
        }
    }

    /// Advances the clock to `now`. Returns `true` exactly once per settled burst in
    /// trailing mode.
    pub fn poll(&mut self, now: Instant) -> bool {
        let DebounceState::Pending { deadline } = self.state else {
            return false;
        };
        if now < deadline {
            return false;
        }
        match self.mode {
            DebounceMode::Trailing => {
                self.state = DebounceState::Fired;
                true
            }
            DebounceMode::Leading => {
                self.state = DebounceState::Idle;
                false
            }
        }
    }

    /// Fires a pending trailing call immediately.
    pub fn flush(&mut self) -> bool {
        if self.mode == DebounceMode::Trailing && self.is_pending() {
            self.state = DebounceState::Fired;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn trailing_fires_once_after_last_signal() {
        let t0 = Instant::now();
        let mut d = Debouncer::trailing(ms(500));
        assert!(!d.signal(t0));
        assert!(!d.signal(t0 + ms(50)));
        assert!(!d.signal(t0 + ms(100)));
        assert!(!d.poll(t0 + ms(599)));
        assert_eq!(d.deadline(), Some(t0 + ms(600)));
        assert!(d.poll(t0 + ms(600)));
        assert_eq!(d.state(), DebounceState::Fired);
        assert!(!d.poll(t0 + ms(2000)));
    }

    #[test]
    fn trailing_rearms_after_firing() {
        let t0 = Instant::now();
        let mut d = Debouncer::trailing(ms(10));
        d.signal(t0);
        assert!(d.poll(t0 + ms(10)));
        d.signal(t0 + ms(20));
        assert!(d.is_pending());
        assert!(d.poll(t0 + ms(30)));
    }

    #[test]
    fn leading_fires_first_and_suppresses_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::leading(ms(100));
        assert!(d.signal(t0));
        assert!(!d.signal(t0 + ms(50)));
        assert!(!d.poll(t0 + ms(100)));
        assert_eq!(d.state(), DebounceState::Idle);
        assert!(d.signal(t0 + ms(120)));
    }

    #[test]
    fn flush_and_reset() {
        let t0 = Instant::now();
        let mut d = Debouncer::trailing(ms(100));
        assert!(!d.flush());
        d.signal(t0);
        assert!(d.flush());
        d.signal(t0);
        d.reset();
        assert!(!d.poll(t0 + ms(1000)));
    }
}
