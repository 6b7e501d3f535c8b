use crate::config::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS};

/// Delay before re-polling after a failed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_ms: u32,
    consecutive_failures: u32,
}

impl Backoff {
    pub const fn new() -> Self {
        Self {
            delay_ms: INITIAL_BACKOFF_MS,
            consecutive_failures: 0,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Grow the delay by 1.5x (rounded down, capped) and return it.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.delay_ms = (self.delay_ms.saturating_mul(3) / 2).min(MAX_BACKOFF_MS);
        self.delay_ms
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
