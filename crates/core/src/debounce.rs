//! Quiet-period timer for preview recompilation.
//!
//! The caller supplies the clock, so the same logic runs under a browser
//! timer, a test, or anything else that can report milliseconds.

/// Default quiet period before a preview is rebuilt.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Fires once after a quiet period following the latest `touch`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Record a change at `now_ms`, pushing back any pending deadline.
    pub fn touch(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Returns `true` once the quiet period has elapsed, then disarms.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a change is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let mut debouncer = Debouncer::new(300);
        assert!(!debouncer.poll(0));

        debouncer.touch(1_000);
        assert!(debouncer.is_pending());
        assert!(!debouncer.poll(1_299));
        assert!(debouncer.poll(1_300));
        assert!(!debouncer.poll(1_400));
    }

    #[test]
    fn test_touch_resets_deadline() {
        let mut debouncer = Debouncer::default();
        debouncer.touch(0);
        debouncer.touch(200);
        assert!(!debouncer.poll(300));
        assert!(debouncer.poll(500));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(10);
        debouncer.touch(0);
        debouncer.cancel();
        assert!(!debouncer.poll(100));
    }
}
