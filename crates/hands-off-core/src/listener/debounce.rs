use std::time::{Duration, Instant};

/// Process-wide notification gate for touch alerts.
///
/// Every observed event moves the reference timestamp forward, so a
/// continuous stream of touches keeps suppressing itself; an alert fires
/// only when the gap since the previous event exceeds the window. The
/// first event always fires.
#[derive(Debug)]
pub(crate) struct DebounceGate {
    window: Duration,
    last_event: Option<Instant>,
}

impl DebounceGate {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
        }
    }

    /// Record an event at `now`; returns true when an alert should fire.
    pub(crate) fn observe(&mut self, now: Instant) -> bool {
        let fire = match self.last_event {
            None => true,
            Some(previous) => now.duration_since(previous) > self.window,
        };
        self.last_event = Some(now);
        fire
    }
}
