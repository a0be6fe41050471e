use std::time::{Duration, Instant};

/// Single-shot timer that restarts every time it is armed.
///
/// Time is passed in by the caller so the host event loop stays in charge.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Start or restart the countdown from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once after the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_postpones_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.arm(t0);
        d.arm(t0 + Duration::from_millis(200));
        assert!(!d.fire_if_due(t0 + Duration::from_millis(400)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(500)));
        assert!(!d.fire_if_due(t0 + Duration::from_millis(900)));
    }
}
