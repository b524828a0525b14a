use std::time::Duration;

/// One-shot, cancellable deadline on the host-driven timeline.
///
/// The host supplies monotonically increasing timestamps (`performance.now()`
/// in the browser). Arming replaces any pending deadline; `fire` returns
/// `true` at most once per arm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Deadline {
    due: Option<Duration>,
}

impl Deadline {
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn fire(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_once_after_due() {
        let mut d = Deadline::default();
        d.arm(ms(0), ms(150));
        assert!(!d.fire(ms(149)));
        assert!(d.fire(ms(150)));
        assert!(!d.fire(ms(400)));
        assert!(!d.is_pending());
    }

    #[test]
    fn rearm_replaces_pending() {
        let mut d = Deadline::default();
        d.arm(ms(0), ms(150));
        d.arm(ms(100), ms(150));
        assert!(!d.fire(ms(200)));
        assert!(d.fire(ms(250)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut d = Deadline::default();
        d.cancel();
        d.arm(ms(0), ms(10));
        d.cancel();
        d.cancel();
        assert!(!d.fire(ms(1_000)));
    }
}
