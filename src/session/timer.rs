use std::time::{Duration, Instant};

/// Repeating scheduled task. Each `poll` reports how many whole periods have
/// elapsed since the last one and re-arms from the last due point, so ticks
/// are neither lost nor double counted when the event loop runs late.
#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: Some(now + period),
        }
    }

    /// A ticker that never fires.
    pub fn idle(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

/// One-shot scheduled task.
#[derive(Clone, Debug, Default)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    pub fn after(delay: Duration, now: Instant) -> Self {
        Self {
            due: Some(now + delay),
        }
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// True exactly once, on the first poll at or after the due instant.
    pub fn fired(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_ticker_counts_whole_periods() {
        let t0 = Instant::now();
        let mut ticker = Ticker::start(SECOND, t0);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(900)), 0);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(ticker.poll(t0 + Duration::from_millis(4200)), 3);
    }

    #[test]
    fn test_cancelled_ticker_never_fires() {
        let t0 = Instant::now();
        let mut ticker = Ticker::start(SECOND, t0);
        ticker.cancel();
        assert!(!ticker.is_active());
        assert_eq!(ticker.poll(t0 + Duration::from_secs(10)), 0);
        assert_eq!(Ticker::idle(SECOND).poll(t0 + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_deadline_fires_once() {
        let t0 = Instant::now();
        let mut deadline = Deadline::after(Duration::from_millis(1500), t0);
        assert!(!deadline.fired(t0 + SECOND));
        assert!(deadline.fired(t0 + Duration::from_millis(1500)));
        assert!(!deadline.fired(t0 + Duration::from_secs(5)));
        assert!(!deadline.is_armed());
    }

    #[test]
    fn test_cancelled_deadline_does_not_fire() {
        let t0 = Instant::now();
        let mut deadline = Deadline::after(SECOND, t0);
        deadline.cancel();
        assert!(!deadline.fired(t0 + Duration::from_secs(2)));
        assert_eq!(deadline.remaining(t0), None);
    }
}
