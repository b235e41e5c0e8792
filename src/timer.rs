use std::time::{Duration, Instant};

pub const FRAMES_PER_SECOND: u32 = 60;

/// A fixed-rate tick on the wall clock.
///
/// Like a hardware timer it does not queue up missed ticks: if the owner falls
/// more than a period behind, the next deadline restarts from now.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    pub fn per_second(rate: u32, now: Instant) -> Self {
        Self::new(Duration::from_secs(1) / rate, now)
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns true once per elapsed period.
    pub fn sync(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let start = Instant::now();
        let mut frame = Ticker::per_second(FRAMES_PER_SECOND, start);
        assert!(!frame.sync(start));
        let due = frame.deadline();
        assert!(frame.sync(due));
        assert!(!frame.sync(due));
        assert_eq!(frame.deadline(), due + Duration::from_secs(1) / FRAMES_PER_SECOND);
    }

    #[test]
    fn test_drops_missed_ticks() {
        let start = Instant::now();
        let mut debug = Ticker::per_second(1, start);
        let late = start + Duration::from_secs(5);
        assert!(debug.sync(late));
        assert!(!debug.sync(late));
        assert_eq!(debug.deadline(), late + Duration::from_secs(1));
    }
}
