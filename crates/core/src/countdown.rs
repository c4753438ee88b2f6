//! Wall-clock countdown for timed interview sessions.
//!
//! Remaining time is always derived from the delta between `now` and the
//! start timestamp, never from the number of ticks observed, so late or
//! skipped ticks cannot accumulate drift.

use chrono::{DateTime, Utc};

use crate::time::whole_seconds_between;

/// Result of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_secs: u64,
    /// Set on exactly one tick: the first one that observes zero remaining.
    pub expired: bool,
}

/// Countdown bound to one start timestamp.
///
/// A countdown cannot be restarted; build a new one for a new start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u64,
    started_at: DateTime<Utc>,
    expired: bool,
    stopped: bool,
}

impl Countdown {
    #[must_use]
    pub fn start(duration_minutes: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            total_secs: u64::from(duration_minutes) * 60,
            started_at,
            expired: false,
            stopped: false,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// `max(0, total - floor(elapsed))` at the given instant.
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        self.total_secs
            .saturating_sub(whole_seconds_between(self.started_at, now))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// True once the countdown expired or was stopped; no further ticks are produced.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Observe the clock.
    ///
    /// Returns `None` once the countdown has stopped, so callbacks that keep
    /// arriving after expiry are harmless.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Tick> {
        if self.stopped {
            return None;
        }
        let remaining_secs = self.remaining_at(now);
        let expired = remaining_secs == 0;
        if expired {
            self.expired = true;
            self.stopped = true;
        }
        Some(Tick {
            remaining_secs,
            expired,
        })
    }

    /// Cancel the countdown without expiring it.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Render seconds as `M:SS`.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn untouched_countdown_reports_full_duration() {
        for minutes in [1_u32, 15, 30, 45, 60, 240] {
            let countdown = Countdown::start(minutes, fixed_now());
            assert_eq!(
                countdown.remaining_at(fixed_now()),
                u64::from(minutes) * 60
            );
        }
    }

    #[test]
    fn remaining_follows_wall_clock_not_tick_count() {
        let start = fixed_now();
        let mut sparse = Countdown::start(2, start);
        let mut dense = Countdown::start(2, start);

        for second in 1..=45 {
            dense.tick(start + Duration::seconds(second));
        }
        // a single late tick after a long pause
        let late = sparse.tick(start + Duration::seconds(45)).unwrap();
        let regular = dense.tick(start + Duration::seconds(45)).unwrap();

        assert_eq!(late.remaining_secs, 75);
        assert_eq!(regular.remaining_secs, 75);
        assert_eq!(sparse.remaining_at(start + Duration::seconds(200)), 0);
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let start = fixed_now();
        let mut countdown = Countdown::start(1, start);

        let before = countdown.tick(start + Duration::seconds(59)).unwrap();
        assert_eq!(before.remaining_secs, 1);
        assert!(!before.expired);

        let at_zero = countdown.tick(start + Duration::seconds(60)).unwrap();
        assert_eq!(at_zero.remaining_secs, 0);
        assert!(at_zero.expired);

        assert!(countdown.tick(start + Duration::seconds(61)).is_none());
        assert!(countdown.tick(start + Duration::seconds(300)).is_none());
        assert!(countdown.is_expired());
    }

    #[test]
    fn stopped_countdown_never_expires() {
        let start = fixed_now();
        let mut countdown = Countdown::start(1, start);
        countdown.stop();

        assert!(countdown.tick(start + Duration::seconds(120)).is_none());
        assert!(!countdown.is_expired());
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(1_800), "30:00");
        assert_eq!(format_remaining(61), "1:01");
        assert_eq!(format_remaining(0), "0:00");
    }
}
