use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::cancel::CancelToken;

/// How often the countdown is re-evaluated.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic wake-up source for a running countdown.
///
/// Carries no time itself: the controller recomputes remaining time from the
/// wall clock on every tick, so late or skipped ticks never cause drift.
/// Ends (`tick` returns `None`) once the countdown stops, expires, or the
/// session is closed.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
    stop: CancelToken,
}

impl Ticker {
    pub(crate) fn new(period: Duration, stop: CancelToken) -> Self {
        Self {
            period,
            interval: None,
            stop,
        }
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) -> Option<()> {
        if self.stop.is_cancelled() {
            return None;
        }
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        tokio::select! {
            biased;
            () = self.stop.cancelled() => None,
            _ = interval.tick() => Some(()),
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let stop = CancelToken::new();
        let mut ticker = Ticker::new(TICK_PERIOD, stop.clone());
        let started = Instant::now();

        assert_eq!(ticker.tick().await, Some(()));
        assert_eq!(ticker.tick().await, Some(()));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_pending_tick() {
        let stop = CancelToken::new();
        let mut ticker = Ticker::new(Duration::from_secs(60), stop.clone());
        let canceller = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        assert_eq!(ticker.tick().await, None);
        assert!(ticker.is_stopped());
        assert_eq!(ticker.tick().await, None);
    }
}
