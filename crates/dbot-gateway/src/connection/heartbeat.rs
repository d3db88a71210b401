//! Heartbeat timer

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic heartbeat schedule for one socket
///
/// The first tick fires one full period after start. Dropping the timer
/// cancels it.
#[derive(Debug)]
pub struct HeartbeatTimer {
    interval: Interval,
    period: Duration,
}

impl HeartbeatTimer {
    /// Start a timer; `None` for a zero period
    #[must_use]
    pub fn start(period_ms: u64) -> Option<Self> {
        if period_ms == 0 {
            return None;
        }
        let period = Duration::from_millis(period_ms);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(Self { interval, period })
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Tick of an optional timer; pending forever when there is none
pub(crate) async fn next_tick(timer: &mut Option<HeartbeatTimer>) {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}
