//! Poll schedule: owns the interval and the next-due timestamp.
//!
//! Timing is never persisted. A restart recomputes the next due time as
//! now + interval, exactly like first startup.

use chrono::{DateTime, Duration, Utc};
use log::warn;

/// Shortest allowed poll interval. BLE reads drain the sensor battery, so
/// polling more often than hourly is refused.
pub const MIN_INTERVAL_MINUTES: i64 = 60;

/// Longest allowed poll interval (one day).
pub const MAX_INTERVAL_MINUTES: i64 = 1440;

/// Clamp a requested interval into the allowed range.
///
/// Out-of-range values are a configuration warning, not an error: the
/// bridge keeps running with the clamped value.
pub fn clamp_interval(requested: i64) -> i64 {
    if requested < MIN_INTERVAL_MINUTES {
        warn!(
            "Requested poll interval of {} minutes is too short; using {} minutes",
            requested, MIN_INTERVAL_MINUTES
        );
        MIN_INTERVAL_MINUTES
    } else if requested > MAX_INTERVAL_MINUTES {
        warn!(
            "Requested poll interval of {} minutes is too long; using {} minutes",
            requested, MAX_INTERVAL_MINUTES
        );
        MAX_INTERVAL_MINUTES
    } else {
        requested
    }
}

/// Decides when a poll cycle should run.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    next_due: DateTime<Utc>,
}

impl PollScheduler {
    pub fn new(requested_minutes: i64) -> Self {
        Self::starting_at(requested_minutes, Utc::now())
    }

    /// Construct with an explicit clock, for tests.
    pub fn starting_at(requested_minutes: i64, now: DateTime<Utc>) -> Self {
        let interval = Duration::minutes(clamp_interval(requested_minutes));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval.num_minutes()
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_due
    }

    /// Push the next due time to now + interval.
    ///
    /// Called whenever a cycle runs, due or manually triggered, even when
    /// the cycle fails. This keeps a failing transport from turning into a
    /// tight retry loop.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.next_due = now + self.interval;
    }

    /// Heartbeat check: returns true when a poll cycle should run now, and
    /// advances the schedule before the caller starts the cycle.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.advance(now);
        true
    }
}
