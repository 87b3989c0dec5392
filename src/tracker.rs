//! Activity time tracking
//!
//! This module watches the stream of classified readings for category
//! transitions, accumulates elapsed time into the active/rest aggregates,
//! and raises an alert when a watched category is held past the configured
//! threshold. Alerts are latched so a continuous session fires at most once.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ActivityLabel, ActivityTotals, AlertEvent, Reading};

/// State machine over activity categories with time accounting.
///
/// The tracker assumes a monotonic clock; wall-clock jumps (a device time
/// change mid-session) are a known accepted limitation.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    current: ActivityLabel,
    entered_at: DateTime<Utc>,
    totals: ActivityTotals,
    alert_fired: bool,
    alert_category: ActivityLabel,
    alert_after: Duration,
}

impl ActivityTracker {
    /// Create a tracker watching `alert_category` for sustained holds
    pub fn new(
        alert_category: ActivityLabel,
        alert_after_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            current: ActivityLabel::Unknown,
            entered_at: now,
            totals: ActivityTotals::default(),
            alert_fired: false,
            alert_category,
            alert_after: Duration::minutes(i64::from(alert_after_minutes)),
        }
    }

    /// Ingest one classified reading.
    ///
    /// Same-category ticks re-measure the held duration and may emit the
    /// session's single alert; a category change finalizes the elapsed span
    /// into the aggregates and resets the session.
    pub fn observe(&mut self, reading: &Reading) -> Option<AlertEvent> {
        let now = reading.timestamp;

        if reading.activity == self.current {
            let held = now - self.entered_at;
            if self.current == self.alert_category && held > self.alert_after && !self.alert_fired
            {
                self.alert_fired = true;
                return Some(AlertEvent::CategoryHeld {
                    category: self.current,
                    held_secs: held.num_seconds(),
                });
            }
            return None;
        }

        let elapsed = now - self.entered_at;
        credit(&mut self.totals, self.current, elapsed);
        self.current = reading.activity;
        self.entered_at = now;
        self.alert_fired = false;
        None
    }

    pub fn current_category(&self) -> ActivityLabel {
        self.current
    }

    /// Elapsed time since the current category session began
    pub fn held_duration(&self, now: DateTime<Utc>) -> Duration {
        now - self.entered_at
    }

    /// Finalized aggregates (completed category sessions only)
    pub fn totals(&self) -> ActivityTotals {
        self.totals
    }

    /// Aggregates including the still-open session, as a live display shows
    pub fn totals_at(&self, now: DateTime<Utc>) -> ActivityTotals {
        let mut totals = self.totals;
        credit(&mut totals, self.current, now - self.entered_at);
        totals
    }

    /// Return to the initial state without reallocating
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.current = ActivityLabel::Unknown;
        self.entered_at = now;
        self.totals = ActivityTotals::default();
        self.alert_fired = false;
    }
}

fn credit(totals: &mut ActivityTotals, category: ActivityLabel, elapsed: Duration) {
    let ms = elapsed.num_milliseconds();
    if category.is_active() {
        totals.active_ms += ms;
    } else if category.is_rest() {
        totals.rest_ms += ms;
    }
}
