//! Notification collaborator seam
//!
//! Alert delivery (push notifications, haptics) lives in the host; the
//! engine raises `AlertEvent`s through the `Notifier` trait and never waits
//! on the result. Condition alerts derived from a single reading live here
//! too, next to the seam that delivers them.

use crate::types::{AlertEvent, LightLabel, NoiseLabel, Reading};

/// Fire-and-forget alert sink supplied by the host
pub trait Notifier {
    fn raise(&mut self, event: &AlertEvent);
}

/// Notifier that drops everything (the default collaborator)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn raise(&mut self, _event: &AlertEvent) {}
}

/// Notifier that records raised events, for tests and polling hosts
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    pub events: Vec<AlertEvent>,
}

impl Notifier for CollectingNotifier {
    fn raise(&mut self, event: &AlertEvent) {
        self.events.push(event.clone());
    }
}

/// Condition alerts for a single reading.
///
/// Only evaluated when migraine mode is on: bright light and very loud
/// noise each raise one alert per offending reading.
pub fn condition_alerts(reading: &Reading, migraine_mode: bool) -> Vec<AlertEvent> {
    if !migraine_mode {
        return Vec::new();
    }

    let mut alerts = Vec::new();
    if reading.light == LightLabel::Bright {
        alerts.push(AlertEvent::BrightLight);
    }
    if reading.noise == NoiseLabel::VeryLoud {
        alerts.push(AlertEvent::LoudNoise);
    }
    alerts
}
