//! Spoken-summary composition
//!
//! Text-to-speech rendering is the host's job; this module only composes the
//! sentences it speaks.

use crate::types::{AlertEvent, Reading};

/// One-breath summary of a reading.
///
/// Example: "You are sitting. Light is normal. Sound is quiet."
pub fn spoken_summary(reading: &Reading) -> String {
    format!(
        "You are {}. Light is {}. Sound is {}.",
        reading.activity.as_str().to_lowercase(),
        reading.light.as_str().to_lowercase(),
        reading.noise.as_str().to_lowercase()
    )
}

/// Spoken form of an alert
pub fn alert_phrase(event: &AlertEvent) -> String {
    format!("{} {}", event.title(), event.body())
}
