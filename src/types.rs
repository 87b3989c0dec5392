//! Core types for the SenseAware engine
//!
//! This module defines the data that flows through the pipeline: raw sensor
//! samples, the discrete category labels each signal is reduced to, the
//! per-tick `Reading` snapshot, and the alert events raised by the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity classification derived from motion variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLabel {
    Sitting,
    Walking,
    Running,
    Vehicle,
    Unknown,
}

impl ActivityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLabel::Sitting => "Sitting",
            ActivityLabel::Walking => "Walking",
            ActivityLabel::Running => "Running",
            ActivityLabel::Vehicle => "Vehicle",
            ActivityLabel::Unknown => "Unknown",
        }
    }

    /// Categories that accumulate into the "active" total
    pub fn is_active(&self) -> bool {
        matches!(self, ActivityLabel::Walking | ActivityLabel::Running)
    }

    /// Categories that accumulate into the "rest" total
    pub fn is_rest(&self) -> bool {
        matches!(self, ActivityLabel::Sitting)
    }
}

/// Ambient light classification from illuminance (lux)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightLabel {
    Dark,
    Dim,
    Normal,
    Bright,
}

impl LightLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightLabel::Dark => "Dark",
            LightLabel::Dim => "Dim",
            LightLabel::Normal => "Normal",
            LightLabel::Bright => "Bright",
        }
    }
}

/// Ambient noise classification from loudness (dB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLabel {
    VeryQuiet,
    Quiet,
    Moderate,
    Loud,
    VeryLoud,
}

impl NoiseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseLabel::VeryQuiet => "Very Quiet",
            NoiseLabel::Quiet => "Quiet",
            NoiseLabel::Moderate => "Moderate",
            NoiseLabel::Loud => "Loud",
            NoiseLabel::VeryLoud => "Very Loud",
        }
    }
}

/// Device orientation classification from the gravity vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationLabel {
    Upright,
    UpsideDown,
    Left,
    Right,
    FaceUp,
    FaceDown,
    Flat,
    Unknown,
}

impl OrientationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationLabel::Upright => "Upright",
            OrientationLabel::UpsideDown => "Upside Down",
            OrientationLabel::Left => "Left",
            OrientationLabel::Right => "Right",
            OrientationLabel::FaceUp => "Face Up",
            OrientationLabel::FaceDown => "Face Down",
            OrientationLabel::Flat => "Flat",
            OrientationLabel::Unknown => "Unknown",
        }
    }
}

/// One classified snapshot of all tracked signals at an instant.
///
/// Produced once per motion tick and forwarded unchanged to the consumer
/// callback, the tracker, and the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub activity: ActivityLabel,
    pub light: LightLabel,
    pub noise: NoiseLabel,
    pub orientation: OrientationLabel,
    pub timestamp: DateTime<Utc>,
}

/// A raw three-axis acceleration sample (g units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: DateTime<Utc>,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: DateTime<Utc>) -> Self {
        Self { x, y, z, timestamp }
    }

    /// Euclidean magnitude of the sample
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A three-axis gravity vector (g units), used for orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GravityVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A raw sensor event on the wire (CLI / FFI ingestion format).
///
/// Light, noise, and gravity events only refresh the pipeline's last-known
/// values; accel events drive a full classification tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor", rename_all = "snake_case")]
pub enum SensorEvent {
    Accel {
        x: f64,
        y: f64,
        z: f64,
        timestamp: DateTime<Utc>,
    },
    Light {
        illuminance: f64,
    },
    Noise {
        level: f64,
    },
    Gravity {
        x: f64,
        y: f64,
        z: f64,
    },
}

/// Alert raised through the notification collaborator.
///
/// `CategoryHeld` comes from the tracker (at most once per continuous
/// category session); the condition variants come from per-reading checks
/// when migraine mode is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    CategoryHeld {
        category: ActivityLabel,
        held_secs: i64,
    },
    BrightLight,
    LoudNoise,
}

impl AlertEvent {
    pub fn title(&self) -> &'static str {
        match self {
            AlertEvent::CategoryHeld { .. } => "Time to Move!",
            AlertEvent::BrightLight => "Bright Light Alert",
            AlertEvent::LoudNoise => "Loud Noise Alert",
        }
    }

    pub fn body(&self) -> String {
        match self {
            AlertEvent::CategoryHeld { category, .. } => format!(
                "You've been {} for a while. Take a break!",
                category.as_str().to_lowercase()
            ),
            AlertEvent::BrightLight => {
                "Consider wearing sunglasses or moving to shade.".to_string()
            }
            AlertEvent::LoudNoise => "Consider using earplugs or moving away.".to_string(),
        }
    }
}

/// Aggregate time spent per behavioral bucket, in milliseconds.
///
/// Walking and Running accumulate into `active_ms`, Sitting into `rest_ms`;
/// Vehicle and Unknown spans count toward neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotals {
    pub active_ms: i64,
    pub rest_ms: i64,
}

impl ActivityTotals {
    pub fn active_minutes(&self) -> i64 {
        self.active_ms / 60_000
    }

    pub fn rest_minutes(&self) -> i64 {
        self.rest_ms / 60_000
    }
}
