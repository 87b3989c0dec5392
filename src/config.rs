//! Engine configuration and user settings
//!
//! `EngineConfig` carries the tunable thresholds and cadences the pipeline
//! runs with; `Settings` carries the user-facing preference toggles. Both are
//! plain serde structs with JSON save/load so the host's storage layer can
//! persist them without knowing their shape.

use serde::{Deserialize, Serialize};

use crate::classify::{
    default_activity_table, default_light_table, default_noise_table, ThresholdTable,
    DEFAULT_ORIENTATION_DOMINANCE,
};
use crate::error::EngineError;
use crate::types::{ActivityLabel, LightLabel, NoiseLabel};

/// Default sitting-alert threshold in minutes
pub const DEFAULT_SIT_ALERT_THRESHOLD_MINUTES: u32 = 15;

/// Default motion sampling cadence in milliseconds
pub const DEFAULT_MOTION_SAMPLE_INTERVAL_MS: u64 = 200;

/// Tunable engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes of continuous sitting before the tracker raises an alert
    pub sit_alert_threshold_minutes: u32,
    /// Cadence the host is expected to deliver motion samples at
    pub motion_sample_interval_ms: u64,
    /// Capacity of the rolling magnitude window
    pub buffer_capacity: usize,
    /// Variance bands for activity classification
    pub activity_bands: ThresholdTable<ActivityLabel>,
    /// Illuminance bands for light classification
    pub light_bands: ThresholdTable<LightLabel>,
    /// Loudness bands for noise classification
    pub noise_bands: ThresholdTable<NoiseLabel>,
    /// Axis-dominance threshold for orientation (g units)
    pub orientation_dominance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sit_alert_threshold_minutes: DEFAULT_SIT_ALERT_THRESHOLD_MINUTES,
            motion_sample_interval_ms: DEFAULT_MOTION_SAMPLE_INTERVAL_MS,
            buffer_capacity: crate::buffer::DEFAULT_BUFFER_CAPACITY,
            activity_bands: default_activity_table(),
            light_bands: default_light_table(),
            noise_bands: default_noise_table(),
            orientation_dominance: DEFAULT_ORIENTATION_DOMINANCE,
        }
    }
}

impl EngineConfig {
    /// Check invariants that serde cannot enforce
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sit_alert_threshold_minutes == 0 {
            return Err(EngineError::InvalidConfig(
                "sit_alert_threshold_minutes must be positive".to_string(),
            ));
        }
        if self.motion_sample_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "motion_sample_interval_ms must be positive".to_string(),
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "buffer_capacity must be positive".to_string(),
            ));
        }
        if !(self.orientation_dominance.is_finite() && self.orientation_dominance > 0.0) {
            return Err(EngineError::InvalidConfig(
                "orientation_dominance must be a positive finite number".to_string(),
            ));
        }
        self.activity_bands.validate()?;
        self.light_bands.validate()?;
        self.noise_bands.validate()?;
        Ok(())
    }

    /// Load a configuration from JSON, validating the threshold tables
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize for the host's save/load interface
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// User-facing preference toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Spoken summaries enabled
    pub tts_enabled: bool,
    /// Alerts forwarded to the notification collaborator
    pub notifications_enabled: bool,
    /// Bright-light / loud-noise condition alerts enabled
    pub migraine_mode_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tts_enabled: true,
            notifications_enabled: true,
            migraine_mode_enabled: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
