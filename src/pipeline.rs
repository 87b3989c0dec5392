//! Pipeline orchestration
//!
//! `SensorPipeline` owns all mutable per-session state: the rolling
//! magnitude buffer, the activity tracker, and the last-known light, noise,
//! and orientation values. Every motion sample drives one synchronous tick:
//! buffer push, variance, classification, consumer callback, tracker update,
//! persistence append. Nothing is shared through globals, so independent
//! pipelines (one per monitoring session, or many in tests) coexist freely.

use chrono::Utc;
use uuid::Uuid;

use crate::buffer::SignalBuffer;
use crate::classify::{
    classify_activity, classify_light, classify_noise, classify_orientation_with,
};
use crate::config::{EngineConfig, Settings};
use crate::notify::{condition_alerts, Notifier, NullNotifier};
use crate::store::{MemoryHistory, ReadingStore};
use crate::tracker::ActivityTracker;
use crate::types::{
    AccelSample, ActivityLabel, ActivityTotals, AlertEvent, GravityVector, NoiseLabel,
    OrientationLabel, Reading, SensorEvent,
};

/// Light level assumed until the first illuminance sample arrives (lux)
const DEFAULT_LIGHT_LUX: f64 = 50.0;

/// Noise label reported while no loudness stream is available
const NEUTRAL_NOISE: NoiseLabel = NoiseLabel::Quiet;

/// Which raw sensor streams the host can supply for a session.
///
/// A missing stream is not an error: the pipeline runs degraded, reporting
/// the neutral label for that signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceAvailability {
    pub motion: bool,
    pub light: bool,
    pub noise: bool,
    pub gravity: bool,
}

impl Default for SourceAvailability {
    fn default() -> Self {
        Self {
            motion: true,
            light: true,
            noise: true,
            gravity: true,
        }
    }
}

impl SourceAvailability {
    pub fn any_enabled(&self) -> bool {
        self.motion || self.light || self.noise || self.gravity
    }
}

/// Metadata for one monitoring session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub started_at: chrono::DateTime<Utc>,
    pub sources: SourceAvailability,
}

/// Result of one motion tick: the produced reading and the alerts raised
/// through the notification collaborator for it
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Tick {
    pub reading: Reading,
    pub alerts: Vec<AlertEvent>,
}

/// Per-session classification engine.
///
/// All ingestion takes `&mut self`, which serializes access; hosts with
/// concurrent sensor callbacks wrap the pipeline in a mutex or funnel
/// events through one channel.
pub struct SensorPipeline {
    config: EngineConfig,
    settings: Settings,
    buffer: SignalBuffer,
    tracker: ActivityTracker,
    light_level: f64,
    noise_level: Option<f64>,
    orientation: OrientationLabel,
    session: Option<SessionInfo>,
    consumer: Option<Box<dyn FnMut(&Reading)>>,
    store: Box<dyn ReadingStore>,
    notifier: Box<dyn Notifier>,
}

impl Default for SensorPipeline {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Settings::default())
    }
}

impl SensorPipeline {
    /// Pipeline with in-memory history and a no-op notifier
    pub fn new(config: EngineConfig, settings: Settings) -> Self {
        Self::with_collaborators(
            config,
            settings,
            Box::new(MemoryHistory::default()),
            Box::new(NullNotifier),
        )
    }

    /// Pipeline with host-supplied persistence and notification collaborators
    pub fn with_collaborators(
        config: EngineConfig,
        settings: Settings,
        store: Box<dyn ReadingStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let now = Utc::now();
        let buffer = SignalBuffer::new(config.buffer_capacity);
        let tracker = ActivityTracker::new(
            ActivityLabel::Sitting,
            config.sit_alert_threshold_minutes,
            now,
        );
        Self {
            config,
            settings,
            buffer,
            tracker,
            light_level: DEFAULT_LIGHT_LUX,
            noise_level: None,
            orientation: OrientationLabel::Unknown,
            session: None,
            consumer: None,
            store,
            notifier,
        }
    }

    /// Start a monitoring session.
    ///
    /// Any previous session is torn down first (the original subscribe
    /// semantics). The returned info echoes which sources the session runs
    /// with; unavailable ones leave the pipeline in degraded mode rather
    /// than failing the subscribe.
    pub fn subscribe<F>(&mut self, sources: SourceAvailability, consumer: F) -> SessionInfo
    where
        F: FnMut(&Reading) + 'static,
    {
        self.unsubscribe();

        let now = Utc::now();
        self.buffer = SignalBuffer::new(self.config.buffer_capacity);
        self.tracker = ActivityTracker::new(
            ActivityLabel::Sitting,
            self.config.sit_alert_threshold_minutes,
            now,
        );
        self.consumer = Some(Box::new(consumer));

        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            started_at: now,
            sources,
        };
        self.session = Some(info.clone());
        info
    }

    /// End the current session.
    ///
    /// Idempotent and safe without a prior subscribe: releases the consumer,
    /// clears the buffer, resets the tracker and the last-known-value cache.
    /// The pipeline stays reusable for a new session.
    pub fn unsubscribe(&mut self) {
        self.consumer = None;
        self.session = None;
        self.buffer.clear();
        self.tracker.reset(Utc::now());
        self.light_level = DEFAULT_LIGHT_LUX;
        self.noise_level = None;
        self.orientation = OrientationLabel::Unknown;
    }

    pub fn is_subscribed(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Swap user settings mid-session (toggles apply from the next tick)
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Dispatch one wire-format event to the matching handler
    pub fn handle_event(&mut self, event: &SensorEvent) -> Option<Tick> {
        match *event {
            SensorEvent::Accel { x, y, z, timestamp } => {
                self.handle_accel(AccelSample::new(x, y, z, timestamp))
            }
            SensorEvent::Light { illuminance } => {
                self.handle_light(illuminance);
                None
            }
            SensorEvent::Noise { level } => {
                self.handle_noise(level);
                None
            }
            SensorEvent::Gravity { x, y, z } => {
                self.handle_gravity(GravityVector::new(x, y, z));
                None
            }
        }
    }

    /// Ingest a motion sample and run one classification tick.
    ///
    /// Returns `None` when no session is active or the session was
    /// subscribed without a motion source.
    pub fn handle_accel(&mut self, sample: AccelSample) -> Option<Tick> {
        let sources = self.session.as_ref()?.sources;
        if !sources.motion {
            return None;
        }

        self.buffer.push(sample.magnitude());
        let variance = self.buffer.variance();

        let noise = match self.noise_level {
            Some(level) => classify_noise(&self.config.noise_bands, level),
            None => NEUTRAL_NOISE,
        };
        let reading = Reading {
            activity: classify_activity(&self.config.activity_bands, variance),
            light: classify_light(&self.config.light_bands, self.light_level),
            noise,
            orientation: self.orientation,
            timestamp: sample.timestamp,
        };

        if let Some(consumer) = self.consumer.as_mut() {
            consumer(&reading);
        }

        // The tracker always observes the reading so accounting and the
        // alert latch advance even while notifications are switched off.
        let tracker_alert = self.tracker.observe(&reading);

        let mut alerts = Vec::new();
        if self.settings.notifications_enabled {
            alerts.extend(tracker_alert);
            alerts.extend(condition_alerts(
                &reading,
                self.settings.migraine_mode_enabled,
            ));
            for alert in &alerts {
                self.notifier.raise(alert);
            }
        }

        self.store.append(&reading);

        Some(Tick { reading, alerts })
    }

    /// Cache the latest illuminance sample (lux)
    pub fn handle_light(&mut self, illuminance: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.sources.light && illuminance.is_finite() {
            self.light_level = illuminance;
        }
    }

    /// Cache the latest loudness sample (dB)
    pub fn handle_noise(&mut self, level: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.sources.noise && level.is_finite() {
            self.noise_level = Some(level);
        }
    }

    /// Classify and cache the latest gravity vector
    pub fn handle_gravity(&mut self, gravity: GravityVector) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.sources.gravity {
            self.orientation =
                classify_orientation_with(Some(gravity), self.config.orientation_dominance);
        }
    }

    /// Finalized activity totals for the current session
    pub fn totals(&self) -> ActivityTotals {
        self.tracker.totals()
    }

    /// Totals including the still-open category session
    pub fn totals_at(&self, now: chrono::DateTime<Utc>) -> ActivityTotals {
        self.tracker.totals_at(now)
    }

    pub fn current_activity(&self) -> ActivityLabel {
        self.tracker.current_category()
    }

    /// Spoken summary for a reading, or `None` while the TTS toggle is off
    pub fn spoken_summary(&self, reading: &Reading) -> Option<String> {
        self.settings
            .tts_enabled
            .then(|| crate::speech::spoken_summary(reading))
    }

    /// Stored readings, most recent first
    pub fn history(&self) -> Vec<Reading> {
        self.store.list()
    }

    pub fn clear_history(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LightLabel;
    use chrono::{DateTime, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// Feed `count` samples whose magnitudes alternate around 1.0 with the
    /// given amplitude, yielding a variance of amplitude^2.
    fn feed_alternating(
        pipeline: &mut SensorPipeline,
        amplitude: f64,
        count: usize,
        start_secs: i64,
    ) -> Option<Tick> {
        let mut last = None;
        for i in 0..count {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let magnitude = 1.0 + sign * amplitude;
            let sample = AccelSample::new(magnitude, 0.0, 0.0, ts(start_secs + i as i64));
            last = pipeline.handle_accel(sample);
        }
        last
    }

    #[test]
    fn test_unsubscribed_pipeline_ignores_samples() {
        let mut pipeline = SensorPipeline::default();
        let tick = pipeline.handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(0)));
        assert!(tick.is_none());
        assert!(pipeline.history().is_empty());
    }

    #[test]
    fn test_end_to_end_variance_classification() {
        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        // Alternating +-0.1 around 1.0 gives variance 0.01 -> Sitting.
        let tick = feed_alternating(&mut pipeline, 0.1, 50, 0).unwrap();
        assert_eq!(tick.reading.activity, ActivityLabel::Sitting);

        // Variance ~0.05 -> Walking (buffer refills over 50 samples).
        let tick = feed_alternating(&mut pipeline, 0.05_f64.sqrt(), 50, 100).unwrap();
        assert_eq!(tick.reading.activity, ActivityLabel::Walking);

        // Variance 0.5 -> Running.
        let tick = feed_alternating(&mut pipeline, 0.5_f64.sqrt(), 50, 200).unwrap();
        assert_eq!(tick.reading.activity, ActivityLabel::Running);
    }

    #[test]
    fn test_consumer_sees_every_reading() {
        let seen: Rc<RefCell<Vec<Reading>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), move |reading| {
            sink.borrow_mut().push(reading.clone());
        });

        feed_alternating(&mut pipeline, 0.01, 5, 0);
        assert_eq!(seen.borrow().len(), 5);
    }

    #[test]
    fn test_last_known_values_flow_into_reading() {
        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        pipeline.handle_light(150.0);
        pipeline.handle_noise(90.0);
        pipeline.handle_gravity(GravityVector::new(0.0, 0.0, 0.9));

        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(0)))
            .unwrap();
        assert_eq!(tick.reading.light, LightLabel::Bright);
        assert_eq!(tick.reading.noise, NoiseLabel::VeryLoud);
        assert_eq!(tick.reading.orientation, OrientationLabel::FaceDown);

        // Stale values persist until the next sensor callback.
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(1)))
            .unwrap();
        assert_eq!(tick.reading.light, LightLabel::Bright);
    }

    #[test]
    fn test_degraded_session_without_noise_stream() {
        let mut pipeline = SensorPipeline::default();
        let sources = SourceAvailability {
            noise: false,
            ..SourceAvailability::default()
        };
        let info = pipeline.subscribe(sources, |_| {});
        assert!(!info.sources.noise);

        // Noise callbacks are ignored; readings carry the neutral label.
        pipeline.handle_noise(95.0);
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(0)))
            .unwrap();
        assert_eq!(tick.reading.noise, NoiseLabel::Quiet);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_clears_state() {
        let mut pipeline = SensorPipeline::default();

        // Never subscribed: still a no-op.
        pipeline.unsubscribe();
        pipeline.unsubscribe();

        pipeline.subscribe(SourceAvailability::default(), |_| {});
        feed_alternating(&mut pipeline, 0.01, 10, 0);
        assert!(pipeline.is_subscribed());

        pipeline.unsubscribe();
        assert!(!pipeline.is_subscribed());
        assert_eq!(pipeline.totals(), ActivityTotals::default());
        assert_eq!(pipeline.current_activity(), ActivityLabel::Unknown);

        // Second call after teardown: no-op, no panic.
        pipeline.unsubscribe();
    }

    #[test]
    fn test_resubscribe_starts_fresh_session() {
        let mut pipeline = SensorPipeline::default();
        let first = pipeline.subscribe(SourceAvailability::default(), |_| {});
        feed_alternating(&mut pipeline, 0.5, 10, 0);

        let second = pipeline.subscribe(SourceAvailability::default(), |_| {});
        assert_ne!(first.session_id, second.session_id);

        // Fresh buffer: one tiny sample classifies from scratch.
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(100)))
            .unwrap();
        assert_eq!(tick.reading.activity, ActivityLabel::Sitting);
    }

    #[test]
    fn test_history_receives_appends() {
        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), |_| {});
        feed_alternating(&mut pipeline, 0.01, 3, 0);

        let history = pipeline.history();
        assert_eq!(history.len(), 3);
        // Most recent first.
        assert_eq!(history[0].timestamp, ts(2));

        pipeline.clear_history();
        assert!(pipeline.history().is_empty());
    }

    /// Notifier backed by shared storage the test can inspect afterwards
    struct SharedNotifier(Rc<RefCell<Vec<AlertEvent>>>);

    impl Notifier for SharedNotifier {
        fn raise(&mut self, event: &AlertEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_sit_alert_reaches_notifier_and_tick() {
        let raised: Rc<RefCell<Vec<AlertEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let mut config = EngineConfig::default();
        config.sit_alert_threshold_minutes = 1;
        let mut pipeline = SensorPipeline::with_collaborators(
            config,
            Settings::default(),
            Box::new(crate::store::MemoryHistory::default()),
            Box::new(SharedNotifier(Rc::clone(&raised))),
        );
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        // Still samples, one per second, for 70 seconds.
        let mut fired = Vec::new();
        for i in 0..70 {
            let tick = pipeline
                .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(i)))
                .unwrap();
            fired.extend(tick.alerts);
        }

        assert_eq!(fired.len(), 1);
        assert!(matches!(
            fired[0],
            AlertEvent::CategoryHeld {
                category: ActivityLabel::Sitting,
                ..
            }
        ));
        // The notification collaborator saw the same single alert.
        assert_eq!(*raised.borrow(), fired);
    }

    #[test]
    fn test_notifications_toggle_suppresses_alerts() {
        let mut config = EngineConfig::default();
        config.sit_alert_threshold_minutes = 1;
        let settings = Settings {
            notifications_enabled: false,
            ..Settings::default()
        };
        let mut pipeline = SensorPipeline::new(config, settings);
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        for i in 0..70 {
            let tick = pipeline
                .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(i)))
                .unwrap();
            assert!(tick.alerts.is_empty());
        }
    }

    #[test]
    fn test_migraine_mode_condition_alerts() {
        let settings = Settings {
            migraine_mode_enabled: true,
            ..Settings::default()
        };
        let mut pipeline = SensorPipeline::new(EngineConfig::default(), settings);
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        pipeline.handle_light(500.0);
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(0)))
            .unwrap();
        assert!(tick.alerts.contains(&AlertEvent::BrightLight));

        // Same conditions without migraine mode stay silent.
        pipeline.set_settings(Settings::default());
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(1)))
            .unwrap();
        assert!(tick.alerts.is_empty());
    }

    #[test]
    fn test_spoken_summary_honors_tts_toggle() {
        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), |_| {});
        let tick = pipeline
            .handle_accel(AccelSample::new(1.0, 0.0, 0.0, ts(0)))
            .unwrap();

        let summary = pipeline.spoken_summary(&tick.reading);
        assert_eq!(
            summary.as_deref(),
            Some("You are sitting. Light is normal. Sound is quiet.")
        );

        pipeline.set_settings(Settings {
            tts_enabled: false,
            ..Settings::default()
        });
        assert!(pipeline.spoken_summary(&tick.reading).is_none());
    }

    #[test]
    fn test_independent_pipelines_do_not_interfere() {
        let mut a = SensorPipeline::default();
        let mut b = SensorPipeline::default();
        a.subscribe(SourceAvailability::default(), |_| {});
        b.subscribe(SourceAvailability::default(), |_| {});

        feed_alternating(&mut a, 0.5_f64.sqrt(), 50, 0);
        let tick_b = feed_alternating(&mut b, 0.01, 50, 0).unwrap();

        // b's buffer never saw a's vigorous samples.
        assert_eq!(tick_b.reading.activity, ActivityLabel::Sitting);
        assert_eq!(a.history().len(), 50);
        assert_eq!(b.history().len(), 50);
    }

    #[test]
    fn test_handle_event_dispatch() {
        let mut pipeline = SensorPipeline::default();
        pipeline.subscribe(SourceAvailability::default(), |_| {});

        assert!(pipeline
            .handle_event(&SensorEvent::Light { illuminance: 5.0 })
            .is_none());
        let tick = pipeline
            .handle_event(&SensorEvent::Accel {
                x: 1.0,
                y: 0.0,
                z: 0.0,
                timestamp: ts(0),
            })
            .unwrap();
        assert_eq!(tick.reading.light, LightLabel::Dark);
    }
}
