//! SenseAware - on-device classification engine for handheld sensor streams
//!
//! SenseAware reduces noisy motion, light, sound, and orientation streams to
//! discrete human-readable states through a deterministic per-tick pipeline:
//! magnitude buffering → variance → threshold classification → reading →
//! tracker update → collaborator fan-out.
//!
//! ## Modules
//!
//! - **Classification**: rolling variance buffer plus data-driven threshold
//!   tables for activity, light, and noise, and the gravity axis-dominance
//!   rule for orientation
//! - **Tracking**: category transition accounting (active/rest totals) and
//!   latched held-category alerts
//! - **Pipeline**: per-session orchestration with host-supplied persistence
//!   and notification collaborators

pub mod buffer;
pub mod classify;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod sim;
pub mod speech;
pub mod store;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{EngineConfig, Settings};
pub use error::EngineError;
pub use pipeline::{SensorPipeline, SessionInfo, SourceAvailability, Tick};
pub use tracker::ActivityTracker;
pub use types::{
    ActivityLabel, ActivityTotals, AlertEvent, LightLabel, NoiseLabel, OrientationLabel, Reading,
    SensorEvent,
};

/// Engine version embedded in session metadata and CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for session metadata
pub const PRODUCER_NAME: &str = "senseaware";
