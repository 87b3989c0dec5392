//! Walk a scripted monitoring session through the pipeline

use chrono::{Duration, Utc};
use senseaware::pipeline::{SensorPipeline, SourceAvailability};
use senseaware::types::{AccelSample, GravityVector};

fn main() {
    let mut pipeline = SensorPipeline::default();
    let info = pipeline.subscribe(SourceAvailability::default(), |reading| {
        println!(
            "{} | {:<8} light {:<6} noise {:<10} {}",
            reading.timestamp.format("%H:%M:%S"),
            reading.activity.as_str(),
            reading.light.as_str(),
            reading.noise.as_str(),
            reading.orientation.as_str()
        );
    });
    println!("session {} started", info.session_id);

    pipeline.handle_light(45.0);
    pipeline.handle_noise(42.0);
    pipeline.handle_gravity(GravityVector::new(0.0, -0.95, 0.1));

    let start = Utc::now();
    let step = Duration::milliseconds(200);

    // Two minutes sitting still, then half a minute of brisk motion.
    for i in 0..600 {
        let jitter = if i % 2 == 0 { 0.05 } else { -0.05 };
        let sample = AccelSample::new(1.0 + jitter, 0.0, 0.0, start + step * i);
        pipeline.handle_accel(sample);
    }
    for i in 600..750 {
        let swing = if i % 2 == 0 { 0.7 } else { -0.7 };
        let sample = AccelSample::new(1.0 + swing, 0.0, 0.0, start + step * i);
        pipeline.handle_accel(sample);
    }

    let end = start + step * 750;
    let totals = pipeline.totals_at(end);
    println!(
        "totals: active {}m rest {}m, {} readings stored",
        totals.active_minutes(),
        totals.rest_minutes(),
        pipeline.history().len()
    );

    pipeline.unsubscribe();
}
