//! Signal classification
//!
//! This module reduces scalar and vector sensor values to discrete category
//! labels. All scalar families run over one generic ordered threshold table
//! so the cut points are configuration, not code; orientation uses an
//! axis-dominance rule over the gravity vector.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{ActivityLabel, GravityVector, LightLabel, NoiseLabel, OrientationLabel};

/// Dominance threshold for orientation axis checks (g units)
pub const DEFAULT_ORIENTATION_DOMINANCE: f64 = 0.8;

/// Ordered threshold table mapping a scalar to a label.
///
/// Bands are `(upper_bound, label)` pairs with strictly ascending bounds;
/// a value classifies into the first band whose bound it is below, and into
/// the fallback label above the last bound. Bands are closed-open, so a
/// boundary value belongs to the band where it is the lower endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable<L> {
    bands: Vec<(f64, L)>,
    fallback: L,
}

impl<L: Copy> ThresholdTable<L> {
    /// Build a table, rejecting empty, non-finite, or non-ascending bounds
    pub fn new(bands: Vec<(f64, L)>, fallback: L) -> Result<Self, EngineError> {
        let table = Self { bands, fallback };
        table.validate()?;
        Ok(table)
    }

    /// Re-check invariants (used after deserializing a configured table)
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.bands.is_empty() {
            return Err(EngineError::InvalidThresholds(
                "at least one band is required".to_string(),
            ));
        }
        for (bound, _) in &self.bands {
            if !bound.is_finite() {
                return Err(EngineError::InvalidThresholds(format!(
                    "non-finite bound {bound}"
                )));
            }
        }
        for pair in self.bands.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(EngineError::InvalidThresholds(format!(
                    "bounds must be strictly ascending ({} then {})",
                    pair[0].0, pair[1].0
                )));
            }
        }
        Ok(())
    }

    /// First band whose upper bound the value is below; fallback otherwise
    pub fn classify(&self, value: f64) -> L {
        for (bound, label) in &self.bands {
            if value < *bound {
                return *label;
            }
        }
        self.fallback
    }

    pub fn bands(&self) -> &[(f64, L)] {
        &self.bands
    }

    pub fn fallback(&self) -> L {
        self.fallback
    }
}

/// Default activity table: variance < 0.02 Sitting, < 0.1 Walking, else
/// Running. A Vehicle band is enabled by appending a third bound and setting
/// the fallback to `Vehicle`.
pub fn default_activity_table() -> ThresholdTable<ActivityLabel> {
    ThresholdTable {
        bands: vec![
            (0.02, ActivityLabel::Sitting),
            (0.1, ActivityLabel::Walking),
        ],
        fallback: ActivityLabel::Running,
    }
}

/// Default light table (lux): < 10 Dark, < 20 Dim, < 100 Normal, else Bright
pub fn default_light_table() -> ThresholdTable<LightLabel> {
    ThresholdTable {
        bands: vec![
            (10.0, LightLabel::Dark),
            (20.0, LightLabel::Dim),
            (100.0, LightLabel::Normal),
        ],
        fallback: LightLabel::Bright,
    }
}

/// Default noise table (dB): < 30 Very Quiet, < 50 Quiet, < 70 Moderate,
/// < 85 Loud, else Very Loud
pub fn default_noise_table() -> ThresholdTable<NoiseLabel> {
    ThresholdTable {
        bands: vec![
            (30.0, NoiseLabel::VeryQuiet),
            (50.0, NoiseLabel::Quiet),
            (70.0, NoiseLabel::Moderate),
            (85.0, NoiseLabel::Loud),
        ],
        fallback: NoiseLabel::VeryLoud,
    }
}

/// Classify motion variance into an activity label.
///
/// Non-finite variance maps to `Unknown` rather than a motion band.
pub fn classify_activity(table: &ThresholdTable<ActivityLabel>, variance: f64) -> ActivityLabel {
    if !variance.is_finite() {
        return ActivityLabel::Unknown;
    }
    table.classify(variance)
}

/// Classify illuminance into a light label (non-finite input → Normal)
pub fn classify_light(table: &ThresholdTable<LightLabel>, illuminance: f64) -> LightLabel {
    if !illuminance.is_finite() {
        return LightLabel::Normal;
    }
    table.classify(illuminance)
}

/// Classify loudness into a noise label (non-finite input → Quiet)
pub fn classify_noise(table: &ThresholdTable<NoiseLabel>, level: f64) -> NoiseLabel {
    if !level.is_finite() {
        return NoiseLabel::Quiet;
    }
    table.classify(level)
}

/// Classify a gravity vector into an orientation label.
///
/// Axis dominance is tested z first (Face Up/Down), then x (Left/Right),
/// then y (Upright/Upside Down); the first matching predicate wins and a
/// vector dominating nothing is Flat. A missing or non-finite vector maps
/// to `Unknown`.
pub fn classify_orientation(gravity: Option<GravityVector>) -> OrientationLabel {
    classify_orientation_with(gravity, DEFAULT_ORIENTATION_DOMINANCE)
}

/// Orientation classification with an explicit dominance threshold
pub fn classify_orientation_with(
    gravity: Option<GravityVector>,
    dominance: f64,
) -> OrientationLabel {
    let Some(g) = gravity else {
        return OrientationLabel::Unknown;
    };
    if !g.is_finite() {
        return OrientationLabel::Unknown;
    }

    if g.z < -dominance {
        OrientationLabel::FaceUp
    } else if g.z > dominance {
        OrientationLabel::FaceDown
    } else if g.x.abs() > dominance {
        if g.x > 0.0 {
            OrientationLabel::Left
        } else {
            OrientationLabel::Right
        }
    } else if g.y.abs() > dominance {
        if g.y > 0.0 {
            OrientationLabel::UpsideDown
        } else {
            OrientationLabel::Upright
        }
    } else {
        OrientationLabel::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_activity_bands() {
        let table = default_activity_table();
        assert_eq!(classify_activity(&table, 0.0), ActivityLabel::Sitting);
        assert_eq!(classify_activity(&table, 0.01), ActivityLabel::Sitting);
        assert_eq!(classify_activity(&table, 0.05), ActivityLabel::Walking);
        assert_eq!(classify_activity(&table, 0.5), ActivityLabel::Running);
    }

    #[test]
    fn test_boundary_values_enter_upper_band() {
        // Closed-open bands: a boundary value belongs to the band where it
        // is the lower endpoint.
        let table = default_activity_table();
        assert_eq!(classify_activity(&table, 0.02), ActivityLabel::Walking);
        assert_eq!(classify_activity(&table, 0.1), ActivityLabel::Running);

        let light = default_light_table();
        assert_eq!(classify_light(&light, 10.0), LightLabel::Dim);
        assert_eq!(classify_light(&light, 20.0), LightLabel::Normal);
        assert_eq!(classify_light(&light, 100.0), LightLabel::Bright);

        let noise = default_noise_table();
        assert_eq!(classify_noise(&noise, 30.0), NoiseLabel::Quiet);
        assert_eq!(classify_noise(&noise, 85.0), NoiseLabel::VeryLoud);
    }

    #[test]
    fn test_bands_partition_the_real_line() {
        let noise = default_noise_table();
        // Sweep a wide range; every value must classify without gaps.
        let mut previous = classify_noise(&noise, -100.0);
        assert_eq!(previous, NoiseLabel::VeryQuiet);
        for i in -1000..2000 {
            let label = classify_noise(&noise, i as f64 / 10.0);
            // Labels may only move up the ordered scale as the value grows.
            assert!(label as u8 >= previous as u8);
            previous = label;
        }
        assert_eq!(previous, NoiseLabel::VeryLoud);
    }

    #[test]
    fn test_vehicle_band_via_configuration() {
        let table = ThresholdTable::new(
            vec![
                (0.02, ActivityLabel::Sitting),
                (0.1, ActivityLabel::Walking),
                (0.8, ActivityLabel::Running),
            ],
            ActivityLabel::Vehicle,
        )
        .unwrap();
        assert_eq!(classify_activity(&table, 0.5), ActivityLabel::Running);
        assert_eq!(classify_activity(&table, 1.5), ActivityLabel::Vehicle);
    }

    #[test]
    fn test_non_finite_inputs_map_to_neutral_labels() {
        let activity = default_activity_table();
        assert_eq!(classify_activity(&activity, f64::NAN), ActivityLabel::Unknown);
        let light = default_light_table();
        assert_eq!(classify_light(&light, f64::INFINITY), LightLabel::Normal);
        let noise = default_noise_table();
        assert_eq!(classify_noise(&noise, f64::NAN), NoiseLabel::Quiet);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        let descending = ThresholdTable::new(
            vec![(0.1, ActivityLabel::Sitting), (0.02, ActivityLabel::Walking)],
            ActivityLabel::Running,
        );
        assert!(descending.is_err());

        let empty: Result<ThresholdTable<ActivityLabel>, _> =
            ThresholdTable::new(vec![], ActivityLabel::Running);
        assert!(empty.is_err());

        let non_finite = ThresholdTable::new(
            vec![(f64::NAN, ActivityLabel::Sitting)],
            ActivityLabel::Running,
        );
        assert!(non_finite.is_err());
    }

    #[test]
    fn test_orientation_axes() {
        let label = classify_orientation(Some(GravityVector::new(0.0, 0.0, -0.95)));
        assert_eq!(label, OrientationLabel::FaceUp);
        let label = classify_orientation(Some(GravityVector::new(0.0, 0.0, 0.95)));
        assert_eq!(label, OrientationLabel::FaceDown);
        let label = classify_orientation(Some(GravityVector::new(0.9, 0.0, 0.0)));
        assert_eq!(label, OrientationLabel::Left);
        let label = classify_orientation(Some(GravityVector::new(-0.9, 0.0, 0.0)));
        assert_eq!(label, OrientationLabel::Right);
        let label = classify_orientation(Some(GravityVector::new(0.0, 0.9, 0.0)));
        assert_eq!(label, OrientationLabel::UpsideDown);
        let label = classify_orientation(Some(GravityVector::new(0.0, -0.9, 0.0)));
        assert_eq!(label, OrientationLabel::Upright);
        let label = classify_orientation(Some(GravityVector::new(0.3, 0.3, 0.3)));
        assert_eq!(label, OrientationLabel::Flat);
    }

    #[test]
    fn test_orientation_z_axis_wins_tie_break() {
        // Both z and x dominate; z is checked first.
        let label = classify_orientation(Some(GravityVector::new(0.9, 0.0, 0.9)));
        assert_eq!(label, OrientationLabel::FaceDown);
        let label = classify_orientation(Some(GravityVector::new(0.9, 0.9, -0.9)));
        assert_eq!(label, OrientationLabel::FaceUp);
        // x beats y when z does not dominate.
        let label = classify_orientation(Some(GravityVector::new(0.9, 0.9, 0.0)));
        assert_eq!(label, OrientationLabel::Left);
    }

    #[test]
    fn test_orientation_missing_or_invalid_vector() {
        assert_eq!(classify_orientation(None), OrientationLabel::Unknown);
        let label = classify_orientation(Some(GravityVector::new(f64::NAN, 0.0, 0.0)));
        assert_eq!(label, OrientationLabel::Unknown);
    }
}
