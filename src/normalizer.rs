//! Measurement normalization
//!
//! This module maps raw measurements onto a risk contribution scale using
//! domain-specific reference ranges.
//! - `min` maps to 0, `max` maps to 1
//! - Values outside the range are not clamped; the scorer clamps the aggregate
//! - Degenerate ranges are rejected when the normalizer is built

use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalsError};
use crate::types::MetricsSnapshot;

/// Normalize `value` against `[min, max]`.
///
/// Fails with a configuration error when the range is degenerate instead of
/// producing an infinite or NaN contribution.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64> {
    NormalizationRange { min, max }.check("range")?;
    Ok((value - min) / (max - min))
}

/// Reference range for a single measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub min: f64,
    pub max: f64,
}

impl NormalizationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Reject ranges that would divide by zero or carry non-finite bounds
    pub fn check(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(VitalsError::Configuration(format!(
                "{} range bounds must be finite (min={}, max={})",
                name, self.min, self.max
            )));
        }
        if self.min == self.max {
            return Err(VitalsError::Configuration(format!(
                "{} range is empty (min == max == {})",
                name, self.min
            )));
        }
        Ok(())
    }

    /// Map `value` into range units. Only valid on a checked range.
    fn apply(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Reference ranges for every measurement that feeds the risk model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRanges {
    /// Blood sugar (mg/dL)
    pub blood_sugar: NormalizationRange,
    /// Active minutes per day
    pub active_minutes: NormalizationRange,
    /// Systolic blood pressure (mmHg)
    pub systolic: NormalizationRange,
    /// Diastolic blood pressure (mmHg)
    pub diastolic: NormalizationRange,
    /// Total cholesterol (mg/dL)
    pub total_cholesterol: NormalizationRange,
    /// Resting heart rate (bpm)
    pub resting_heart_rate: NormalizationRange,
    /// Steps per day
    pub steps: NormalizationRange,
}

impl Default for ReferenceRanges {
    fn default() -> Self {
        Self {
            blood_sugar: NormalizationRange::new(70.0, 200.0),
            active_minutes: NormalizationRange::new(0.0, 60.0),
            systolic: NormalizationRange::new(90.0, 180.0),
            diastolic: NormalizationRange::new(60.0, 120.0),
            total_cholesterol: NormalizationRange::new(150.0, 300.0),
            resting_heart_rate: NormalizationRange::new(60.0, 100.0),
            steps: NormalizationRange::new(0.0, 10_000.0),
        }
    }
}

impl ReferenceRanges {
    pub fn validate(&self) -> Result<()> {
        self.blood_sugar.check("blood_sugar")?;
        self.active_minutes.check("active_minutes")?;
        self.systolic.check("systolic")?;
        self.diastolic.check("diastolic")?;
        self.total_cholesterol.check("total_cholesterol")?;
        self.resting_heart_rate.check("resting_heart_rate")?;
        self.steps.check("steps")?;
        Ok(())
    }
}

/// Normalized terms for one snapshot. Values may fall outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMetrics {
    pub blood_sugar: f64,
    pub active_minutes: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub total_cholesterol: f64,
    pub resting_heart_rate: f64,
    pub steps: f64,
}

/// Normalizer bound to a validated set of reference ranges
#[derive(Debug, Clone)]
pub struct Normalizer {
    ranges: ReferenceRanges,
}

impl Normalizer {
    /// Build a normalizer, failing fast on any degenerate range
    pub fn new(ranges: ReferenceRanges) -> Result<Self> {
        ranges.validate()?;
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &ReferenceRanges {
        &self.ranges
    }

    /// Normalize every scored measurement of a snapshot
    pub fn normalize(&self, snapshot: &MetricsSnapshot) -> NormalizedMetrics {
        let r = &self.ranges;
        NormalizedMetrics {
            blood_sugar: r.blood_sugar.apply(snapshot.blood_sugar.value),
            active_minutes: r.active_minutes.apply(snapshot.activity.active_minutes),
            systolic: r.systolic.apply(snapshot.blood_pressure.systolic),
            diastolic: r.diastolic.apply(snapshot.blood_pressure.diastolic),
            total_cholesterol: r.total_cholesterol.apply(snapshot.cholesterol.total),
            resting_heart_rate: r.resting_heart_rate.apply(snapshot.heart_rate.resting),
            steps: r.steps.apply(f64::from(snapshot.activity.steps)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::snapshot;

    #[test]
    fn test_normalize_within_range() {
        let x = normalize(95.0, 70.0, 200.0).unwrap();
        assert!((x - 25.0 / 130.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_is_not_clamped() {
        assert!((normalize(220.0, 90.0, 180.0).unwrap() - 130.0 / 90.0).abs() < 1e-12);
        assert!(normalize(50.0, 60.0, 100.0).unwrap() < 0.0);
    }

    #[test]
    fn test_normalize_empty_range_fails_fast() {
        let err = normalize(5.0, 10.0, 10.0).unwrap_err();
        assert!(matches!(err, VitalsError::Configuration(_)));
    }

    #[test]
    fn test_normalizer_rejects_degenerate_ranges() {
        let mut ranges = ReferenceRanges::default();
        ranges.steps = NormalizationRange::new(100.0, 100.0);
        let err = Normalizer::new(ranges).unwrap_err();
        assert!(err.to_string().contains("steps"));

        let mut ranges = ReferenceRanges::default();
        ranges.systolic = NormalizationRange::new(f64::NAN, 180.0);
        assert!(Normalizer::new(ranges).is_err());
    }

    #[test]
    fn test_normalize_snapshot_uses_reference_ranges() {
        let normalizer = Normalizer::new(ReferenceRanges::default()).unwrap();
        let n = normalizer.normalize(&snapshot(0));

        assert!((n.blood_sugar - 25.0 / 130.0).abs() < 1e-12);
        assert!((n.active_minutes - 0.75).abs() < 1e-12);
        assert!((n.systolic - 28.0 / 90.0).abs() < 1e-12);
        assert!((n.diastolic - 15.0 / 60.0).abs() < 1e-12);
        assert!((n.total_cholesterol - 0.2).abs() < 1e-12);
        assert!((n.resting_heart_rate - 0.125).abs() < 1e-12);
        assert!((n.steps - 0.8).abs() < 1e-12);
    }
}
