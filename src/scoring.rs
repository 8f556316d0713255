//! Risk scoring
//!
//! Combines normalized measurements through fixed weights into four category
//! risks and one overall health score. Scoring is a pure function of a single
//! snapshot: no history, no clock.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VitalsError};
use crate::normalizer::{NormalizedMetrics, Normalizer, ReferenceRanges};
use crate::types::{HealthRiskScore, MetricsSnapshot, RiskCategories};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesWeights {
    pub blood_sugar: f64,
    /// Applied to `1 - normalized active minutes`
    pub inactivity: f64,
}

/// Heart disease weights. They sum to 0.8, not 1, and are kept that way so
/// scores stay comparable with earlier releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartDiseaseWeights {
    pub systolic: f64,
    pub diastolic: f64,
    pub total_cholesterol: f64,
    pub resting_heart_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeWeights {
    pub systolic: f64,
    /// Applied to `1 - normalized steps`
    pub inactivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypertensionWeights {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Weight set for every risk category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub diabetes: DiabetesWeights,
    pub heart_disease: HeartDiseaseWeights,
    pub stroke: StrokeWeights,
    pub hypertension: HypertensionWeights,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            diabetes: DiabetesWeights {
                blood_sugar: 0.7,
                inactivity: 0.3,
            },
            heart_disease: HeartDiseaseWeights {
                systolic: 0.3,
                diastolic: 0.2,
                total_cholesterol: 0.15,
                resting_heart_rate: 0.15,
            },
            stroke: StrokeWeights {
                systolic: 0.6,
                inactivity: 0.4,
            },
            hypertension: HypertensionWeights {
                systolic: 0.6,
                diastolic: 0.4,
            },
        }
    }
}

impl RiskWeights {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("diabetes.blood_sugar", self.diabetes.blood_sugar),
            ("diabetes.inactivity", self.diabetes.inactivity),
            ("heart_disease.systolic", self.heart_disease.systolic),
            ("heart_disease.diastolic", self.heart_disease.diastolic),
            ("heart_disease.total_cholesterol", self.heart_disease.total_cholesterol),
            ("heart_disease.resting_heart_rate", self.heart_disease.resting_heart_rate),
            ("stroke.systolic", self.stroke.systolic),
            ("stroke.inactivity", self.stroke.inactivity),
            ("hypertension.systolic", self.hypertension.systolic),
            ("hypertension.diastolic", self.hypertension.diastolic),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() {
                return Err(VitalsError::Configuration(format!(
                    "weight {} must be finite, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

/// Scale a weighted sum to percent and clamp to [0, 100]
pub fn clamp100(x: f64) -> f64 {
    (x * 100.0).clamp(0.0, 100.0)
}

/// Risk scoring engine
#[derive(Debug, Clone)]
pub struct RiskScorer {
    normalizer: Normalizer,
    weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(ranges: ReferenceRanges, weights: RiskWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(ranges)?,
            weights,
        })
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    /// Score a snapshot. `last_updated` is the snapshot's capture time.
    pub fn score(&self, snapshot: &MetricsSnapshot) -> HealthRiskScore {
        let categories = self.categories(snapshot);
        let overall = 100.0 - categories.mean();

        debug!(
            overall,
            diabetes = categories.diabetes,
            heart_disease = categories.heart_disease,
            stroke = categories.stroke,
            hypertension = categories.hypertension,
            "scored snapshot"
        );

        HealthRiskScore {
            overall,
            categories,
            last_updated: snapshot.timestamp,
        }
    }

    /// Compute the four category risks independently
    pub fn categories(&self, snapshot: &MetricsSnapshot) -> RiskCategories {
        let n = self.normalizer.normalize(snapshot);
        RiskCategories {
            diabetes: self.diabetes_risk(&n),
            heart_disease: self.heart_disease_risk(&n),
            stroke: self.stroke_risk(&n),
            hypertension: self.hypertension_risk(&n),
        }
    }

    fn diabetes_risk(&self, n: &NormalizedMetrics) -> f64 {
        let w = &self.weights.diabetes;
        clamp100(n.blood_sugar * w.blood_sugar + (1.0 - n.active_minutes) * w.inactivity)
    }

    fn heart_disease_risk(&self, n: &NormalizedMetrics) -> f64 {
        let w = &self.weights.heart_disease;
        clamp100(
            n.systolic * w.systolic
                + n.diastolic * w.diastolic
                + n.total_cholesterol * w.total_cholesterol
                + n.resting_heart_rate * w.resting_heart_rate,
        )
    }

    fn stroke_risk(&self, n: &NormalizedMetrics) -> f64 {
        let w = &self.weights.stroke;
        clamp100(n.systolic * w.systolic + (1.0 - n.steps) * w.inactivity)
    }

    fn hypertension_risk(&self, n: &NormalizedMetrics) -> f64 {
        let w = &self.weights.hypertension;
        clamp100(n.systolic * w.systolic + n.diastolic * w.diastolic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::snapshot;

    fn default_scorer() -> RiskScorer {
        RiskScorer::new(ReferenceRanges::default(), RiskWeights::default()).unwrap()
    }

    #[test]
    fn test_diabetes_example() {
        let scorer = default_scorer();
        let score = scorer.score(&snapshot(0));

        // normSugar = 25/130, normActive = 0.75
        let expected = ((25.0 / 130.0) * 0.7 + 0.25 * 0.3) * 100.0;
        assert!((score.categories.diabetes - expected).abs() < 1e-9);
        assert!((score.categories.diabetes - 20.96).abs() < 0.05);
    }

    #[test]
    fn test_category_formulas() {
        let scorer = default_scorer();
        let s = snapshot(0);
        let c = scorer.categories(&s);

        let sys = 28.0 / 90.0;
        let dia = 15.0 / 60.0;
        let heart = (sys * 0.3 + dia * 0.2 + 0.2 * 0.15 + 0.125 * 0.15) * 100.0;
        let stroke = (sys * 0.6 + (1.0 - 0.8) * 0.4) * 100.0;
        let hyper = (sys * 0.6 + dia * 0.4) * 100.0;

        assert!((c.heart_disease - heart).abs() < 1e-9);
        assert!((c.stroke - stroke).abs() < 1e-9);
        assert!((c.hypertension - hyper).abs() < 1e-9);
    }

    #[test]
    fn test_overall_is_inverse_mean() {
        let scorer = default_scorer();
        let score = scorer.score(&snapshot(3));
        assert_eq!(score.overall, 100.0 - score.categories.mean());
        assert_eq!(score.last_updated, snapshot(3).timestamp);
    }

    #[test]
    fn test_scores_clamped_for_extreme_inputs() {
        let scorer = default_scorer();

        let mut high = snapshot(0);
        high.blood_sugar.value = 400.0;
        high.blood_pressure.systolic = 240.0;
        high.blood_pressure.diastolic = 160.0;
        high.cholesterol.total = 500.0;
        high.heart_rate.resting = 150.0;
        high.activity.steps = 0;
        high.activity.active_minutes = 0.0;

        let mut low = snapshot(0);
        low.blood_sugar.value = 40.0;
        low.blood_pressure.systolic = 70.0;
        low.blood_pressure.diastolic = 40.0;
        low.cholesterol.total = 100.0;
        low.heart_rate.resting = 40.0;
        low.activity.steps = 30_000;
        low.activity.active_minutes = 200.0;

        for s in [high, low] {
            let score = scorer.score(&s);
            for category in crate::types::RiskCategory::ALL {
                let value = score.categories.get(category);
                assert!((0.0..=100.0).contains(&value), "{:?} = {}", category, value);
            }
            assert!((0.0..=100.0).contains(&score.overall));
            assert_eq!(score.overall, 100.0 - score.categories.mean());
        }
    }

    #[test]
    fn test_heart_disease_caps_below_100_at_range_max() {
        let scorer = default_scorer();
        let mut s = snapshot(0);
        s.blood_pressure.systolic = 180.0;
        s.blood_pressure.diastolic = 120.0;
        s.cholesterol.total = 300.0;
        s.heart_rate.resting = 100.0;

        let c = scorer.categories(&s);
        assert!((c.heart_disease - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let mut weights = RiskWeights::default();
        weights.stroke.inactivity = f64::INFINITY;
        let err = RiskScorer::new(ReferenceRanges::default(), weights).unwrap_err();
        assert!(matches!(err, VitalsError::Configuration(_)));
    }
}
