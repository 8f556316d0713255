//! Trend analysis
//!
//! Inspects a rolling window of recent snapshots together with the current risk
//! score and emits warnings for sustained patterns. Checks run in a fixed order:
//! blood sugar, blood pressure, activity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VitalsError};
use crate::types::{HealthRiskScore, MetricsSnapshot};

/// Thresholds for the trend checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Number of most recent snapshots inspected
    pub window: usize,
    /// Mean blood sugar above which the diabetes check can fire (mg/dL)
    pub blood_sugar_mean: f64,
    /// Diabetes risk above which the diabetes check can fire
    pub diabetes_risk: f64,
    /// Mean systolic pressure above which the blood pressure check can fire (mmHg)
    pub systolic_mean: f64,
    /// Hypertension risk above which the blood pressure check can fire
    pub hypertension_risk: f64,
    /// Mean steps below which the activity check fires
    pub steps_mean: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            window: 7,
            blood_sugar_mean: 100.0,
            diabetes_risk: 30.0,
            systolic_mean: 130.0,
            hypertension_risk: 30.0,
            steps_mean: 5000.0,
        }
    }
}

impl TrendThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(VitalsError::Configuration(
                "trend window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pattern a warning was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    ElevatedBloodSugar,
    HighBloodPressure,
    LowActivity,
}

/// Human-readable trend warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendWarning {
    pub kind: TrendKind,
    pub message: String,
}

impl TrendWarning {
    fn new(kind: TrendKind) -> Self {
        let message = match kind {
            TrendKind::ElevatedBloodSugar => {
                "Your average blood sugar levels are elevated. Consider consulting a healthcare provider about diabetes risk."
            }
            TrendKind::HighBloodPressure => {
                "Your blood pressure has been consistently high. Schedule a check-up to discuss hypertension management."
            }
            TrendKind::LowActivity => {
                "Your activity levels have been low. Aim for at least 7,000 steps daily to reduce health risks."
            }
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Rolling-window trend analyzer
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    thresholds: TrendThresholds,
}

impl TrendAnalyzer {
    pub fn new(thresholds: TrendThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Number of trailing snapshots the analyzer looks at
    pub fn window(&self) -> usize {
        self.thresholds.window
    }

    /// Analyze `history` (oldest first). Only the trailing window is used.
    pub fn analyze<'a, I>(&self, history: I, risk: &HealthRiskScore) -> Vec<TrendWarning>
    where
        I: IntoIterator<Item = &'a MetricsSnapshot>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = history.into_iter();
        let skip = iter.len().saturating_sub(self.thresholds.window);
        let window: Vec<&MetricsSnapshot> = iter.skip(skip).collect();

        let t = &self.thresholds;
        let mut warnings = Vec::new();

        let sugar = mean(window.iter().map(|s| s.blood_sugar.value));
        if matches!(sugar, Some(avg) if avg > t.blood_sugar_mean)
            && risk.categories.diabetes > t.diabetes_risk
        {
            warnings.push(TrendWarning::new(TrendKind::ElevatedBloodSugar));
        }

        let systolic = mean(window.iter().map(|s| s.blood_pressure.systolic));
        if matches!(systolic, Some(avg) if avg > t.systolic_mean)
            && risk.categories.hypertension > t.hypertension_risk
        {
            warnings.push(TrendWarning::new(TrendKind::HighBloodPressure));
        }

        let steps = mean(window.iter().map(|s| f64::from(s.activity.steps)));
        if matches!(steps, Some(avg) if avg < t.steps_mean) {
            warnings.push(TrendWarning::new(TrendKind::LowActivity));
        }

        debug!(
            window = window.len(),
            warnings = warnings.len(),
            "analyzed trends"
        );
        warnings
    }
}

/// Mean of a series, `None` when empty
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{at_day, snapshot};
    use crate::types::RiskCategories;

    fn risk(diabetes: f64, hypertension: f64) -> HealthRiskScore {
        let categories = RiskCategories {
            diabetes,
            heart_disease: 20.0,
            stroke: 20.0,
            hypertension,
        };
        HealthRiskScore {
            overall: 100.0 - categories.mean(),
            categories,
            last_updated: at_day(0),
        }
    }

    fn kinds(warnings: &[TrendWarning]) -> Vec<TrendKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_healthy_history_has_no_warnings() {
        let history: Vec<_> = (0..7).map(snapshot).collect();
        let warnings = TrendAnalyzer::default().analyze(&history, &risk(15.0, 20.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_all_checks_fire_in_order() {
        let history: Vec<_> = (0..7)
            .map(|day| {
                let mut s = snapshot(day);
                s.blood_sugar.value = 130.0;
                s.blood_pressure.systolic = 145.0;
                s.activity.steps = 3000;
                s
            })
            .collect();

        let warnings = TrendAnalyzer::default().analyze(&history, &risk(45.0, 55.0));
        assert_eq!(
            kinds(&warnings),
            vec![
                TrendKind::ElevatedBloodSugar,
                TrendKind::HighBloodPressure,
                TrendKind::LowActivity
            ]
        );
        assert!(warnings[2].message.contains("7,000 steps"));
    }

    #[test]
    fn test_sugar_check_requires_risk_above_threshold() {
        let history: Vec<_> = (0..3)
            .map(|day| {
                let mut s = snapshot(day);
                s.blood_sugar.value = 150.0;
                s
            })
            .collect();

        let analyzer = TrendAnalyzer::default();
        assert!(analyzer.analyze(&history, &risk(30.0, 10.0)).is_empty());
        assert_eq!(
            kinds(&analyzer.analyze(&history, &risk(30.5, 10.0))),
            vec![TrendKind::ElevatedBloodSugar]
        );
    }

    #[test]
    fn test_only_trailing_window_is_used() {
        // Ten sedentary days followed by seven active ones
        let history: Vec<_> = (0..17)
            .map(|day| {
                let mut s = snapshot(day);
                s.activity.steps = if day < 10 { 1000 } else { 9000 };
                s
            })
            .collect();

        let warnings = TrendAnalyzer::default().analyze(&history, &risk(10.0, 10.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_short_history_uses_available_entries() {
        let mut s = snapshot(0);
        s.activity.steps = 4000;
        let warnings = TrendAnalyzer::default().analyze(&[s], &risk(10.0, 10.0));
        assert_eq!(kinds(&warnings), vec![TrendKind::LowActivity]);
    }

    #[test]
    fn test_empty_history_emits_nothing() {
        let history: Vec<MetricsSnapshot> = Vec::new();
        let warnings = TrendAnalyzer::default().analyze(&history, &risk(90.0, 90.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        let thresholds = TrendThresholds {
            window: 0,
            ..Default::default()
        };
        assert!(TrendAnalyzer::new(thresholds).is_err());
    }
}
