//! Core types for VitalSense
//!
//! This module defines the data that flows through the engine: metrics snapshots
//! captured from devices or manual logs, risk scores derived from them, and the
//! recommendation/task structures that drive the points system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalsError};

/// Heart rate readings (bpm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRate {
    /// Resting heart rate
    pub resting: f64,
    /// Most recent instantaneous heart rate, when the device reports one
    #[serde(default)]
    pub current: Option<f64>,
}

/// Blood pressure reading (mmHg)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// How a blood sugar reading was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SugarReading {
    Fasting,
    Random,
}

/// Blood sugar reading (mg/dL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodSugar {
    pub value: f64,
    pub reading: SugarReading,
}

/// Lipid panel (mg/dL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cholesterol {
    pub total: f64,
    pub hdl: f64,
    pub ldl: f64,
    pub triglycerides: f64,
}

/// Daily activity totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub steps: u32,
    pub active_minutes: f64,
    pub calories_burned: f64,
}

/// Sleep summary for the previous night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sleep {
    pub duration_hours: f64,
    /// Sleep quality (0-100)
    pub quality_pct: f64,
}

/// Meal slot for a diet log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Macronutrients in grams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Single food item within a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub nutrients: Nutrients,
}

/// Logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietLog {
    pub meal_type: MealType,
    pub items: Vec<FoodItem>,
    pub timestamp: DateTime<Utc>,
}

impl DietLog {
    /// Total calories across all items
    pub fn total_calories(&self) -> f64 {
        self.items.iter().map(|item| item.calories).sum()
    }

    /// Check that calories and nutrients are finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for item in &self.items {
            check_non_negative(&[
                ("diet.calories", item.calories),
                ("diet.protein", item.nutrients.protein),
                ("diet.carbs", item.nutrients.carbs),
                ("diet.fats", item.nutrients.fats),
            ])?;
        }
        Ok(())
    }
}

/// Point-in-time capture of every tracked vital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub heart_rate: HeartRate,
    pub blood_pressure: BloodPressure,
    pub blood_sugar: BloodSugar,
    pub cholesterol: Cholesterol,
    pub activity: Activity,
    pub sleep: Sleep,
    #[serde(default)]
    pub diet: Vec<DietLog>,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// Check that every numeric field is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let mut fields = vec![
            ("heart_rate.resting", self.heart_rate.resting),
            ("blood_pressure.systolic", self.blood_pressure.systolic),
            ("blood_pressure.diastolic", self.blood_pressure.diastolic),
            ("blood_sugar.value", self.blood_sugar.value),
            ("cholesterol.total", self.cholesterol.total),
            ("cholesterol.hdl", self.cholesterol.hdl),
            ("cholesterol.ldl", self.cholesterol.ldl),
            ("cholesterol.triglycerides", self.cholesterol.triglycerides),
            ("activity.active_minutes", self.activity.active_minutes),
            ("activity.calories_burned", self.activity.calories_burned),
            ("sleep.duration_hours", self.sleep.duration_hours),
            ("sleep.quality_pct", self.sleep.quality_pct),
        ];
        if let Some(current) = self.heart_rate.current {
            fields.push(("heart_rate.current", current));
        }
        check_non_negative(&fields)?;
        for log in &self.diet {
            log.validate()?;
        }
        Ok(())
    }
}

fn check_non_negative(fields: &[(&str, f64)]) -> Result<()> {
    for (name, value) in fields {
        if !value.is_finite() || *value < 0.0 {
            return Err(VitalsError::InvalidSnapshot(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

/// Risk categories scored by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Diabetes,
    HeartDisease,
    Stroke,
    Hypertension,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Diabetes,
        RiskCategory::HeartDisease,
        RiskCategory::Stroke,
        RiskCategory::Hypertension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Diabetes => "diabetes",
            RiskCategory::HeartDisease => "heart_disease",
            RiskCategory::Stroke => "stroke",
            RiskCategory::Hypertension => "hypertension",
        }
    }
}

/// Per-category risk (0-100, higher is worse)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskCategories {
    pub diabetes: f64,
    pub heart_disease: f64,
    pub stroke: f64,
    pub hypertension: f64,
}

impl RiskCategories {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Diabetes => self.diabetes,
            RiskCategory::HeartDisease => self.heart_disease,
            RiskCategory::Stroke => self.stroke,
            RiskCategory::Hypertension => self.hypertension,
        }
    }

    /// Arithmetic mean of the four categories
    pub fn mean(&self) -> f64 {
        (self.diabetes + self.heart_disease + self.stroke + self.hypertension) / 4.0
    }
}

/// Overall health score plus its category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRiskScore {
    /// Overall health (0-100, higher is better)
    pub overall: f64,
    pub categories: RiskCategories,
    pub last_updated: DateTime<Utc>,
}

/// Recommendation / task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Exercise,
    Diet,
    Lifestyle,
    Medical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Point-bearing action belonging to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u32,
    pub difficulty: Difficulty,
    pub category: RecommendationType,
    pub completed: bool,
}

/// Actionable recommendation with its task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub tasks: Vec<Task>,
    pub potential_points: u32,
}

/// Display-only targets supplied at profile initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthGoals {
    pub steps: u32,
    pub active_minutes: f64,
    pub calories: f64,
    pub sleep_hours: f64,
}

impl Default for HealthGoals {
    fn default() -> Self {
        Self {
            steps: 10_000,
            active_minutes: 60.0,
            calories: 2000.0,
            sleep_hours: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Descriptive user attributes carried on the profile (not used in scoring)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub name: String,
    pub age: u32,
    /// Height (cm)
    pub height_cm: f64,
    /// Weight (kg)
    pub weight_kg: f64,
    pub gender: Gender,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn at_day(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::days(day)
    }

    /// Healthy adult reading used as a starting point by tests
    pub fn snapshot(day: i64) -> MetricsSnapshot {
        MetricsSnapshot {
            heart_rate: HeartRate {
                resting: 65.0,
                current: Some(72.0),
            },
            blood_pressure: BloodPressure {
                systolic: 118.0,
                diastolic: 75.0,
            },
            blood_sugar: BloodSugar {
                value: 95.0,
                reading: SugarReading::Fasting,
            },
            cholesterol: Cholesterol {
                total: 180.0,
                hdl: 50.0,
                ldl: 110.0,
                triglycerides: 150.0,
            },
            activity: Activity {
                steps: 8000,
                active_minutes: 45.0,
                calories_burned: 400.0,
            },
            sleep: Sleep {
                duration_hours: 7.5,
                quality_pct: 85.0,
            },
            diet: Vec::new(),
            timestamp: at_day(day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::snapshot;
    use super::*;

    #[test]
    fn test_valid_snapshot_passes() {
        assert!(snapshot(0).validate().is_ok());
    }

    #[test]
    fn test_negative_field_rejected() {
        let mut s = snapshot(0);
        s.blood_pressure.diastolic = -1.0;
        let err = s.validate().unwrap_err();
        assert!(matches!(err, VitalsError::InvalidSnapshot(msg) if msg.contains("diastolic")));
    }

    #[test]
    fn test_nan_field_rejected() {
        let mut s = snapshot(0);
        s.sleep.quality_pct = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_recommendation_serializes_type_key() {
        let rec = Recommendation {
            kind: RecommendationType::Diet,
            priority: Priority::Medium,
            title: "t".to_string(),
            description: "d".to_string(),
            impact: "i".to_string(),
            tasks: vec![],
            potential_points: 0,
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["type"], "diet");
        assert_eq!(value["priority"], "medium");
    }

    #[test]
    fn test_snapshot_json_roundtrip_defaults_diet() {
        let mut value = serde_json::to_value(snapshot(1)).unwrap();
        value.as_object_mut().unwrap().remove("diet");
        let parsed: MetricsSnapshot = serde_json::from_value(value).unwrap();
        assert!(parsed.diet.is_empty());
        assert_eq!(parsed.blood_sugar.reading, SugarReading::Fasting);
    }
}
