//! Recommendation generation
//!
//! Recommendations come from an ordered list of rules. Each rule pairs a
//! predicate over the current snapshot with a static template; every rule is
//! evaluated independently and matching templates are instantiated in rule order,
//! so the same snapshot always yields the same recommendation set.

use std::fmt;

use tracing::debug;

use crate::types::{Difficulty, MetricsSnapshot, Priority, Recommendation, RecommendationType, Task};

/// Static description of a task
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub difficulty: Difficulty,
    pub category: RecommendationType,
}

impl TaskTemplate {
    fn instantiate(&self) -> Task {
        Task {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            points: self.points,
            difficulty: self.difficulty,
            category: self.category,
            completed: false,
        }
    }
}

/// Static description of a recommendation and its tasks
#[derive(Debug, Clone, Copy)]
pub struct RecommendationTemplate {
    pub kind: RecommendationType,
    pub priority: Priority,
    pub title: &'static str,
    pub description: &'static str,
    pub impact: &'static str,
    pub tasks: &'static [TaskTemplate],
}

impl RecommendationTemplate {
    /// Sum of the task point values
    pub fn potential_points(&self) -> u32 {
        self.tasks.iter().map(|t| t.points).sum()
    }

    /// Build a fresh recommendation with every task pending
    pub fn instantiate(&self) -> Recommendation {
        Recommendation {
            kind: self.kind,
            priority: self.priority,
            title: self.title.to_string(),
            description: self.description.to_string(),
            impact: self.impact.to_string(),
            tasks: self.tasks.iter().map(TaskTemplate::instantiate).collect(),
            potential_points: self.potential_points(),
        }
    }
}

/// Predicate/template pair
#[derive(Clone, Copy)]
pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&MetricsSnapshot) -> bool,
    /// One-line advice shown when the rule fires
    pub advice: &'static str,
    pub template: RecommendationTemplate,
}

impl fmt::Debug for RecommendationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationRule")
            .field("name", &self.name)
            .field("template", &self.template.title)
            .finish()
    }
}

pub const INCREASE_DAILY_STEPS: RecommendationTemplate = RecommendationTemplate {
    kind: RecommendationType::Exercise,
    priority: Priority::High,
    title: "Increase Daily Steps",
    description: "Try to reach 10,000 steps daily to improve cardiovascular health.",
    impact: "Reduces heart disease risk by 30%",
    tasks: &[
        TaskTemplate {
            id: "task1",
            title: "Take a 15-minute walk after each meal",
            description: "Walking after meals helps with digestion and blood sugar control",
            points: 10,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Exercise,
        },
        TaskTemplate {
            id: "task2",
            title: "Use stairs instead of elevator",
            description: "Taking stairs burns more calories and strengthens leg muscles",
            points: 15,
            difficulty: Difficulty::Medium,
            category: RecommendationType::Exercise,
        },
        TaskTemplate {
            id: "task3",
            title: "Park farther from destinations",
            description: "This simple change adds more steps to your daily routine",
            points: 5,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Exercise,
        },
    ],
};

pub const REDUCE_SODIUM_INTAKE: RecommendationTemplate = RecommendationTemplate {
    kind: RecommendationType::Diet,
    priority: Priority::Medium,
    title: "Reduce Sodium Intake",
    description: "Your sodium intake is slightly above recommended levels.",
    impact: "Helps maintain healthy blood pressure",
    tasks: &[
        TaskTemplate {
            id: "task4",
            title: "Choose low-sodium alternatives",
            description: "Look for low-sodium options when shopping",
            points: 10,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Diet,
        },
        TaskTemplate {
            id: "task5",
            title: "Cook meals at home more often",
            description: "Home-cooked meals give you better control over sodium content",
            points: 20,
            difficulty: Difficulty::Medium,
            category: RecommendationType::Diet,
        },
        TaskTemplate {
            id: "task6",
            title: "Read nutrition labels carefully",
            description: "Check sodium content on all packaged foods",
            points: 5,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Diet,
        },
    ],
};

pub const PACE_CARBOHYDRATES: RecommendationTemplate = RecommendationTemplate {
    kind: RecommendationType::Diet,
    priority: Priority::High,
    title: "Pace Carbohydrate Intake",
    description: "Smaller, more frequent meals help keep blood sugar stable through the day.",
    impact: "Reduces risk of diabetes complications",
    tasks: &[
        TaskTemplate {
            id: "task7",
            title: "Glucose check",
            description: "Check blood sugar before and after meals",
            points: 10,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Medical,
        },
        TaskTemplate {
            id: "task8",
            title: "Split lunch into two smaller meals",
            description: "Spread carbohydrates across the afternoon instead of one large meal",
            points: 15,
            difficulty: Difficulty::Medium,
            category: RecommendationType::Diet,
        },
        TaskTemplate {
            id: "task9",
            title: "Stay within your daily carb target",
            description: "Track carbohydrates for every meal and snack today",
            points: 20,
            difficulty: Difficulty::Hard,
            category: RecommendationType::Diet,
        },
    ],
};

pub const ADD_CARDIO: RecommendationTemplate = RecommendationTemplate {
    kind: RecommendationType::Exercise,
    priority: Priority::Medium,
    title: "Add Cardiovascular Exercise",
    description: "Regular cardio lowers resting heart rate over time.",
    impact: "Strengthens the heart and reduces cardiovascular risk",
    tasks: &[
        TaskTemplate {
            id: "task10",
            title: "Take a 20-minute brisk walk",
            description: "Keep a pace where talking is possible but singing is not",
            points: 10,
            difficulty: Difficulty::Easy,
            category: RecommendationType::Exercise,
        },
        TaskTemplate {
            id: "task11",
            title: "Complete a 30-minute cardio session",
            description: "Cycling, swimming or jogging all count",
            points: 20,
            difficulty: Difficulty::Medium,
            category: RecommendationType::Exercise,
        },
        TaskTemplate {
            id: "task12",
            title: "Try interval training",
            description: "Alternate one minute of hard effort with two minutes of recovery, six times",
            points: 25,
            difficulty: Difficulty::Hard,
            category: RecommendationType::Exercise,
        },
    ],
};

fn low_steps(s: &MetricsSnapshot) -> bool {
    s.activity.steps < 7000
}

fn elevated_blood_pressure(s: &MetricsSnapshot) -> bool {
    s.blood_pressure.systolic > 130.0 || s.blood_pressure.diastolic > 80.0
}

fn elevated_blood_sugar(s: &MetricsSnapshot) -> bool {
    s.blood_sugar.value > 100.0
}

fn elevated_resting_heart_rate(s: &MetricsSnapshot) -> bool {
    s.heart_rate.resting > 80.0
}

/// Built-in rules, in evaluation order
pub fn default_rules() -> Vec<RecommendationRule> {
    vec![
        RecommendationRule {
            name: "activity",
            applies: low_steps,
            advice: "Increase your daily steps to 7,000-10,000 by taking short walks throughout the day.",
            template: INCREASE_DAILY_STEPS,
        },
        RecommendationRule {
            name: "blood_pressure",
            applies: elevated_blood_pressure,
            advice: "Reduce sodium intake and practice stress-management techniques to help lower blood pressure.",
            template: REDUCE_SODIUM_INTAKE,
        },
        RecommendationRule {
            name: "blood_sugar",
            applies: elevated_blood_sugar,
            advice: "Monitor carbohydrate intake and consider eating smaller, more frequent meals to stabilize blood sugar.",
            template: PACE_CARBOHYDRATES,
        },
        RecommendationRule {
            name: "heart_rate",
            applies: elevated_resting_heart_rate,
            advice: "Your resting heart rate is elevated. Consider incorporating more cardiovascular exercise into your routine.",
            template: ADD_CARDIO,
        },
    ]
}

/// Rule-based recommendation generator
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: Vec<RecommendationRule>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RecommendationEngine {
    /// Engine with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule; it is evaluated after every existing rule
    pub fn with_rule(mut self, rule: RecommendationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[RecommendationRule] {
        &self.rules
    }

    fn matching<'a>(
        &'a self,
        snapshot: &'a MetricsSnapshot,
    ) -> impl Iterator<Item = &'a RecommendationRule> + 'a {
        self.rules.iter().filter(move |rule| (rule.applies)(snapshot))
    }

    /// Instantiate the templates of every rule that fires
    pub fn generate(&self, snapshot: &MetricsSnapshot) -> Vec<Recommendation> {
        let recommendations: Vec<Recommendation> = self
            .matching(snapshot)
            .map(|rule| rule.template.instantiate())
            .collect();
        debug!(count = recommendations.len(), "generated recommendations");
        recommendations
    }

    /// One-line advice for every rule that fires
    pub fn advice(&self, snapshot: &MetricsSnapshot) -> Vec<&'static str> {
        self.matching(snapshot).map(|rule| rule.advice).collect()
    }
}
