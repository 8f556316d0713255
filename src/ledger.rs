//! Task and points ledger
//!
//! Tracks completion of the tasks carried by the active recommendation set and
//! accrues points on first completion. Each task moves `Pending -> Completed`
//! once; only `reset_daily` moves it back.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VitalsError};
use crate::types::{Recommendation, Task};

/// Outcome of a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskCompletion {
    /// Task moved to completed and its points were added
    Completed { points: u32 },
    /// Task was already completed; nothing changed
    AlreadyCompleted,
}

impl TaskCompletion {
    /// Points added by this completion
    pub fn points_awarded(&self) -> u32 {
        match self {
            TaskCompletion::Completed { points } => *points,
            TaskCompletion::AlreadyCompleted => 0,
        }
    }
}

/// Completion and point state layered over the active recommendations
#[derive(Debug, Clone, Default)]
pub struct TaskLedger {
    recommendations: Vec<Recommendation>,
    earned_points: u32,
    /// (recommendation title, task id) pairs completed since the last reset
    completed_today: HashSet<(String, String)>,
}

impl TaskLedger {
    pub fn new(recommendations: Vec<Recommendation>) -> Self {
        Self {
            recommendations,
            earned_points: 0,
            completed_today: HashSet::new(),
        }
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Points earned since the last daily reset
    pub fn earned_points(&self) -> u32 {
        self.earned_points
    }

    /// Sum of potential points across the active recommendations
    pub fn total_available_points(&self) -> u32 {
        self.recommendations.iter().map(|r| r.potential_points).sum()
    }

    fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.recommendations.iter().flat_map(|r| r.tasks.iter())
    }

    pub fn completed_count(&self) -> usize {
        self.tasks().filter(|t| t.completed).count()
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks().filter(|t| !t.completed).collect()
    }

    /// Complete the first task matching `task_id`.
    ///
    /// Recommendations are scanned in list order, then tasks within each one.
    /// Completing an already-completed task is a no-op.
    pub fn complete_task(&mut self, task_id: &str) -> Result<TaskCompletion> {
        let position = self.recommendations.iter().enumerate().find_map(|(r, rec)| {
            rec.tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|t| (r, t))
        });

        let Some((r, t)) = position else {
            warn!(task_id, "completion requested for unknown task");
            return Err(VitalsError::TaskNotFound(task_id.to_string()));
        };

        let rec = &mut self.recommendations[r];
        let key = (rec.title.clone(), task_id.to_string());
        let task = &mut rec.tasks[t];
        if task.completed {
            return Ok(TaskCompletion::AlreadyCompleted);
        }

        task.completed = true;
        self.completed_today.insert(key);
        let points = task.points;
        self.earned_points = self.earned_points.saturating_add(points);
        info!(task_id, points, earned = self.earned_points, "task completed");
        Ok(TaskCompletion::Completed { points })
    }

    /// Mark every task pending again and zero the earned points
    pub fn reset_daily(&mut self) {
        for task in self.recommendations.iter_mut().flat_map(|r| r.tasks.iter_mut()) {
            task.completed = false;
        }
        self.earned_points = 0;
        self.completed_today.clear();
        info!("daily tasks reset");
    }

    /// Swap in a regenerated recommendation set.
    ///
    /// Any task completed since the last reset comes back completed, matched by
    /// recommendation title and task id, even if its recommendation left the
    /// active set in between. Earned points are unchanged.
    pub fn replace_recommendations(&mut self, mut recommendations: Vec<Recommendation>) {
        for rec in &mut recommendations {
            for task in &mut rec.tasks {
                if self
                    .completed_today
                    .contains(&(rec.title.clone(), task.id.clone()))
                {
                    task.completed = true;
                }
            }
        }

        self.recommendations = recommendations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::{INCREASE_DAILY_STEPS, REDUCE_SODIUM_INTAKE};
    use crate::types::{Difficulty, Priority, RecommendationType};

    fn canonical_ledger() -> TaskLedger {
        TaskLedger::new(vec![
            INCREASE_DAILY_STEPS.instantiate(),
            REDUCE_SODIUM_INTAKE.instantiate(),
        ])
    }

    #[test]
    fn test_complete_task_adds_points_once() {
        let mut ledger = canonical_ledger();

        let first = ledger.complete_task("task1").unwrap();
        assert_eq!(first, TaskCompletion::Completed { points: 10 });
        assert_eq!(ledger.earned_points(), 10);

        let second = ledger.complete_task("task1").unwrap();
        assert_eq!(second, TaskCompletion::AlreadyCompleted);
        assert_eq!(ledger.earned_points(), 10);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn test_unknown_task_leaves_state_unchanged() {
        let mut ledger = canonical_ledger();
        ledger.complete_task("task5").unwrap();

        let err = ledger.complete_task("nope").unwrap_err();
        assert!(matches!(err, VitalsError::TaskNotFound(id) if id == "nope"));
        assert_eq!(ledger.earned_points(), 20);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn test_reset_then_replay_reproduces_total() {
        let mut ledger = canonical_ledger();
        let replay = ["task1", "task4", "task5", "task1"];

        for id in replay {
            ledger.complete_task(id).unwrap();
        }
        let before = ledger.earned_points();
        assert_eq!(before, 40);

        ledger.reset_daily();
        assert_eq!(ledger.earned_points(), 0);
        assert_eq!(ledger.completed_count(), 0);
        assert_eq!(ledger.pending_tasks().len(), 6);
        assert_eq!(ledger.total_available_points(), 65);

        for id in replay {
            ledger.complete_task(id).unwrap();
        }
        assert_eq!(ledger.earned_points(), before);
    }

    #[test]
    fn test_duplicate_ids_complete_first_match_only() {
        let mut other = INCREASE_DAILY_STEPS.instantiate();
        other.title = "Walk More".to_string();
        other.kind = RecommendationType::Lifestyle;
        other.priority = Priority::Low;
        other.tasks[0].points = 99;
        other.tasks[0].difficulty = Difficulty::Hard;

        let mut ledger = TaskLedger::new(vec![INCREASE_DAILY_STEPS.instantiate(), other]);

        assert_eq!(
            ledger.complete_task("task1").unwrap(),
            TaskCompletion::Completed { points: 10 }
        );
        // The first match is already completed, so the later duplicate is untouched
        assert_eq!(
            ledger.complete_task("task1").unwrap(),
            TaskCompletion::AlreadyCompleted
        );
        assert!(!ledger.recommendations()[1].tasks[0].completed);
        assert_eq!(ledger.earned_points(), 10);
    }

    #[test]
    fn test_replace_carries_over_completed_tasks() {
        let mut ledger = canonical_ledger();
        ledger.complete_task("task2").unwrap();
        ledger.complete_task("task6").unwrap();

        ledger.replace_recommendations(vec![INCREASE_DAILY_STEPS.instantiate()]);

        assert_eq!(ledger.earned_points(), 20);
        assert_eq!(ledger.recommendations().len(), 1);
        assert!(ledger.recommendations()[0].tasks[1].completed);
        assert_eq!(
            ledger.complete_task("task2").unwrap(),
            TaskCompletion::AlreadyCompleted
        );
        assert!(matches!(
            ledger.complete_task("task6"),
            Err(VitalsError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_completion_survives_recommendation_dropping_out() {
        let mut ledger = canonical_ledger();
        ledger.complete_task("task2").unwrap();

        ledger.replace_recommendations(vec![REDUCE_SODIUM_INTAKE.instantiate()]);
        assert!(matches!(
            ledger.complete_task("task2"),
            Err(VitalsError::TaskNotFound(_))
        ));

        ledger.replace_recommendations(vec![
            INCREASE_DAILY_STEPS.instantiate(),
            REDUCE_SODIUM_INTAKE.instantiate(),
        ]);
        assert!(ledger.recommendations()[0].tasks[1].completed);
        assert_eq!(
            ledger.complete_task("task2").unwrap(),
            TaskCompletion::AlreadyCompleted
        );
        assert_eq!(ledger.earned_points(), 15);

        ledger.reset_daily();
        ledger.replace_recommendations(vec![INCREASE_DAILY_STEPS.instantiate()]);
        assert_eq!(
            ledger.complete_task("task2").unwrap(),
            TaskCompletion::Completed { points: 15 }
        );
    }
}
