//! User health profile
//!
//! The profile is the aggregate root of the engine. It owns the current
//! snapshot, the bounded history, the latest risk score and trend warnings, and
//! the task ledger. All mutation goes through its methods.
//!
//! Ingestion is all-or-nothing: a snapshot is validated and appended first, and
//! only then are scores, warnings and recommendations recomputed. Every step
//! after the append is infallible, so a rejected snapshot leaves the profile
//! exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Result, VitalsError};
use crate::history::MetricsHistory;
use crate::ledger::{TaskCompletion, TaskLedger};
use crate::recommendations::RecommendationEngine;
use crate::scoring::RiskScorer;
use crate::source::MetricsSource;
use crate::trends::{TrendAnalyzer, TrendWarning};
use crate::types::{
    Demographics, DietLog, HealthGoals, HealthRiskScore, MetricsSnapshot, Recommendation,
};

/// Summary of one accepted ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub risk_score: HealthRiskScore,
    pub warnings: Vec<TrendWarning>,
    pub recommendation_count: usize,
    /// Capture time of the snapshot evicted from history, if any
    pub evicted: Option<DateTime<Utc>>,
    pub history_len: usize,
}

/// Aggregate root for one user's health state
#[derive(Debug, Clone)]
pub struct UserHealthProfile {
    id: Uuid,
    demographics: Option<Demographics>,
    goals: HealthGoals,
    metrics: MetricsSnapshot,
    history: MetricsHistory,
    risk_score: HealthRiskScore,
    warnings: Vec<TrendWarning>,
    ledger: TaskLedger,
    diet_logs: Vec<DietLog>,
    scorer: RiskScorer,
    analyzer: TrendAnalyzer,
    recommender: RecommendationEngine,
}

impl UserHealthProfile {
    /// Create a profile from an initial snapshot using the reference configuration
    pub fn new(initial: MetricsSnapshot) -> Result<Self> {
        Self::with_config(initial, &EngineConfig::default())
    }

    /// Create a profile with explicit configuration.
    ///
    /// Configuration problems are reported here and never during scoring.
    pub fn with_config(initial: MetricsSnapshot, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        initial.validate()?;

        let scorer = RiskScorer::new(config.ranges.clone(), config.weights.clone())?;
        let analyzer = TrendAnalyzer::new(config.trends.clone())?;
        let recommender = RecommendationEngine::default();
        let mut history = MetricsHistory::new(config.history_capacity)?;
        history.append(initial.clone())?;

        let risk_score = scorer.score(&initial);
        let warnings = analyzer.analyze(history.iter(), &risk_score);
        let ledger = TaskLedger::new(recommender.generate(&initial));

        let id = Uuid::new_v4();
        info!(profile_id = %id, overall = risk_score.overall, "profile initialized");

        Ok(Self {
            id,
            demographics: None,
            goals: HealthGoals::default(),
            metrics: initial,
            history,
            risk_score,
            warnings,
            ledger,
            diet_logs: Vec::new(),
            scorer,
            analyzer,
            recommender,
        })
    }

    pub fn with_goals(mut self, goals: HealthGoals) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = Some(demographics);
        self
    }

    /// Replace the recommendation rules and regenerate the active set.
    ///
    /// Earned points and today's completions are kept.
    pub fn with_recommendation_engine(mut self, engine: RecommendationEngine) -> Self {
        self.recommender = engine;
        self.ledger
            .replace_recommendations(self.recommender.generate(&self.metrics));
        self
    }

    /// Ingest a new snapshot.
    ///
    /// Fails with `InvalidSnapshot` or `OutOfOrder` without changing anything.
    pub fn ingest(&mut self, snapshot: MetricsSnapshot) -> Result<IngestReport> {
        if let Err(e) = snapshot.validate() {
            warn!(profile_id = %self.id, error = %e, "rejecting invalid snapshot");
            return Err(e);
        }
        let evicted = self.history.append(snapshot.clone())?;

        self.metrics = snapshot;
        self.risk_score = self.scorer.score(&self.metrics);
        self.warnings = self
            .analyzer
            .analyze(self.history.iter(), &self.risk_score);
        self.ledger
            .replace_recommendations(self.recommender.generate(&self.metrics));

        info!(
            profile_id = %self.id,
            timestamp = %self.metrics.timestamp,
            overall = self.risk_score.overall,
            warnings = self.warnings.len(),
            history_len = self.history.len(),
            "snapshot ingested"
        );

        Ok(IngestReport {
            risk_score: self.risk_score.clone(),
            warnings: self.warnings.clone(),
            recommendation_count: self.ledger.recommendations().len(),
            evicted: evicted.map(|s| s.timestamp),
            history_len: self.history.len(),
        })
    }

    /// Fetch a snapshot from `source` and ingest it.
    ///
    /// A transport failure is returned as-is and the profile is untouched.
    /// Retrying is left to the caller.
    pub fn sync(&mut self, source: &mut dyn MetricsSource) -> Result<IngestReport> {
        let snapshot = source.fetch().map_err(|e| {
            warn!(profile_id = %self.id, error = %e, "metrics fetch failed");
            VitalsError::Transport(e)
        })?;
        self.ingest(snapshot)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.demographics.as_ref()
    }

    pub fn goals(&self) -> &HealthGoals {
        &self.goals
    }

    /// Most recently ingested snapshot
    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    pub fn risk_score(&self) -> &HealthRiskScore {
        &self.risk_score
    }

    /// Last `min(window, len)` snapshots, oldest first
    pub fn history(&self, window: usize) -> Vec<&MetricsSnapshot> {
        self.history.window(window).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Trend warnings computed at the last ingestion
    pub fn warnings(&self) -> &[TrendWarning] {
        &self.warnings
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        self.ledger.recommendations()
    }

    /// One-line advice for the current metrics
    pub fn advice(&self) -> Vec<&'static str> {
        self.recommender.advice(&self.metrics)
    }

    pub fn earned_points(&self) -> u32 {
        self.ledger.earned_points()
    }

    pub fn total_available_points(&self) -> u32 {
        self.ledger.total_available_points()
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn complete_task(&mut self, task_id: &str) -> Result<TaskCompletion> {
        self.ledger.complete_task(task_id)
    }

    pub fn reset_daily(&mut self) {
        self.ledger.reset_daily();
    }

    /// Record a meal; newest entries come first
    pub fn log_meal(&mut self, meal: DietLog) -> Result<()> {
        meal.validate()?;
        self.diet_logs.insert(0, meal);
        Ok(())
    }

    pub fn diet_logs(&self) -> &[DietLog] {
        &self.diet_logs
    }
}
