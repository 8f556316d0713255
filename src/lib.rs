//! VitalSense - Health risk scoring engine for personal health dashboards
//!
//! VitalSense turns periodic health measurements into risk scores, trend
//! warnings and point-bearing recommendations through a deterministic pipeline:
//! snapshot validation → bounded history → normalization and weighted scoring
//! → trend analysis → rule-based recommendations → task/points ledger.
//!
//! ## Modules
//!
//! - **Scoring**: Normalize measurements against reference ranges and score four risk categories
//! - **History & Trends**: Keep the last 30 snapshots and warn on sustained patterns
//! - **Recommendations & Ledger**: Map metrics to task lists and track earned points
//! - **Profile**: The aggregate root that ties every stage together

pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod normalizer;
pub mod profile;
pub mod recommendations;
pub mod scoring;
pub mod source;
pub mod trends;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::EngineConfig;
pub use error::{Result, TransportError, VitalsError};
pub use ledger::{TaskCompletion, TaskLedger};
pub use profile::{IngestReport, UserHealthProfile};
pub use recommendations::RecommendationEngine;
pub use scoring::RiskScorer;
pub use source::MetricsSource;
pub use trends::{TrendAnalyzer, TrendWarning};
pub use types::{HealthRiskScore, MetricsSnapshot, Recommendation, Task};

/// VitalSense version embedded in CLI reports
pub const VITALS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "vitalsense";
