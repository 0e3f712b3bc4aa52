//! Mission data model: configs, progress, findings and results.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::ScoringError;

/// Errors raised inside a mission run.
///
/// These never reach the caller of the orchestrator; they are converted into
/// a terminal [`MissionResult`].
#[derive(Debug, Error)]
pub enum MissionError {
    /// No driver (or other target) could be resolved for the mission.
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Cancellation was observed at a checkpoint.
    #[error("mission cancelled")]
    Cancelled,

    /// A scoring engine failed.
    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// No pipeline is registered for the mission type.
    #[error("no pipeline registered for mission type: {0}")]
    UnknownType(String),

    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

/// The five mission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    CoachingSweep,
    WellnessCheck,
    SafetyInvestigation,
    InsuranceOptimization,
    PreshiftSweep,
}

/// Display metadata for a mission type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionTypeInfo {
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub display_name: &'static str,
    pub description: &'static str,
}

impl MissionType {
    pub const ALL: [MissionType; 5] = [
        MissionType::CoachingSweep,
        MissionType::WellnessCheck,
        MissionType::SafetyInvestigation,
        MissionType::InsuranceOptimization,
        MissionType::PreshiftSweep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionType::CoachingSweep => "coaching_sweep",
            MissionType::WellnessCheck => "wellness_check",
            MissionType::SafetyInvestigation => "safety_investigation",
            MissionType::InsuranceOptimization => "insurance_optimization",
            MissionType::PreshiftSweep => "preshift_sweep",
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.info().display_name
    }

    pub fn info(&self) -> MissionTypeInfo {
        let (display_name, description) = match self {
            MissionType::CoachingSweep => (
                "Coaching Sweep",
                "Scores the fleet, deep-dives the riskiest drivers and builds a coaching plan.",
            ),
            MissionType::WellnessCheck => (
                "Wellness Check",
                "Screens every driver for burnout signals and schedules interventions.",
            ),
            MissionType::SafetyInvestigation => (
                "Safety Investigation",
                "Investigates one driver's risk profile, event patterns and likely root causes.",
            ),
            MissionType::InsuranceOptimization => (
                "Insurance Optimization",
                "Breaks down the fleet insurance score and the savings available per component.",
            ),
            MissionType::PreshiftSweep => (
                "Pre-Shift Sweep",
                "Flags drivers who should not start a shift unchecked and forecasts the week.",
            ),
        };
        MissionTypeInfo {
            mission_type: *self,
            display_name,
            description,
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionType {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MissionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MissionError::UnknownType(s.to_string()))
    }
}

/// Mission-specific parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionParams {
    /// Number of drivers to deep-dive (coaching sweep).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    /// Investigation target by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    /// Investigation target by name fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
}

fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// What to run. Immutable once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    #[serde(default = "generate_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub params: MissionParams,
}

impl MissionConfig {
    pub fn new(mission_type: MissionType) -> Self {
        Self {
            mission_type,
            session_id: generate_session_id(),
            params: MissionParams::default(),
        }
    }

    pub fn with_params(mut self, params: MissionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    Starting,
    Running,
    Summarizing,
}

/// Progress notice. `step` strictly increases within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub mission_id: String,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub phase: MissionPhase,
    pub step: u32,
    pub total_steps: u32,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Info,
    Warning,
    Critical,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Info => "info",
            FindingSeverity::Warning => "warning",
            FindingSeverity::Critical => "critical",
        }
    }
}

/// A structured observation produced by a mission step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionFinding {
    pub mission_id: String,
    pub category: String,
    pub severity: FindingSeverity,
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Complete,
    Failed,
    Cancelled,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Complete => "complete",
            MissionStatus::Failed => "failed",
            MissionStatus::Cancelled => "cancelled",
        }
    }
}

/// The single terminal record of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionResult {
    pub mission_id: String,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub session_id: String,
    pub status: MissionStatus,
    pub display_name: String,
    pub summary: String,
    pub findings: Vec<MissionFinding>,
    pub recommendations: Vec<String>,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
    /// Mission-type-specific rollup.
    #[serde(default)]
    pub data: serde_json::Value,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MissionResult {
    pub fn findings_in(&self, category: &str) -> impl Iterator<Item = &MissionFinding> {
        let category = category.to_string();
        self.findings.iter().filter(move |f| f.category == category)
    }
}

/// Finding categories. Consumers must treat unknown categories generically.
pub mod category {
    pub const FLEET_RISK_OVERVIEW: &str = "fleet_risk_overview";
    pub const DRIVER_COACHING_PLAN: &str = "driver_coaching_plan";
    pub const TREND_ANALYSIS: &str = "trend_analysis";
    pub const COACHING_ACTION_PLAN: &str = "coaching_action_plan";
    pub const WELLNESS_OVERVIEW: &str = "wellness_overview";
    pub const BURNOUT_CRITICAL: &str = "burnout_critical";
    pub const BURNOUT_MODERATE: &str = "burnout_moderate";
    pub const INTERVENTION_SCHEDULE: &str = "intervention_schedule";
    pub const RISK_PROFILE: &str = "risk_profile";
    pub const EVENT_PATTERN: &str = "event_pattern";
    pub const WELLNESS_CORRELATION: &str = "wellness_correlation";
    pub const PRESHIFT_ASSESSMENT: &str = "preshift_assessment";
    pub const ROOT_CAUSE: &str = "root_cause";
    pub const INSURANCE_SCORE: &str = "insurance_score";
    pub const COMPONENT_ANALYSIS: &str = "component_analysis";
    pub const ROI_ANALYSIS: &str = "roi_analysis";
    pub const BEFORE_AFTER: &str = "before_after";
    pub const TOP_OFFENDERS: &str = "top_offenders";
    pub const PRESHIFT_OVERVIEW: &str = "preshift_overview";
    pub const PRESHIFT_FLAGGED: &str = "preshift_flagged";
    pub const WEEKLY_FORECAST: &str = "weekly_forecast";
    pub const DAILY_BRIEFING: &str = "daily_briefing";
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_type_parse() {
        assert_eq!(
            "coaching_sweep".parse::<MissionType>().unwrap(),
            MissionType::CoachingSweep
        );
        assert!(matches!(
            "fleet_party".parse::<MissionType>(),
            Err(MissionError::UnknownType(t)) if t == "fleet_party"
        ));
        for mission_type in MissionType::ALL {
            assert_eq!(mission_type.as_str().parse::<MissionType>().unwrap(), mission_type);
        }
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: MissionConfig =
            serde_json::from_str(r#"{"type": "wellness_check"}"#).unwrap();
        assert_eq!(config.mission_type, MissionType::WellnessCheck);
        assert!(!config.session_id.is_empty());
        assert_eq!(config.params, MissionParams::default());

        let other: MissionConfig =
            serde_json::from_str(r#"{"type": "wellness_check"}"#).unwrap();
        assert_ne!(config.session_id, other.session_id);
    }

    #[test]
    fn test_config_with_params() {
        let config: MissionConfig = serde_json::from_str(
            r#"{"type": "safety_investigation", "session_id": "s-1", "params": {"driver_name": "rivera"}}"#,
        )
        .unwrap();
        assert_eq!(config.session_id, "s-1");
        assert_eq!(config.params.driver_name.as_deref(), Some("rivera"));
        assert_eq!(config.params.top_n, None);
    }

    #[test]
    fn test_result_serialization() {
        let result = MissionResult {
            mission_id: "m-1".to_string(),
            mission_type: MissionType::PreshiftSweep,
            session_id: "s-1".to_string(),
            status: MissionStatus::Complete,
            display_name: MissionType::PreshiftSweep.display_name().to_string(),
            summary: "All clear.".to_string(),
            findings: vec![],
            recommendations: vec![],
            duration_secs: 1.5,
            data: serde_json::Value::Null,
            completed_at: Utc::now(),
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "preshift_sweep");
        assert_eq!(json["status"], "complete");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(FindingSeverity::Critical > FindingSeverity::Warning);
        assert!(FindingSeverity::Warning > FindingSeverity::Info);
    }
}
