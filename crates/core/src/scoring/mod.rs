//! Deterministic scoring engines.
//!
//! Every engine is a pure function of a [`FleetData`](crate::fleet::FleetData)
//! snapshot and a [`ScoringConfig`]. Nothing is cached and nothing is written,
//! so repeated calls over an unchanged snapshot return identical results and
//! engines may be called concurrently from any number of missions.
//!
//! - [`risk`]: per-driver risk score, tier and annualized cost
//! - [`insurance`]: fleet insurance score, grade and premium impact
//! - [`wellness`]: burnout signals and retention cost at risk
//! - [`roi`]: savings categories, ROI and a 3-year projection
//! - [`preshift`]: pre-shift risk and a weekly forecast
//! - [`alerts`]: urgency-scored alert triage and a daily briefing

pub mod alerts;
mod config;
pub mod insurance;
pub mod preshift;
pub mod risk;
pub mod roi;
mod window;
pub mod wellness;

use thiserror::Error;

pub use alerts::{daily_briefing, triage_alerts, AlertBriefing, AlertPriority, TriagedAlert};
pub use config::ScoringConfig;
pub use insurance::{score_insurance, InsuranceComponent, InsuranceGrade, InsuranceScore};
pub use preshift::{
    assess_all_preshift, assess_preshift, weekly_forecast, DayForecast, PreShiftLevel,
    PreShiftRisk, WeeklyForecast,
};
pub use risk::{
    analyze_event_patterns, score_driver_risk, score_fleet_risk, summarize_fleet_risk,
    DriverRisk, EventPatternAnalysis, FleetRiskSummary, RiskComponents, RiskTier, TrendDirection,
};
pub use roi::{compute_fleet_roi, FleetRoi, RoiProjectionYear, SavingsBreakdown};
pub use wellness::{
    assess_fleet_wellness, assess_wellness, BurnoutRisk, FleetWellness, SignalStatus,
    WellnessResult, WellnessSignal,
};

/// Errors returned by scoring engines.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("driver not found: {0}")]
    DriverNotFound(String),

    #[error("fleet has no {0} to score")]
    EmptyFleet(&'static str),
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round a currency amount to cents.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(12.36), 12.4);
        assert_eq!(round2(1234.5678), 1234.57);
    }

    #[test]
    fn test_error_display() {
        let err = ScoringError::DriverNotFound("d-042".to_string());
        assert_eq!(err.to_string(), "driver not found: d-042");

        let err = ScoringError::EmptyFleet("vehicles");
        assert_eq!(err.to_string(), "fleet has no vehicles to score");
    }
}
