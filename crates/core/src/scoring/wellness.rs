//! Driver wellness and burnout assessment.
//!
//! Six signals are classified as normal, warning or critical. Burnout
//! probability is `critical × 0.22 + warning × 0.12 + 0.03`, clamped to [0, 1].

use serde::{Deserialize, Serialize};

use crate::fleet::{Driver, FleetData};

use super::window::recent_and_previous;
use super::{round1, round2, ScoringConfig, ScoringError};

const CRITICAL_SIGNAL_WEIGHT: f64 = 0.22;
const WARNING_SIGNAL_WEIGHT: f64 = 0.12;
const BASELINE_PROBABILITY: f64 = 0.03;

const MODERATE_THRESHOLD: f64 = 0.30;
const HIGH_THRESHOLD: f64 = 0.60;

/// Status of a single wellness signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Normal,
    Warning,
    Critical,
}

/// Burnout risk level derived from burnout probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutRisk {
    Low,
    Moderate,
    High,
}

impl BurnoutRisk {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_THRESHOLD {
            BurnoutRisk::High
        } else if probability >= MODERATE_THRESHOLD {
            BurnoutRisk::Moderate
        } else {
            BurnoutRisk::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BurnoutRisk::Low => "low",
            BurnoutRisk::Moderate => "moderate",
            BurnoutRisk::High => "high",
        }
    }
}

/// One observed wellness signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessSignal {
    /// Stable key, e.g. `weekly_hours`.
    pub key: String,
    pub label: String,
    pub value: f64,
    pub status: SignalStatus,
}

/// Wellness assessment for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessResult {
    pub driver_id: String,
    pub driver_name: String,
    pub wellness_score: f64,
    pub burnout_probability: f64,
    pub burnout_risk: BurnoutRisk,
    pub retention_cost_at_risk: f64,
    pub critical_signals: u32,
    pub warning_signals: u32,
    pub signals: Vec<WellnessSignal>,
}

impl WellnessResult {
    /// Signals that are not normal, worst first.
    pub fn flagged_signals(&self) -> Vec<&WellnessSignal> {
        let mut flagged: Vec<&WellnessSignal> = self
            .signals
            .iter()
            .filter(|s| s.status != SignalStatus::Normal)
            .collect();
        flagged.sort_by(|a, b| b.status.cmp(&a.status));
        flagged
    }
}

/// Fleet wellness rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetWellness {
    /// All drivers, highest burnout probability first.
    pub drivers: Vec<WellnessResult>,
    pub average_wellness: f64,
    pub high_risk: usize,
    pub moderate_risk: usize,
    pub low_risk: usize,
    pub total_retention_cost_at_risk: f64,
}

impl FleetWellness {
    pub fn with_risk(&self, risk: BurnoutRisk) -> Vec<&WellnessResult> {
        self.drivers
            .iter()
            .filter(|d| d.burnout_risk == risk)
            .collect()
    }
}

/// Burnout probability for a signal tally.
pub fn burnout_probability(critical: u32, warning: u32) -> f64 {
    (critical as f64 * CRITICAL_SIGNAL_WEIGHT
        + warning as f64 * WARNING_SIGNAL_WEIGHT
        + BASELINE_PROBABILITY)
        .clamp(0.0, 1.0)
}

/// Wellness score (0-100) for a signal tally.
pub fn wellness_score(critical: u32, warning: u32) -> f64 {
    (100.0 - critical as f64 * 18.0 - warning as f64 * 8.0).clamp(0.0, 100.0)
}

/// Assess one driver.
pub fn assess_wellness(
    data: &dyn FleetData,
    config: &ScoringConfig,
    driver_id: &str,
) -> Result<WellnessResult, ScoringError> {
    let driver = data
        .driver(driver_id)
        .ok_or_else(|| ScoringError::DriverNotFound(driver_id.to_string()))?;
    Ok(assess(data, config, driver))
}

/// Assess every driver in the fleet.
pub fn assess_fleet_wellness(data: &dyn FleetData, config: &ScoringConfig) -> FleetWellness {
    let mut drivers: Vec<WellnessResult> = data
        .drivers()
        .iter()
        .map(|driver| assess(data, config, driver))
        .collect();

    drivers.sort_by(|a, b| {
        b.burnout_probability
            .total_cmp(&a.burnout_probability)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });

    let count_risk = |risk: BurnoutRisk| drivers.iter().filter(|d| d.burnout_risk == risk).count();
    let average_wellness = if drivers.is_empty() {
        0.0
    } else {
        round1(drivers.iter().map(|d| d.wellness_score).sum::<f64>() / drivers.len() as f64)
    };

    FleetWellness {
        average_wellness,
        high_risk: count_risk(BurnoutRisk::High),
        moderate_risk: count_risk(BurnoutRisk::Moderate),
        low_risk: count_risk(BurnoutRisk::Low),
        total_retention_cost_at_risk: round2(
            drivers.iter().map(|d| d.retention_cost_at_risk).sum(),
        ),
        drivers,
    }
}

fn assess(data: &dyn FleetData, config: &ScoringConfig, driver: &Driver) -> WellnessResult {
    let work = &driver.work;
    let events = data.events_for_driver(&driver.id);
    let (recent, previous) = recent_and_previous(&events, data.as_of());

    let signals = vec![
        signal(
            "weekly_hours",
            "Weekly driving hours",
            work.hours_last_7d,
            status_above(work.hours_last_7d, 55.0, 65.0),
        ),
        signal(
            "consecutive_days",
            "Consecutive days worked",
            work.consecutive_days_worked as f64,
            status_at_least(work.consecutive_days_worked as f64, 6.0, 10.0),
        ),
        signal(
            "night_shifts",
            "Night shifts (14 days)",
            work.night_shifts_14d as f64,
            status_at_least(work.night_shifts_14d as f64, 4.0, 8.0),
        ),
        signal(
            "rest_hours",
            "Average rest between shifts",
            work.avg_rest_hours,
            if work.avg_rest_hours < 8.0 {
                SignalStatus::Critical
            } else if work.avg_rest_hours < 10.0 {
                SignalStatus::Warning
            } else {
                SignalStatus::Normal
            },
        ),
        signal(
            "days_since_time_off",
            "Days since time off",
            work.days_since_time_off as f64,
            status_at_least(work.days_since_time_off as f64, 14.0, 28.0),
        ),
        signal(
            "behavior_trend",
            "Safety events, last 14 days",
            recent as f64,
            if recent >= 3 && recent >= previous * 2 {
                SignalStatus::Critical
            } else if recent > previous {
                SignalStatus::Warning
            } else {
                SignalStatus::Normal
            },
        ),
    ];

    let critical = signals
        .iter()
        .filter(|s| s.status == SignalStatus::Critical)
        .count() as u32;
    let warning = signals
        .iter()
        .filter(|s| s.status == SignalStatus::Warning)
        .count() as u32;
    let probability = burnout_probability(critical, warning);

    WellnessResult {
        driver_id: driver.id.clone(),
        driver_name: driver.name.clone(),
        wellness_score: wellness_score(critical, warning),
        burnout_probability: round2(probability),
        burnout_risk: BurnoutRisk::from_probability(probability),
        retention_cost_at_risk: round2(config.driver_replacement_cost * probability),
        critical_signals: critical,
        warning_signals: warning,
        signals,
    }
}

fn signal(key: &str, label: &str, value: f64, status: SignalStatus) -> WellnessSignal {
    WellnessSignal {
        key: key.to_string(),
        label: label.to_string(),
        value: round1(value),
        status,
    }
}

fn status_above(value: f64, warning: f64, critical: f64) -> SignalStatus {
    if value > critical {
        SignalStatus::Critical
    } else if value > warning {
        SignalStatus::Warning
    } else {
        SignalStatus::Normal
    }
}

fn status_at_least(value: f64, warning: f64, critical: f64) -> SignalStatus {
    if value >= critical {
        SignalStatus::Critical
    } else if value >= warning {
        SignalStatus::Warning
    } else {
        SignalStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetSnapshot, InMemoryFleet, WorkPattern};
    use crate::testing::fixtures;

    fn fleet_with_work(work: WorkPattern) -> InMemoryFleet {
        let mut driver = fixtures::driver("d1", "Sam Okafor");
        driver.work = work;
        InMemoryFleet::new(FleetSnapshot {
            as_of: fixtures::as_of(),
            drivers: vec![driver],
            vehicles: vec![],
            events: vec![],
        })
    }

    #[test]
    fn test_probability_formula() {
        assert_eq!(burnout_probability(0, 0), 0.03);
        assert!((burnout_probability(1, 2) - 0.49).abs() < 1e-9);
        assert_eq!(burnout_probability(6, 0), 1.0);
    }

    #[test]
    fn test_risk_bands() {
        assert_eq!(BurnoutRisk::from_probability(0.03), BurnoutRisk::Low);
        assert_eq!(BurnoutRisk::from_probability(0.29), BurnoutRisk::Low);
        assert_eq!(BurnoutRisk::from_probability(0.30), BurnoutRisk::Moderate);
        assert_eq!(BurnoutRisk::from_probability(0.59), BurnoutRisk::Moderate);
        assert_eq!(BurnoutRisk::from_probability(0.60), BurnoutRisk::High);
    }

    #[test]
    fn test_healthy_driver() {
        let fleet = fleet_with_work(fixtures::healthy_work());
        let result = assess_wellness(&fleet, &ScoringConfig::default(), "d1").unwrap();

        assert_eq!(result.signals.len(), 6);
        assert_eq!(result.critical_signals, 0);
        assert_eq!(result.warning_signals, 0);
        assert_eq!(result.wellness_score, 100.0);
        assert_eq!(result.burnout_risk, BurnoutRisk::Low);
        assert_eq!(result.retention_cost_at_risk, 1_050.0);
        assert!(result.flagged_signals().is_empty());
    }

    #[test]
    fn test_overworked_driver() {
        let fleet = fleet_with_work(WorkPattern {
            hours_last_7d: 68.0,
            consecutive_days_worked: 7,
            night_shifts_14d: 2,
            avg_rest_hours: 9.0,
            days_since_time_off: 30,
        });
        let result = assess_wellness(&fleet, &ScoringConfig::default(), "d1").unwrap();

        // critical: weekly hours, days since time off; warning: consecutive days, rest
        assert_eq!(result.critical_signals, 2);
        assert_eq!(result.warning_signals, 2);
        assert_eq!(result.burnout_probability, 0.71);
        assert_eq!(result.burnout_risk, BurnoutRisk::High);
        assert_eq!(result.wellness_score, 48.0);
        assert_eq!(result.retention_cost_at_risk, 24_850.0);

        let flagged = result.flagged_signals();
        assert_eq!(flagged.len(), 4);
        assert_eq!(flagged[0].status, SignalStatus::Critical);
    }

    #[test]
    fn test_replacement_cost_is_configurable() {
        let fleet = fleet_with_work(fixtures::healthy_work());
        let config = ScoringConfig {
            driver_replacement_cost: 10_000.0,
            ..Default::default()
        };
        let result = assess_wellness(&fleet, &config, "d1").unwrap();
        assert_eq!(result.retention_cost_at_risk, 300.0);
    }

    #[test]
    fn test_fleet_sorted_by_probability() {
        let fleet = InMemoryFleet::new(fixtures::sample_fleet(15));
        let wellness = assess_fleet_wellness(&fleet, &ScoringConfig::default());

        assert_eq!(wellness.drivers.len(), 15);
        assert!(wellness
            .drivers
            .windows(2)
            .all(|w| w[0].burnout_probability >= w[1].burnout_probability));
        assert_eq!(
            wellness.high_risk + wellness.moderate_risk + wellness.low_risk,
            15
        );
    }
}
