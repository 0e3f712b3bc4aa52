//! Pre-shift risk: how risky is it to put a driver on the road today.
//!
//! Higher is riskier. Four capped components sum to a 0-100 score:
//! fatigue (30), behavior trend (25), recent severity (25) and workload (20).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fleet::{Driver, EventSeverity, FleetData, SafetyEvent};

use super::window::{count_in_window, last_days, DAYS_14, DAYS_28, DAYS_7};
use super::{round1, ScoringError};

pub const FATIGUE_MAX: f64 = 30.0;
pub const BEHAVIOR_MAX: f64 = 25.0;
pub const SEVERITY_MAX: f64 = 25.0;
pub const WORKLOAD_MAX: f64 = 20.0;

/// Share of a component's maximum at which it is reported as a factor.
const FACTOR_THRESHOLD: f64 = 0.40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreShiftLevel {
    Low,
    Elevated,
    High,
    Critical,
}

impl PreShiftLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=24 => PreShiftLevel::Low,
            25..=49 => PreShiftLevel::Elevated,
            50..=74 => PreShiftLevel::High,
            _ => PreShiftLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreShiftLevel::Low => "low",
            PreShiftLevel::Elevated => "elevated",
            PreShiftLevel::High => "high",
            PreShiftLevel::Critical => "critical",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            PreShiftLevel::Low => "Clear to drive. No pre-shift action needed.",
            PreShiftLevel::Elevated => {
                "Brief check-in before the shift; remind the driver of their recent events."
            }
            PreShiftLevel::High => {
                "Supervisor conversation before dispatch; prefer shorter or daytime routes."
            }
            PreShiftLevel::Critical => {
                "Hold from dispatch until a supervisor reviews fatigue and recent events."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreShiftComponents {
    pub fatigue: f64,
    pub behavior_trend: f64,
    pub recent_severity: f64,
    pub workload: f64,
}

/// A component at or above 40% of its maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub key: String,
    pub label: String,
    pub points: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreShiftRisk {
    pub driver_id: String,
    pub driver_name: String,
    pub score: u32,
    pub level: PreShiftLevel,
    pub components: PreShiftComponents,
    /// Highest points first.
    pub factors: Vec<RiskFactor>,
    pub recommendation: String,
    pub events_7d: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub weekday: String,
    pub expected_events: f64,
    pub risk_index: u32,
    pub level: PreShiftLevel,
}

/// Risk outlook for the seven days after the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyForecast {
    pub days: Vec<DayForecast>,
    pub peak_day: Option<DayForecast>,
    pub mean_preshift_score: f64,
}

fn severity_points(severity: EventSeverity) -> f64 {
    match severity {
        EventSeverity::Low => 2.0,
        EventSeverity::Medium => 5.0,
        EventSeverity::High => 10.0,
        EventSeverity::Critical => 20.0,
    }
}

/// Assess one driver.
pub fn assess_preshift(
    data: &dyn FleetData,
    driver_id: &str,
) -> Result<PreShiftRisk, ScoringError> {
    let driver = data
        .driver(driver_id)
        .ok_or_else(|| ScoringError::DriverNotFound(driver_id.to_string()))?;
    Ok(assess(data, driver))
}

/// Assess every driver, riskiest first (ties by driver id).
pub fn assess_all_preshift(data: &dyn FleetData) -> Vec<PreShiftRisk> {
    let mut all: Vec<PreShiftRisk> = data.drivers().iter().map(|d| assess(data, d)).collect();
    all.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });
    all
}

/// Forecast the next seven days from weekday event history.
pub fn weekly_forecast(data: &dyn FleetData) -> WeeklyForecast {
    let as_of = data.as_of();
    let all = assess_all_preshift(data);
    let mean_score = if all.is_empty() {
        0.0
    } else {
        all.iter().map(|r| r.score as f64).sum::<f64>() / all.len() as f64
    };

    let events: Vec<&SafetyEvent> = data.events().iter().collect();
    let history = last_days(&events, as_of, DAYS_28);
    let today = as_of.date_naive();

    let expected: Vec<(NaiveDate, f64)> = (1..=7)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let on_weekday = history
                .iter()
                .filter(|e| e.occurred_at.weekday() == date.weekday())
                .count();
            (date, on_weekday as f64 / 4.0)
        })
        .collect();
    let mean_expected = expected.iter().map(|(_, e)| e).sum::<f64>() / expected.len() as f64;

    let days: Vec<DayForecast> = expected
        .into_iter()
        .map(|(date, expected_events)| {
            let factor = if mean_expected > 0.0 {
                expected_events / mean_expected
            } else {
                1.0
            };
            let risk_index = (mean_score * factor).clamp(0.0, 100.0).round() as u32;
            DayForecast {
                date,
                weekday: date.weekday().to_string(),
                expected_events,
                risk_index,
                level: PreShiftLevel::from_score(risk_index),
            }
        })
        .collect();

    let peak_day = days
        .iter()
        .fold(None::<&DayForecast>, |best, day| match best {
            Some(b) if b.risk_index >= day.risk_index => Some(b),
            _ => Some(day),
        })
        .cloned();

    WeeklyForecast {
        days,
        peak_day,
        mean_preshift_score: round1(mean_score),
    }
}

fn assess(data: &dyn FleetData, driver: &Driver) -> PreShiftRisk {
    let as_of = data.as_of();
    let work = &driver.work;
    let events = data.events_for_driver(&driver.id);
    let last_week = last_days(&events, as_of, DAYS_7);
    let events_7d = last_week.len() as f64;
    let prior_7d = count_in_window(&events, as_of, DAYS_14, DAYS_7) as f64;

    let fatigue = ((work.hours_last_7d - 40.0).max(0.0) * 0.6
        + (10.0 - work.avg_rest_hours).max(0.0) * 2.5
        + (work.consecutive_days_worked as f64 - 5.0).max(0.0) * 2.0)
        .min(FATIGUE_MAX);
    let behavior_trend =
        (events_7d * 3.0 + (events_7d - prior_7d).max(0.0) * 4.0).min(BEHAVIOR_MAX);
    let recent_severity = last_week
        .iter()
        .map(|e| severity_points(e.severity))
        .sum::<f64>()
        .min(SEVERITY_MAX);
    let workload = ((work.hours_last_7d - 45.0).max(0.0) * 0.8
        + work.night_shifts_14d as f64 * 1.5)
        .min(WORKLOAD_MAX);

    let score = (fatigue + behavior_trend + recent_severity + workload)
        .round()
        .clamp(0.0, 100.0) as u32;
    let level = PreShiftLevel::from_score(score);

    let mut factors: Vec<RiskFactor> = [
        ("fatigue", "Fatigue", fatigue, FATIGUE_MAX),
        ("behavior_trend", "Behavior trend", behavior_trend, BEHAVIOR_MAX),
        ("recent_severity", "Recent event severity", recent_severity, SEVERITY_MAX),
        ("workload", "Workload", workload, WORKLOAD_MAX),
    ]
    .into_iter()
    .filter(|(_, _, points, max)| *points >= max * FACTOR_THRESHOLD)
    .map(|(key, label, points, max)| RiskFactor {
        key: key.to_string(),
        label: label.to_string(),
        points: round1(points),
        max,
    })
    .collect();
    // stable sort keeps the fixed component order on ties
    factors.sort_by(|a, b| b.points.total_cmp(&a.points));

    PreShiftRisk {
        driver_id: driver.id.clone(),
        driver_name: driver.name.clone(),
        score,
        level,
        components: PreShiftComponents {
            fatigue: round1(fatigue),
            behavior_trend: round1(behavior_trend),
            recent_severity: round1(recent_severity),
            workload: round1(workload),
        },
        factors,
        recommendation: level.recommendation().to_string(),
        events_7d: last_week.len() as u32,
    }
}
