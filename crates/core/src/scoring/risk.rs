//! Driver risk scoring.
//!
//! `score = frequency × 0.40 + severity × 0.25 + pattern × 0.20 + trend × 0.15`,
//! rounded to a whole number and bucketed into fixed tiers.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::fleet::{Driver, EventType, FleetData, SafetyEvent};

use super::window::{last_days, recent_and_previous, DAYS_30};
use super::{round1, ScoringError};

pub const FREQUENCY_WEIGHT: f64 = 0.40;
pub const SEVERITY_WEIGHT: f64 = 0.25;
pub const PATTERN_WEIGHT: f64 = 0.20;
pub const TREND_WEIGHT: f64 = 0.15;

/// Minimum 30-day events before a pattern is considered.
const PATTERN_MIN_EVENTS: usize = 3;
/// Occurrences at which an event type counts as repeated.
const REPEAT_THRESHOLD: u32 = 3;

/// Discrete risk bucket derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Tier for a score: low 0-25, moderate 26-50, high 51-75, critical 76-100.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=25 => RiskTier::Low,
            26..=50 => RiskTier::Moderate,
            51..=75 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    /// Expected annual incident cost for a driver in this tier (USD).
    pub fn annualized_cost(&self) -> f64 {
        match self {
            RiskTier::Low => 2_000.0,
            RiskTier::Moderate => 8_000.0,
            RiskTier::High => 25_000.0,
            RiskTier::Critical => 65_000.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

/// Direction of a driver's short-term event trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
}

impl TrendDirection {
    pub fn from_counts(recent: u32, previous: u32) -> Self {
        match recent.cmp(&previous) {
            std::cmp::Ordering::Less => TrendDirection::Improving,
            std::cmp::Ordering::Equal => TrendDirection::Stable,
            std::cmp::Ordering::Greater => TrendDirection::Worsening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Worsening => "worsening",
        }
    }
}

/// The four weighted components of a risk score, each 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub frequency: f64,
    pub severity: f64,
    pub pattern: f64,
    pub trend: f64,
}

/// Occurrences of one event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeCount {
    pub event_type: EventType,
    pub count: u32,
}

/// Risk assessment for a single driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRisk {
    pub driver_id: String,
    pub driver_name: String,
    pub score: u32,
    pub tier: RiskTier,
    pub annualized_cost: f64,
    pub components: RiskComponents,
    pub events_30d: u32,
    pub recent_14d: u32,
    pub previous_14d: u32,
    pub trend: TrendDirection,
    /// 30-day events by type, most frequent first.
    pub event_breakdown: Vec<EventTypeCount>,
}

/// Counts of drivers per tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

/// Fleet-wide rollup of driver risks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRiskSummary {
    pub driver_count: usize,
    pub average_score: f64,
    pub tier_counts: TierCounts,
    pub total_annualized_cost: f64,
    pub improving: usize,
    pub worsening: usize,
}

/// Event pattern breakdown used by investigations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPatternAnalysis {
    pub driver_id: String,
    pub events_30d: u32,
    pub by_type: Vec<EventTypeCount>,
    pub dominant_type: Option<EventType>,
    /// Share of 30-day events that are the dominant type (0.0-1.0).
    pub dominant_share: f64,
    /// Hour of day (UTC) with the most events; earliest hour on ties.
    pub peak_hour: Option<u32>,
    /// 30-day events per hour of day.
    pub hourly: Vec<u32>,
    pub recent_14d: u32,
    pub previous_14d: u32,
    pub trend: TrendDirection,
}

/// Score a single driver.
pub fn score_driver_risk(
    data: &dyn FleetData,
    driver_id: &str,
) -> Result<DriverRisk, ScoringError> {
    let driver = data
        .driver(driver_id)
        .ok_or_else(|| ScoringError::DriverNotFound(driver_id.to_string()))?;
    let events = data.events_for_driver(driver_id);
    Ok(risk_for(driver, &events, data.as_of()))
}

/// Score every driver, highest score first (ties by driver id).
pub fn score_fleet_risk(data: &dyn FleetData) -> Vec<DriverRisk> {
    let by_driver = group_by_driver(data.events());
    let as_of = data.as_of();

    let mut risks: Vec<DriverRisk> = data
        .drivers()
        .iter()
        .map(|driver| {
            let events = by_driver
                .get(driver.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            risk_for(driver, events, as_of)
        })
        .collect();

    risks.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });
    risks
}

/// Roll up a set of driver risks.
pub fn summarize_fleet_risk(risks: &[DriverRisk]) -> FleetRiskSummary {
    let mut tier_counts = TierCounts::default();
    for risk in risks {
        match risk.tier {
            RiskTier::Low => tier_counts.low += 1,
            RiskTier::Moderate => tier_counts.moderate += 1,
            RiskTier::High => tier_counts.high += 1,
            RiskTier::Critical => tier_counts.critical += 1,
        }
    }

    let average_score = if risks.is_empty() {
        0.0
    } else {
        round1(risks.iter().map(|r| r.score as f64).sum::<f64>() / risks.len() as f64)
    };

    FleetRiskSummary {
        driver_count: risks.len(),
        average_score,
        tier_counts,
        total_annualized_cost: risks.iter().map(|r| r.annualized_cost).sum(),
        improving: risks
            .iter()
            .filter(|r| r.trend == TrendDirection::Improving)
            .count(),
        worsening: risks
            .iter()
            .filter(|r| r.trend == TrendDirection::Worsening)
            .count(),
    }
}

/// Break down a driver's recent events by type and hour of day.
pub fn analyze_event_patterns(
    data: &dyn FleetData,
    driver_id: &str,
) -> Result<EventPatternAnalysis, ScoringError> {
    if data.driver(driver_id).is_none() {
        return Err(ScoringError::DriverNotFound(driver_id.to_string()));
    }
    let as_of = data.as_of();
    let all = data.events_for_driver(driver_id);
    let events = last_days(&all, as_of, DAYS_30);
    let (recent, previous) = recent_and_previous(&all, as_of);

    let by_type = breakdown(&events);
    let dominant = by_type.first();
    let dominant_share = match dominant {
        Some(top) if !events.is_empty() => top.count as f64 / events.len() as f64,
        _ => 0.0,
    };

    let mut hourly = vec![0u32; 24];
    for event in &events {
        hourly[event.occurred_at.hour() as usize] += 1;
    }
    let peak_hour = hourly
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .fold(None::<(usize, u32)>, |best, (hour, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((hour, *count)),
        })
        .map(|(hour, _)| hour as u32);

    Ok(EventPatternAnalysis {
        driver_id: driver_id.to_string(),
        events_30d: events.len() as u32,
        dominant_type: dominant.map(|d| d.event_type),
        dominant_share,
        by_type,
        peak_hour,
        hourly,
        recent_14d: recent,
        previous_14d: previous,
        trend: TrendDirection::from_counts(recent, previous),
    })
}

fn group_by_driver(events: &[SafetyEvent]) -> HashMap<&str, Vec<&SafetyEvent>> {
    let mut grouped: HashMap<&str, Vec<&SafetyEvent>> = HashMap::new();
    for event in events {
        grouped.entry(event.driver_id.as_str()).or_default().push(event);
    }
    grouped
}

/// Counts per type, most frequent first; ties keep the fixed type order.
fn breakdown(events: &[&SafetyEvent]) -> Vec<EventTypeCount> {
    let mut counts: BTreeMap<EventType, u32> = BTreeMap::new();
    for event in events {
        *counts.entry(event.event_type).or_default() += 1;
    }
    let mut by_type: Vec<EventTypeCount> = counts
        .into_iter()
        .map(|(event_type, count)| EventTypeCount { event_type, count })
        .collect();
    by_type.sort_by(|a, b| b.count.cmp(&a.count));
    by_type
}

fn risk_for(driver: &Driver, all_events: &[&SafetyEvent], as_of: DateTime<Utc>) -> DriverRisk {
    let events = last_days(all_events, as_of, DAYS_30);
    let n = events.len();
    let (recent, previous) = recent_and_previous(all_events, as_of);
    let by_type = breakdown(&events);

    let frequency = if driver.miles_30d <= 0.0 {
        (n as f64 * 10.0).min(100.0)
    } else {
        (n as f64 / driver.miles_30d * 1000.0 * 25.0).min(100.0)
    };

    let severity = if n == 0 {
        0.0
    } else {
        events.iter().map(|e| e.severity.weight()).sum::<f64>() / n as f64
    };

    let pattern = if n < PATTERN_MIN_EVENTS {
        0.0
    } else {
        let dominant_share = by_type.first().map(|t| t.count).unwrap_or(0) as f64 / n as f64;
        let repeated = by_type.iter().filter(|t| t.count >= REPEAT_THRESHOLD).count();
        (dominant_share * 60.0 + repeated as f64 * 15.0).min(100.0)
    };

    let trend = (50.0 + (recent as f64 - previous as f64) * 10.0).clamp(0.0, 100.0);

    let weighted = frequency * FREQUENCY_WEIGHT
        + severity * SEVERITY_WEIGHT
        + pattern * PATTERN_WEIGHT
        + trend * TREND_WEIGHT;
    let score = (weighted.round() as u32).min(100);
    let tier = RiskTier::from_score(score);

    DriverRisk {
        driver_id: driver.id.clone(),
        driver_name: driver.name.clone(),
        score,
        tier,
        annualized_cost: tier.annualized_cost(),
        components: RiskComponents {
            frequency: round1(frequency),
            severity: round1(severity),
            pattern: round1(pattern),
            trend: round1(trend),
        },
        events_30d: n as u32,
        recent_14d: recent,
        previous_14d: previous,
        trend: TrendDirection::from_counts(recent, previous),
        event_breakdown: by_type,
    }
}
