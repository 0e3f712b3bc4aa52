//! Alert triage over the last seven days of events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fleet::{EventSeverity, EventType, FleetData, SafetyEvent};

use super::round1;
use super::window::{last_days, DAYS_30, DAYS_7};

const MAX_URGENCY: u32 = 100;
const CLUSTER_BONUS_PER_ALERT: u32 = 5;
const CLUSTER_BONUS_CAP: u32 = 10;
const BRIEFING_TOP_ALERTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertPriority {
    pub fn from_urgency(urgency: u32) -> Self {
        match urgency {
            80.. => AlertPriority::Critical,
            60..=79 => AlertPriority::High,
            35..=59 => AlertPriority::Medium,
            _ => AlertPriority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::Low => "low",
            AlertPriority::Medium => "medium",
            AlertPriority::High => "high",
            AlertPriority::Critical => "critical",
        }
    }
}

fn base_urgency(severity: EventSeverity) -> u32 {
    match severity {
        EventSeverity::Low => 10,
        EventSeverity::Medium => 30,
        EventSeverity::High => 55,
        EventSeverity::Critical => 80,
    }
}

/// An event scored for follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriagedAlert {
    pub event_id: String,
    pub driver_id: String,
    pub driver_name: String,
    pub vehicle_id: String,
    pub event_type: EventType,
    pub severity: EventSeverity,
    pub occurred_at: DateTime<Utc>,
    pub hours_ago: f64,
    pub urgency: u32,
    pub priority: AlertPriority,
    /// Bonuses applied on top of the severity base.
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionDriver {
    pub driver_id: String,
    pub driver_name: String,
    pub highest_priority: AlertPriority,
}

/// Morning briefing built from the triaged alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertBriefing {
    pub as_of: DateTime<Utc>,
    pub total_alerts: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub top_alerts: Vec<TriagedAlert>,
    /// Drivers with critical or high alerts, in alert order.
    pub drivers_needing_attention: Vec<AttentionDriver>,
    pub headline: String,
}

/// Score and order every alert from the last seven days.
pub fn triage_alerts(data: &dyn FleetData) -> Vec<TriagedAlert> {
    let as_of = data.as_of();
    let all: Vec<&SafetyEvent> = data.events().iter().collect();
    let alerts = last_days(&all, as_of, DAYS_7);

    let mut monthly: HashMap<&str, u32> = HashMap::new();
    for event in last_days(&all, as_of, DAYS_30) {
        *monthly.entry(event.driver_id.as_str()).or_default() += 1;
    }
    let mut clusters: HashMap<(&str, EventType), u32> = HashMap::new();
    for event in &alerts {
        *clusters
            .entry((event.driver_id.as_str(), event.event_type))
            .or_default() += 1;
    }

    let mut triaged: Vec<TriagedAlert> = alerts
        .iter()
        .map(|event| {
            let mut reasons = Vec::new();
            let mut urgency = base_urgency(event.severity);

            let month_count = monthly.get(event.driver_id.as_str()).copied().unwrap_or(0);
            if month_count >= 6 {
                urgency += 15;
                reasons.push(format!("repeat offender ({} events in 30 days)", month_count));
            } else if month_count >= 3 {
                urgency += 10;
                reasons.push(format!("repeat offender ({} events in 30 days)", month_count));
            }

            let hours_ago = (as_of - event.occurred_at).num_minutes() as f64 / 60.0;
            if hours_ago < 24.0 {
                urgency += 10;
                reasons.push("occurred in the last 24 hours".to_string());
            } else if hours_ago < 72.0 {
                urgency += 5;
                reasons.push("occurred in the last 3 days".to_string());
            }

            let others = clusters
                .get(&(event.driver_id.as_str(), event.event_type))
                .copied()
                .unwrap_or(1)
                .saturating_sub(1);
            if others > 0 {
                urgency += (others * CLUSTER_BONUS_PER_ALERT).min(CLUSTER_BONUS_CAP);
                reasons.push(format!(
                    "{} other {} alerts this week",
                    others,
                    event.event_type.label().to_lowercase()
                ));
            }

            let urgency = urgency.min(MAX_URGENCY);
            TriagedAlert {
                event_id: event.id.clone(),
                driver_id: event.driver_id.clone(),
                driver_name: data
                    .driver(&event.driver_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| event.driver_id.clone()),
                vehicle_id: event.vehicle_id.clone(),
                event_type: event.event_type,
                severity: event.severity,
                occurred_at: event.occurred_at,
                hours_ago: round1(hours_ago),
                urgency,
                priority: AlertPriority::from_urgency(urgency),
                reasons,
            }
        })
        .collect();

    triaged.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then_with(|| b.occurred_at.cmp(&a.occurred_at))
            .then_with(|| a.event_id.cmp(&b.event_id))
    });
    triaged
}

/// Build the daily briefing.
pub fn daily_briefing(data: &dyn FleetData) -> AlertBriefing {
    let alerts = triage_alerts(data);
    let count = |priority: AlertPriority| alerts.iter().filter(|a| a.priority == priority).count();
    let (critical, high, medium, low) = (
        count(AlertPriority::Critical),
        count(AlertPriority::High),
        count(AlertPriority::Medium),
        count(AlertPriority::Low),
    );

    let mut drivers_needing_attention: Vec<AttentionDriver> = Vec::new();
    for alert in alerts.iter().filter(|a| a.priority >= AlertPriority::High) {
        if !drivers_needing_attention
            .iter()
            .any(|d| d.driver_id == alert.driver_id)
        {
            drivers_needing_attention.push(AttentionDriver {
                driver_id: alert.driver_id.clone(),
                driver_name: alert.driver_name.clone(),
                highest_priority: alert.priority,
            });
        }
    }

    let headline = if alerts.is_empty() {
        "No safety alerts in the last 7 days.".to_string()
    } else {
        format!(
            "{} alerts in the last 7 days: {} critical, {} high priority. {} drivers need attention today.",
            alerts.len(),
            critical,
            high,
            drivers_needing_attention.len()
        )
    };

    AlertBriefing {
        as_of: data.as_of(),
        total_alerts: alerts.len(),
        critical,
        high,
        medium,
        low,
        top_alerts: alerts.iter().take(BRIEFING_TOP_ALERTS).cloned().collect(),
        drivers_needing_attention,
        headline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetSnapshot, InMemoryFleet};
    use crate::testing::fixtures;
    use chrono::Duration;

    fn fleet(events: Vec<SafetyEvent>) -> InMemoryFleet {
        InMemoryFleet::new(FleetSnapshot {
            as_of: fixtures::as_of(),
            drivers: vec![
                fixtures::driver("d1", "Alex Rivera"),
                fixtures::driver("d2", "Jordan Lee"),
            ],
            vehicles: vec![fixtures::vehicle("v1")],
            events,
        })
    }

    #[test]
    fn test_priority_bands() {
        assert_eq!(AlertPriority::from_urgency(100), AlertPriority::Critical);
        assert_eq!(AlertPriority::from_urgency(80), AlertPriority::Critical);
        assert_eq!(AlertPriority::from_urgency(79), AlertPriority::High);
        assert_eq!(AlertPriority::from_urgency(60), AlertPriority::High);
        assert_eq!(AlertPriority::from_urgency(35), AlertPriority::Medium);
        assert_eq!(AlertPriority::from_urgency(34), AlertPriority::Low);
    }

    #[test]
    fn test_urgency_bonuses() {
        let as_of = fixtures::as_of();
        let events = vec![
            // three tailgating events this week for d1
            fixtures::event(
                "e1",
                "d1",
                EventType::Tailgating,
                EventSeverity::High,
                as_of - Duration::hours(2),
            ),
            fixtures::event(
                "e2",
                "d1",
                EventType::Tailgating,
                EventSeverity::Medium,
                as_of - Duration::hours(50),
            ),
            fixtures::event(
                "e3",
                "d1",
                EventType::Tailgating,
                EventSeverity::Low,
                as_of - Duration::days(5),
            ),
            // old event outside the alert window
            fixtures::event(
                "e4",
                "d2",
                EventType::Speeding,
                EventSeverity::Critical,
                as_of - Duration::days(9),
            ),
            fixtures::event(
                "e5",
                "d2",
                EventType::Speeding,
                EventSeverity::Low,
                as_of - Duration::hours(100),
            ),
        ];
        let alerts = triage_alerts(&fleet(events));

        assert_eq!(alerts.len(), 4);
        // 55 base + 10 repeat + 10 recency + 10 cluster
        assert_eq!(alerts[0].event_id, "e1");
        assert_eq!(alerts[0].urgency, 85);
        assert_eq!(alerts[0].priority, AlertPriority::Critical);
        // 30 + 10 + 5 + 10
        assert_eq!(alerts[1].event_id, "e2");
        assert_eq!(alerts[1].urgency, 55);
        // 10 + 10 + 0 + 10
        assert_eq!(alerts[2].event_id, "e3");
        assert_eq!(alerts[2].urgency, 30);
        // 10, no bonuses
        assert_eq!(alerts[3].event_id, "e5");
        assert_eq!(alerts[3].urgency, 10);
        assert!(alerts[3].reasons.is_empty());
    }

    #[test]
    fn test_urgency_capped() {
        let as_of = fixtures::as_of();
        let events: Vec<SafetyEvent> = (0..7)
            .map(|i| {
                fixtures::event(
                    &format!("e{}", i),
                    "d1",
                    EventType::Collision,
                    EventSeverity::Critical,
                    as_of - Duration::hours(i + 1),
                )
            })
            .collect();
        let alerts = triage_alerts(&fleet(events));
        assert!(alerts.iter().all(|a| a.urgency == 100));
        // equal urgency: most recent first
        assert_eq!(alerts[0].event_id, "e0");
    }

    #[test]
    fn test_daily_briefing() {
        let as_of = fixtures::as_of();
        let events = vec![
            fixtures::event(
                "e1",
                "d2",
                EventType::Collision,
                EventSeverity::Critical,
                as_of - Duration::hours(3),
            ),
            fixtures::event(
                "e2",
                "d1",
                EventType::PhoneUse,
                EventSeverity::High,
                as_of - Duration::hours(5),
            ),
            fixtures::event(
                "e3",
                "d1",
                EventType::Seatbelt,
                EventSeverity::Low,
                as_of - Duration::days(4),
            ),
        ];
        let briefing = daily_briefing(&fleet(events));

        assert_eq!(briefing.total_alerts, 3);
        assert_eq!(briefing.critical, 1);
        assert_eq!(briefing.high, 1);
        assert_eq!(briefing.low, 1);
        let ids: Vec<&str> = briefing
            .drivers_needing_attention
            .iter()
            .map(|d| d.driver_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d2", "d1"]);
        assert!(briefing.headline.starts_with("3 alerts"));
    }

    #[test]
    fn test_empty_briefing() {
        let briefing = daily_briefing(&fleet(vec![]));
        assert_eq!(briefing.total_alerts, 0);
        assert!(briefing.top_alerts.is_empty());
        assert_eq!(briefing.headline, "No safety alerts in the last 7 days.");
    }
}
