//! Fleet dataset types: drivers, vehicles and safety events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recent work pattern of a driver, as reported by the scheduling system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkPattern {
    /// Hours driven in the last 7 days.
    pub hours_last_7d: f64,
    /// Consecutive days worked without a day off.
    pub consecutive_days_worked: u32,
    /// Night shifts worked in the last 14 days.
    pub night_shifts_14d: u32,
    /// Average rest between shifts, in hours.
    pub avg_rest_hours: f64,
    /// Days since the last full day off.
    pub days_since_time_off: u32,
}

/// A driver in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    /// Vehicle currently assigned to the driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub years_experience: f64,
    /// Miles driven in the last 30 days.
    pub miles_30d: f64,
    #[serde(default)]
    pub work: WorkPattern,
}

/// A vehicle in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub unit_number: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub odometer_miles: f64,
    pub days_since_service: u32,
    pub service_interval_days: u32,
}

impl Vehicle {
    /// Days past the service interval (0 when on schedule).
    pub fn overdue_days(&self) -> u32 {
        self.days_since_service
            .saturating_sub(self.service_interval_days)
    }
}

/// Kind of safety event recorded by the telematics unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    HardBraking,
    HarshAcceleration,
    HarshCornering,
    Speeding,
    DistractedDriving,
    PhoneUse,
    Seatbelt,
    Tailgating,
    RollingStop,
    Collision,
}

impl EventType {
    pub const ALL: [EventType; 10] = [
        EventType::HardBraking,
        EventType::HarshAcceleration,
        EventType::HarshCornering,
        EventType::Speeding,
        EventType::DistractedDriving,
        EventType::PhoneUse,
        EventType::Seatbelt,
        EventType::Tailgating,
        EventType::RollingStop,
        EventType::Collision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::HardBraking => "hard_braking",
            EventType::HarshAcceleration => "harsh_acceleration",
            EventType::HarshCornering => "harsh_cornering",
            EventType::Speeding => "speeding",
            EventType::DistractedDriving => "distracted_driving",
            EventType::PhoneUse => "phone_use",
            EventType::Seatbelt => "seatbelt",
            EventType::Tailgating => "tailgating",
            EventType::RollingStop => "rolling_stop",
            EventType::Collision => "collision",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::HardBraking => "hard braking",
            EventType::HarshAcceleration => "harsh acceleration",
            EventType::HarshCornering => "harsh cornering",
            EventType::Speeding => "speeding",
            EventType::DistractedDriving => "distracted driving",
            EventType::PhoneUse => "phone use",
            EventType::Seatbelt => "seatbelt violation",
            EventType::Tailgating => "tailgating",
            EventType::RollingStop => "rolling stop",
            EventType::Collision => "collision",
        }
    }

    /// Events that count against regulatory compliance.
    pub fn is_compliance(&self) -> bool {
        matches!(
            self,
            EventType::Speeding | EventType::PhoneUse | EventType::Seatbelt | EventType::RollingStop
        )
    }

    /// Events that waste fuel (aggressive driving).
    pub fn is_harsh(&self) -> bool {
        matches!(
            self,
            EventType::HardBraking
                | EventType::HarshAcceleration
                | EventType::HarshCornering
                | EventType::Speeding
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity assigned to a safety event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EventSeverity {
    /// Weight (0-100) used by the driver risk severity component.
    pub fn weight(&self) -> f64 {
        match self {
            EventSeverity::Low => 10.0,
            EventSeverity::Medium => 35.0,
            EventSeverity::High => 70.0,
            EventSeverity::Critical => 100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Low => "low",
            EventSeverity::Medium => "medium",
            EventSeverity::High => "high",
            EventSeverity::Critical => "critical",
        }
    }
}

/// A single safety event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyEvent {
    pub id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub event_type: EventType,
    pub severity: EventSeverity,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mph: Option<f64>,
}

/// A complete, static dataset snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Reference time of the snapshot. All scoring windows are measured from here.
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub events: Vec<SafetyEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::HardBraking).unwrap();
        assert_eq!(json, "\"hard_braking\"");

        let parsed: EventType = serde_json::from_str("\"phone_use\"").unwrap();
        assert_eq!(parsed, EventType::PhoneUse);
        assert_eq!(parsed.as_str(), "phone_use");
    }

    #[test]
    fn test_severity_weights_increase() {
        let weights: Vec<f64> = [
            EventSeverity::Low,
            EventSeverity::Medium,
            EventSeverity::High,
            EventSeverity::Critical,
        ]
        .iter()
        .map(|s| s.weight())
        .collect();
        assert!(weights.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_vehicle_overdue_days() {
        let mut vehicle = Vehicle {
            id: "v1".to_string(),
            unit_number: "T-101".to_string(),
            make: "Freightliner".to_string(),
            model: "Cascadia".to_string(),
            year: 2021,
            odometer_miles: 120_000.0,
            days_since_service: 80,
            service_interval_days: 90,
        };
        assert_eq!(vehicle.overdue_days(), 0);

        vehicle.days_since_service = 100;
        assert_eq!(vehicle.overdue_days(), 10);
    }

    #[test]
    fn test_snapshot_defaults_missing_collections() {
        let snapshot: FleetSnapshot =
            serde_json::from_str(r#"{"as_of":"2025-03-01T12:00:00Z"}"#).unwrap();
        assert!(snapshot.drivers.is_empty());
        assert!(snapshot.vehicles.is_empty());
        assert!(snapshot.events.is_empty());
    }
}
