//! Built-in sample fleet.
//!
//! Used when no dataset file is configured and by tests. Generation is fully
//! deterministic: the same driver count always yields the same snapshot.

use chrono::{DateTime, Duration, Utc};

use super::types::{
    Driver, EventSeverity, EventType, FleetSnapshot, SafetyEvent, Vehicle, WorkPattern,
};

/// 2025-03-14T18:00:00Z
const SAMPLE_AS_OF_SECS: i64 = 1_741_975_200;

const FIRST_NAMES: [&str; 12] = [
    "Alex", "Jordan", "Sam", "Priya", "Marcus", "Elena", "Tomas", "Aisha", "Dmitri", "Grace",
    "Luis", "Noor",
];
const LAST_NAMES: [&str; 10] = [
    "Rivera", "Lee", "Okafor", "Patel", "Johnson", "Kowalski", "Nguyen", "Haddad", "Brennan",
    "Silva",
];
const MODELS: [(&str, &str); 4] = [
    ("Freightliner", "Cascadia"),
    ("Ford", "Transit"),
    ("Volvo", "VNL"),
    ("Ram", "ProMaster"),
];

/// Reference time of the sample snapshot.
pub fn sample_as_of() -> DateTime<Utc> {
    DateTime::from_timestamp(SAMPLE_AS_OF_SECS, 0).unwrap_or_default()
}

/// Work pattern archetypes, from rested to exhausted.
fn work_pattern(index: usize) -> WorkPattern {
    match index % 5 {
        0 => WorkPattern {
            hours_last_7d: 40.0,
            consecutive_days_worked: 4,
            night_shifts_14d: 0,
            avg_rest_hours: 11.0,
            days_since_time_off: 5,
        },
        1 => WorkPattern {
            hours_last_7d: 52.0,
            consecutive_days_worked: 6,
            night_shifts_14d: 3,
            avg_rest_hours: 9.5,
            days_since_time_off: 12,
        },
        2 => WorkPattern {
            hours_last_7d: 62.0,
            consecutive_days_worked: 8,
            night_shifts_14d: 5,
            avg_rest_hours: 8.5,
            days_since_time_off: 20,
        },
        3 => WorkPattern {
            hours_last_7d: 68.0,
            consecutive_days_worked: 11,
            night_shifts_14d: 9,
            avg_rest_hours: 7.0,
            days_since_time_off: 30,
        },
        _ => WorkPattern {
            hours_last_7d: 46.0,
            consecutive_days_worked: 5,
            night_shifts_14d: 2,
            avg_rest_hours: 10.5,
            days_since_time_off: 8,
        },
    }
}

fn severity(index: usize) -> EventSeverity {
    match index % 7 {
        0 | 1 | 2 => EventSeverity::Low,
        3 | 4 => EventSeverity::Medium,
        5 => EventSeverity::High,
        _ => EventSeverity::Critical,
    }
}

/// Generate a fleet of `drivers` drivers, each with an assigned vehicle.
pub fn sample_fleet(drivers: usize) -> FleetSnapshot {
    let as_of = sample_as_of();
    let mut snapshot = FleetSnapshot {
        as_of,
        drivers: Vec::with_capacity(drivers),
        vehicles: Vec::with_capacity(drivers),
        events: Vec::new(),
    };

    for i in 0..drivers {
        let driver_id = format!("drv-{:03}", i + 1);
        let vehicle_id = format!("veh-{:03}", i + 1);
        let (make, model) = MODELS[i % MODELS.len()];

        snapshot.vehicles.push(Vehicle {
            id: vehicle_id.clone(),
            unit_number: format!("Unit {}", 100 + i),
            make: make.to_string(),
            model: model.to_string(),
            year: 2016 + (i % 8) as u16,
            odometer_miles: 40_000.0 + (i * 13_337 % 250_000) as f64,
            days_since_service: (i * 17 % 120) as u32,
            service_interval_days: 90,
        });

        snapshot.drivers.push(Driver {
            id: driver_id.clone(),
            name: format!(
                "{} {}",
                FIRST_NAMES[i % FIRST_NAMES.len()],
                LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()]
            ),
            vehicle_id: Some(vehicle_id.clone()),
            years_experience: 1.0 + (i * 7 % 20) as f64 / 2.0,
            miles_30d: 2_500.0 + (i * 373 % 2_500) as f64,
            work: work_pattern(i),
        });

        // Event volume and recency vary per driver so trends go both ways.
        let count = i * 7 % 11;
        let worsening = i % 3 == 0;
        let habit = EventType::ALL[i % EventType::ALL.len()];
        for k in 0..count {
            let days_ago = if worsening {
                (k * 3 + i) % 14
            } else {
                (k * 5 + i) % 28
            };
            let hour = (i * 3 + k * 5) % 24;
            let event_type = if k % 2 == 0 {
                habit
            } else {
                EventType::ALL[(i + k * 3) % EventType::ALL.len()]
            };
            let occurred_at = as_of - Duration::days(days_ago as i64) - Duration::hours(hour as i64)
                - Duration::minutes(((i + k) * 11 % 60) as i64);

            snapshot.events.push(SafetyEvent {
                id: format!("evt-{:03}-{:02}", i + 1, k + 1),
                driver_id: driver_id.clone(),
                vehicle_id: vehicle_id.clone(),
                event_type,
                severity: severity(i + k * 2),
                occurred_at,
                speed_mph: (event_type == EventType::Speeding)
                    .then(|| 62.0 + ((i + k) % 15) as f64),
            });
        }
    }

    snapshot
}
