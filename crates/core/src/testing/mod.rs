//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the engine's collaborators, allowing mission
//! runs to be tested end to end without an LLM or a real dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use fleetsafe_core::testing::{fixtures, MockSummarizer, RecordingObserver};
//!
//! let fleet = InMemoryFleet::new(fixtures::sample_fleet(30));
//! let summarizer = Arc::new(MockSummarizer::new("Two drivers need coaching."));
//! let observer = RecordingObserver::new();
//!
//! // Run a mission with these, then inspect what was observed
//! let steps: Vec<u32> = observer.progress().iter().map(|p| p.step).collect();
//! ```

mod mock_fleet;
mod mock_summarizer;
mod panicking_pipeline;
mod recording_observer;

pub use mock_fleet::MockFleet;
pub use mock_summarizer::MockSummarizer;
pub use panicking_pipeline::PanickingPipeline;
pub use recording_observer::RecordingObserver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::fleet::{
        self, Driver, EventSeverity, EventType, FleetSnapshot, SafetyEvent, Vehicle, WorkPattern,
    };

    /// Reference time shared by every fixture.
    pub fn as_of() -> DateTime<Utc> {
        fleet::sample_as_of()
    }

    /// A rested work pattern that trips no wellness or pre-shift signal.
    pub fn healthy_work() -> WorkPattern {
        WorkPattern {
            hours_last_7d: 40.0,
            consecutive_days_worked: 4,
            night_shifts_14d: 0,
            avg_rest_hours: 11.0,
            days_since_time_off: 5,
        }
    }

    /// Create a test driver with reasonable defaults.
    pub fn driver(id: &str, name: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: name.to_string(),
            vehicle_id: None,
            years_experience: 6.0,
            miles_30d: 4_000.0,
            work: healthy_work(),
        }
    }

    /// Create a test vehicle that is not due for service.
    pub fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            unit_number: format!("Unit {}", id),
            make: "Freightliner".to_string(),
            model: "Cascadia".to_string(),
            year: 2021,
            odometer_miles: 180_000.0,
            days_since_service: 30,
            service_interval_days: 90,
        }
    }

    /// Create a test safety event on vehicle `v1`.
    pub fn event(
        id: &str,
        driver_id: &str,
        event_type: EventType,
        severity: EventSeverity,
        occurred_at: DateTime<Utc>,
    ) -> SafetyEvent {
        SafetyEvent {
            id: id.to_string(),
            driver_id: driver_id.to_string(),
            vehicle_id: "v1".to_string(),
            event_type,
            severity,
            occurred_at,
            speed_mph: None,
        }
    }

    /// Deterministic fleet of `drivers` drivers with a mix of risk profiles.
    pub fn sample_fleet(drivers: usize) -> FleetSnapshot {
        fleet::sample_fleet(drivers)
    }
}
