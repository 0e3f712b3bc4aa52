//! Read-only fleet data provider trait.

use chrono::{DateTime, Utc};

use super::types::{Driver, SafetyEvent, Vehicle};

/// Read-only access to a fleet dataset snapshot.
///
/// Implementations must be safe to share across concurrently running missions.
/// Nothing in this crate ever writes through this trait.
pub trait FleetData: Send + Sync {
    /// Reference time of the snapshot.
    fn as_of(&self) -> DateTime<Utc>;

    /// All drivers, in dataset order.
    fn drivers(&self) -> &[Driver];

    /// All vehicles, in dataset order.
    fn vehicles(&self) -> &[Vehicle];

    /// All safety events, in dataset order.
    fn events(&self) -> &[SafetyEvent];

    /// Look up a driver by id.
    fn driver(&self, id: &str) -> Option<&Driver> {
        self.drivers().iter().find(|d| d.id == id)
    }

    /// Look up a vehicle by id.
    fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles().iter().find(|v| v.id == id)
    }

    /// First driver whose name contains `fragment`, ignoring case.
    fn find_driver_by_name(&self, fragment: &str) -> Option<&Driver> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.drivers()
            .iter()
            .find(|d| d.name.to_lowercase().contains(&needle))
    }

    /// All events recorded for a driver.
    fn events_for_driver(&self, driver_id: &str) -> Vec<&SafetyEvent> {
        self.events()
            .iter()
            .filter(|e| e.driver_id == driver_id)
            .collect()
    }
}
