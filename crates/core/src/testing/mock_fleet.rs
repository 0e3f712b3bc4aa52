//! Mock fleet data provider for testing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::fleet::{Driver, FleetData, FleetSnapshot, SafetyEvent, Vehicle};

/// Fleet provider whose per-driver lookups can be made to fail.
///
/// Collections are served unchanged, so fleet-wide engines still see every
/// driver; only [`FleetData::driver`] and [`FleetData::find_driver_by_name`]
/// hide the selected ids. This reproduces a driver that disappears between a
/// mission's planning and its deep dive.
#[derive(Debug, Clone)]
pub struct MockFleet {
    snapshot: FleetSnapshot,
    missing: HashSet<String>,
}

impl MockFleet {
    pub fn new(snapshot: FleetSnapshot) -> Self {
        Self {
            snapshot,
            missing: HashSet::new(),
        }
    }

    /// Make lookups for `driver_id` return nothing.
    pub fn fail_lookup(mut self, driver_id: impl Into<String>) -> Self {
        self.missing.insert(driver_id.into());
        self
    }
}

impl FleetData for MockFleet {
    fn as_of(&self) -> DateTime<Utc> {
        self.snapshot.as_of
    }

    fn drivers(&self) -> &[Driver] {
        &self.snapshot.drivers
    }

    fn vehicles(&self) -> &[Vehicle] {
        &self.snapshot.vehicles
    }

    fn events(&self) -> &[SafetyEvent] {
        &self.snapshot.events
    }

    fn driver(&self, id: &str) -> Option<&Driver> {
        if self.missing.contains(id) {
            return None;
        }
        self.snapshot.drivers.iter().find(|d| d.id == id)
    }

    fn find_driver_by_name(&self, fragment: &str) -> Option<&Driver> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.snapshot
            .drivers
            .iter()
            .filter(|d| !self.missing.contains(&d.id))
            .find(|d| d.name.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_fail_lookup() {
        let fleet = MockFleet::new(fixtures::sample_fleet(3)).fail_lookup("drv-002");

        assert_eq!(fleet.drivers().len(), 3);
        assert!(fleet.driver("drv-001").is_some());
        assert!(fleet.driver("drv-002").is_none());
        assert!(fleet.find_driver_by_name("jordan").is_none());
    }
}
