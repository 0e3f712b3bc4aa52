//! In-memory fleet provider backed by a static snapshot.

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use super::provider::FleetData;
use super::types::{Driver, FleetSnapshot, SafetyEvent, Vehicle};

/// Errors that can occur while loading a fleet snapshot.
#[derive(Debug, Error)]
pub enum FleetDataError {
    #[error("dataset file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fleet provider holding a complete snapshot in memory.
#[derive(Debug, Clone)]
pub struct InMemoryFleet {
    snapshot: FleetSnapshot,
}

impl InMemoryFleet {
    pub fn new(snapshot: FleetSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, FleetDataError> {
        if !path.exists() {
            return Err(FleetDataError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let fleet = Self::from_json_str(&raw)?;
        info!(
            drivers = fleet.snapshot.drivers.len(),
            vehicles = fleet.snapshot.vehicles.len(),
            events = fleet.snapshot.events.len(),
            "Loaded fleet snapshot from {:?}",
            path
        );
        Ok(fleet)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, FleetDataError> {
        let snapshot: FleetSnapshot = serde_json::from_str(raw)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &FleetSnapshot {
        &self.snapshot
    }
}

impl FleetData for InMemoryFleet {
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
}
