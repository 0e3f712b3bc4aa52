//! Fleet dataset model and the read-only data provider.
//!
//! Scoring engines and missions never reach for a global dataset; they receive
//! a [`FleetData`] implementation explicitly. The production provider is
//! [`InMemoryFleet`], built from a static [`FleetSnapshot`].

mod memory;
mod provider;
mod sample;
mod types;

pub use memory::{FleetDataError, InMemoryFleet};
pub use provider::FleetData;
pub use sample::{sample_as_of, sample_fleet};
pub use types::{
    Driver, EventSeverity, EventType, FleetSnapshot, SafetyEvent, Vehicle, WorkPattern,
};
