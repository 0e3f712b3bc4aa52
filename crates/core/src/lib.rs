pub mod config;
pub mod fleet;
pub mod metrics;
pub mod mission;
pub mod scoring;
pub mod summarizer;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatasetConfig,
    SanitizedConfig, ServerConfig,
};
pub use fleet::{
    Driver, EventSeverity, EventType, FleetData, FleetDataError, FleetSnapshot, InMemoryFleet,
    SafetyEvent, Vehicle, WorkPattern,
};
pub use mission::{
    FindingSeverity, MissionConfig, MissionEvent, MissionFinding, MissionHandle, MissionManager,
    MissionObserver, MissionOrchestrator, MissionParams, MissionProgress, MissionRecord,
    MissionRegistry, MissionResult, MissionSettings, MissionStatus, MissionType, RunState,
};
pub use scoring::{ScoringConfig, ScoringError};
pub use summarizer::{create_summarizer, Summarizer, SummarizerConfig, SummarizerError};
