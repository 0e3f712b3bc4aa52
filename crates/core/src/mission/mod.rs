//! Mission engine: multi-step background analyses over the fleet.
//!
//! A mission runs a fixed sequence of scoring steps for one [`MissionType`],
//! streams progress and findings to a [`MissionObserver`] as they happen, and
//! ends in exactly one [`MissionResult`]:
//! - **Planning**: targets and step count resolved before any progress
//! - **Running**: one progress notice per step, cooperative cancellation
//! - **Summarizing**: one narrative call, templated fallback on any failure

mod config;
mod context;
mod manager;
mod observer;
mod pipeline;
pub mod pipelines;
mod registry;
mod runner;
mod summary;
mod types;

pub use config::MissionSettings;
pub use context::StepContext;
pub use manager::{MissionHandle, MissionManager, MissionRecord, RunState};
pub use observer::{BroadcastObserver, MissionEvent, MissionObserver, NoopObserver};
pub use pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
pub use registry::MissionRegistry;
pub use runner::MissionOrchestrator;
pub use summary::fallback_summary;
pub use types::{
    category, FindingSeverity, MissionConfig, MissionError, MissionFinding, MissionParams,
    MissionPhase, MissionProgress, MissionResult, MissionStatus, MissionType, MissionTypeInfo,
};
