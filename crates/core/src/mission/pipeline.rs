//! The trait each mission kind implements.

use async_trait::async_trait;

use crate::fleet::FleetData;

use super::config::MissionSettings;
use super::context::StepContext;
use super::types::{MissionError, MissionParams, MissionType};

/// Decisions fixed before the first step runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    /// Total step count, including the final summarize step.
    pub total_steps: u32,
    /// Driver ids the pipeline will work through, in order.
    pub targets: Vec<String>,
}

impl PipelinePlan {
    pub fn fixed(total_steps: u32) -> Self {
        Self {
            total_steps,
            targets: Vec::new(),
        }
    }
}

/// What a pipeline hands back besides its findings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub recommendations: Vec<String>,
    /// Mission-type-specific rollup.
    pub data: serde_json::Value,
}

/// A fixed sequence of steps over the fleet data.
#[async_trait]
pub trait MissionPipeline: Send + Sync {
    fn mission_type(&self) -> MissionType;

    /// Resolve targets and the step count.
    ///
    /// Runs before any progress is emitted; an error here fails the mission
    /// with no findings.
    fn plan(
        &self,
        data: &dyn FleetData,
        params: &MissionParams,
        settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError>;

    /// Execute every step except summarization.
    ///
    /// Each step emits exactly one progress notice through
    /// [`StepContext::step`], and loops call [`StepContext::checkpoint`]
    /// between items.
    async fn run_steps(
        &self,
        plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError>;
}
