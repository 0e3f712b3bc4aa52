use async_trait::async_trait;

use crate::fleet::FleetData;
use crate::mission::{
    FindingSeverity, MissionError, MissionParams, MissionPipeline, MissionSettings, MissionType,
    PipelineOutput, PipelinePlan, StepContext,
};

/// Pipeline that records one finding, then panics on its second step.
pub struct PanickingPipeline {
    mission_type: MissionType,
    message: &'static str,
}

impl PanickingPipeline {
    pub fn new(mission_type: MissionType, message: &'static str) -> Self {
        Self {
            mission_type,
            message,
        }
    }
}

#[async_trait]
impl MissionPipeline for PanickingPipeline {
    fn mission_type(&self) -> MissionType {
        self.mission_type
    }

    fn plan(
        &self,
        _data: &dyn FleetData,
        _params: &MissionParams,
        _settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError> {
        Ok(PipelinePlan::fixed(3))
    }

    async fn run_steps(
        &self,
        _plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError> {
        ctx.step("Scanning").await;
        ctx.add_finding(
            "scan",
            FindingSeverity::Warning,
            "Recorded before the crash",
            "",
            serde_json::Value::Null,
        );
        ctx.step("Crashing").await;
        panic!("{}", self.message);
    }
}
