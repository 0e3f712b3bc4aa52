//! Per-run step context handed to pipelines.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::fleet::FleetData;
use crate::scoring::ScoringConfig;

use super::observer::MissionObserver;
use super::types::{
    FindingSeverity, MissionError, MissionFinding, MissionPhase, MissionProgress, MissionType,
};

/// Everything a pipeline may touch while its steps run.
///
/// The context owns the findings list for the run. Findings are delivered to
/// the observer the moment they are added, then kept in insertion order.
pub struct StepContext<'a> {
    mission_id: String,
    mission_type: MissionType,
    total_steps: u32,
    step: u32,
    first_step_announced: bool,
    findings: Vec<MissionFinding>,
    data: &'a dyn FleetData,
    scoring: &'a ScoringConfig,
    observer: &'a dyn MissionObserver,
    cancel: CancellationToken,
    step_delay: Duration,
}

impl<'a> StepContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        mission_id: &str,
        mission_type: MissionType,
        total_steps: u32,
        data: &'a dyn FleetData,
        scoring: &'a ScoringConfig,
        observer: &'a dyn MissionObserver,
        cancel: CancellationToken,
        step_delay: Duration,
    ) -> Self {
        Self {
            mission_id: mission_id.to_string(),
            mission_type,
            total_steps,
            step: 0,
            first_step_announced: false,
            findings: Vec::new(),
            data,
            scoring,
            observer,
            cancel,
            step_delay,
        }
    }

    /// The `starting` notice already announced step 1, so the pipeline's
    /// first [`step`](Self::step) only logs and paces.
    pub(crate) fn after_starting_notice(mut self) -> Self {
        self.step = 1;
        self.first_step_announced = true;
        self
    }

    pub fn data(&self) -> &'a dyn FleetData {
        self.data
    }

    pub fn scoring(&self) -> &'a ScoringConfig {
        self.scoring
    }

    pub fn mission_id(&self) -> &str {
        &self.mission_id
    }

    /// Last step number emitted.
    pub fn current_step(&self) -> u32 {
        self.step
    }

    pub fn findings(&self) -> &[MissionFinding] {
        &self.findings
    }

    /// Emit the progress notice for the next step, then pause.
    ///
    /// The final step number is reserved for summarization, so pipelines call
    /// this at most `total_steps - 1` times.
    pub async fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.first_step_announced {
            self.first_step_announced = false;
            debug!(mission_id = %self.mission_id, step = self.step, "{}", message);
        } else {
            self.step += 1;
            if self.step >= self.total_steps {
                warn!(
                    mission_id = %self.mission_id,
                    step = self.step,
                    total_steps = self.total_steps,
                    "Pipeline stepped into the summarize step"
                );
            }
            debug_assert!(
                self.step < self.total_steps,
                "step {} of {} is reserved for summarization",
                self.step,
                self.total_steps
            );
            let progress = MissionProgress {
                mission_id: self.mission_id.clone(),
                mission_type: self.mission_type,
                phase: MissionPhase::Running,
                step: self.step,
                total_steps: self.total_steps,
                message,
            };
            debug!(
                mission_id = %self.mission_id,
                step = progress.step,
                total_steps = progress.total_steps,
                "{}",
                progress.message
            );
            self.observer.on_progress(&progress);
        }

        if !self.step_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.step_delay) => {}
                _ = self.cancel.cancelled() => {}
            }
        }
    }

    /// Record a finding and deliver it to the observer.
    pub fn add_finding(
        &mut self,
        category: &str,
        severity: FindingSeverity,
        title: impl Into<String>,
        detail: impl Into<String>,
        data: serde_json::Value,
    ) {
        let finding = MissionFinding {
            mission_id: self.mission_id.clone(),
            category: category.to_string(),
            severity,
            title: title.into(),
            detail: detail.into(),
            data,
        };
        self.observer.on_finding(&finding);
        self.findings.push(finding);
    }

    /// Cooperative cancellation point.
    pub fn checkpoint(&self) -> Result<(), MissionError> {
        if self.cancel.is_cancelled() {
            Err(MissionError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn into_findings(self) -> Vec<MissionFinding> {
        self.findings
    }
}
