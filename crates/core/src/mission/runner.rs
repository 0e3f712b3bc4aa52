//! Mission orchestrator implementation.
//!
//! Drives one run through its lifecycle:
//! - Planning: pipeline lookup and target resolution, before any progress
//! - Running: pipeline steps with cooperative cancellation checkpoints
//! - Summarizing: a single bounded summarizer call with a templated fallback

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fleet::FleetData;
use crate::metrics;
use crate::scoring::{round2, ScoringConfig};
use crate::summarizer::{Summarizer, SummarizerError, SummaryRequest};

use super::config::MissionSettings;
use super::context::StepContext;
use super::observer::MissionObserver;
use super::pipeline::PipelineOutput;
use super::registry::MissionRegistry;
use super::summary::{cancelled_summary, failed_summary, fallback_summary, timed_out_summary};
use super::types::{
    MissionConfig, MissionError, MissionFinding, MissionPhase, MissionProgress, MissionResult,
    MissionStatus,
};

/// How a run ended, before it is turned into a [`MissionResult`].
enum Outcome {
    Complete {
        findings: Vec<MissionFinding>,
        output: PipelineOutput,
        summary: String,
    },
    Failed {
        findings: Vec<MissionFinding>,
        error: String,
    },
    Cancelled {
        findings: Vec<MissionFinding>,
    },
}

/// Runs missions against a shared, read-only fleet dataset.
///
/// Any number of runs may execute concurrently on one orchestrator.
pub struct MissionOrchestrator {
    data: Arc<dyn FleetData>,
    registry: MissionRegistry,
    summarizer: Arc<dyn Summarizer>,
    settings: MissionSettings,
    scoring: ScoringConfig,
}

impl MissionOrchestrator {
    pub fn new(
        data: Arc<dyn FleetData>,
        registry: MissionRegistry,
        summarizer: Arc<dyn Summarizer>,
        settings: MissionSettings,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            data,
            registry,
            summarizer,
            settings,
            scoring,
        }
    }

    pub fn data(&self) -> &Arc<dyn FleetData> {
        &self.data
    }

    pub fn registry(&self) -> &MissionRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &MissionSettings {
        &self.settings
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Run a mission to completion under a freshly generated id.
    ///
    /// Never fails: every outcome, including a missing pipeline, cancellation
    /// and timeout, is reported as a terminal [`MissionResult`], which is also
    /// delivered to `observer.on_complete`.
    pub async fn run(
        &self,
        config: MissionConfig,
        observer: &dyn MissionObserver,
        cancel: CancellationToken,
    ) -> MissionResult {
        let mission_id = uuid::Uuid::new_v4().to_string();
        self.run_with_id(mission_id, config, observer, cancel).await
    }

    /// Like [`run`](Self::run), with a caller-chosen mission id.
    pub async fn run_with_id(
        &self,
        mission_id: String,
        config: MissionConfig,
        observer: &dyn MissionObserver,
        cancel: CancellationToken,
    ) -> MissionResult {
        let started = Instant::now();
        info!(
            mission_id = %mission_id,
            mission_type = %config.mission_type,
            session_id = %config.session_id,
            "Mission started"
        );

        // Caller cancellation and the run timeout share one token.
        let token = cancel.child_token();
        let timed_out = Arc::new(AtomicBool::new(false));
        let timer = spawn_timeout(token.clone(), timed_out.clone(), self.settings.timeout());

        let outcome = self.execute(&mission_id, &config, observer, &token).await;
        timer.abort();

        let result = self.finish(
            mission_id,
            &config,
            outcome,
            timed_out.load(Ordering::SeqCst),
            started.elapsed(),
        );
        record_metrics(&result);
        info!(
            mission_id = %result.mission_id,
            mission_type = %result.mission_type,
            status = result.status.as_str(),
            findings = result.findings.len(),
            duration_secs = result.duration_secs,
            "Mission finished"
        );

        observer.on_complete(&result);
        result
    }

    async fn execute(
        &self,
        mission_id: &str,
        config: &MissionConfig,
        observer: &dyn MissionObserver,
        token: &CancellationToken,
    ) -> Outcome {
        let mission_type = config.mission_type;

        let Some(pipeline) = self.registry.get(mission_type) else {
            let error = MissionError::UnknownType(mission_type.to_string());
            warn!(mission_id = %mission_id, error = %error, "Mission has no pipeline");
            return Outcome::Failed {
                findings: Vec::new(),
                error: error.to_string(),
            };
        };

        let plan = match pipeline.plan(self.data.as_ref(), &config.params, &self.settings) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(mission_id = %mission_id, error = %e, "Mission planning failed");
                return Outcome::Failed {
                    findings: Vec::new(),
                    error: e.to_string(),
                };
            }
        };
        debug!(
            mission_id = %mission_id,
            total_steps = plan.total_steps,
            targets = ?plan.targets,
            "Mission planned"
        );

        // The starting notice doubles as the pipeline's first step.
        observer.on_progress(&MissionProgress {
            mission_id: mission_id.to_string(),
            mission_type,
            phase: MissionPhase::Starting,
            step: 1,
            total_steps: plan.total_steps,
            message: format!("Starting {}", mission_type.display_name()),
        });
        pause(self.settings.start_delay(), token).await;

        if token.is_cancelled() {
            return Outcome::Cancelled {
                findings: Vec::new(),
            };
        }

        let mut ctx = StepContext::new(
            mission_id,
            mission_type,
            plan.total_steps,
            self.data.as_ref(),
            &self.scoring,
            observer,
            token.clone(),
            self.settings.step_delay(),
        )
        .after_starting_notice();
        let steps = AssertUnwindSafe(pipeline.run_steps(&plan, &mut ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(MissionError::Panicked(panic_message(panic.as_ref())))
            });
        let findings = ctx.into_findings();

        let output = match steps {
            Ok(output) => output,
            Err(MissionError::Cancelled) => return Outcome::Cancelled { findings },
            Err(e) => {
                warn!(mission_id = %mission_id, error = %e, "Mission step failed");
                return Outcome::Failed {
                    findings,
                    error: e.to_string(),
                };
            }
        };

        if token.is_cancelled() {
            return Outcome::Cancelled { findings };
        }

        observer.on_progress(&MissionProgress {
            mission_id: mission_id.to_string(),
            mission_type,
            phase: MissionPhase::Summarizing,
            step: plan.total_steps,
            total_steps: plan.total_steps,
            message: "Writing the summary".to_string(),
        });

        let request = SummaryRequest::from_findings(mission_type, &findings);
        let summary = tokio::select! {
            _ = token.cancelled() => return Outcome::Cancelled { findings },
            summarized = tokio::time::timeout(
                self.settings.summary_timeout(),
                self.summarizer.summarize(&request),
            ) => match summarized {
                Ok(Ok(text)) => text,
                Ok(Err(SummarizerError::NotConfigured)) => {
                    debug!(mission_id = %mission_id, "No summarizer, using templated summary");
                    metrics::SUMMARY_FALLBACKS
                        .with_label_values(&["not_configured"])
                        .inc();
                    fallback_summary(mission_type, &findings)
                }
                Ok(Err(e)) => {
                    warn!(
                        mission_id = %mission_id,
                        error = %e,
                        "Summarizer failed, using templated summary"
                    );
                    metrics::SUMMARY_FALLBACKS.with_label_values(&["error"]).inc();
                    fallback_summary(mission_type, &findings)
                }
                Err(_) => {
                    warn!(
                        mission_id = %mission_id,
                        timeout_secs = self.settings.summary_timeout_secs,
                        "Summarizer timed out, using templated summary"
                    );
                    metrics::SUMMARY_FALLBACKS.with_label_values(&["timeout"]).inc();
                    fallback_summary(mission_type, &findings)
                }
            },
        };

        Outcome::Complete {
            findings,
            output,
            summary,
        }
    }

    fn finish(
        &self,
        mission_id: String,
        config: &MissionConfig,
        outcome: Outcome,
        timed_out: bool,
        elapsed: Duration,
    ) -> MissionResult {
        let mission_type = config.mission_type;
        let (status, summary, findings, recommendations, data, error) = match outcome {
            Outcome::Complete {
                findings,
                output,
                summary,
            } => (
                MissionStatus::Complete,
                summary,
                findings,
                output.recommendations,
                output.data,
                None,
            ),
            Outcome::Failed { findings, error } => (
                MissionStatus::Failed,
                failed_summary(mission_type, &error),
                findings,
                Vec::new(),
                serde_json::Value::Null,
                Some(error),
            ),
            Outcome::Cancelled { findings } => {
                let summary = if timed_out {
                    timed_out_summary(self.settings.timeout_secs, findings.len())
                } else {
                    cancelled_summary(findings.len())
                };
                (
                    MissionStatus::Cancelled,
                    summary,
                    findings,
                    Vec::new(),
                    serde_json::Value::Null,
                    None,
                )
            }
        };

        MissionResult {
            mission_id,
            mission_type,
            session_id: config.session_id.clone(),
            status,
            display_name: mission_type.display_name().to_string(),
            summary,
            findings,
            recommendations,
            duration_secs: round2(elapsed.as_secs_f64()),
            data,
            completed_at: Utc::now(),
            error,
        }
    }
}

/// Cancel `token` once `timeout` elapses, flagging that the timer fired.
fn spawn_timeout(
    token: CancellationToken,
    timed_out: Arc<AtomicBool>,
    timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                timed_out.store(true, Ordering::SeqCst);
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

async fn pause(delay: Duration, token: &CancellationToken) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = token.cancelled() => {}
    }
}

fn record_metrics(result: &MissionResult) {
    let mission_type = result.mission_type.as_str();
    let status = result.status.as_str();
    metrics::MISSIONS_TOTAL
        .with_label_values(&[mission_type, status])
        .inc();
    metrics::MISSION_DURATION
        .with_label_values(&[mission_type, status])
        .observe(result.duration_secs);
    for finding in &result.findings {
        metrics::FINDINGS_TOTAL
            .with_label_values(&[mission_type, finding.severity.as_str()])
            .inc();
    }
}
