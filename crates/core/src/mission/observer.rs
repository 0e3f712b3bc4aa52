//! Callbacks through which a run reports progress, findings and its result.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{MissionFinding, MissionProgress, MissionResult};

/// Receives a run's notifications in order.
///
/// Calls happen on the task driving the run, so implementations must not block.
pub trait MissionObserver: Send + Sync {
    fn on_progress(&self, _progress: &MissionProgress) {}

    fn on_finding(&self, _finding: &MissionFinding) {}

    fn on_complete(&self, _result: &MissionResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MissionObserver for NoopObserver {}

/// A notification from any running mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MissionEvent {
    Progress(MissionProgress),
    Finding(MissionFinding),
    Complete(Box<MissionResult>),
}

impl MissionEvent {
    pub fn mission_id(&self) -> &str {
        match self {
            MissionEvent::Progress(p) => &p.mission_id,
            MissionEvent::Finding(f) => &f.mission_id,
            MissionEvent::Complete(r) => &r.mission_id,
        }
    }
}

/// Forwards notifications to a broadcast channel.
///
/// Sending with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<MissionEvent>,
}

impl BroadcastObserver {
    pub fn new(tx: broadcast::Sender<MissionEvent>) -> Self {
        Self { tx }
    }
}

impl MissionObserver for BroadcastObserver {
    fn on_progress(&self, progress: &MissionProgress) {
        let _ = self.tx.send(MissionEvent::Progress(progress.clone()));
    }

    fn on_finding(&self, finding: &MissionFinding) {
        let _ = self.tx.send(MissionEvent::Finding(finding.clone()));
    }

    fn on_complete(&self, result: &MissionResult) {
        let _ = self.tx.send(MissionEvent::Complete(Box::new(result.clone())));
    }
}
