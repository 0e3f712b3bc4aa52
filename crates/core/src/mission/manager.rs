//! Background mission jobs for the lifetime of the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::observer::{BroadcastObserver, MissionEvent, MissionObserver};
use super::runner::MissionOrchestrator;
use super::types::{
    MissionConfig, MissionFinding, MissionProgress, MissionResult, MissionStatus, MissionType,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Returned by [`MissionManager::start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionHandle {
    pub mission_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl From<MissionStatus> for RunState {
    fn from(status: MissionStatus) -> Self {
        match status {
            MissionStatus::Complete => RunState::Complete,
            MissionStatus::Failed => RunState::Failed,
            MissionStatus::Cancelled => RunState::Cancelled,
        }
    }
}

/// What the manager knows about one run.
#[derive(Debug, Clone, Serialize)]
pub struct MissionRecord {
    pub mission_id: String,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub session_id: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    /// Last progress notice, while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<MissionProgress>,
    pub findings_so_far: usize,
    /// Terminal result, once finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MissionResult>,
}

impl MissionRecord {
    pub fn is_finished(&self) -> bool {
        self.state != RunState::Running
    }
}

struct Entry {
    seq: u64,
    record: MissionRecord,
    cancel: CancellationToken,
}

type Records = Arc<RwLock<HashMap<String, Entry>>>;

/// Keeps the record of one run current, then forwards to the event channel.
struct TrackingObserver {
    mission_id: String,
    records: Records,
    forward: BroadcastObserver,
}

impl TrackingObserver {
    fn update(&self, f: impl FnOnce(&mut MissionRecord)) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = records.get_mut(&self.mission_id) {
            f(&mut entry.record);
        }
    }
}

impl MissionObserver for TrackingObserver {
    fn on_progress(&self, progress: &MissionProgress) {
        self.update(|record| record.progress = Some(progress.clone()));
        self.forward.on_progress(progress);
    }

    fn on_finding(&self, finding: &MissionFinding) {
        self.update(|record| record.findings_so_far += 1);
        self.forward.on_finding(finding);
    }

    fn on_complete(&self, result: &MissionResult) {
        self.update(|record| {
            record.state = result.status.into();
            record.progress = None;
            record.findings_so_far = result.findings.len();
            record.result = Some(result.clone());
        });
        self.forward.on_complete(result);
    }
}

/// Starts missions as background tasks and tracks them.
///
/// Runs are independent: they share only the read-only dataset and the
/// record map, and each has its own cancellation token.
pub struct MissionManager {
    orchestrator: Arc<MissionOrchestrator>,
    records: Records,
    events: broadcast::Sender<MissionEvent>,
    next_seq: AtomicU64,
}

impl MissionManager {
    pub fn new(orchestrator: Arc<MissionOrchestrator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            orchestrator,
            records: Arc::new(RwLock::new(HashMap::new())),
            events,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn orchestrator(&self) -> &Arc<MissionOrchestrator> {
        &self.orchestrator
    }

    /// Spawn a run and return immediately.
    ///
    /// The record exists before the task starts, so the run can be looked up
    /// or cancelled at once.
    pub fn start(&self, config: MissionConfig) -> MissionHandle {
        let mission_id = uuid::Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        let handle = MissionHandle {
            mission_id: mission_id.clone(),
            session_id: config.session_id.clone(),
        };

        let record = MissionRecord {
            mission_id: mission_id.clone(),
            mission_type: config.mission_type,
            session_id: config.session_id.clone(),
            state: RunState::Running,
            started_at: Utc::now(),
            progress: None,
            findings_so_far: 0,
            result: None,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                mission_id.clone(),
                Entry {
                    seq,
                    record,
                    cancel: cancel.clone(),
                },
            );

        info!(
            mission_id = %mission_id,
            mission_type = %config.mission_type,
            "Mission queued"
        );

        let observer = TrackingObserver {
            mission_id: mission_id.clone(),
            records: self.records.clone(),
            forward: BroadcastObserver::new(self.events.clone()),
        };
        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .run_with_id(mission_id, config, &observer, cancel)
                .await;
        });

        handle
    }

    /// Request cancellation. Returns `false` for unknown or finished runs.
    pub fn cancel(&self, mission_id: &str) -> bool {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        match records.get(mission_id) {
            Some(entry) if !entry.record.is_finished() => {
                debug!(mission_id = %mission_id, "Cancelling mission");
                entry.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Cancel every running mission.
    pub fn cancel_all(&self) -> usize {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let running: Vec<&Entry> = records
            .values()
            .filter(|e| !e.record.is_finished())
            .collect();
        for entry in &running {
            entry.cancel.cancel();
        }
        running.len()
    }

    pub fn get(&self, mission_id: &str) -> Option<MissionRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(mission_id)
            .map(|e| e.record.clone())
    }

    /// All known runs, most recent first.
    pub fn list(&self) -> Vec<MissionRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<&Entry> = records.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    pub fn running_count(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| !e.record.is_finished())
            .count()
    }

    /// Events from every run, in the order each run emits them.
    pub fn subscribe(&self) -> broadcast::Receiver<MissionEvent> {
        self.events.subscribe()
    }

    /// Wait for a run's terminal result. `None` for unknown ids.
    pub async fn wait(&self, mission_id: &str) -> Option<MissionResult> {
        let mut rx = self.subscribe();
        if let Some(result) = self.get(mission_id)?.result {
            return Some(result);
        }
        loop {
            match rx.recv().await {
                Ok(MissionEvent::Complete(result)) if result.mission_id == mission_id => {
                    return Some(*result);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if let Some(result) = self.get(mission_id)?.result {
                        return Some(result);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return self.get(mission_id)?.result;
                }
            }
        }
    }
}
