//! Observer that records everything a run reports.

use std::sync::{PoisonError, RwLock};

use crate::mission::{MissionFinding, MissionObserver, MissionProgress, MissionResult};

#[derive(Debug, Default)]
struct Recorded {
    progress: Vec<MissionProgress>,
    findings: Vec<MissionFinding>,
    result: Option<MissionResult>,
    completions: usize,
}

/// Collects progress notices, findings and the terminal result, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    recorded: RwLock<Recorded>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Vec<MissionProgress> {
        self.read(|r| r.progress.clone())
    }

    pub fn findings(&self) -> Vec<MissionFinding> {
        self.read(|r| r.findings.clone())
    }

    /// The terminal result, if the run has finished.
    pub fn result(&self) -> Option<MissionResult> {
        self.read(|r| r.result.clone())
    }

    /// How many times `on_complete` fired. Always 1 after a run.
    pub fn completions(&self) -> usize {
        self.read(|r| r.completions)
    }

    fn read<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self, f: impl FnOnce(&mut Recorded)) {
        f(&mut self.recorded.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl MissionObserver for RecordingObserver {
    fn on_progress(&self, progress: &MissionProgress) {
        self.write(|r| r.progress.push(progress.clone()));
    }

    fn on_finding(&self, finding: &MissionFinding) {
        self.write(|r| r.findings.push(finding.clone()));
    }

    fn on_complete(&self, result: &MissionResult) {
        self.write(|r| {
            r.result = Some(result.clone());
            r.completions += 1;
        });
    }
}
