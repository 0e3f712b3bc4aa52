//! Templated summaries used when no narrative is available.

use super::types::{FindingSeverity, MissionFinding, MissionType};

/// Summary built from finding counts alone.
pub fn fallback_summary(mission_type: MissionType, findings: &[MissionFinding]) -> String {
    let critical = count(findings, FindingSeverity::Critical);
    let warning = count(findings, FindingSeverity::Warning);
    let name = mission_type.display_name();

    match (critical, warning) {
        (0, 0) => format!(
            "{} complete with {} findings. No critical or warning issues were found.",
            name,
            findings.len()
        ),
        _ => format!(
            "{} complete with {} findings: {} critical and {} warning. Review the critical findings first.",
            name,
            findings.len(),
            critical,
            warning
        ),
    }
}

pub(crate) fn timed_out_summary(timeout_secs: u64, findings: usize) -> String {
    format!(
        "Mission timed out after {}s. {} findings were collected before the run was interrupted.",
        timeout_secs, findings
    )
}

pub(crate) fn cancelled_summary(findings: usize) -> String {
    format!(
        "Mission cancelled by request. {} findings were collected before the run was interrupted.",
        findings
    )
}

pub(crate) fn failed_summary(mission_type: MissionType, error: &str) -> String {
    format!("{} failed: {}", mission_type.display_name(), error)
}

fn count(findings: &[MissionFinding], severity: FindingSeverity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}
