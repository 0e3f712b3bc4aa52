//! Built-in mission pipelines.

mod coaching;
mod insurance;
mod investigation;
mod preshift;
mod wellness;

pub use coaching::CoachingSweep;
pub use insurance::InsuranceOptimization;
pub use investigation::{root_causes, RootCause, SafetyInvestigation};
pub use preshift::PreshiftSweep;
pub use wellness::WellnessCheck;

use crate::scoring::{BurnoutRisk, PreShiftLevel, RiskTier};

use super::types::FindingSeverity;

fn tier_severity(tier: RiskTier) -> FindingSeverity {
    match tier {
        RiskTier::Critical => FindingSeverity::Critical,
        RiskTier::High => FindingSeverity::Warning,
        RiskTier::Moderate | RiskTier::Low => FindingSeverity::Info,
    }
}

fn burnout_severity(risk: BurnoutRisk) -> FindingSeverity {
    match risk {
        BurnoutRisk::High => FindingSeverity::Critical,
        BurnoutRisk::Moderate => FindingSeverity::Warning,
        BurnoutRisk::Low => FindingSeverity::Info,
    }
}

fn preshift_severity(level: PreShiftLevel) -> FindingSeverity {
    match level {
        PreShiftLevel::Critical => FindingSeverity::Critical,
        PreShiftLevel::High => FindingSeverity::Warning,
        PreShiftLevel::Elevated | PreShiftLevel::Low => FindingSeverity::Info,
    }
}

fn percent(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

fn dollars(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
