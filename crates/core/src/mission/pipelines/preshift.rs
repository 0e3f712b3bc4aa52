//! Pre-shift sweep: who should not start a shift unchecked, and the week ahead.

use async_trait::async_trait;
use serde_json::json;

use crate::fleet::FleetData;
use crate::mission::config::MissionSettings;
use crate::mission::context::StepContext;
use crate::mission::pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
use crate::mission::types::{category, FindingSeverity, MissionError, MissionParams, MissionType};
use crate::scoring::{
    assess_all_preshift, daily_briefing, weekly_forecast, PreShiftLevel, PreShiftRisk,
};

use super::preshift_severity;

const TOTAL_STEPS: u32 = 5;

pub struct PreshiftSweep;

fn count_level(all: &[PreShiftRisk], level: PreShiftLevel) -> usize {
    all.iter().filter(|r| r.level == level).count()
}

#[async_trait]
impl MissionPipeline for PreshiftSweep {
    fn mission_type(&self) -> MissionType {
        MissionType::PreshiftSweep
    }

    fn plan(
        &self,
        _data: &dyn FleetData,
        _params: &MissionParams,
        _settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError> {
        Ok(PipelinePlan::fixed(TOTAL_STEPS))
    }

    async fn run_steps(
        &self,
        _plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError> {
        let data = ctx.data();

        ctx.step("Assessing pre-shift risk for every driver").await;
        let all = assess_all_preshift(data);
        let critical = count_level(&all, PreShiftLevel::Critical);
        let high = count_level(&all, PreShiftLevel::High);
        let elevated = count_level(&all, PreShiftLevel::Elevated);
        let low = count_level(&all, PreShiftLevel::Low);
        ctx.add_finding(
            category::PRESHIFT_OVERVIEW,
            if critical > 0 {
                FindingSeverity::Critical
            } else if high > 0 {
                FindingSeverity::Warning
            } else {
                FindingSeverity::Info
            },
            format!("{} drivers flagged before their shift", critical + high),
            format!(
                "{} critical, {} high, {} elevated and {} low across {} drivers.",
                critical,
                high,
                elevated,
                low,
                all.len()
            ),
            json!({ "critical": critical, "high": high, "elevated": elevated, "low": low }),
        );

        ctx.checkpoint()?;
        ctx.step("Reviewing flagged drivers").await;
        let flagged: Vec<&PreShiftRisk> = all
            .iter()
            .filter(|r| r.level >= PreShiftLevel::High)
            .collect();
        for risk in &flagged {
            ctx.checkpoint()?;
            let factors: Vec<String> = risk
                .factors
                .iter()
                .map(|f| format!("{} {}/{}", f.label.to_lowercase(), f.points, f.max))
                .collect();
            ctx.add_finding(
                category::PRESHIFT_FLAGGED,
                preshift_severity(risk.level),
                format!(
                    "{}: {} pre-shift risk (score {})",
                    risk.driver_name,
                    risk.level.as_str(),
                    risk.score
                ),
                format!(
                    "Factors: {}. {}",
                    if factors.is_empty() {
                        "none above threshold".to_string()
                    } else {
                        factors.join(", ")
                    },
                    risk.recommendation
                ),
                json!(risk),
            );
        }

        ctx.checkpoint()?;
        ctx.step("Forecasting the week ahead").await;
        let forecast = weekly_forecast(data);
        let peak = forecast.peak_day.clone();
        ctx.add_finding(
            category::WEEKLY_FORECAST,
            match &peak {
                Some(day) if day.level >= PreShiftLevel::High => FindingSeverity::Warning,
                _ => FindingSeverity::Info,
            },
            match &peak {
                Some(day) => format!(
                    "Riskiest day ahead: {} {} (index {})",
                    day.weekday, day.date, day.risk_index
                ),
                None => "No forecast available".to_string(),
            },
            forecast
                .days
                .iter()
                .map(|d| format!("{} {}", d.weekday, d.risk_index))
                .collect::<Vec<_>>()
                .join(", "),
            json!(forecast),
        );

        ctx.checkpoint()?;
        ctx.step("Building the daily alert briefing").await;
        let briefing = daily_briefing(data);
        ctx.add_finding(
            category::DAILY_BRIEFING,
            if briefing.critical > 0 {
                FindingSeverity::Critical
            } else if briefing.high > 0 {
                FindingSeverity::Warning
            } else {
                FindingSeverity::Info
            },
            format!("{} alerts in the last 7 days", briefing.total_alerts),
            briefing.headline.clone(),
            json!(briefing),
        );

        let mut recommendations: Vec<String> = flagged
            .iter()
            .map(|r| format!("{}: {}", r.driver_name, r.recommendation))
            .collect();
        if let Some(day) = peak.as_ref().filter(|d| d.level >= PreShiftLevel::Elevated) {
            recommendations.push(format!(
                "Plan extra supervision for {} {}, the riskiest day this week.",
                day.weekday, day.date
            ));
        }
        for driver in &briefing.drivers_needing_attention {
            if !flagged.iter().any(|r| r.driver_id == driver.driver_id) {
                recommendations.push(format!(
                    "Follow up on {}'s {} alert before dispatch.",
                    driver.driver_name,
                    driver.highest_priority.as_str()
                ));
            }
        }
        if recommendations.is_empty() {
            recommendations.push("All drivers are clear for today's shifts.".to_string());
        }

        Ok(PipelineOutput {
            recommendations,
            data: json!({
                "driversAssessed": all.len(),
                "critical": critical,
                "high": high,
                "elevated": elevated,
                "low": low,
                "peakDay": peak.map(|d| d.date),
                "alerts": briefing.total_alerts,
            }),
        })
    }
}
