//! Wellness check: burnout screening and an intervention schedule.

use async_trait::async_trait;
use serde_json::json;

use crate::fleet::FleetData;
use crate::mission::config::MissionSettings;
use crate::mission::context::StepContext;
use crate::mission::pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
use crate::mission::types::{category, FindingSeverity, MissionError, MissionParams, MissionType};
use crate::scoring::{assess_fleet_wellness, BurnoutRisk, SignalStatus, WellnessResult};

use super::{burnout_severity, dollars, percent};

const TOTAL_STEPS: u32 = 5;

pub struct WellnessCheck;

fn signal_summary(result: &WellnessResult) -> String {
    let flagged: Vec<String> = result
        .flagged_signals()
        .iter()
        .map(|s| {
            let status = match s.status {
                SignalStatus::Critical => "critical",
                _ => "warning",
            };
            format!("{} {} ({})", s.label.to_lowercase(), s.value, status)
        })
        .collect();
    if flagged.is_empty() {
        "no flagged signals".to_string()
    } else {
        flagged.join(", ")
    }
}

fn driver_detail(result: &WellnessResult) -> String {
    format!(
        "Burnout probability {}, wellness score {}. Signals: {}. Retention cost at risk {}.",
        percent(result.burnout_probability),
        result.wellness_score,
        signal_summary(result),
        dollars(result.retention_cost_at_risk)
    )
}

#[async_trait]
impl MissionPipeline for WellnessCheck {
    fn mission_type(&self) -> MissionType {
        MissionType::WellnessCheck
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

        ctx.step("Assessing wellness across the fleet").await;
        let fleet = assess_fleet_wellness(data, ctx.scoring());
        ctx.add_finding(
            category::WELLNESS_OVERVIEW,
            if fleet.high_risk > 0 {
                FindingSeverity::Critical
            } else if fleet.moderate_risk > 0 {
                FindingSeverity::Warning
            } else {
                FindingSeverity::Info
            },
            format!(
                "{} high and {} moderate burnout risks across {} drivers",
                fleet.high_risk,
                fleet.moderate_risk,
                fleet.drivers.len()
            ),
            format!(
                "Average wellness score {}. Retention cost at risk {}.",
                fleet.average_wellness,
                dollars(fleet.total_retention_cost_at_risk)
            ),
            json!({
                "highRisk": fleet.high_risk,
                "moderateRisk": fleet.moderate_risk,
                "lowRisk": fleet.low_risk,
                "averageWellness": fleet.average_wellness,
                "totalRetentionCostAtRisk": fleet.total_retention_cost_at_risk,
            }),
        );

        let high: Vec<WellnessResult> = fleet
            .with_risk(BurnoutRisk::High)
            .into_iter()
            .cloned()
            .collect();
        let moderate: Vec<WellnessResult> = fleet
            .with_risk(BurnoutRisk::Moderate)
            .into_iter()
            .cloned()
            .collect();

        ctx.checkpoint()?;
        ctx.step(format!("Reviewing {} high-risk drivers", high.len())).await;
        for result in &high {
            ctx.checkpoint()?;
            ctx.add_finding(
                category::BURNOUT_CRITICAL,
                burnout_severity(result.burnout_risk),
                format!("{}: high burnout risk", result.driver_name),
                driver_detail(result),
                json!(result),
            );
        }

        ctx.checkpoint()?;
        ctx.step(format!("Reviewing {} moderate-risk drivers", moderate.len()))
            .await;
        for result in &moderate {
            ctx.checkpoint()?;
            ctx.add_finding(
                category::BURNOUT_MODERATE,
                burnout_severity(result.burnout_risk),
                format!("{}: moderate burnout risk", result.driver_name),
                driver_detail(result),
                json!(result),
            );
        }

        ctx.checkpoint()?;
        ctx.step("Scheduling interventions").await;
        let mut recommendations: Vec<String> = high
            .iter()
            .map(|r| {
                format!(
                    "Meet with {} within 48 hours and rebalance their schedule ({}).",
                    r.driver_name,
                    signal_summary(r)
                )
            })
            .collect();
        recommendations.extend(moderate.iter().map(|r| {
            format!(
                "Check in with {} this week about workload and rest.",
                r.driver_name
            )
        }));
        if recommendations.is_empty() {
            recommendations.push("No interventions needed; keep the current rota.".to_string());
        }

        let schedule: Vec<serde_json::Value> = high
            .iter()
            .map(|r| {
                json!({
                    "driverId": r.driver_id,
                    "driverName": r.driver_name,
                    "when": "within 48 hours",
                })
            })
            .chain(moderate.iter().map(|r| {
                json!({ "driverId": r.driver_id, "driverName": r.driver_name, "when": "this week" })
            }))
            .collect();
        ctx.add_finding(
            category::INTERVENTION_SCHEDULE,
            FindingSeverity::Info,
            format!("{} interventions scheduled", schedule.len()),
            format!(
                "{} urgent (48 hours) and {} this week. Acting on them protects up to {} in retention cost.",
                high.len(),
                moderate.len(),
                dollars(
                    high.iter()
                        .chain(moderate.iter())
                        .map(|r| r.retention_cost_at_risk)
                        .sum()
                )
            ),
            json!({ "schedule": schedule }),
        );

        Ok(PipelineOutput {
            recommendations,
            data: json!({
                "driversAssessed": fleet.drivers.len(),
                "highRisk": fleet.high_risk,
                "moderateRisk": fleet.moderate_risk,
                "lowRisk": fleet.low_risk,
                "averageWellness": fleet.average_wellness,
                "totalRetentionCostAtRisk": fleet.total_retention_cost_at_risk,
            }),
        })
    }
}
