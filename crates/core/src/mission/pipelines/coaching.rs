//! Coaching sweep: fleet risk scan, then deep dives on the riskiest drivers.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::fleet::FleetData;
use crate::mission::config::MissionSettings;
use crate::mission::context::StepContext;
use crate::mission::pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
use crate::mission::types::{category, FindingSeverity, MissionError, MissionParams, MissionType};
use crate::scoring::{
    analyze_event_patterns, assess_wellness, score_driver_risk, score_fleet_risk,
    summarize_fleet_risk, BurnoutRisk, DriverRisk, RiskTier, ScoringConfig, ScoringError,
    TrendDirection,
};

use super::{dollars, percent, tier_severity};

/// Steps besides the per-driver deep dives: scan, trends, plan, summarize.
const FIXED_STEPS: u32 = 4;

pub struct CoachingSweep;

struct DeepDive {
    risk: DriverRisk,
    focus: String,
    burnout: BurnoutRisk,
}

fn deep_dive(
    data: &dyn FleetData,
    config: &ScoringConfig,
    driver_id: &str,
) -> Result<DeepDive, ScoringError> {
    let risk = score_driver_risk(data, driver_id)?;
    let patterns = analyze_event_patterns(data, driver_id)?;
    let wellness = assess_wellness(data, config, driver_id)?;

    let focus = patterns
        .dominant_type
        .map(|t| t.label().to_lowercase())
        .unwrap_or_else(|| "general defensive driving".to_string());

    Ok(DeepDive {
        risk,
        focus,
        burnout: wellness.burnout_risk,
    })
}

#[async_trait]
impl MissionPipeline for CoachingSweep {
    fn mission_type(&self) -> MissionType {
        MissionType::CoachingSweep
    }

    fn plan(
        &self,
        data: &dyn FleetData,
        params: &MissionParams,
        settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError> {
        let top_n = params.top_n.unwrap_or(settings.default_top_n);
        if top_n == 0 {
            return Err(MissionError::InvalidParams(
                "top_n must be at least 1".to_string(),
            ));
        }
        let top_n = top_n.min(settings.max_top_n);

        let targets: Vec<String> = score_fleet_risk(data)
            .into_iter()
            .take(top_n)
            .map(|r| r.driver_id)
            .collect();

        Ok(PipelinePlan {
            total_steps: targets.len() as u32 + FIXED_STEPS,
            targets,
        })
    }

    async fn run_steps(
        &self,
        plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError> {
        let data = ctx.data();
        let scoring = ctx.scoring();

        // Step 1: fleet-wide scan
        ctx.step(format!(
            "Scanning risk across {} drivers",
            data.drivers().len()
        ))
        .await;
        let risks = score_fleet_risk(data);
        let summary = summarize_fleet_risk(&risks);
        let overview_severity = if summary.tier_counts.critical > 0 {
            FindingSeverity::Critical
        } else if summary.tier_counts.high > 0 {
            FindingSeverity::Warning
        } else {
            FindingSeverity::Info
        };
        ctx.add_finding(
            category::FLEET_RISK_OVERVIEW,
            overview_severity,
            format!(
                "Fleet average risk score {} across {} drivers",
                summary.average_score, summary.driver_count
            ),
            format!(
                "{} critical, {} high, {} moderate and {} low risk drivers. Annualized risk cost {}.",
                summary.tier_counts.critical,
                summary.tier_counts.high,
                summary.tier_counts.moderate,
                summary.tier_counts.low,
                dollars(summary.total_annualized_cost)
            ),
            json!(summary),
        );

        // Deep dives, one step per driver
        let mut dives: Vec<DeepDive> = Vec::with_capacity(plan.targets.len());
        for (index, driver_id) in plan.targets.iter().enumerate() {
            ctx.checkpoint()?;
            let name = data
                .driver(driver_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| driver_id.clone());
            ctx.step(format!(
                "Deep dive {}/{}: {}",
                index + 1,
                plan.targets.len(),
                name
            ))
            .await;

            match deep_dive(data, scoring, driver_id) {
                Ok(dive) => {
                    let risk = &dive.risk;
                    ctx.add_finding(
                        category::DRIVER_COACHING_PLAN,
                        tier_severity(risk.tier),
                        format!(
                            "{}: {} risk (score {})",
                            risk.driver_name,
                            risk.tier.as_str(),
                            risk.score
                        ),
                        format!(
                            "{} events in 30 days, trend {}. Coach on {}. Burnout risk {}. Annualized cost {}.",
                            risk.events_30d,
                            risk.trend.as_str(),
                            dive.focus,
                            dive.burnout.as_str(),
                            dollars(risk.annualized_cost)
                        ),
                        json!({
                            "driverId": risk.driver_id,
                            "score": risk.score,
                            "tier": risk.tier,
                            "trend": risk.trend,
                            "focus": dive.focus,
                            "burnoutRisk": dive.burnout,
                            "components": risk.components,
                        }),
                    );
                    dives.push(dive);
                }
                Err(err) => {
                    warn!(
                        mission_id = %ctx.mission_id(),
                        driver_id = %driver_id,
                        error = %err,
                        "Deep dive failed"
                    );
                    ctx.add_finding(
                        category::ERROR,
                        FindingSeverity::Warning,
                        format!("Deep dive failed for {}", name),
                        err.to_string(),
                        json!({ "driverId": driver_id }),
                    );
                }
            }
        }

        // Trend cross-reference
        ctx.checkpoint()?;
        ctx.step("Cross-referencing trends").await;
        let worsening: Vec<&DeepDive> = dives
            .iter()
            .filter(|d| d.risk.trend == TrendDirection::Worsening)
            .collect();
        let improving = dives
            .iter()
            .filter(|d| d.risk.trend == TrendDirection::Improving)
            .count();
        let worsening_names: Vec<&str> = worsening
            .iter()
            .map(|d| d.risk.driver_name.as_str())
            .collect();
        ctx.add_finding(
            category::TREND_ANALYSIS,
            if worsening.is_empty() {
                FindingSeverity::Info
            } else {
                FindingSeverity::Warning
            },
            format!(
                "{} of {} analyzed drivers are worsening",
                worsening.len(),
                dives.len()
            ),
            if worsening.is_empty() {
                format!("No analyzed driver is trending worse. {} are improving.", improving)
            } else {
                format!(
                    "Worsening: {}. Fleet-wide, {} drivers are improving and {} worsening.",
                    worsening_names.join(", "),
                    summary.improving,
                    summary.worsening
                )
            },
            json!({
                "worsening": worsening_names,
                "improving": improving,
                "fleetImproving": summary.improving,
                "fleetWorsening": summary.worsening,
            }),
        );

        // Action plan
        ctx.checkpoint()?;
        ctx.step("Assembling coaching action plan").await;
        let mut recommendations: Vec<String> = dives
            .iter()
            .map(|d| {
                let urgency = match d.risk.tier {
                    RiskTier::Critical => "this week",
                    RiskTier::High => "within two weeks",
                    _ => "at the next scheduled check-in",
                };
                format!(
                    "Coach {} on {} {} (score {}, {}).",
                    d.risk.driver_name,
                    d.focus,
                    urgency,
                    d.risk.score,
                    d.risk.trend.as_str()
                )
            })
            .collect();
        let fatigued: Vec<&str> = dives
            .iter()
            .filter(|d| d.burnout != BurnoutRisk::Low)
            .map(|d| d.risk.driver_name.as_str())
            .collect();
        if !fatigued.is_empty() {
            recommendations.push(format!(
                "Review schedules for {} before coaching; burnout signals may be driving their events.",
                fatigued.join(", ")
            ));
        }
        let addressed_cost: f64 = dives.iter().map(|d| d.risk.annualized_cost).sum();
        ctx.add_finding(
            category::COACHING_ACTION_PLAN,
            FindingSeverity::Info,
            format!("Coaching plan for {} drivers", dives.len()),
            format!(
                "{} actions covering {} of annualized risk cost ({} of the fleet total).",
                recommendations.len(),
                dollars(addressed_cost),
                if summary.total_annualized_cost > 0.0 {
                    percent(addressed_cost / summary.total_annualized_cost)
                } else {
                    percent(0.0)
                }
            ),
            json!({ "actions": recommendations }),
        );

        Ok(PipelineOutput {
            recommendations,
            data: json!({
                "driversAnalyzed": dives.len(),
                "totalFleetDrivers": summary.driver_count,
                "fleetAverageScore": summary.average_score,
                "totalAnnualizedCost": summary.total_annualized_cost,
                "improving": summary.improving,
                "worsening": summary.worsening,
            }),
        })
    }
}
