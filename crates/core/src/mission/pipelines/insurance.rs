//! Insurance optimization: score breakdown, savings and the drivers behind them.

use async_trait::async_trait;
use serde_json::json;

use crate::fleet::FleetData;
use crate::mission::config::MissionSettings;
use crate::mission::context::StepContext;
use crate::mission::pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
use crate::mission::types::{category, FindingSeverity, MissionError, MissionParams, MissionType};
use crate::scoring::insurance::premium_savings;
use crate::scoring::{
    compute_fleet_roi, round1, score_fleet_risk, score_insurance, InsuranceComponent,
    InsuranceGrade, RiskTier, ScoringError,
};

use super::{dollars, tier_severity};

const TOTAL_STEPS: u32 = 6;
const TOP_OFFENDERS: usize = 5;
/// Components lifted in the before/after scenario.
const IMPROVED_COMPONENTS: usize = 2;

pub struct InsuranceOptimization;

fn score_severity(score: f64) -> FindingSeverity {
    if score < 55.0 {
        FindingSeverity::Critical
    } else if score < 75.0 {
        FindingSeverity::Warning
    } else {
        FindingSeverity::Info
    }
}

fn component_advice(component: &InsuranceComponent) -> String {
    let action = match component.key.as_str() {
        "safe_driving" => "coach the highest-risk drivers",
        "compliance" => "enforce phone, seatbelt and speed policies and cap weekly hours at 60",
        "maintenance" => "clear the overdue service backlog",
        "driver_quality" => "pair junior drivers with mentors and address burnout signals",
        _ => "improve this component",
    };
    format!(
        "Raise {} (score {}): {} to recover up to {} a year.",
        component.label.to_lowercase(),
        component.score,
        action,
        dollars(component.potential_savings)
    )
}

#[async_trait]
impl MissionPipeline for InsuranceOptimization {
    fn mission_type(&self) -> MissionType {
        MissionType::InsuranceOptimization
    }

    /// Every step needs both drivers and vehicles, so an incomplete fleet
    /// fails here instead of partway through.
    fn plan(
        &self,
        data: &dyn FleetData,
        _params: &MissionParams,
        _settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError> {
        if data.drivers().is_empty() {
            return Err(ScoringError::EmptyFleet("drivers").into());
        }
        if data.vehicles().is_empty() {
            return Err(ScoringError::EmptyFleet("vehicles").into());
        }
        Ok(PipelinePlan::fixed(TOTAL_STEPS))
    }

    async fn run_steps(
        &self,
        _plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError> {
        let data = ctx.data();
        let scoring = ctx.scoring();

        ctx.step("Scoring the fleet insurance profile").await;
        let score = score_insurance(data, scoring)?;
        ctx.add_finding(
            category::INSURANCE_SCORE,
            score_severity(score.overall),
            format!("Insurance score {} (grade {})", score.overall, score.grade),
            format!(
                "Benchmark premium {} for {} vehicles. Estimated premium {} ({} {}).",
                dollars(score.benchmark_premium),
                score.vehicle_count,
                dollars(score.estimated_premium),
                dollars(score.premium_savings.abs()),
                if score.premium_savings >= 0.0 {
                    "below benchmark"
                } else {
                    "above benchmark"
                }
            ),
            json!(score),
        );

        ctx.checkpoint()?;
        ctx.step("Analyzing score components").await;
        let weakest: Vec<InsuranceComponent> =
            score.weakest_first().into_iter().cloned().collect();
        for component in &weakest {
            ctx.checkpoint()?;
            ctx.add_finding(
                category::COMPONENT_ANALYSIS,
                score_severity(component.score),
                format!("{}: {}", component.label, component.score),
                format!(
                    "Weight {}, contributing {} points. Lifting it to 100 saves up to {} a year.",
                    component.weight,
                    component.weighted,
                    dollars(component.potential_savings)
                ),
                json!(component),
            );
        }

        ctx.checkpoint()?;
        ctx.step("Computing fleet ROI").await;
        let roi = compute_fleet_roi(data, scoring)?;
        ctx.add_finding(
            category::ROI_ANALYSIS,
            if roi.roi_percent < 0.0 {
                FindingSeverity::Warning
            } else {
                FindingSeverity::Info
            },
            format!(
                "ROI {}% on {} annual investment",
                roi.roi_percent,
                dollars(roi.annual_investment)
            ),
            format!(
                "Annual savings {}: insurance {}, accident prevention {}, fuel {}, retention {}, productivity {}.{}",
                dollars(roi.total_annual_savings),
                dollars(roi.savings.insurance),
                dollars(roi.savings.accident_prevention),
                dollars(roi.savings.fuel),
                dollars(roi.savings.retention),
                dollars(roi.savings.productivity),
                roi.payback_months
                    .map(|m| format!(" Payback in {} months.", m))
                    .unwrap_or_default()
            ),
            json!(roi),
        );

        ctx.checkpoint()?;
        ctx.step("Projecting before and after").await;
        // Lift the weakest components halfway to 100.
        let uplift: f64 = weakest
            .iter()
            .take(IMPROVED_COMPONENTS)
            .map(|c| (100.0 - c.score) / 2.0 * c.weight)
            .sum();
        let projected = round1(score.overall + uplift);
        let projected_grade = InsuranceGrade::from_score(projected);
        let projected_savings = premium_savings(projected, score.benchmark_premium);
        let gain = projected_savings - score.premium_savings;
        ctx.add_finding(
            category::BEFORE_AFTER,
            FindingSeverity::Info,
            format!(
                "Score {} -> {} (grade {} -> {})",
                score.overall, projected, score.grade, projected_grade
            ),
            format!(
                "Halving the gap on {} adds {} a year in premium savings.",
                weakest
                    .iter()
                    .take(IMPROVED_COMPONENTS)
                    .map(|c| c.label.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" and "),
                dollars(gain)
            ),
            json!({
                "before": {
                    "score": score.overall,
                    "grade": score.grade,
                    "premium": score.estimated_premium,
                },
                "after": {
                    "score": projected,
                    "grade": projected_grade,
                    "premium": score.benchmark_premium - projected_savings,
                },
                "annualGain": gain,
            }),
        );

        ctx.checkpoint()?;
        ctx.step("Identifying top offenders").await;
        let offenders: Vec<_> = score_fleet_risk(data)
            .into_iter()
            .filter(|r| r.tier >= RiskTier::High)
            .take(TOP_OFFENDERS)
            .collect();
        let worst_tier = offenders.iter().map(|r| r.tier).max().unwrap_or(RiskTier::Low);
        ctx.add_finding(
            category::TOP_OFFENDERS,
            tier_severity(worst_tier),
            format!("{} high-risk drivers drive the safe-driving score", offenders.len()),
            if offenders.is_empty() {
                "No drivers are in the high or critical tier.".to_string()
            } else {
                offenders
                    .iter()
                    .map(|r| format!("{} (score {}, {})", r.driver_name, r.score, r.tier.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
            json!(offenders),
        );

        let mut recommendations: Vec<String> = weakest
            .iter()
            .take(IMPROVED_COMPONENTS)
            .map(component_advice)
            .collect();
        if !offenders.is_empty() {
            recommendations.push(format!(
                "Start coaching with {}; they carry {} of annualized risk cost.",
                offenders
                    .iter()
                    .map(|r| r.driver_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                dollars(offenders.iter().map(|r| r.annualized_cost).sum())
            ));
        }
        recommendations.push(format!(
            "Share the {} insurance profile with your broker at renewal.",
            score.grade
        ));

        Ok(PipelineOutput {
            recommendations,
            data: json!({
                "overallScore": score.overall,
                "grade": score.grade,
                "premiumSavings": score.premium_savings,
                "potentialSavings": weakest.iter().map(|c| c.potential_savings).sum::<f64>(),
                "roiPercent": roi.roi_percent,
                "paybackMonths": roi.payback_months,
                "topOffenders": offenders.len(),
            }),
        })
    }
}
