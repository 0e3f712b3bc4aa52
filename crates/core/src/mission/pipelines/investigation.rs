//! Safety investigation: one driver's risk, patterns, wellness and root causes.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::fleet::FleetData;
use crate::mission::config::MissionSettings;
use crate::mission::context::StepContext;
use crate::mission::pipeline::{MissionPipeline, PipelineOutput, PipelinePlan};
use crate::mission::types::{category, FindingSeverity, MissionError, MissionParams, MissionType};
use crate::scoring::{
    analyze_event_patterns, assess_preshift, assess_wellness, score_driver_risk, score_fleet_risk,
    BurnoutRisk, EventPatternAnalysis, TrendDirection,
};

use super::{burnout_severity, dollars, percent, preshift_severity, tier_severity};

const TOTAL_STEPS: u32 = 6;
/// Share of 30-day events above which one type is a dominant pattern.
const DOMINANT_SHARE: f64 = 0.40;

pub struct SafetyInvestigation;

/// A likely contributor to a driver's risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootCause {
    pub key: &'static str,
    pub title: String,
    pub detail: String,
    pub recommendation: String,
}

fn is_afternoon(hour: u32) -> bool {
    (13..=17).contains(&hour)
}

fn is_night(hour: u32) -> bool {
    hour >= 22 || hour <= 4
}

/// Rule-based root causes, evaluated in a fixed order.
pub fn root_causes(
    driver_name: &str,
    burnout: BurnoutRisk,
    trend: TrendDirection,
    patterns: &EventPatternAnalysis,
) -> Vec<RootCause> {
    let mut causes = Vec::new();

    if burnout != BurnoutRisk::Low {
        causes.push(RootCause {
            key: "fatigue",
            title: "Fatigue".to_string(),
            detail: format!(
                "{} shows {} burnout risk; fatigue is likely contributing to events.",
                driver_name,
                burnout.as_str()
            ),
            recommendation: format!(
                "Reduce {}'s hours and guarantee rest days before further coaching.",
                driver_name
            ),
        });
    }

    if trend == TrendDirection::Worsening {
        causes.push(RootCause {
            key: "behavioral_pattern",
            title: "Unaddressed behavioral pattern".to_string(),
            detail: format!(
                "Events rose from {} to {} between the previous and the last 14 days.",
                patterns.previous_14d, patterns.recent_14d
            ),
            recommendation: format!(
                "Schedule a one-on-one coaching session with {} this week.",
                driver_name
            ),
        });
    }

    if let Some(hour) = patterns.peak_hour {
        if is_afternoon(hour) {
            causes.push(RootCause {
                key: "afternoon_fatigue",
                title: "Afternoon fatigue".to_string(),
                detail: format!("Events peak at {:02}:00, in the post-lunch slump.", hour),
                recommendation: "Add a mandatory afternoon break to this driver's route plan."
                    .to_string(),
            });
        } else if is_night(hour) {
            causes.push(RootCause {
                key: "night_driving",
                title: "Night driving risk".to_string(),
                detail: format!("Events peak at {:02}:00, during night hours.", hour),
                recommendation: "Limit night shifts and prefer daytime routes for this driver."
                    .to_string(),
            });
        }
    }

    if let Some(dominant) = patterns.dominant_type {
        if patterns.dominant_share > DOMINANT_SHARE {
            causes.push(RootCause {
                key: "dominant_behavior",
                title: format!("Dominant behavior: {}", dominant.label()),
                detail: format!(
                    "{} accounts for {} of 30-day events.",
                    dominant.label(),
                    percent(patterns.dominant_share)
                ),
                recommendation: format!(
                    "Assign targeted {} training.",
                    dominant.label().to_lowercase()
                ),
            });
        }
    }

    if causes.is_empty() {
        causes.push(RootCause {
            key: "multiple_factors",
            title: "Multiple contributing factors".to_string(),
            detail: "No single cause stands out; risk is spread across factors.".to_string(),
            recommendation: format!(
                "Keep {} on the standard coaching cadence and review again next month.",
                driver_name
            ),
        });
    }

    causes
}

#[async_trait]
impl MissionPipeline for SafetyInvestigation {
    fn mission_type(&self) -> MissionType {
        MissionType::SafetyInvestigation
    }

    /// Resolve the target by id, then by name, then the fleet's riskiest driver.
    fn plan(
        &self,
        data: &dyn FleetData,
        params: &MissionParams,
        _settings: &MissionSettings,
    ) -> Result<PipelinePlan, MissionError> {
        let by_id = params
            .driver_id
            .as_deref()
            .and_then(|id| data.driver(id))
            .map(|d| d.id.clone());
        let by_name = || {
            params
                .driver_name
                .as_deref()
                .and_then(|name| data.find_driver_by_name(name))
                .map(|d| d.id.clone())
        };
        let riskiest = || score_fleet_risk(data).into_iter().next().map(|r| r.driver_id);

        let target = by_id.or_else(by_name).or_else(riskiest).ok_or_else(|| {
            let wanted = params
                .driver_id
                .as_deref()
                .or(params.driver_name.as_deref())
                .unwrap_or("any driver");
            MissionError::TargetNotFound(format!(
                "{} (fleet has no drivers to fall back on)",
                wanted
            ))
        })?;
        debug!(driver_id = %target, "Investigation target resolved");

        Ok(PipelinePlan {
            total_steps: TOTAL_STEPS,
            targets: vec![target],
        })
    }

    async fn run_steps(
        &self,
        plan: &PipelinePlan,
        ctx: &mut StepContext<'_>,
    ) -> Result<PipelineOutput, MissionError> {
        let data = ctx.data();
        let driver_id = plan
            .targets
            .first()
            .ok_or_else(|| MissionError::TargetNotFound("no target planned".to_string()))?
            .clone();

        let risk = score_driver_risk(data, &driver_id)?;
        let name = risk.driver_name.clone();

        ctx.step(format!("Building risk profile for {}", name)).await;
        ctx.add_finding(
            category::RISK_PROFILE,
            tier_severity(risk.tier),
            format!("{}: {} risk (score {})", name, risk.tier.as_str(), risk.score),
            format!(
                "Frequency {}, severity {}, pattern {}, trend {}. {} events in 30 days; annualized cost {}.",
                risk.components.frequency,
                risk.components.severity,
                risk.components.pattern,
                risk.components.trend,
                risk.events_30d,
                dollars(risk.annualized_cost)
            ),
            json!(risk),
        );

        ctx.checkpoint()?;
        ctx.step("Analyzing event patterns").await;
        let patterns = analyze_event_patterns(data, &driver_id)?;
        let dominant = patterns
            .dominant_type
            .map(|t| format!("{} ({})", t.label(), percent(patterns.dominant_share)))
            .unwrap_or_else(|| "none".to_string());
        let peak = patterns
            .peak_hour
            .map(|h| format!("{:02}:00", h))
            .unwrap_or_else(|| "n/a".to_string());
        ctx.add_finding(
            category::EVENT_PATTERN,
            if patterns.dominant_share > DOMINANT_SHARE {
                FindingSeverity::Warning
            } else {
                FindingSeverity::Info
            },
            format!("Dominant event type: {}", dominant),
            format!(
                "{} events in 30 days, peak hour {}. {} in the last 14 days vs {} before ({}).",
                patterns.events_30d,
                peak,
                patterns.recent_14d,
                patterns.previous_14d,
                patterns.trend.as_str()
            ),
            json!(patterns),
        );

        ctx.checkpoint()?;
        ctx.step("Correlating wellness signals").await;
        let wellness = assess_wellness(data, ctx.scoring(), &driver_id)?;
        let flagged: Vec<String> = wellness
            .flagged_signals()
            .iter()
            .map(|s| s.label.to_lowercase())
            .collect();
        ctx.add_finding(
            category::WELLNESS_CORRELATION,
            burnout_severity(wellness.burnout_risk),
            format!(
                "Burnout risk {} ({})",
                wellness.burnout_risk.as_str(),
                percent(wellness.burnout_probability)
            ),
            if flagged.is_empty() {
                "No wellness signals are flagged; events are unlikely to be fatigue-driven."
                    .to_string()
            } else {
                format!("Flagged signals: {}.", flagged.join(", "))
            },
            json!(wellness),
        );

        ctx.checkpoint()?;
        ctx.step("Running pre-shift assessment").await;
        let preshift = assess_preshift(data, &driver_id)?;
        ctx.add_finding(
            category::PRESHIFT_ASSESSMENT,
            preshift_severity(preshift.level),
            format!(
                "Pre-shift risk {} (score {})",
                preshift.level.as_str(),
                preshift.score
            ),
            preshift.recommendation.clone(),
            json!(preshift),
        );

        ctx.checkpoint()?;
        ctx.step("Synthesizing root causes").await;
        let causes = root_causes(&name, wellness.burnout_risk, risk.trend, &patterns);
        for cause in &causes {
            ctx.add_finding(
                category::ROOT_CAUSE,
                if cause.key == "multiple_factors" {
                    FindingSeverity::Info
                } else {
                    FindingSeverity::Warning
                },
                cause.title.clone(),
                cause.detail.clone(),
                json!(cause),
            );
        }

        Ok(PipelineOutput {
            recommendations: causes.iter().map(|c| c.recommendation.clone()).collect(),
            data: json!({
                "driverId": driver_id,
                "driverName": name,
                "riskScore": risk.score,
                "tier": risk.tier,
                "burnoutRisk": wellness.burnout_risk,
                "preshiftScore": preshift.score,
                "rootCauses": causes.iter().map(|c| c.key).collect::<Vec<_>>(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{EventType, FleetSnapshot, InMemoryFleet};
    use crate::testing::fixtures;

    fn patterns(peak_hour: Option<u32>, dominant_share: f64) -> EventPatternAnalysis {
        EventPatternAnalysis {
            driver_id: "d1".to_string(),
            events_30d: 5,
            by_type: vec![],
            dominant_type: Some(EventType::Speeding),
            dominant_share,
            peak_hour,
            hourly: vec![0; 24],
            recent_14d: 2,
            previous_14d: 2,
            trend: TrendDirection::Stable,
        }
    }

    fn keys(causes: &[RootCause]) -> Vec<&'static str> {
        causes.iter().map(|c| c.key).collect()
    }

    #[test]
    fn test_root_cause_order() {
        let causes = root_causes(
            "Alex",
            BurnoutRisk::Moderate,
            TrendDirection::Worsening,
            &patterns(Some(15), 0.6),
        );
        assert_eq!(
            keys(&causes),
            vec!["fatigue", "behavioral_pattern", "afternoon_fatigue", "dominant_behavior"]
        );
    }

    #[test]
    fn test_root_cause_night_window() {
        for hour in [22, 23, 0, 4] {
            let causes = root_causes(
                "A",
                BurnoutRisk::Low,
                TrendDirection::Stable,
                &patterns(Some(hour), 0.2),
            );
            assert_eq!(keys(&causes), vec!["night_driving"], "hour {}", hour);
        }
        let causes = root_causes(
            "A",
            BurnoutRisk::Low,
            TrendDirection::Stable,
            &patterns(Some(5), 0.2),
        );
        assert_eq!(keys(&causes), vec!["multiple_factors"]);
    }

    #[test]
    fn test_dominant_share_threshold_is_exclusive() {
        let causes = root_causes(
            "A",
            BurnoutRisk::Low,
            TrendDirection::Improving,
            &patterns(None, 0.40),
        );
        assert_eq!(keys(&causes), vec!["multiple_factors"]);
    }

    #[test]
    fn test_plan_resolution_order() {
        let fleet = InMemoryFleet::new(fixtures::sample_fleet(10));
        let settings = MissionSettings::default();
        let target = |params: MissionParams| {
            SafetyInvestigation
                .plan(&fleet, &params, &settings)
                .unwrap()
                .targets[0]
                .clone()
        };

        let by_id = target(MissionParams {
            driver_id: Some("drv-004".to_string()),
            driver_name: Some("jordan".to_string()),
            ..Default::default()
        });
        assert_eq!(by_id, "drv-004");

        let by_name = target(MissionParams {
            driver_id: Some("drv-999".to_string()),
            driver_name: Some("JORDAN".to_string()),
            ..Default::default()
        });
        assert_eq!(by_name, "drv-002");

        let fallback = target(MissionParams {
            driver_name: Some("nobody".to_string()),
            ..Default::default()
        });
        assert_eq!(fallback, score_fleet_risk(&fleet)[0].driver_id);
    }

    #[test]
    fn test_plan_fails_without_drivers() {
        let fleet = InMemoryFleet::new(FleetSnapshot {
            as_of: fixtures::as_of(),
            drivers: vec![],
            vehicles: vec![],
            events: vec![],
        });
        let params = MissionParams {
            driver_name: Some("nobody".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            SafetyInvestigation.plan(&fleet, &params, &MissionSettings::default()),
            Err(MissionError::TargetNotFound(msg)) if msg.contains("nobody")
        ));
    }
}
