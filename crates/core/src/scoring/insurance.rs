//! Fleet insurance score, letter grade and premium impact.

use serde::{Deserialize, Serialize};

use crate::fleet::FleetData;

use super::risk::score_fleet_risk;
use super::wellness::assess_fleet_wellness;
use super::window::{last_days, DAYS_30};
use super::{round1, round2, ScoringConfig, ScoringError};

pub const SAFE_DRIVING_WEIGHT: f64 = 0.35;
pub const COMPLIANCE_WEIGHT: f64 = 0.25;
pub const MAINTENANCE_WEIGHT: f64 = 0.20;
pub const DRIVER_QUALITY_WEIGHT: f64 = 0.20;

/// Premium moves 0.3% of benchmark per point away from 50.
const PREMIUM_SENSITIVITY: f64 = 0.003;
const PREMIUM_PIVOT: f64 = 50.0;

/// Weekly hours above which a driver counts against compliance.
const HOS_LIMIT_HOURS: f64 = 60.0;

/// Letter grade for an overall insurance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InsuranceGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl InsuranceGrade {
    pub fn from_score(score: f64) -> Self {
        const BANDS: [(f64, InsuranceGrade); 10] = [
            (95.0, InsuranceGrade::APlus),
            (90.0, InsuranceGrade::A),
            (85.0, InsuranceGrade::AMinus),
            (80.0, InsuranceGrade::BPlus),
            (75.0, InsuranceGrade::B),
            (70.0, InsuranceGrade::BMinus),
            (65.0, InsuranceGrade::CPlus),
            (60.0, InsuranceGrade::C),
            (55.0, InsuranceGrade::CMinus),
            (40.0, InsuranceGrade::D),
        ];
        BANDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(InsuranceGrade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceGrade::APlus => "A+",
            InsuranceGrade::A => "A",
            InsuranceGrade::AMinus => "A-",
            InsuranceGrade::BPlus => "B+",
            InsuranceGrade::B => "B",
            InsuranceGrade::BMinus => "B-",
            InsuranceGrade::CPlus => "C+",
            InsuranceGrade::C => "C",
            InsuranceGrade::CMinus => "C-",
            InsuranceGrade::D => "D",
            InsuranceGrade::F => "F",
        }
    }
}

impl std::fmt::Display for InsuranceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted component of the insurance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceComponent {
    /// Stable key: `safe_driving`, `compliance`, `maintenance` or `driver_quality`.
    pub key: String,
    pub label: String,
    pub score: f64,
    pub weight: f64,
    /// `score × weight`
    pub weighted: f64,
    /// Annual savings recovered by lifting this component to 100.
    pub potential_savings: f64,
}

/// Fleet insurance assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceScore {
    pub overall: f64,
    pub grade: InsuranceGrade,
    pub components: Vec<InsuranceComponent>,
    pub driver_count: usize,
    pub vehicle_count: usize,
    pub benchmark_premium: f64,
    /// Negative when the fleet scores below 50.
    pub premium_savings: f64,
    pub estimated_premium: f64,
}

impl InsuranceScore {
    /// Components ordered weakest first.
    pub fn weakest_first(&self) -> Vec<&InsuranceComponent> {
        let mut sorted: Vec<&InsuranceComponent> = self.components.iter().collect();
        sorted.sort_by(|a, b| a.score.total_cmp(&b.score));
        sorted
    }

    pub fn component(&self, key: &str) -> Option<&InsuranceComponent> {
        self.components.iter().find(|c| c.key == key)
    }
}

/// Premium savings for an overall score against a benchmark premium.
pub fn premium_savings(overall: f64, benchmark_premium: f64) -> f64 {
    (overall - PREMIUM_PIVOT) * PREMIUM_SENSITIVITY * benchmark_premium
}

/// Score the fleet.
pub fn score_insurance(
    data: &dyn FleetData,
    config: &ScoringConfig,
) -> Result<InsuranceScore, ScoringError> {
    let drivers = data.drivers();
    if drivers.is_empty() {
        return Err(ScoringError::EmptyFleet("drivers"));
    }
    let driver_count = drivers.len() as f64;

    let risks = score_fleet_risk(data);
    let safe_driving = 100.0 - risks.iter().map(|r| r.score as f64).sum::<f64>() / driver_count;

    let all_events: Vec<_> = data.events().iter().collect();
    let compliance_events = last_days(&all_events, data.as_of(), DAYS_30)
        .into_iter()
        .filter(|e| e.event_type.is_compliance())
        .count() as f64;
    let hos_over = drivers
        .iter()
        .filter(|d| d.work.hours_last_7d > HOS_LIMIT_HOURS)
        .count() as f64;
    let compliance =
        (100.0 - compliance_events / driver_count * 20.0 - hos_over * 5.0).clamp(0.0, 100.0);

    let vehicles = data.vehicles();
    let maintenance = if vehicles.is_empty() {
        100.0
    } else {
        vehicles
            .iter()
            .map(|v| (100.0 - v.overdue_days() as f64 * 2.0).max(0.0))
            .sum::<f64>()
            / vehicles.len() as f64
    };

    let experience = drivers
        .iter()
        .map(|d| (20.0 + d.years_experience * 8.0).min(100.0))
        .sum::<f64>()
        / driver_count;
    let wellness = assess_fleet_wellness(data, config);
    let mean_wellness = wellness
        .drivers
        .iter()
        .map(|w| w.wellness_score)
        .sum::<f64>()
        / driver_count;
    let driver_quality = experience * 0.5 + mean_wellness * 0.5;

    let benchmark = vehicles.len() as f64 * config.benchmark_premium_per_vehicle;
    let components = vec![
        component("safe_driving", "Safe driving", safe_driving, SAFE_DRIVING_WEIGHT, benchmark),
        component("compliance", "Compliance", compliance, COMPLIANCE_WEIGHT, benchmark),
        component("maintenance", "Maintenance", maintenance, MAINTENANCE_WEIGHT, benchmark),
        component(
            "driver_quality",
            "Driver quality",
            driver_quality,
            DRIVER_QUALITY_WEIGHT,
            benchmark,
        ),
    ];

    let overall = round1(components.iter().map(|c| c.score * c.weight).sum());
    let savings = round2(premium_savings(overall, benchmark));

    Ok(InsuranceScore {
        overall,
        grade: InsuranceGrade::from_score(overall),
        components,
        driver_count: drivers.len(),
        vehicle_count: vehicles.len(),
        benchmark_premium: round2(benchmark),
        premium_savings: savings,
        estimated_premium: round2(benchmark - savings),
    })
}

fn component(
    key: &str,
    label: &str,
    score: f64,
    weight: f64,
    benchmark: f64,
) -> InsuranceComponent {
    InsuranceComponent {
        key: key.to_string(),
        label: label.to_string(),
        score: round1(score),
        weight,
        weighted: round1(score * weight),
        potential_savings: round2((100.0 - score) * weight * PREMIUM_SENSITIVITY * benchmark),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetSnapshot, InMemoryFleet};
    use crate::testing::fixtures;

    #[test]
    fn test_weights_sum_to_one() {
        let sum =
            SAFE_DRIVING_WEIGHT + COMPLIANCE_WEIGHT + MAINTENANCE_WEIGHT + DRIVER_QUALITY_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(InsuranceGrade::from_score(100.0), InsuranceGrade::APlus);
        assert_eq!(InsuranceGrade::from_score(95.0), InsuranceGrade::APlus);
        assert_eq!(InsuranceGrade::from_score(94.9), InsuranceGrade::A);
        assert_eq!(InsuranceGrade::from_score(72.0), InsuranceGrade::BMinus);
        assert_eq!(InsuranceGrade::from_score(55.0), InsuranceGrade::CMinus);
        assert_eq!(InsuranceGrade::from_score(54.9), InsuranceGrade::D);
        assert_eq!(InsuranceGrade::from_score(39.9), InsuranceGrade::F);
        assert_eq!(InsuranceGrade::BPlus.to_string(), "B+");
    }

    #[test]
    fn test_premium_savings_sign() {
        assert_eq!(premium_savings(50.0, 142_000.0), 0.0);
        assert!(premium_savings(80.0, 142_000.0) > 0.0);
        assert!(premium_savings(30.0, 142_000.0) < 0.0);
    }

    #[test]
    fn test_empty_fleet() {
        let fleet = InMemoryFleet::new(FleetSnapshot {
            as_of: fixtures::as_of(),
            drivers: vec![],
            vehicles: vec![],
            events: vec![],
        });
        assert_eq!(
            score_insurance(&fleet, &ScoringConfig::default()),
            Err(ScoringError::EmptyFleet("drivers"))
        );
    }

    #[test]
    fn test_clean_fleet() {
        let mut driver = fixtures::driver("d1", "Alex Rivera");
        driver.years_experience = 10.0;
        let fleet = InMemoryFleet::new(FleetSnapshot {
            as_of: fixtures::as_of(),
            drivers: vec![driver],
            vehicles: vec![fixtures::vehicle("v1")],
            events: vec![],
        });
        let score = score_insurance(&fleet, &ScoringConfig::default()).unwrap();

        // a clean driver still carries a neutral trend component: score 8
        assert_eq!(score.component("safe_driving").unwrap().score, 92.0);
        assert_eq!(score.component("compliance").unwrap().score, 100.0);
        assert_eq!(score.component("maintenance").unwrap().score, 100.0);
        assert_eq!(score.component("driver_quality").unwrap().score, 100.0);
        assert_eq!(score.overall, 97.2);
        assert_eq!(score.grade, InsuranceGrade::APlus);
        assert_eq!(score.benchmark_premium, 14_200.0);
        assert_eq!(
            score.estimated_premium,
            round2(score.benchmark_premium - score.premium_savings)
        );
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let fleet = InMemoryFleet::new(fixtures::sample_fleet(20));
        let score = score_insurance(&fleet, &ScoringConfig::default()).unwrap();

        let expected: f64 = score.components.iter().map(|c| c.score * c.weight).sum();
        assert!((score.overall - expected).abs() <= 0.1);
        assert_eq!(score.grade, InsuranceGrade::from_score(score.overall));
    }

    #[test]
    fn test_weakest_first() {
        let fleet = InMemoryFleet::new(fixtures::sample_fleet(20));
        let score = score_insurance(&fleet, &ScoringConfig::default()).unwrap();
        let weakest = score.weakest_first();

        assert_eq!(weakest.len(), 4);
        assert!(weakest.windows(2).all(|w| w[0].score <= w[1].score));
    }
}
