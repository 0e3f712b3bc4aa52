//! Fleet ROI: annual savings by category against the platform investment.

use serde::{Deserialize, Serialize};

use crate::fleet::FleetData;

use super::insurance::score_insurance;
use super::risk::score_fleet_risk;
use super::wellness::assess_fleet_wellness;
use super::window::{last_days, DAYS_30};
use super::{round1, round2, ScoringConfig, ScoringError};

/// Fuel savings share bounds (of annual fuel spend).
const FUEL_SAVINGS_MIN: f64 = 0.02;
const FUEL_SAVINGS_MAX: f64 = 0.08;
/// Fuel savings share per harsh event per vehicle.
const FUEL_SAVINGS_PER_EVENT: f64 = 0.01;

const PROJECTION_YEARS: u32 = 3;

/// Annual savings by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsBreakdown {
    pub insurance: f64,
    pub accident_prevention: f64,
    pub fuel: f64,
    pub retention: f64,
    pub productivity: f64,
}

impl SavingsBreakdown {
    pub fn total(&self) -> f64 {
        self.insurance + self.accident_prevention + self.fuel + self.retention + self.productivity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiProjectionYear {
    pub year: u32,
    pub savings: f64,
    pub cumulative_savings: f64,
    pub cumulative_investment: f64,
    pub net: f64,
}

/// Fleet return on investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRoi {
    pub vehicle_count: usize,
    pub driver_count: usize,
    pub annual_investment: f64,
    pub savings: SavingsBreakdown,
    pub total_annual_savings: f64,
    pub roi_percent: f64,
    /// None when there are no savings to pay the investment back.
    pub payback_months: Option<f64>,
    pub projection: Vec<RoiProjectionYear>,
}

/// Compute the fleet's ROI.
pub fn compute_fleet_roi(
    data: &dyn FleetData,
    config: &ScoringConfig,
) -> Result<FleetRoi, ScoringError> {
    let vehicle_count = data.vehicles().len();
    if vehicle_count == 0 {
        return Err(ScoringError::EmptyFleet("vehicles"));
    }
    let vehicles = vehicle_count as f64;
    let driver_count = data.drivers().len();
    let investment = vehicles * config.platform_cost_per_vehicle;

    let insurance = match score_insurance(data, config) {
        Ok(score) => score.premium_savings.max(0.0),
        Err(ScoringError::EmptyFleet(_)) => 0.0,
        Err(err) => return Err(err),
    };

    let accident_prevention = score_fleet_risk(data)
        .iter()
        .map(|r| r.annualized_cost)
        .sum::<f64>()
        * config.accident_reduction_rate;

    let all_events: Vec<_> = data.events().iter().collect();
    let harsh = last_days(&all_events, data.as_of(), DAYS_30)
        .into_iter()
        .filter(|e| e.event_type.is_harsh())
        .count() as f64;
    let fuel_share =
        (harsh / vehicles * FUEL_SAVINGS_PER_EVENT).clamp(FUEL_SAVINGS_MIN, FUEL_SAVINGS_MAX);
    let fuel = vehicles * config.fuel_spend_per_vehicle * fuel_share;

    let retention = assess_fleet_wellness(data, config).total_retention_cost_at_risk
        * config.retention_improvement_rate;
    let productivity = driver_count as f64 * config.productivity_gain_per_driver;

    let savings = SavingsBreakdown {
        insurance: round2(insurance),
        accident_prevention: round2(accident_prevention),
        fuel: round2(fuel),
        retention: round2(retention),
        productivity: round2(productivity),
    };
    let total = round2(savings.total());

    Ok(FleetRoi {
        vehicle_count,
        driver_count,
        annual_investment: round2(investment),
        roi_percent: round1((total - investment) / investment * 100.0),
        payback_months: (total > 0.0).then(|| round1(investment / (total / 12.0))),
        projection: project(total, investment, config.annual_growth_rate),
        total_annual_savings: total,
        savings,
    })
}

fn project(total: f64, investment: f64, growth: f64) -> Vec<RoiProjectionYear> {
    let mut cumulative_savings = 0.0;
    (1..=PROJECTION_YEARS)
        .map(|year| {
            let savings = total * (1.0 + growth).powi(year as i32 - 1);
            cumulative_savings += savings;
            let cumulative_investment = investment * year as f64;
            RoiProjectionYear {
                year,
                savings: round2(savings),
                cumulative_savings: round2(cumulative_savings),
                cumulative_investment: round2(cumulative_investment),
                net: round2(cumulative_savings - cumulative_investment),
            }
        })
        .collect()
}
