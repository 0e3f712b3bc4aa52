//! Scoring constants that vary between deployments.

use serde::{Deserialize, Serialize};

/// Financial constants used by the insurance, wellness and ROI engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Benchmark annual premium per vehicle (USD).
    #[serde(default = "default_benchmark_premium")]
    pub benchmark_premium_per_vehicle: f64,

    /// Cost of replacing a driver who leaves (USD).
    #[serde(default = "default_replacement_cost")]
    pub driver_replacement_cost: f64,

    /// Annual platform cost per vehicle (USD). Drives the ROI investment.
    #[serde(default = "default_platform_cost")]
    pub platform_cost_per_vehicle: f64,

    /// Annual fuel spend per vehicle (USD).
    #[serde(default = "default_fuel_spend")]
    pub fuel_spend_per_vehicle: f64,

    /// Annual productivity gain per driver (USD).
    #[serde(default = "default_productivity_gain")]
    pub productivity_gain_per_driver: f64,

    /// Share of annualized risk cost avoided through coaching (0.0-1.0).
    #[serde(default = "default_accident_reduction")]
    pub accident_reduction_rate: f64,

    /// Share of retention cost at risk recovered by interventions (0.0-1.0).
    #[serde(default = "default_retention_improvement")]
    pub retention_improvement_rate: f64,

    /// Year-over-year savings growth used by the 3-year projection.
    #[serde(default = "default_growth_rate")]
    pub annual_growth_rate: f64,
}

fn default_benchmark_premium() -> f64 {
    14_200.0
}

fn default_replacement_cost() -> f64 {
    35_000.0
}

fn default_platform_cost() -> f64 {
    1_800.0
}

fn default_fuel_spend() -> f64 {
    18_000.0
}

fn default_productivity_gain() -> f64 {
    1_200.0
}

fn default_accident_reduction() -> f64 {
    0.20
}

fn default_retention_improvement() -> f64 {
    0.30
}

fn default_growth_rate() -> f64 {
    0.08
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            benchmark_premium_per_vehicle: default_benchmark_premium(),
            driver_replacement_cost: default_replacement_cost(),
            platform_cost_per_vehicle: default_platform_cost(),
            fuel_spend_per_vehicle: default_fuel_spend(),
            productivity_gain_per_driver: default_productivity_gain(),
            accident_reduction_rate: default_accident_reduction(),
            retention_improvement_rate: default_retention_improvement(),
            annual_growth_rate: default_growth_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.benchmark_premium_per_vehicle, 14_200.0);
        assert_eq!(config.driver_replacement_cost, 35_000.0);
        assert_eq!(config.annual_growth_rate, 0.08);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            driver_replacement_cost = 12000.0
        "#;
        let config: ScoringConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.driver_replacement_cost, 12_000.0);
        assert_eq!(config.benchmark_premium_per_vehicle, 14_200.0);
    }
}
