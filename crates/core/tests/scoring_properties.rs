//! Properties every scoring engine must hold over arbitrary fleets.

use chrono::Duration;

use fleetsafe_core::{
    fleet::{EventSeverity, EventType, FleetData, FleetSnapshot, InMemoryFleet},
    scoring::{
        assess_all_preshift, assess_fleet_wellness, compute_fleet_roi, daily_briefing,
        insurance::{
            premium_savings, COMPLIANCE_WEIGHT, DRIVER_QUALITY_WEIGHT, MAINTENANCE_WEIGHT,
            SAFE_DRIVING_WEIGHT,
        },
        risk::{FREQUENCY_WEIGHT, PATTERN_WEIGHT, SEVERITY_WEIGHT, TREND_WEIGHT},
        score_fleet_risk, score_insurance, triage_alerts, weekly_forecast,
        wellness::{burnout_probability, wellness_score},
        BurnoutRisk, RiskTier, ScoringConfig, ScoringError,
    },
    testing::fixtures,
};

fn sample(drivers: usize) -> InMemoryFleet {
    InMemoryFleet::new(fixtures::sample_fleet(drivers))
}

#[test]
fn test_tier_bands_are_exclusive_and_exhaustive() {
    let mut previous = RiskTier::Low;
    for score in 0..=100u32 {
        let tier = RiskTier::from_score(score);
        assert!(tier >= previous, "tier went down at {}", score);
        previous = tier;

        let expected = match score {
            0..=25 => RiskTier::Low,
            26..=50 => RiskTier::Moderate,
            51..=75 => RiskTier::High,
            _ => RiskTier::Critical,
        };
        assert_eq!(tier, expected, "score {}", score);
    }
}

#[test]
fn test_driver_risk_is_deterministic_and_consistent() {
    let fleet = sample(40);
    let first = score_fleet_risk(&fleet);
    let second = score_fleet_risk(&fleet);
    assert_eq!(first, second);

    for risk in &first {
        assert!(risk.score <= 100);
        assert_eq!(risk.tier, RiskTier::from_score(risk.score));
        assert_eq!(risk.annualized_cost, risk.tier.annualized_cost());
    }
    assert!(first.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_risk_weights_sum_to_one() {
    let sum = FREQUENCY_WEIGHT + SEVERITY_WEIGHT + PATTERN_WEIGHT + TREND_WEIGHT;
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_insurance_is_weighted_sum_of_components() {
    let weights =
        SAFE_DRIVING_WEIGHT + COMPLIANCE_WEIGHT + MAINTENANCE_WEIGHT + DRIVER_QUALITY_WEIGHT;
    assert!((weights - 1.0).abs() < 1e-9);

    for drivers in [1, 7, 30] {
        let score = score_insurance(&sample(drivers), &ScoringConfig::default()).unwrap();
        let weighted: f64 = score.components.iter().map(|c| c.score * c.weight).sum();
        assert!(
            (score.overall - weighted).abs() <= 0.05 + 1e-9,
            "overall {} vs weighted {}",
            score.overall,
            weighted
        );
        assert!((0.0..=100.0).contains(&score.overall));
        let component_weights: f64 = score.components.iter().map(|c| c.weight).sum();
        assert!((component_weights - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_premium_savings_monotonic_and_signed() {
    let benchmark = 10.0 * 14_200.0;
    assert_eq!(premium_savings(50.0, benchmark), 0.0);
    assert!(premium_savings(49.9, benchmark) < 0.0);
    assert!(premium_savings(50.1, benchmark) > 0.0);

    let mut previous = f64::NEG_INFINITY;
    for tenth in 0..=1000 {
        let savings = premium_savings(tenth as f64 / 10.0, benchmark);
        assert!(savings > previous);
        previous = savings;
    }
}

#[test]
fn test_burnout_probability_monotonic_and_bounded() {
    for critical in 0..=6 {
        for warning in 0..=6 {
            let p = burnout_probability(critical, warning);
            assert!((0.0..=1.0).contains(&p));
            assert!(burnout_probability(critical + 1, warning) >= p);
            assert!(burnout_probability(critical, warning + 1) >= p);
            assert!(
                burnout_probability(critical + 1, warning)
                    >= burnout_probability(critical, warning + 1)
            );

            let score = wellness_score(critical, warning);
            assert!((0.0..=100.0).contains(&score));
            assert!(wellness_score(critical + 1, warning) <= score);
        }
    }
    assert_eq!(BurnoutRisk::from_probability(burnout_probability(0, 0)), BurnoutRisk::Low);
}

#[test]
fn test_fleet_wellness_ordering_and_counts() {
    let wellness = assess_fleet_wellness(&sample(30), &ScoringConfig::default());
    assert_eq!(wellness.drivers.len(), 30);
    assert_eq!(
        wellness.high_risk + wellness.moderate_risk + wellness.low_risk,
        30
    );
    assert!(wellness
        .drivers
        .windows(2)
        .all(|w| w[0].burnout_probability >= w[1].burnout_probability));
}

#[test]
fn test_retention_cost_follows_configuration() {
    let fleet = sample(10);
    let default = assess_fleet_wellness(&fleet, &ScoringConfig::default());
    let doubled = assess_fleet_wellness(
        &fleet,
        &ScoringConfig {
            driver_replacement_cost: 70_000.0,
            ..Default::default()
        },
    );
    let ratio = doubled.total_retention_cost_at_risk / default.total_retention_cost_at_risk;
    assert!((ratio - 2.0).abs() < 1e-3);
}

#[test]
fn test_roi_projection_accumulates() {
    let roi = compute_fleet_roi(&sample(20), &ScoringConfig::default()).unwrap();
    assert_eq!(roi.projection.len(), 3);
    let mut cumulative = 0.0;
    for (i, year) in roi.projection.iter().enumerate() {
        assert_eq!(year.year as usize, i + 1);
        cumulative += year.savings;
        assert!((year.cumulative_savings - cumulative).abs() < 0.05);
        assert!((year.net - (year.cumulative_savings - year.cumulative_investment)).abs() < 0.05);
    }
    assert!(roi.projection[1].savings > roi.projection[0].savings);
}

#[test]
fn test_empty_fleet_errors() {
    let empty = InMemoryFleet::new(FleetSnapshot {
        as_of: fixtures::as_of(),
        drivers: vec![],
        vehicles: vec![],
        events: vec![],
    });
    assert!(matches!(
        score_insurance(&empty, &ScoringConfig::default()),
        Err(ScoringError::EmptyFleet(_))
    ));
    assert!(matches!(
        compute_fleet_roi(&empty, &ScoringConfig::default()),
        Err(ScoringError::EmptyFleet(_))
    ));
    assert!(score_fleet_risk(&empty).is_empty());
    assert!(assess_all_preshift(&empty).is_empty());
    assert_eq!(daily_briefing(&empty).total_alerts, 0);
}

#[test]
fn test_preshift_bounds_and_forecast() {
    let fleet = sample(30);
    for risk in assess_all_preshift(&fleet) {
        assert!(risk.score <= 100);
        assert!(risk.components.fatigue <= 30.0);
        assert!(risk.components.behavior_trend <= 25.0);
        assert!(risk.components.recent_severity <= 25.0);
        assert!(risk.components.workload <= 20.0);
    }

    let forecast = weekly_forecast(&fleet);
    assert_eq!(forecast.days.len(), 7);
    assert_eq!(
        forecast.days[0].date,
        fleet.as_of().date_naive() + Duration::days(1)
    );
    assert!(forecast.days.iter().all(|d| d.risk_index <= 100));
    let peak = forecast.peak_day.unwrap();
    assert!(forecast.days.iter().all(|d| d.risk_index <= peak.risk_index));
}

#[test]
fn test_alert_triage_only_covers_last_week() {
    let as_of = fixtures::as_of();
    let fleet = InMemoryFleet::new(FleetSnapshot {
        as_of,
        drivers: vec![fixtures::driver("d1", "Alex Rivera")],
        vehicles: vec![fixtures::vehicle("v1")],
        events: vec![
            fixtures::event(
                "e1",
                "d1",
                EventType::Speeding,
                EventSeverity::High,
                as_of - Duration::days(2),
            ),
            fixtures::event(
                "e2",
                "d1",
                EventType::Speeding,
                EventSeverity::Critical,
                as_of - Duration::days(9),
            ),
        ],
    });

    let alerts = triage_alerts(&fleet);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].event_id, "e1");
    assert!(alerts[0].urgency <= 100);
}
