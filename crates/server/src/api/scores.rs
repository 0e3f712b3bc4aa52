//! Read-only scoring endpoints over the loaded dataset.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use fleetsafe_core::scoring::{
    analyze_event_patterns, assess_all_preshift, assess_fleet_wellness, assess_preshift,
    assess_wellness, compute_fleet_roi, daily_briefing, score_driver_risk, score_fleet_risk,
    score_insurance, summarize_fleet_risk, weekly_forecast, AlertBriefing, DriverRisk,
    EventPatternAnalysis, FleetRiskSummary, FleetRoi, FleetWellness, InsuranceScore,
    PreShiftRisk, ScoringError, WeeklyForecast, WellnessResult,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Serialize)]
pub struct FleetRiskResponse {
    pub summary: FleetRiskSummary,
    pub drivers: Vec<DriverRisk>,
}

/// Everything the scoring engines know about one driver.
#[derive(Debug, Serialize)]
pub struct DriverDetailResponse {
    pub risk: DriverRisk,
    pub patterns: EventPatternAnalysis,
    pub wellness: WellnessResult,
    pub preshift: PreShiftRisk,
}

#[derive(Debug, Serialize)]
pub struct PreShiftResponse {
    pub drivers: Vec<PreShiftRisk>,
}

fn scoring_error(e: ScoringError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ScoringError::DriverNotFound(_) => StatusCode::NOT_FOUND,
        ScoringError::EmptyFleet(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    ErrorResponse::with_status(status, e.to_string())
}

/// Fleet risk, riskiest driver first
pub async fn fleet_risk(State(state): State<Arc<AppState>>) -> Json<FleetRiskResponse> {
    let drivers = score_fleet_risk(state.data());
    Json(FleetRiskResponse {
        summary: summarize_fleet_risk(&drivers),
        drivers,
    })
}

pub async fn driver_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverDetailResponse> {
    let data = state.data();
    let risk = score_driver_risk(data, &id).map_err(scoring_error)?;
    let patterns = analyze_event_patterns(data, &id).map_err(scoring_error)?;
    let wellness = assess_wellness(data, state.scoring(), &id).map_err(scoring_error)?;
    let preshift = assess_preshift(data, &id).map_err(scoring_error)?;

    Ok(Json(DriverDetailResponse {
        risk,
        patterns,
        wellness,
        preshift,
    }))
}

pub async fn insurance(State(state): State<Arc<AppState>>) -> ApiResult<InsuranceScore> {
    score_insurance(state.data(), state.scoring())
        .map(Json)
        .map_err(scoring_error)
}

pub async fn wellness(State(state): State<Arc<AppState>>) -> Json<FleetWellness> {
    Json(assess_fleet_wellness(state.data(), state.scoring()))
}

pub async fn roi(State(state): State<Arc<AppState>>) -> ApiResult<FleetRoi> {
    compute_fleet_roi(state.data(), state.scoring())
        .map(Json)
        .map_err(scoring_error)
}

pub async fn preshift(State(state): State<Arc<AppState>>) -> Json<PreShiftResponse> {
    Json(PreShiftResponse {
        drivers: assess_all_preshift(state.data()),
    })
}

pub async fn preshift_forecast(State(state): State<Arc<AppState>>) -> Json<WeeklyForecast> {
    Json(weekly_forecast(state.data()))
}

/// Triaged alerts for the last week
pub async fn alert_briefing(State(state): State<Arc<AppState>>) -> Json<AlertBriefing> {
    Json(daily_briefing(state.data()))
}
