//! Mission API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use fleetsafe_core::{
    mission::MissionTypeInfo, MissionConfig, MissionHandle, MissionParams, MissionRecord,
    MissionType, RunState,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for mission listings
const MAX_LIMIT: usize = 500;

/// Default limit for mission listings
const DEFAULT_LIMIT: usize = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a mission.
///
/// The type is kept as a string so an unknown type is a 400 with a readable
/// message rather than a generic deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct StartMissionBody {
    #[serde(rename = "type")]
    pub mission_type: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub params: MissionParams,
}

/// Query parameters for listing missions
#[derive(Debug, Deserialize)]
pub struct ListMissionsParams {
    /// Filter by run state (running, complete, failed, cancelled)
    pub state: Option<String>,
    /// Filter by session
    pub session_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MissionTypesResponse {
    pub types: Vec<MissionTypeInfo>,
}

#[derive(Debug, Serialize)]
pub struct ListMissionsResponse {
    pub missions: Vec<MissionRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CancelMissionResponse {
    pub mission_id: String,
    pub cancelled: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// List the mission types this server can run
pub async fn list_types(State(state): State<Arc<AppState>>) -> Json<MissionTypesResponse> {
    let types = state
        .manager()
        .orchestrator()
        .registry()
        .types()
        .into_iter()
        .map(|t| t.info())
        .collect();
    Json(MissionTypesResponse { types })
}

/// Start a mission in the background
pub async fn start_mission(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartMissionBody>,
) -> Result<(StatusCode, Json<MissionHandle>), impl IntoResponse> {
    let mission_type = match body.mission_type.parse::<MissionType>() {
        Ok(t) => t,
        Err(e) => return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, e.to_string())),
    };

    let mut config = MissionConfig::new(mission_type).with_params(body.params);
    if let Some(session_id) = body.session_id.filter(|s| !s.trim().is_empty()) {
        config = config.with_session_id(session_id);
    }

    let handle = state.manager().start(config);
    info!(
        mission_id = %handle.mission_id,
        session_id = %handle.session_id,
        "Mission started via API"
    );
    Ok((StatusCode::ACCEPTED, Json(handle)))
}

/// List missions, most recent first
pub async fn list_missions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMissionsParams>,
) -> Result<Json<ListMissionsResponse>, impl IntoResponse> {
    let state_filter = match params.state.as_deref() {
        None => None,
        Some(raw) => match parse_run_state(raw) {
            Some(s) => Some(s),
            None => {
                return Err(ErrorResponse::with_status(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown mission state: {}", raw),
                ))
            }
        },
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let matching: Vec<MissionRecord> = state
        .manager()
        .list()
        .into_iter()
        .filter(|r| state_filter.map_or(true, |s| r.state == s))
        .filter(|r| {
            params
                .session_id
                .as_deref()
                .map_or(true, |session| r.session_id == session)
        })
        .collect();
    let total = matching.len();

    Ok(Json(ListMissionsResponse {
        missions: matching.into_iter().take(limit).collect(),
        total,
    }))
}

/// Get a mission by ID
pub async fn get_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MissionRecord>, impl IntoResponse> {
    match state.manager().get(&id) {
        Some(record) => Ok(Json(record)),
        None => Err(ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Mission not found: {}", id),
        )),
    }
}

/// Cancel a running mission (DELETE endpoint)
pub async fn cancel_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<CancelMissionResponse>), impl IntoResponse> {
    let Some(record) = state.manager().get(&id) else {
        return Err(ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Mission not found: {}", id),
        ));
    };

    if record.is_finished() || !state.manager().cancel(&id) {
        return Err(ErrorResponse::with_status(
            StatusCode::CONFLICT,
            format!("Cannot cancel mission {}: it has already finished", id),
        ));
    }

    info!(mission_id = %id, "Mission cancellation requested via API");
    Ok((
        StatusCode::ACCEPTED,
        Json(CancelMissionResponse {
            mission_id: id,
            cancelled: true,
        }),
    ))
}

fn parse_run_state(raw: &str) -> Option<RunState> {
    match raw {
        "running" => Some(RunState::Running),
        "complete" => Some(RunState::Complete),
        "failed" => Some(RunState::Failed),
        "cancelled" => Some(RunState::Cancelled),
        _ => None,
    }
}
