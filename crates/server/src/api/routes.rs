use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, missions, scores, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Missions
        .route("/missions/types", get(missions::list_types))
        .route(
            "/missions",
            get(missions::list_missions).post(missions::start_mission),
        )
        .route(
            "/missions/{id}",
            get(missions::get_mission).delete(missions::cancel_mission),
        )
        // Scoring engines
        .route("/scores/drivers", get(scores::fleet_risk))
        .route("/scores/drivers/{id}", get(scores::driver_detail))
        .route("/scores/insurance", get(scores::insurance))
        .route("/scores/wellness", get(scores::wellness))
        .route("/scores/roi", get(scores::roi))
        .route("/scores/preshift", get(scores::preshift))
        .route("/scores/preshift/forecast", get(scores::preshift_forecast))
        .route("/alerts/briefing", get(scores::alert_briefing))
        // Live mission events
        .route("/ws", get(ws::ws_handler))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
