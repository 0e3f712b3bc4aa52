//! Router-level tests for the mission and scoring API.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestConfig, TestFixture};
use fleetsafe_server::api::WsMessage;

// =============================================================================
// Health / config / metrics
// =============================================================================

#[tokio::test]
async fn test_health_reports_dataset() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
    assert_json_path!(response.body, "drivers", json!(20));
    assert_json_path!(response.body, "running_missions", json!(0));
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 8080);
    assert_eq!(response.body["missions"]["step_delay_ms"], 0);
    assert!(response.body["summarizer"].is_null());
}

#[tokio::test]
async fn test_metrics_endpoint_renders_text() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, text) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("fleetsafe_http_requests_total"));
    assert!(text.contains("fleetsafe_missions_running"));
}

// =============================================================================
// Missions
// =============================================================================

#[tokio::test]
async fn test_list_mission_types() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/missions/types").await;
    assert_status!(response, StatusCode::OK);
    let types: Vec<&str> = response.body["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["type"].as_str().unwrap())
        .collect();
    assert_eq!(types.len(), 5);
    for expected in [
        "coaching_sweep",
        "wellness_check",
        "safety_investigation",
        "insurance_optimization",
        "preshift_sweep",
    ] {
        assert!(types.contains(&expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_start_mission_runs_to_completion() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/missions",
            json!({
                "type": "coaching_sweep",
                "session_id": "session-7",
                "params": { "top_n": 3 },
            }),
        )
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_json_path!(response.body, "session_id", json!("session-7"));
    let mission_id = response.body["mission_id"].as_str().unwrap().to_string();

    let record = fixture.wait_for_mission(&mission_id).await;
    assert_eq!(record["state"], "complete");
    assert_eq!(record["type"], "coaching_sweep");
    assert_eq!(record["result"]["status"], "complete");
    assert_eq!(record["result"]["summary"], "Fleet summary from the mock.");
    assert_eq!(record["result"]["data"]["driversAnalyzed"], 3);
    assert_eq!(fixture.summarizer.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_mission_type_is_bad_request() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/missions", json!({ "type": "route_optimization" }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("route_optimization"));
    assert!(fixture.manager.list().is_empty());
}

#[tokio::test]
async fn test_get_unknown_mission_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/missions/no-such-mission").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture.delete("/api/v1/missions/no-such-mission").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_running_mission() {
    let fixture = TestFixture::with_config(TestConfig::slow()).await;

    let response = fixture
        .post("/api/v1/missions", json!({ "type": "wellness_check" }))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    let mission_id = response.body["mission_id"].as_str().unwrap().to_string();

    let running = fixture.get(&format!("/api/v1/missions/{}", mission_id)).await;
    assert_json_path!(running.body, "state", json!("running"));

    let response = fixture.delete(&format!("/api/v1/missions/{}", mission_id)).await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_json_path!(response.body, "cancelled", json!(true));

    let record = fixture.wait_for_mission(&mission_id).await;
    assert_eq!(record["state"], "cancelled");
    assert!(record["result"]["summary"]
        .as_str()
        .unwrap()
        .starts_with("Mission cancelled by request."));

    // a finished mission cannot be cancelled again
    let response = fixture.delete(&format!("/api/v1/missions/{}", mission_id)).await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_missions_filters_by_state_and_session() {
    let fixture = TestFixture::new().await;

    let mut ids = Vec::new();
    for (mission_type, session) in [("wellness_check", "a"), ("preshift_sweep", "b")] {
        let response = fixture
            .post(
                "/api/v1/missions",
                json!({ "type": mission_type, "session_id": session }),
            )
            .await;
        let id = response.body["mission_id"].as_str().unwrap().to_string();
        fixture.wait_for_mission(&id).await;
        ids.push(id);
    }

    let response = fixture.get("/api/v1/missions").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(2));
    assert_eq!(response.body["missions"][0]["mission_id"], json!(ids[1]));

    let response = fixture.get("/api/v1/missions?session_id=a").await;
    assert_json_path!(response.body, "total", json!(1));
    assert_eq!(response.body["missions"][0]["mission_id"], json!(ids[0]));

    let response = fixture.get("/api/v1/missions?state=running").await;
    assert_json_path!(response.body, "total", json!(0));

    let response = fixture.get("/api/v1/missions?state=paused").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mission_events_reach_ws_broadcaster() {
    let fixture = TestFixture::new().await;
    let mut rx = fixture.ws_broadcaster.subscribe();

    let response = fixture
        .post("/api/v1/missions", json!({ "type": "insurance_optimization" }))
        .await;
    let mission_id = response.body["mission_id"].as_str().unwrap().to_string();

    let mut saw_progress = false;
    loop {
        let msg = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for events")
            .unwrap();
        let WsMessage::Mission(event) = msg else {
            continue;
        };
        assert_eq!(event.mission_id(), mission_id);
        match event {
            fleetsafe_core::MissionEvent::Progress(_) => saw_progress = true,
            fleetsafe_core::MissionEvent::Finding(_) => {}
            fleetsafe_core::MissionEvent::Complete(result) => {
                assert_eq!(result.status, fleetsafe_core::MissionStatus::Complete);
                break;
            }
        }
    }
    assert!(saw_progress);
}

// =============================================================================
// Scores
// =============================================================================

#[tokio::test]
async fn test_fleet_risk_scores() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/scores/drivers").await;
    assert_status!(response, StatusCode::OK);
    let drivers = response.body["drivers"].as_array().unwrap();
    assert_eq!(drivers.len(), 20);
    assert_json_path!(response.body["summary"], "driver_count", json!(20));
    let scores: Vec<u64> = drivers.iter().map(|d| d["score"].as_u64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_driver_detail() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/scores/drivers/drv-001").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["risk"]["driver_id"], "drv-001");
    assert!(response.body["wellness"].is_object());
    assert!(response.body["preshift"].is_object());
    assert!(response.body["patterns"].is_object());

    let response = fixture.get("/api/v1/scores/drivers/drv-999").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fleet_level_scores() {
    let fixture = TestFixture::new().await;

    let insurance = fixture.get("/api/v1/scores/insurance").await;
    assert_status!(insurance, StatusCode::OK);
    assert_eq!(insurance.body["components"].as_array().unwrap().len(), 4);

    let wellness = fixture.get("/api/v1/scores/wellness").await;
    assert_status!(wellness, StatusCode::OK);
    assert_eq!(wellness.body["drivers"].as_array().unwrap().len(), 20);

    let roi = fixture.get("/api/v1/scores/roi").await;
    assert_status!(roi, StatusCode::OK);
    assert_eq!(roi.body["projection"].as_array().unwrap().len(), 3);

    let preshift = fixture.get("/api/v1/scores/preshift").await;
    assert_status!(preshift, StatusCode::OK);
    assert_eq!(preshift.body["drivers"].as_array().unwrap().len(), 20);

    let forecast = fixture.get("/api/v1/scores/preshift/forecast").await;
    assert_status!(forecast, StatusCode::OK);
    assert_eq!(forecast.body["days"].as_array().unwrap().len(), 7);

    let briefing = fixture.get("/api/v1/alerts/briefing").await;
    assert_status!(briefing, StatusCode::OK);
    assert!(briefing.body["total_alerts"].is_u64());
}
