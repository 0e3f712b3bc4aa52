//! Common test utilities for driving the router in-process.
//!
//! The fixture wires a real mission manager over a sample fleet with pacing
//! disabled and a mock summarizer, so requests run end to end without any
//! network or LLM.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fleetsafe_core::{
    testing::{fixtures, MockSummarizer},
    Config, InMemoryFleet, MissionManager, MissionOrchestrator, MissionRegistry,
    MissionSettings, Summarizer,
};
use fleetsafe_server::{
    api::{create_router, spawn_event_forwarder, WsBroadcaster},
    state::AppState,
};

/// Test fixture holding the router and the pieces tests want to poke at.
pub struct TestFixture {
    pub router: Router,
    pub manager: Arc<MissionManager>,
    pub summarizer: Arc<MockSummarizer>,
    pub ws_broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub drivers: usize,
    pub settings: MissionSettings,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            drivers: 20,
            settings: MissionSettings::unpaced(),
        }
    }
}

impl TestConfig {
    /// Missions that take long enough to be observed while running.
    pub fn slow() -> Self {
        Self {
            settings: MissionSettings {
                step_delay_ms: 400,
                ..MissionSettings::unpaced()
            },
            ..Default::default()
        }
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let summarizer = Arc::new(MockSummarizer::new("Fleet summary from the mock."));
        let data = Arc::new(InMemoryFleet::new(fixtures::sample_fleet(test_config.drivers)));

        let mut config = Config::default();
        config.missions = test_config.settings.clone();

        let orchestrator = Arc::new(MissionOrchestrator::new(
            data,
            MissionRegistry::with_default_pipelines(),
            Arc::clone(&summarizer) as Arc<dyn Summarizer>,
            test_config.settings,
            config.scoring.clone(),
        ));
        let manager = Arc::new(MissionManager::new(orchestrator));

        let ws_broadcaster = WsBroadcaster::default();
        spawn_event_forwarder(&manager, ws_broadcaster.clone());

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&manager),
            ws_broadcaster.clone(),
        ));

        Self {
            router: create_router(state),
            manager,
            summarizer,
            ws_broadcaster,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// GET returning the raw body text (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Poll a mission until it leaves the running state.
    pub async fn wait_for_mission(&self, mission_id: &str) -> Value {
        for _ in 0..200 {
            let response = self.get(&format!("/api/v1/missions/{}", mission_id)).await;
            if response.body["state"] != "running" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("mission {} did not finish in time", mission_id);
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
