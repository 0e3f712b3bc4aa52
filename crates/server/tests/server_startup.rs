use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config with fast missions
fn minimal_config(port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[dataset]
sample_drivers = 12

[missions]
start_delay_ms = 0
step_delay_ms = 0
"#,
        port
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_fleetsafe"))
        .env("FLEETSAFE_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

async fn exits_with_error(config_path: &std::path::Path) -> bool {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_fleetsafe"))
            .env("FLEETSAFE_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    !result.status.success()
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["drivers"], 12);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let config = format!(
        r#"{}
[summarizer]
provider = "anthropic"
model = "claude-test"
api_key = "sk-secret-value"
"#,
        minimal_config(port)
    );
    let temp_file = write_config(&config);

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let text = response.text().await.unwrap();
    assert!(!text.contains("sk-secret-value"));
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["summarizer"]["api_key_configured"], true);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_mission_over_http() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);
    let response = client
        .post(format!("{}/missions", base))
        .json(&serde_json::json!({ "type": "preshift_sweep" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    let started: serde_json::Value = response.json().await.unwrap();
    let mission_id = started["mission_id"].as_str().unwrap().to_string();

    let mut record = serde_json::Value::Null;
    for _ in 0..100 {
        record = client
            .get(format!("{}/missions/{}", base, mission_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if record["state"] != "running" {
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    // no summarizer configured: the templated summary is used
    assert_eq!(record["state"], "complete");
    assert!(!record["result"]["summary"].as_str().unwrap().is_empty());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    assert!(exits_with_error(std::path::Path::new("/nonexistent/config.toml")).await);
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let temp_file = write_config(
        r#"
[server]
port = 8080

[missions]
default_top_n = 0
"#,
    );
    assert!(exits_with_error(temp_file.path()).await);
}

#[tokio::test]
async fn test_missing_dataset_file_exits_with_error() {
    let temp_file = write_config(
        r#"
[server]
port = 8080

[dataset]
path = "/nonexistent/fleet.json"
"#,
    );
    assert!(exits_with_error(temp_file.path()).await);
}
