//! Tests that run the `steward` binary end to end.

use std::io::Write;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::{NamedTempFile, TempDir};
use tokio::process::Child;
use tokio::time::{sleep, timeout};

fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// A running server with its own config and tenants file.
struct RunningServer {
    base_url: String,
    tenants_path: PathBuf,
    _config: NamedTempFile,
    _dir: TempDir,
    _child: Child,
}

impl RunningServer {
    /// Start with the tenants file seeded from `tenants` (if given).
    async fn start(tenants: Option<Value>) -> Self {
        let port = get_available_port();
        let dir = tempfile::tempdir().unwrap();
        let tenants_path = dir.path().join("state").join("tenants.json");
        std::fs::create_dir_all(tenants_path.parent().unwrap()).unwrap();
        if let Some(tenants) = tenants {
            std::fs::write(&tenants_path, serde_json::to_vec_pretty(&tenants).unwrap()).unwrap();
        }

        let config = format!(
            r#"
[auth]
method = "none"

[server]
host = "127.0.0.1"
port = {port}

[storage]
tenants_path = "{path}"

[engine]
status_interval_secs = 3600
drawing_interval_secs = 3600
"#,
            port = port,
            path = tenants_path.display()
        );
        let config_file = write_config(&config);
        let child = spawn_server(config_file.path());

        let server = Self {
            base_url: format!("http://127.0.0.1:{}/api/v1", port),
            tenants_path,
            _config: config_file,
            _dir: dir,
            _child: child,
        };
        assert!(server.wait_ready(40).await, "Server did not start in time");
        server
    }

    async fn wait_ready(&self, max_attempts: u32) -> bool {
        let client = Client::new();
        for _ in 0..max_attempts {
            if client
                .get(format!("{}/health", self.base_url))
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

    async fn get_json(&self, path: &str) -> Value {
        let response = Client::new()
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "GET {} failed", path);
        response.json().await.expect("Failed to parse JSON")
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn spawn_server(config_path: &Path) -> Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_steward"))
        .env("STEWARD_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Run the binary against `config` (or a missing file) and expect it to fail.
async fn assert_exits_with_error(config: Option<&str>) {
    let file = config.map(write_config);
    let path = file
        .as_ref()
        .map(|f| f.path().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/nonexistent/steward.toml"));

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_steward"))
            .env("STEWARD_CONFIG", &path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success(), "steward started with {:?}", config);
}

#[tokio::test]
async fn test_engine_loops_run_after_startup() {
    let server = RunningServer::start(None).await;

    let health = server.get_json("/health").await;
    assert_eq!(health["status"], "ok");

    let status = server.get_json("/status").await;
    assert_eq!(status["status_loop_running"], true);
    assert_eq!(status["drawing_loop_running"], true);
    assert_eq!(status["configured_tenants"], 0);
}

#[tokio::test]
async fn test_tenants_file_is_loaded_at_startup() {
    let server = RunningServer::start(Some(json!({
        "guild-1": { "auto_role_id": "member" },
        "guild-2": {
            "warns": { "u1": [{ "reason": "spam", "issued_at": "2026-01-01T00:00:00Z" }] }
        }
    })))
    .await;

    let status = server.get_json("/status").await;
    assert_eq!(status["configured_tenants"], 2);

    let settings = server.get_json("/tenants/guild-1/settings").await;
    assert_eq!(settings["auto_role_id"], "member");

    let warns = server.get_json("/tenants/guild-2/warns/u1").await;
    assert_eq!(warns["warns"][0]["reason"], "spam");
}

#[tokio::test]
async fn test_settings_are_written_to_tenants_file() {
    let server = RunningServer::start(None).await;

    let response = Client::new()
        .put(format!("{}/tenants/guild-9/auto-role", server.base_url))
        .json(&json!({ "role_id": "newcomer" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let written: Value =
        serde_json::from_slice(&std::fs::read(&server.tenants_path).unwrap()).unwrap();
    assert_eq!(written["guild-9"]["auto_role_id"], "newcomer");

    let config = server.get_json("/config").await;
    assert_eq!(config["auth"]["method"], "none");
    assert_eq!(config["bridge"]["token_configured"], false);
}

#[tokio::test]
async fn test_invalid_startup_configs_exit_with_error() {
    // Missing file.
    assert_exits_with_error(None).await;

    // No [auth] section.
    assert_exits_with_error(Some("[server]\nport = 8080\n")).await;

    // api_key auth with an empty key.
    assert_exits_with_error(Some("[auth]\nmethod = \"api_key\"\napi_key = \"\"\n")).await;

    // Zero loop interval.
    assert_exits_with_error(Some(
        "[auth]\nmethod = \"none\"\n\n[engine]\nstatus_interval_secs = 0\n",
    ))
    .await;
}
