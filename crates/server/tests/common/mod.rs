//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock collaborators injected, so commands and events can be driven
//! through HTTP without a platform bridge, yt-dlp or a game server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use steward_core::{
    create_authenticator, load_config_from_str,
    testing::{MemoryConfigStore, MockPlatform, MockProber, MockResolver, MockVoiceGateway},
    Authenticator, Collaborators, Engine, EngineConfig, TenantSettings,
};

/// Re-export fixtures for test convenience
pub use steward_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_play() {
///     let fixture = TestFixture::new().await;
///     fixture.resolver.add("song", fixtures::media("Song")).await;
///
///     let response = fixture.post("/api/v1/tenants/t1/playback/play", json!({
///         "voice_channel_id": "v1",
///         "query": "song"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The engine behind the router, for driving loop cycles directly
    pub engine: Arc<Engine>,
    /// Mock chat platform - inspect posted messages, configure reactions
    pub platform: Arc<MockPlatform>,
    /// Mock voice gateway - inspect streams, set channel members
    pub voice: Arc<MockVoiceGateway>,
    /// Mock media resolver - register query results
    pub resolver: Arc<MockResolver>,
    /// Mock status prober - configure endpoint status
    pub prober: Arc<MockProber>,
    /// In-memory tenant settings document
    pub store: Arc<MemoryConfigStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks and no auth.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let config_toml = match &test_config.api_key {
            Some(key) => format!("[auth]\nmethod = \"api_key\"\napi_key = \"{}\"\n", key),
            None => "[auth]\nmethod = \"none\"\n".to_string(),
        };
        let config = load_config_from_str(&config_toml).expect("Failed to parse test config");
        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );

        // Create mocks
        let platform = Arc::new(MockPlatform::new());
        let voice = Arc::new(MockVoiceGateway::new());
        let resolver = Arc::new(MockResolver::new());
        let prober = Arc::new(MockProber::new());
        let store = Arc::new(MemoryConfigStore::new());

        let settings = Arc::new(
            TenantSettings::load(Arc::clone(&store) as Arc<dyn steward_core::ConfigStore>)
                .expect("Failed to load settings"),
        );
        let engine = Arc::new(Engine::new(
            &EngineConfig {
                call_timeout_secs: 1,
                ..Default::default()
            },
            settings,
            Collaborators {
                platform: platform.clone(),
                voice: voice.clone(),
                resolver: resolver.clone(),
                prober: prober.clone(),
            },
        ));

        let state = Arc::new(steward_server::state::AppState::new(
            config,
            authenticator,
            Arc::clone(&engine),
        ));
        let router = steward_server::api::create_router(state);

        Self {
            router,
            engine,
            platform,
            voice,
            resolver,
            prober,
            store,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, None).await
    }

    /// Send a GET request with a bearer token.
    pub async fn get_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.request("GET", path, None, Some(key)).await
    }

    /// Fetch a non-JSON endpoint and return the raw text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
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

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        key: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(key) = key {
            request_builder = request_builder.header("Authorization", format!("Bearer {}", key));
        }

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

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Require this API key on protected routes
    pub api_key: Option<String>,
}

impl TestConfig {
    /// Create config with API key auth enabled.
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
        }
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
