//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a temporary SQLite store and a mock feed, enabling end-to-end tests
//! without network access.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use holocron_core::config::{
    AuthConfig, AuthMethod, DatabaseConfig, FeedConfig, ServerConfig, SyncConfig,
};
use holocron_core::testing::MockFeedSource;
use holocron_core::{create_authenticator, Authenticator, CatalogService, Config, SqliteMovieStore};

/// Re-export fixtures for test convenience
pub use holocron_core::testing::fixtures;

pub const ADMIN_KEY: &str = "admin-secret";
pub const USER_KEY: &str = "user-secret";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_movie_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/movies", json!({ ... })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock feed - configure the payload returned to sync
    pub feed: Arc<MockFeedSource>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
    /// Key sent with every request, if any
    api_key: Mutex<Option<String>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Use api_key auth with [`ADMIN_KEY`] and [`USER_KEY`] instead of none
    pub api_key_auth: bool,
}

impl TestFixture {
    /// Create a new test fixture with `none` auth.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let auth = if test_config.api_key_auth {
            AuthConfig {
                method: AuthMethod::ApiKey,
                admin_key: Some(ADMIN_KEY.to_string()),
                user_key: Some(USER_KEY.to_string()),
            }
        } else {
            AuthConfig {
                method: AuthMethod::None,
                admin_key: None,
                user_key: None,
            }
        };

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            feed: FeedConfig::default(),
            sync: SyncConfig {
                enabled: false,
                ..Default::default()
            },
        };

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );
        let store = Arc::new(SqliteMovieStore::new(&db_path).expect("Failed to create store"));
        let feed = Arc::new(MockFeedSource::new());
        let catalog = Arc::new(CatalogService::new(store, feed.clone()));

        let state = Arc::new(holocron_server::state::AppState::new(
            config,
            authenticator,
            catalog,
        ));
        let router = holocron_server::api::create_router(state);

        Self {
            router,
            feed,
            temp_dir,
            api_key: Mutex::new(None),
        }
    }

    /// Send subsequent requests with the given key in `Authorization: Bearer`.
    pub fn set_key(&self, key: Option<&str>) {
        *self.api_key.lock().unwrap() = key.map(str::to_string);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = self
            .builder("POST", path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a text body (for the metrics endpoint).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = self.builder("GET", path).body(Body::empty()).unwrap();
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
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    fn builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match self.api_key.lock().unwrap().as_deref() {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = self.builder(method, path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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
