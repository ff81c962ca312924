#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use fieldform_api::ai::{AiConfig, Generator};
use fieldform_api::auth::jwt::{generate_access_token, JwtConfig};
use fieldform_api::config::ServerConfig;
use fieldform_api::router::build_app_router;
use fieldform_api::state::AppState;
use fieldform_core::roles::Role;
use fieldform_core::types::DbId;
use fieldform_db::JsonStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// A router over a fresh store in a temporary directory.
///
/// The directory lives as long as this value.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<JsonStore>,
    pub config: ServerConfig,
    _dir: TempDir,
}

/// A user holding a valid access token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: DbId,
    pub role: Role,
    pub token: String,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(dir: &TempDir, ai: AiConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_dir: dir.path().to_path_buf(),
        seed_demo_forms: false,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        ai,
    }
}

/// Build the full application router with offline schema generation.
pub async fn build_test_app() -> TestApp {
    build_test_app_with_ai(AiConfig::disabled()).await
}

/// Build the full application router, mirroring `main.rs`, so integration
/// tests exercise the same middleware stack production uses.
pub async fn build_test_app_with_ai(ai: AiConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, ai);
    build_test_app_from(dir, config).await
}

/// Build the application over `dir` with a caller-adjusted `config`.
pub async fn build_test_app_from(dir: TempDir, config: ServerConfig) -> TestApp {
    let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
        generator: Arc::new(Generator::new(config.ai.clone())),
    };

    TestApp {
        router: build_app_router(state),
        store,
        config,
        _dir: dir,
    }
}

impl TestApp {
    /// Mint a token for a new user with `role`.
    pub fn user(&self, role: Role) -> TestUser {
        let id = Uuid::new_v4();
        let token = generate_access_token(id, role, &self.config.jwt).unwrap();
        TestUser { id, role, token }
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Response<Body> {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post_json(&self, uri: &str, user: &TestUser, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, user: &TestUser, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> Response<Body> {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// Send a request without credentials.
    pub async fn anonymous(&self, method: Method, uri: &str) -> Response<Body> {
        self.send(method, uri, None, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", user.token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Create a form as `owner` and return its id.
    pub async fn create_form(&self, owner: &TestUser, body: Value) -> DbId {
        let response = self.post_json("/api/v1/forms", owner, body).await;
        assert_eq!(response.status(), 201, "form creation failed");
        let json = body_json(response).await;
        json["data"]["id"].as_str().unwrap().parse().unwrap()
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A pole inspection form body with a voltage threshold.
pub fn pole_form(assigned_to: &[DbId]) -> Value {
    serde_json::json!({
        "title": "Pole Inspection",
        "description": "Monthly pole check",
        "schema": {
            "title": "Pole Inspection",
            "fields": [
                { "name": "inspector_name", "label": "Inspector Name", "type": "string", "required": true },
                { "name": "voltage", "label": "Voltage", "type": "number", "required": true,
                  "min": 0, "max": 1000, "notifyIf": ">400" },
                { "name": "pole_condition", "label": "Pole Condition", "type": "select", "required": true,
                  "options": ["Good", "Fair", "Poor"] },
                { "name": "remarks", "label": "Remarks", "type": "textarea" }
            ]
        },
        "assigned_to": assigned_to
    })
}
