#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// Every test gets its own router over a fresh `MemoryStore`, so tests run
/// in parallel without a database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use kanban_api::{
    app::{build_router, AppState},
    config::Config,
};
use kanban_shared::store::{memory::MemoryStore, ranking::RankPolicy};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-secret-at-least-32-bytes";

/// Test context holding the router under test
pub struct TestContext {
    pub app: Router,
    pub config: Config,
}

/// A registered user and their token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Response status plus parsed JSON body (`Value::Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Context with the default (append) rank policy
    pub fn new() -> Self {
        Self::with_policy(RankPolicy::Append)
    }

    pub fn with_policy(policy: RankPolicy) -> Self {
        let policy_name = policy.to_string();
        let config = Config::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "RANK_POLICY" => Some(policy_name.clone()),
            _ => None,
        })
        .expect("test configuration");

        let store = Arc::new(MemoryStore::new(config.storage.rank_policy));
        let app = build_router(AppState::new(store, config.clone()));

        Self { app, config }
    }

    /// Sends a request; `token` becomes a bearer `Authorization` header
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse { status, body }
    }

    /// Registers a user with a unique email
    pub async fn register(&self) -> TestUser {
        let email = format!("user-{}@example.com", Uuid::new_v4());
        let response = self
            .request(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({ "email": email, "password": "password123", "name": "Test User" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        TestUser {
            id: Uuid::parse_str(response.body["user_id"].as_str().unwrap()).unwrap(),
            token: response.body["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a board and returns its ID
    pub async fn create_board(&self, user: &TestUser, name: &str) -> Uuid {
        let response = self
            .request(Method::POST, "/v1/boards", Some(&user.token), Some(json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        id_of(&response.body)
    }

    /// A board's columns, by rank
    pub async fn columns(&self, user: &TestUser, board_id: Uuid) -> Vec<Value> {
        let response = self
            .request(
                Method::GET,
                &format!("/v1/boards/{}/columns", board_id),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body.as_array().unwrap().clone()
    }

    /// Creates a task and returns its ID
    pub async fn create_task(&self, user: &TestUser, board_id: Uuid, column_id: Uuid, title: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/v1/tasks",
                Some(&user.token),
                Some(json!({ "title": title, "board_id": board_id, "column_id": column_id })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        id_of(&response.body)
    }

    /// A board's tasks, by rank
    pub async fn tasks(&self, user: &TestUser, board_id: Uuid) -> Vec<Value> {
        let response = self
            .request(
                Method::GET,
                &format!("/v1/boards/{}/tasks", board_id),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body.as_array().unwrap().clone()
    }
}

/// Reads the `id` field of a JSON object as a UUID
pub fn id_of(value: &Value) -> Uuid {
    Uuid::parse_str(value["id"].as_str().unwrap()).unwrap()
}
