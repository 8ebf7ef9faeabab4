use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use jsonwebtoken::Algorithm;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::{AppConfig, DatabaseConfig, Environment, SecurityConfig, ServerConfig, StoreBackend};
use crate::database::Stores;
use crate::router::app;
use crate::services::{register_user, NewUser};
use crate::state::AppState;

/// In-process application over the memory store, with user `alice` / `wonderland`.
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
}

pub fn test_config() -> AppConfig {
    let mut security = SecurityConfig::new("test-secret", Algorithm::HS256, 15);
    security.bcrypt_cost = 4;

    AppConfig {
        environment: Environment::Development,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            url: None,
            name: None,
            users_collection: "user".to_string(),
            games_collection: "game".to_string(),
            max_pool_size: 1,
            connect_timeout_secs: 1,
        },
        security,
        bootstrap: None,
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let state = AppState::new(test_config(), Stores::memory());

        register_user(
            state.users.as_ref(),
            NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                full_name: Some("Alice Liddell".to_string()),
                password: "wonderland".to_string(),
            },
            state.config.security.bcrypt_cost,
        )
        .await
        .expect("seed user");

        let app = app(state.clone());
        Self { state, app }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible router")
    }

    /// Send a request and decode the JSON body (Null when empty).
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, token, body).await;
        read_json(response).await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request");
        let response = self.app.clone().oneshot(request).await.expect("infallible router");
        read_json(response).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post_form("/token", &format!("username={}&password={}", username, password))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().expect("access_token").to_string()
    }

    /// Create a game and return its `_id`.
    pub async fn create_game(&self, token: &str, game: Value) -> String {
        let (status, body) = self.send(Method::POST, "/games/", Some(token), Some(game)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["_id"].as_str().expect("_id").to_string()
    }
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
