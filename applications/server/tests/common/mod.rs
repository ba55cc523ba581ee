//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chirp_core::User;
use chirp_server::{
    create_router,
    services::{
        users::{self, RegisterRequest},
        AuthService,
    },
    state::AppState,
};
use chirp_storage::Database;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Test user credentials
pub mod fixtures {
    pub const TEST_PASSWORD: &str = "TestPassword123!";
    pub const JWT_SECRET: &str = "test-secret-key";
}

/// Full application over a throwaway SQLite file
pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let db = Arc::new(Database::connect(&db_url).await.unwrap());

        let auth_service = Arc::new(
            AuthService::new(fixtures::JWT_SECRET.to_string(), 1, 1).with_bcrypt_cost(4),
        );

        let router = create_router(AppState::new(Arc::clone(&db), Arc::clone(&auth_service)));

        Self {
            router,
            db,
            auth_service,
            _temp_dir: temp_dir,
        }
    }

    /// Insert an active, verified user with [`fixtures::TEST_PASSWORD`]
    pub async fn create_user(&self, username: &str, superuser: bool) -> User {
        let mut tx = self.db.begin().await.unwrap();
        let user = users::create_account(
            &mut tx,
            &self.auth_service,
            RegisterRequest {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password: fixtures::TEST_PASSWORD.to_string(),
            },
            superuser,
            true,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        user
    }

    pub fn token_for(&self, user: &User) -> String {
        self.auth_service.create_access_token(&user.id).unwrap()
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.dispatch(builder.body(body).unwrap()).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Send a pre-encoded body with an explicit content type
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.dispatch(request).await
    }

    /// Number of rows in `table`
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }
}
