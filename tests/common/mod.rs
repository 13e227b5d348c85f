#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tagmark::config::{AuthConfig, Config, LookupConfig};
use tagmark::tagging::TagSuggestionSource;

pub const PASSWORD: &str = "hunter2hunter2";

/// Encyclopedia stand-in that answers every query with fixed titles.
pub struct StubSource {
    titles: Vec<String>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TagSuggestionSource for StubSource {
    async fn lookup(&self, _query: &str) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.titles.clone()
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: ([127, 0, 0, 1], 0).into(),
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl: chrono::Duration::minutes(30),
            bcrypt_cost: 4,
        },
        cors_origins: vec!["http://localhost:3000".to_string()],
        lookup: LookupConfig {
            enabled: false,
            ..Default::default()
        },
    }
}

pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub source: Arc<StubSource>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_source(StubSource::new(&[])).await
    }

    pub async fn with_source(source: Arc<StubSource>) -> Self {
        let pool = memory_pool().await;
        let router = tagmark::build_app(pool.clone(), &test_config(), source.clone());
        Self {
            router,
            db: pool,
            source,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Create a user in the database and return its id.
    pub async fn create_user(&self, username: &str, role: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let hashed = tagmark::auth::hash_password(PASSWORD, 4).unwrap();

        sqlx::query(
            "INSERT INTO users (id, username, email, hashed_password, is_active, role, created_at) VALUES (?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(&hashed)
        .bind(role)
        .bind(&now)
        .execute(&self.db)
        .await
        .expect("Failed to create test user");

        id
    }

    /// Log in with the test password and return the bearer token.
    pub async fn login(&self, username: &str) -> String {
        let req = Request::builder()
            .uri("/auth/token")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={PASSWORD}")))
            .unwrap();

        let resp = self.request(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["token_type"], "bearer");
        json["access_token"].as_str().unwrap().to_string()
    }

    /// Create a user and log in. Returns (user_id, token).
    pub async fn signed_in(&self, username: &str) -> (String, String) {
        let id = self.create_user(username, "user").await;
        let token = self.login(username).await;
        (id, token)
    }

    /// Send a GET request with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send("GET", uri, None, token).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, body: serde_json::Value, token: Option<&str>) -> Response {
        self.send("POST", uri, Some(body), token).await
    }

    /// Send a PUT request with a JSON body.
    pub async fn put_json(&self, uri: &str, body: serde_json::Value, token: Option<&str>) -> Response {
        self.send("PUT", uri, Some(body), token).await
    }

    /// Send a DELETE request with an optional bearer token.
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send("DELETE", uri, None, token).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.request(builder.body(body).unwrap()).await
    }

    /// Create a bookmark through the API and return its JSON.
    pub async fn create_bookmark(&self, body: serde_json::Value, token: &str) -> serde_json::Value {
        let resp = self.post_json("/bookmarks", body, Some(token)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// Tag names of a bookmark response.
pub fn tag_names(bookmark: &serde_json::Value) -> Vec<String> {
    bookmark["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}
