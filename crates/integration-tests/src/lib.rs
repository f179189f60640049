//! Integration test harness for Pinmark.
//!
//! Each [`TestApp`] is a real server bound to an ephemeral port on
//! `127.0.0.1`, backed by its own in-memory database. Tests talk to it over
//! HTTP with `reqwest`, exactly like the web client does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pinmark-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use pinmark_server::config::ServerConfig;
use pinmark_server::services::TokenService;
use pinmark_server::{AppState, app, db};

/// Registration code every test server accepts.
pub const REGISTRATION_CODE: &str = "integration-invite";

/// Signing key every test server uses.
pub const JWT_SECRET: &str = "Xq7#vB2!pL9@mN4$kR8^tW1&zY6*cF3e";

/// A running server plus a client pointed at it.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub pool: SqlitePool,
    /// Token service sharing the server's key, for forging test tokens.
    pub tokens: TokenService,
}

impl TestApp {
    /// Spawn a server with default test configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server after letting the caller adjust its configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let mut config = test_config();
        configure(&mut config);

        let pool = db::create_memory_pool()
            .await
            .expect("Failed to create in-memory database");
        let tokens = TokenService::new(&config.jwt_secret);
        let state = AppState::new(config, pool.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            client: Client::new(),
            pool,
            tokens,
        }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST /api/register with the valid code.
    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/register"))
            .json(&json!({
                "username": username,
                "password": password,
                "verification_code": REGISTRATION_CODE,
            }))
            .send()
            .await
            .expect("register request failed")
    }

    /// POST /api/login.
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed")
    }

    /// Register a fresh account and return its session token.
    pub async fn signup(&self, username: &str) -> String {
        let password = format!("{username}-pw");
        let resp = self.register(username, &password).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "register {username}");

        let resp = self.login(username, &password).await;
        assert_eq!(resp.status(), StatusCode::OK, "login {username}");
        let body: Value = resp.json().await.expect("login body");
        body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Authenticated request builder.
    pub fn authed(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(token)
    }

    /// Create a bookmark and return its JSON.
    pub async fn create_bookmark(&self, token: &str, title: &str) -> Value {
        let resp = self
            .authed(reqwest::Method::POST, "/api/bookmarks", token)
            .json(&json!({ "title": title, "url": format!("https://{title}.example") }))
            .send()
            .await
            .expect("create bookmark request failed");
        assert_eq!(resp.status(), StatusCode::CREATED, "create {title}");
        resp.json().await.expect("bookmark body")
    }

    /// List bookmarks as JSON values.
    pub async fn list_bookmarks(&self, token: &str) -> Vec<Value> {
        let resp = self
            .authed(reqwest::Method::GET, "/api/bookmarks", token)
            .send()
            .await
            .expect("list bookmarks request failed");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.expect("bookmark list body")
    }
}

/// Titles of a bookmark listing, in order.
#[must_use]
pub fn titles(bookmarks: &[Value]) -> Vec<String> {
    bookmarks
        .iter()
        .map(|b| b["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("sqlite::memory:".to_string()),
        host: [127, 0, 0, 1].into(),
        port: 0,
        jwt_secret: SecretString::from(JWT_SECRET.to_string()),
        registration_code: SecretString::from(REGISTRATION_CODE.to_string()),
        strict_reorder: false,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../server/static"),
        sentry_dsn: None,
        sentry_environment: None,
    }
}
