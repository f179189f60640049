//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                          - Web client (static/index.html)
//! GET    /static/*                  - Web client assets
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (database)
//!
//! # Auth
//! POST   /api/register              - Create account (needs verification code)
//! POST   /api/login                 - Issue session token
//!
//! # Bookmarks (Authorization: Bearer <token>)
//! GET    /api/bookmarks             - List in display order
//! POST   /api/bookmarks             - Create
//! PUT    /api/bookmarks/{id}        - Partial update
//! DELETE /api/bookmarks/{id}        - Delete
//! POST   /api/bookmarks/reorder     - Rewrite order from an id list
//! POST   /api/bookmarks/{id}/pin    - Toggle pin
//! ```

pub mod auth;
pub mod bookmarks;
pub mod extract;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/bookmarks", get(bookmarks::list).post(bookmarks::create))
        .route("/bookmarks/reorder", post(bookmarks::reorder))
        .route(
            "/bookmarks/{id}",
            put(bookmarks::update).delete(bookmarks::delete),
        )
        .route("/bookmarks/{id}/pin", post(bookmarks::toggle_pin))
        .fallback(api_not_found)
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    account_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors_layer())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
