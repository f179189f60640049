//! Bookmark routes. All of them require a session token.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use pinmark_core::{BookmarkId, BookmarkPatch};

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Bookmark, NewBookmark};
use crate::state::AppState;

/// Reorder request body.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub bookmark_ids: Vec<BookmarkId>,
}

/// GET /api/bookmarks
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<Json<Vec<Bookmark>>> {
    let bookmarks = state.bookmarks().list(account.id).await?;
    Ok(Json(bookmarks))
}

/// POST /api/bookmarks
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    ApiJson(body): ApiJson<NewBookmark>,
) -> Result<(StatusCode, Json<Bookmark>)> {
    let bookmark = state.bookmarks().create(account.id, body).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// PUT /api/bookmarks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    ApiPath(id): ApiPath<BookmarkId>,
    ApiJson(patch): ApiJson<BookmarkPatch>,
) -> Result<Json<Bookmark>> {
    let bookmark = state.bookmarks().update(account.id, id, patch).await?;
    Ok(Json(bookmark))
}

/// DELETE /api/bookmarks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    ApiPath(id): ApiPath<BookmarkId>,
) -> Result<Json<Value>> {
    state.bookmarks().delete(account.id, id).await?;
    Ok(Json(json!({ "message": "Bookmark deleted successfully" })))
}

/// POST /api/bookmarks/reorder
///
/// Ids the caller does not own are ignored; the response does not say which.
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    ApiJson(body): ApiJson<ReorderRequest>,
) -> Result<Json<Value>> {
    state
        .bookmarks()
        .reorder(account.id, &body.bookmark_ids)
        .await?;
    Ok(Json(json!({ "message": "Bookmarks reordered successfully" })))
}

/// POST /api/bookmarks/{id}/pin
pub async fn toggle_pin(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    ApiPath(id): ApiPath<BookmarkId>,
) -> Result<Json<Bookmark>> {
    let bookmark = state.bookmarks().toggle_pin(account.id, id).await?;
    Ok(Json(bookmark))
}
