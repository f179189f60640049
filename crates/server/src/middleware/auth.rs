//! Bearer-token authentication extractor.
//!
//! Every bookmark route takes [`RequireAuth`]; the account it yields is the
//! owner filter for the whole request.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentAccount;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor that requires a valid session token.
///
/// Reads `Authorization: Bearer <token>`. A bare token without the scheme is
/// also accepted. Missing or invalid tokens reject with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("No authorization token".to_string()))?;

        let account = state
            .tokens()
            .validate(token)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        set_sentry_user(&account.id, account.username.as_str());
        tracing::Span::current().record("account_id", account.id.as_i64());

        Ok(Self(account))
    }
}

/// Token from the `Authorization` header, with any `Bearer ` scheme removed.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = match value.get(..BEARER_PREFIX.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_PREFIX) => {
            value.get(BEARER_PREFIX.len()..).unwrap_or_default()
        }
        _ if value.eq_ignore_ascii_case(BEARER_PREFIX.trim_end()) => "",
        _ => value,
    }
    .trim();
    (!token.is_empty()).then_some(token)
}
