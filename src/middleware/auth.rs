use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated, active user resolved from the bearer token
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Bearer authentication middleware for protected routes.
///
/// Verifies the token, loads the user it names and rejects disabled accounts.
/// On success the user is injected as a `CurrentUser` request extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await.map_err(|e| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        e
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_bearer(headers).ok_or(AuthError::MissingToken)?;
    let claims = state.tokens.verify(token)?;

    let user = state
        .users
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| AuthError::UnknownUser(claims.sub.clone()))?;

    if user.is_disabled() {
        return Err(AuthError::InactiveUser.into());
    }
    Ok(user.into())
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
