// handlers/public/token.rs - POST /token (OAuth2 password flow)

use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use serde::Deserialize;

use crate::auth::{verify_password, AccessToken, AuthError};
use crate::error::{ApiError, ApiResult};
use crate::handlers::form_rejection;
use crate::state::AppState;

/// OAuth2 password-grant form. `grant_type`, `scope` and client fields are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /token - Exchange username/password for a bearer token
///
/// Unknown users and wrong passwords get the same 401 so the response does
/// not reveal which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<AccessToken>> {
    let Form(form) = form.map_err(form_rejection)?;

    let Some(user) = state.users.find_user(&form.username).await? else {
        tracing::warn!("Login failed: unknown user '{}'", form.username);
        return Err(AuthError::InvalidCredentials.into());
    };

    // bcrypt verification blocks for tens of milliseconds.
    let hashed = user.hashed_password.clone();
    let password = form.password;
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;

    if !valid {
        tracing::warn!("Login failed: wrong password for '{}'", user.username);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue(&user.username)?;
    tracing::info!("Issued access token for '{}'", user.username);
    Ok(Json(token))
}
