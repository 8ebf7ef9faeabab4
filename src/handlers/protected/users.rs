use axum::{Extension, Json};

use crate::database::models::User;
use crate::middleware::CurrentUser;

/// GET /users/me - The user the bearer token belongs to
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}
