use thiserror::Error;
use tracing::info;

use crate::auth::{hash_password, AuthError};
use crate::config::BootstrapUser;
use crate::database::models::{User, UserInDb};
use crate::database::{DatabaseError, UserStore};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Input for out-of-band user creation (CLI and startup bootstrap).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
}

/// Shape check only: one `@` with a non-empty local part and domain, no
/// whitespace, and a domain without empty labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').all(|label| !label.is_empty())
}

/// Hash the password and store a new, enabled user.
pub async fn register_user(
    store: &dyn UserStore,
    new_user: NewUser,
    bcrypt_cost: u32,
) -> Result<User, UserServiceError> {
    let username = new_user.username.trim().to_string();
    if username.is_empty() {
        return Err(UserServiceError::EmptyUsername);
    }
    if new_user.password.is_empty() {
        return Err(UserServiceError::EmptyPassword);
    }
    let email = new_user.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(UserServiceError::InvalidEmail(email));
    }

    let password = new_user.password;
    let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password, bcrypt_cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))??;

    let user = UserInDb {
        username,
        email,
        full_name: new_user.full_name,
        disabled: Some(false),
        hashed_password,
    };
    store.create_user(user.clone()).await?;
    Ok(user.into())
}

/// Create the configured bootstrap user unless it already exists.
/// Returns true when a user was created.
pub async fn ensure_bootstrap_user(
    store: &dyn UserStore,
    bootstrap: &BootstrapUser,
    bcrypt_cost: u32,
) -> Result<bool, UserServiceError> {
    if store.find_user(&bootstrap.username).await?.is_some() {
        return Ok(false);
    }

    let new_user = NewUser {
        username: bootstrap.username.clone(),
        email: bootstrap.email.clone(),
        full_name: None,
        password: bootstrap.password.clone(),
    };
    match register_user(store, new_user, bcrypt_cost).await {
        Ok(_) => {
            info!("Created bootstrap user '{}'", bootstrap.username);
            Ok(true)
        }
        // Another instance won the race.
        Err(UserServiceError::Database(DatabaseError::Conflict(_))) => Ok(false),
        Err(e) => Err(e),
    }
}
