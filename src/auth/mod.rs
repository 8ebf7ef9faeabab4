pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("Inactive user")]
    InactiveUser,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Body returned by `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Signs and verifies access tokens with the configured HMAC secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(security.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(security.secret_key.as_bytes()),
            algorithm: security.algorithm,
            ttl: Duration::try_minutes(security.access_token_expire_minutes).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, username: &str) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenGeneration("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: username.to_string(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims).map(|access_token| AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecurityConfig::new(secret, Algorithm::HS256, 15))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service("s3cret");
        let token = tokens.issue("alice").unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = tokens.verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("s3cret");
        let past = Utc::now() - Duration::hours(1);
        let token = tokens
            .sign(&Claims {
                sub: "alice".to_string(),
                exp: past.timestamp(),
                iat: (past - Duration::minutes(15)).timestamp(),
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service("s3cret");
        let token = tokens.issue("alice").unwrap().access_token;

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = service("s3cret").issue("mallory").unwrap().access_token;
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        assert!(matches!(tokens.verify(&tampered), Err(AuthError::InvalidToken(_))));
        assert!(matches!(tokens.verify("not.a.jwt"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("s3cret").issue("alice").unwrap().access_token;
        assert!(service("other").verify(&token).is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let tokens = TokenService::new(&SecurityConfig::new("s3cret", Algorithm::HS256, 200_000_000_000));
        assert!(matches!(tokens.issue("alice"), Err(AuthError::TokenGeneration(_))));

        let tokens = TokenService::new(&SecurityConfig::new("s3cret", Algorithm::HS256, i64::MAX));
        assert!(matches!(tokens.issue("alice"), Err(AuthError::TokenGeneration(_))));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = TokenService::new(&SecurityConfig::new("s3cret", Algorithm::HS512, 15));
        let token = hs512.issue("alice").unwrap().access_token;
        assert!(service("s3cret").verify(&token).is_err());
    }
}
