use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub bootstrap: Option<BootstrapUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub name: Option<String>,
    pub users_collection: String,
    pub games_collection: String,
    pub max_pool_size: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
}

// Keep the signing secret out of debug output.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// User created at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Environment-dependent defaults, overridden by explicit variables.
struct Preset {
    max_pool_size: u32,
    connect_timeout_secs: u64,
    bcrypt_cost: u32,
}

impl Preset {
    fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                max_pool_size: 10,
                connect_timeout_secs: 30,
                bcrypt_cost: 10,
            },
            Environment::Staging => Self {
                max_pool_size: 20,
                connect_timeout_secs: 10,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            Environment::Production => Self {
                max_pool_size: 50,
                connect_timeout_secs: 5,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }
}

pub const DEFAULT_EXPIRE_MINUTES: i64 = 15;
/// One year.
pub const MAX_EXPIRE_MINUTES: i64 = 525_600;
pub const DEFAULT_PORT: u16 = 8000;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup("APP_ENV").as_deref());

        Ok(Self {
            environment,
            server: ServerConfig::from_lookup(&lookup)?,
            database: DatabaseConfig::from_lookup(environment, &lookup)?,
            security: SecurityConfig::from_lookup(environment, &lookup)?,
            bootstrap: BootstrapUser::from_lookup(&lookup),
        })
    }
}

impl ServerConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let host = lookup("GAMES_API_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("GAMES_API_PORT").or_else(|| lookup("PORT")) {
            Some(v) => parse_value("GAMES_API_PORT", &v)?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| env::var(key).ok();
        let environment = Environment::parse(lookup("APP_ENV").as_deref());
        Self::from_lookup(environment, &lookup)
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(
        environment: Environment,
        lookup: &F,
    ) -> Result<Self, ConfigError> {
        let preset = Preset::for_environment(environment);

        let backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("mongo") | Some("mongodb") => StoreBackend::Mongo,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let url = lookup("MONGO_DETAILS");
        // DATABEASE is the historical spelling still found in deployed .env files.
        let name = lookup("DATABASE").or_else(|| lookup("DATABEASE"));

        if backend == StoreBackend::Mongo {
            if url.is_none() {
                return Err(ConfigError::Missing("MONGO_DETAILS"));
            }
            if name.is_none() {
                return Err(ConfigError::Missing("DATABASE"));
            }
        }

        let mut config = Self {
            backend,
            url,
            name,
            users_collection: "user".to_string(),
            games_collection: "game".to_string(),
            max_pool_size: preset.max_pool_size,
            connect_timeout_secs: preset.connect_timeout_secs,
        };

        if let Some(v) = lookup("DATABASE_MAX_POOL_SIZE") {
            config.max_pool_size = parse_value("DATABASE_MAX_POOL_SIZE", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = parse_value("DATABASE_CONNECT_TIMEOUT_SECS", &v)?;
        }

        Ok(config)
    }
}

impl SecurityConfig {
    pub fn new(secret_key: impl Into<String>, algorithm: Algorithm, access_token_expire_minutes: i64) -> Self {
        Self {
            secret_key: secret_key.into(),
            algorithm,
            access_token_expire_minutes,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(
        environment: Environment,
        lookup: &F,
    ) -> Result<Self, ConfigError> {
        let preset = Preset::for_environment(environment);

        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let algorithm = match lookup("ALGORITHM") {
            Some(v) => parse_algorithm(&v)?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => parse_value("ACCESS_TOKEN_EXPIRE_MINUTES", &v)?,
            None => DEFAULT_EXPIRE_MINUTES,
        };
        if !(1..=MAX_EXPIRE_MINUTES).contains(&access_token_expire_minutes) {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_expire_minutes.to_string(),
            });
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(v) => parse_value("BCRYPT_COST", &v)?,
            None => preset.bcrypt_cost,
        };

        Ok(Self {
            secret_key,
            algorithm,
            access_token_expire_minutes,
            bcrypt_cost,
        })
    }
}

impl BootstrapUser {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<Self> {
        let username = lookup("BOOTSTRAP_USERNAME")?;
        let password = lookup("BOOTSTRAP_PASSWORD")?;
        let email = lookup("BOOTSTRAP_EMAIL").unwrap_or_else(|| format!("{}@localhost", username));
        Some(Self { username, password, email })
    }
}

/// Only HMAC algorithms make sense with a shared secret key.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            key: "ALGORITHM",
            value: value.to_string(),
        }),
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
