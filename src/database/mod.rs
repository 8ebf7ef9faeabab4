pub mod memory;
pub mod models;
pub mod mongo;
pub mod sort;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use models::{Game, GameUpdate, StoredGame, UserInDb};
use sort::GameQuery;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Errors from the store backends
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

impl From<mongodb::bson::ser::Error> for DatabaseError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for DatabaseError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

/// Access to the `user` collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<UserInDb>, DatabaseError>;

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: UserInDb) -> Result<(), DatabaseError>;

    /// Returns false when no such user exists.
    async fn set_disabled(&self, username: &str, disabled: bool) -> Result<bool, DatabaseError>;
}

/// Access to the `game` collection.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert_game(&self, game: Game) -> Result<StoredGame, DatabaseError>;

    async fn find_game(&self, id: &ObjectId) -> Result<Option<StoredGame>, DatabaseError>;

    async fn list_games(&self, query: GameQuery) -> Result<Vec<StoredGame>, DatabaseError>;

    /// Returns the document after the update, or `None` if it does not exist.
    async fn update_game(&self, id: &ObjectId, update: GameUpdate) -> Result<Option<StoredGame>, DatabaseError>;

    /// Returns false when nothing was deleted.
    async fn delete_game(&self, id: &ObjectId) -> Result<bool, DatabaseError>;
}

/// Liveness probe used by `/health`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Shared store handles for the process.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub games: Arc<dyn GameStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            games: store.clone(),
            health: store,
        }
    }

    pub async fn mongo(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let store = Arc::new(MongoStore::connect(config).await?);
        store.ensure_indexes().await;
        Ok(Self {
            users: store.clone(),
            games: store.clone(),
            health: store,
        })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match config.backend {
            StoreBackend::Mongo => Self::mongo(config).await,
            StoreBackend::Memory => {
                info!("Using in-memory store; data is lost on exit");
                Ok(Self::memory())
            }
        }
    }
}
