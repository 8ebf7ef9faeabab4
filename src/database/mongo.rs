use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use tracing::{debug, info, warn};

use super::models::{Game, GameUpdate, StoredGame, UserInDb};
use super::sort::GameQuery;
use super::{DatabaseError, GameStore, HealthCheck, UserStore};
use crate::config::DatabaseConfig;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed store. The driver client is a connection pool and is cheap to clone.
pub struct MongoStore {
    db: Database,
    users: Collection<UserInDb>,
    games: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("MONGO_DETAILS"))?;
        let name = config
            .name
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE"))?;

        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client = Client::with_options(options)?;
        let db = client.database(name);
        info!("MongoDB client configured for database '{}'", name);

        Ok(Self {
            users: db.collection(&config.users_collection),
            games: db.collection(&config.games_collection),
            db,
        })
    }

    /// Usernames are unique. Index creation failure is logged, not fatal,
    /// so a legacy collection with duplicates still serves reads.
    pub async fn ensure_indexes(&self) {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match self.users.create_index(index).await {
            Ok(_) => debug!("Unique username index ensured"),
            Err(e) => warn!("Could not create unique username index: {}", e),
        }
    }
}

fn stored_game(mut document: Document) -> Result<StoredGame, DatabaseError> {
    let id = document
        .get_object_id("_id")
        .map_err(|e| DatabaseError::Serialization(format!("game _id: {}", e)))?;
    document.remove("_id");
    let game: Game = bson::from_document(document)?;
    Ok(StoredGame { id, game })
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserInDb>, DatabaseError> {
        Ok(self.users.find_one(doc! { "username": username }).await?)
    }

    async fn create_user(&self, user: UserInDb) -> Result<(), DatabaseError> {
        match self.users.insert_one(&user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(DatabaseError::Conflict(format!(
                "user '{}' already exists",
                user.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_disabled(&self, username: &str, disabled: bool) -> Result<bool, DatabaseError> {
        let result = self
            .users
            .update_one(
                doc! { "username": username },
                doc! { "$set": { "disabled": disabled } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl GameStore for MongoStore {
    async fn insert_game(&self, game: Game) -> Result<StoredGame, DatabaseError> {
        let id = ObjectId::new();
        let mut document = bson::to_document(&game)?;
        document.insert("_id", id);

        self.games.insert_one(document).await?;
        Ok(StoredGame { id, game })
    }

    async fn find_game(&self, id: &ObjectId) -> Result<Option<StoredGame>, DatabaseError> {
        self.games
            .find_one(doc! { "_id": *id })
            .await?
            .map(stored_game)
            .transpose()
    }

    async fn list_games(&self, query: GameQuery) -> Result<Vec<StoredGame>, DatabaseError> {
        let mut find = self.games.find(doc! {}).sort(query.sort_document());
        if let Some(limit) = query.effective_limit() {
            find = find.limit(limit as i64);
        }

        let documents: Vec<Document> = find.await?.try_collect().await?;
        documents.into_iter().map(stored_game).collect()
    }

    async fn update_game(&self, id: &ObjectId, update: GameUpdate) -> Result<Option<StoredGame>, DatabaseError> {
        if update.is_empty() {
            return self.find_game(id).await;
        }

        let set = bson::to_document(&update)?;
        self.games
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(stored_game)
            .transpose()
    }

    async fn delete_game(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        let result = self.games.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl HealthCheck for MongoStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
