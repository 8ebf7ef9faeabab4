use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tokio::sync::RwLock;

use super::models::{Game, GameUpdate, StoredGame, UserInDb};
use super::sort::{GameQuery, SortDirection};
use super::{DatabaseError, GameStore, HealthCheck, UserStore};

/// In-process store for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserInDb>>,
    // Kept in insertion order, which is also `_id` order.
    games: RwLock<Vec<StoredGame>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mongo's cross-type ordering, restricted to the JSON types a game can hold:
/// missing/null < numbers < strings < objects < arrays < booleans.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_key(game: &Game, path: &str) -> Option<Value> {
    let value = serde_json::to_value(game).ok()?;
    let pointer = format!("/{}", path.replace('.', "/"));
    value.pointer(&pointer).cloned()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserInDb>, DatabaseError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, user: UserInDb) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(DatabaseError::Conflict(format!(
                "user '{}' already exists",
                user.username
            )));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn set_disabled(&self, username: &str, disabled: bool) -> Result<bool, DatabaseError> {
        match self.users.write().await.get_mut(username) {
            Some(user) => {
                user.disabled = Some(disabled);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert_game(&self, game: Game) -> Result<StoredGame, DatabaseError> {
        let stored = StoredGame {
            id: ObjectId::new(),
            game,
        };
        self.games.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_game(&self, id: &ObjectId) -> Result<Option<StoredGame>, DatabaseError> {
        Ok(self.games.read().await.iter().find(|g| g.id == *id).cloned())
    }

    async fn list_games(&self, query: GameQuery) -> Result<Vec<StoredGame>, DatabaseError> {
        let mut games = self.games.read().await.clone();

        if let Some(sort) = query.sort {
            let path = sort.field.path();
            let mut keyed: Vec<(Option<Value>, StoredGame)> = games
                .into_iter()
                .map(|g| (sort_key(&g.game, path), g))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = compare_values(a.as_ref(), b.as_ref());
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
            games = keyed.into_iter().map(|(_, g)| g).collect();
        }

        if let Some(limit) = query.effective_limit() {
            games.truncate(limit);
        }
        Ok(games)
    }

    async fn update_game(&self, id: &ObjectId, update: GameUpdate) -> Result<Option<StoredGame>, DatabaseError> {
        let mut games = self.games.write().await;
        Ok(games.iter_mut().find(|g| g.id == *id).map(|stored| {
            stored.game.apply(update);
            stored.clone()
        }))
    }

    async fn delete_game(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        let mut games = self.games.write().await;
        let before = games.len();
        games.retain(|g| g.id != *id);
        Ok(games.len() < before)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sort::{GameSort, SortField};
    use serde_json::json;

    fn game(name: &str, price: Option<f64>) -> Game {
        Game {
            name: name.to_string(),
            price: price.map(|p| {
                json!({ "base": p })
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            }),
            ..Default::default()
        }
    }

    fn user(username: &str) -> UserInDb {
        UserInDb {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: None,
            disabled: None,
            hashed_password: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_game_crud() {
        let store = MemoryStore::new();

        let created = store.insert_game(game("Halo", Some(20.0))).await.unwrap();
        let found = store.find_game(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);

        let updated = store
            .update_game(
                &created.id,
                GameUpdate {
                    badge: Some("sale".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.game.badge.as_deref(), Some("sale"));
        assert_eq!(updated.game.name, "Halo");

        assert!(store.delete_game(&created.id).await.unwrap());
        assert!(!store.delete_game(&created.id).await.unwrap());
        assert!(store.find_game(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_game() {
        let store = MemoryStore::new();
        let result = store
            .update_game(&ObjectId::new(), GameUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_price_with_limit() {
        let store = MemoryStore::new();
        store.insert_game(game("B", Some(30.0))).await.unwrap();
        store.insert_game(game("A", Some(10.0))).await.unwrap();
        store.insert_game(game("C", None)).await.unwrap();
        store.insert_game(game("D", Some(20.0))).await.unwrap();

        let sort = GameSort {
            field: SortField::Price,
            direction: SortDirection::Asc,
        };
        let names: Vec<String> = store
            .list_games(GameQuery { sort: Some(sort), limit: None })
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.game.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "D", "B"]);

        let sort = GameSort {
            field: SortField::Price,
            direction: SortDirection::Desc,
        };
        let names: Vec<String> = store
            .list_games(GameQuery { sort: Some(sort), limit: Some(2) })
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.game.name)
            .collect();
        assert_eq!(names, vec!["B", "D"]);
    }

    #[tokio::test]
    async fn test_list_sorted_by_ratings_percentage() {
        let store = MemoryStore::new();
        for (name, percentage) in [("Okay", Some(60)), ("Great", Some(95)), ("Unrated", None), ("Good", Some(80))] {
            let mut g = game(name, None);
            g.ratings = percentage.map(|p| json!({ "percentage": p }).as_object().cloned().unwrap_or_default());
            store.insert_game(g).await.unwrap();
        }

        let sort = GameSort {
            field: SortField::Ratings,
            direction: SortDirection::Desc,
        };
        let names: Vec<String> = store
            .list_games(GameQuery { sort: Some(sort), limit: None })
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.game.name)
            .collect();
        assert_eq!(names, vec!["Great", "Good", "Okay", "Unrated"]);
    }

    #[tokio::test]
    async fn test_list_defaults_to_insertion_order() {
        let store = MemoryStore::new();
        store.insert_game(game("Zelda", None)).await.unwrap();
        store.insert_game(game("Asteroids", None)).await.unwrap();

        let names: Vec<String> = store
            .list_games(GameQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.game.name)
            .collect();
        assert_eq!(names, vec!["Zelda", "Asteroids"]);
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        store.create_user(user("alice")).await.unwrap();

        let err = store.create_user(user("alice")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));

        assert!(store.set_disabled("alice", true).await.unwrap());
        assert!(!store.set_disabled("bob", true).await.unwrap());
        assert!(store.find_user("alice").await.unwrap().unwrap().is_disabled());
    }
}
