use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Game, GameUpdate, StoredGame};
use crate::database::sort::{GameQuery, GameSort, SortDirection, SortField};
use crate::error::{ApiError, ApiResult};
use crate::handlers::{json_rejection, query_rejection};
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of games; 0 or absent returns everything. A negative
    /// value counts by its magnitude.
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<ListQuery> for GameQuery {
    fn from(query: ListQuery) -> Self {
        let direction = query
            .sort_order
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default();

        GameQuery {
            sort: query
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .map(|field| GameSort { field, direction }),
            limit: query
                .limit
                .map(|n| u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX)),
        }
    }
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::bad_request("Invalid game ID"))
}

fn game_not_found() -> ApiError {
    ApiError::not_found("Game not found")
}

/// POST /games/ - Create a game
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<Game>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredGame>)> {
    let Json(game) = payload.map_err(json_rejection)?;

    let stored = state.games.insert_game(game).await?;
    tracing::info!("Game {} created by '{}'", stored.id, user.username);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /games/ - List games with optional sort and limit
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<StoredGame>>> {
    let Query(query) = query.map_err(query_rejection)?;
    let games = state.games.list_games(query.into()).await?;
    Ok(Json(games))
}

/// GET /games/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<StoredGame>> {
    let id = parse_id(&id)?;
    state
        .games
        .find_game(&id)
        .await?
        .map(Json)
        .ok_or_else(game_not_found)
}

/// PUT /games/:id - Set the supplied fields; others stay as they are
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<GameUpdate>, JsonRejection>,
) -> ApiResult<Json<StoredGame>> {
    let id = parse_id(&id)?;
    let Json(update) = payload.map_err(json_rejection)?;

    let updated = state
        .games
        .update_game(&id, update)
        .await?
        .ok_or_else(game_not_found)?;
    tracing::info!("Game {} updated by '{}'", id, user.username);
    Ok(Json(updated))
}

/// DELETE /games/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;

    if !state.games.delete_game(&id).await? {
        return Err(game_not_found());
    }
    tracing::info!("Game {} deleted by '{}'", id, user.username);
    Ok(Json(json!({ "message": "Game deleted successfully" })))
}
