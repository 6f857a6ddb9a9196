use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{GameId, GameRecord};
use crate::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitGameRequest {
    pub owner_id: String,
    pub symbol: String,
    pub user_prediction: String,
}

#[derive(Debug, Deserialize)]
pub struct ListGamesQuery {
    pub owner_id: String,
}

/// POST /api/games: record a prediction, scoring it when results are ready.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitGameRequest>,
) -> Result<Json<ApiResponse<GameRecord>>, AppError> {
    let game = state
        .engine
        .submit(&body.owner_id, &body.symbol, &body.user_prediction, Utc::now())
        .await?;

    Ok(ApiResponse::ok(game))
}

/// GET /api/games?owner_id=: games of one owner.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<ApiResponse<Vec<GameRecord>>>, AppError> {
    if query.owner_id.trim().is_empty() {
        return Err(AppError::BadRequest("owner_id is required".into()));
    }

    let games = state.engine.list_for(&query.owner_id, Utc::now()).await?;
    Ok(ApiResponse::ok(games))
}

/// GET /api/games/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GameRecord>>, AppError> {
    let id: GameId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid game id {id:?}")))?;

    match state.engine.get(id, Utc::now()).await? {
        Some(game) => Ok(ApiResponse::ok(game)),
        None => Err(AppError::NotFound(format!("game {id}"))),
    }
}
