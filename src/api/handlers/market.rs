use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::AppState;

/// GET /api/market/status: calendar view at the current instant.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let now = Utc::now();
    let calendar = state.engine.calendar();

    Json(json!({
        "market_open": calendar.is_market_open(now),
        "can_evaluate": calendar.can_evaluate_now(now),
        "evaluation_date": calendar.evaluation_date_for(now).to_string(),
        "timezone": calendar.config().zone.name(),
    }))
}
