use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{BlockedPeriod, TimeRange};
use crate::state::AppState;

// GET /api/blocked-periods
pub async fn list_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BlockedPeriod>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let periods = state.store()?.list_blocked()?;
    Ok(Json(periods))
}

// POST /api/blocked-periods
#[derive(Deserialize)]
pub struct BlockRequest {
    pub staff_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub reason: String,
}

pub async fn create_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BlockRequest>,
) -> Result<(StatusCode, Json<BlockedPeriod>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.staff_id.trim().is_empty() {
        return Err(AppError::BadRequest("staff_id is required".to_string()));
    }
    if TimeRange::checked(body.start, body.end).is_none() {
        return Err(AppError::BadRequest("end must be after start".to_string()));
    }

    let period = BlockedPeriod {
        id: state.scheduler.ids().next_id(),
        staff_id: body.staff_id,
        start: body.start,
        end: body.end,
        reason: body.reason,
    };
    state.store()?.insert_blocked(period.clone())?;

    tracing::info!("staff {} blocked {} to {}", period.staff_id, period.start, period.end);
    Ok((StatusCode::CREATED, Json(period)))
}

// DELETE /api/blocked-periods/:id
pub async fn delete_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if !state.store()?.remove_blocked(&id)? {
        return Err(AppError::NotFound(format!("blocked period {id}")));
    }
    Ok(Json(serde_json::json!({"ok": true})))
}
