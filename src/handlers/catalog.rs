use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{Service, ServiceKind, MAX_SERVICE_MINUTES};
use crate::state::AppState;

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let services = state.store()?.list_services()?;
    Ok(Json(services))
}

#[derive(Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub kind: ServiceKind,
    pub duration_minutes: i64,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if body.duration_minutes <= 0 || body.duration_minutes > MAX_SERVICE_MINUTES {
        return Err(AppError::BadRequest(format!(
            "duration_minutes must be between 1 and {MAX_SERVICE_MINUTES}"
        )));
    }

    let service = Service {
        id: state.scheduler.ids().next_id(),
        name: body.name,
        kind: body.kind,
        duration_minutes: body.duration_minutes,
    };
    state.store()?.insert_service(service.clone())?;

    Ok((StatusCode::CREATED, Json(service)))
}
