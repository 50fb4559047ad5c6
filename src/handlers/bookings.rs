use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{Booking, BookingDraft, BookingStatus, PaymentStatus, TimeRange};
use crate::services::{Candidate, DropOutcome, DropTarget, RecurrenceRule};
use crate::state::AppState;
use crate::store::BookingStore;

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub staff_id: Option<String>,
    pub status: Option<BookingStatus>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let bookings = state.store()?.list()?;
    let bookings = bookings
        .into_iter()
        .filter(|b| query.staff_id.as_deref().map_or(true, |s| b.staff_id == s))
        .filter(|b| query.status.map_or(true, |s| b.status == s))
        .collect();

    Ok(Json(bookings))
}

/// Form fields for a new or edited booking. Everything is optional here;
/// required fields are enforced when the draft is finalized.
#[derive(Deserialize, Default)]
pub struct BookingRequest {
    pub customer_id: Option<String>,
    pub staff_id: Option<String>,
    pub service_id: Option<String>,
    pub resource_id: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub pickup_location: Option<String>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub group_size: Option<u32>,
    pub participants: Option<Vec<String>>,
    pub recurrence: Option<RecurrenceRule>,
}

fn apply_request(
    mut draft: BookingDraft,
    req: BookingRequest,
    store: &dyn BookingStore,
) -> Result<BookingDraft, AppError> {
    if let Some(customer_id) = req.customer_id {
        draft = draft.with_customer(customer_id);
    }
    if let Some(staff_id) = req.staff_id {
        draft = draft.with_staff(staff_id);
    }
    if req.resource_id.is_some() {
        draft = draft.with_resource(req.resource_id);
    }
    if req.pickup_location.is_some() {
        draft = draft.with_pickup(req.pickup_location);
    }
    if let Some(status) = req.status {
        draft = draft.with_status(status);
    }
    if let Some(payment_status) = req.payment_status {
        draft = draft.with_payment_status(payment_status);
    }
    if req.group_size.is_some() || req.participants.is_some() {
        draft = draft.with_group(req.group_size, req.participants);
    }
    if let Some(start) = req.start {
        draft = draft.starting_at(start);
    }

    // The service decides the duration. An edit whose service has since been
    // removed from the catalogue keeps its previous duration.
    let explicit = req.service_id.is_some();
    if let Some(service_id) = req.service_id.or_else(|| draft.service_id().map(str::to_string)) {
        match store.get_service(&service_id)? {
            Some(service) => draft = draft.with_service(&service),
            None if explicit => return Err(AppError::NotFound(format!("service {service_id}"))),
            None => {}
        }
    }

    Ok(draft)
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut body): Json<BookingRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let recurrence = body.recurrence.take();
    let mut store = state.store()?;
    let draft = apply_request(BookingDraft::new(), body, store.as_ref())?;

    match recurrence {
        Some(rule) => {
            let expansion = state.scheduler.create_series(store.as_mut(), draft, rule)?;
            Ok((StatusCode::CREATED, Json(expansion)).into_response())
        }
        None => {
            let booking = state.scheduler.create(store.as_mut(), draft)?;
            Ok((StatusCode::CREATED, Json(booking)).into_response())
        }
    }
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<BookingRequest>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut store = state.store()?;
    let existing = store
        .get(&id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    let draft = apply_request(BookingDraft::from_booking(&existing), body, store.as_ref())?;
    let booking = state.scheduler.edit(store.as_mut(), draft)?;

    Ok(Json(booking))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut store = state.store()?;
    state.scheduler.delete(store.as_mut(), &id)?;

    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: BookingStatus,
}

pub async fn set_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut store = state.store()?;
    let booking = state.scheduler.set_status(store.as_mut(), &id, body.status)?;

    Ok(Json(booking))
}

// POST /api/bookings/:id/drop
#[derive(Deserialize)]
pub struct DropRequest {
    pub date: NaiveDate,
    pub minutes_of_day: Option<u32>,
    #[serde(default)]
    pub copy: bool,
}

pub async fn drop_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DropRequest>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let target = DropTarget {
        date: body.date,
        minutes_of_day: body.minutes_of_day,
    };
    let outcome = {
        let mut store = state.store()?;
        state
            .scheduler
            .reschedule(store.as_mut(), &id, target, body.copy)?
    };

    let response = match outcome {
        DropOutcome::Move(booking) => (
            StatusCode::OK,
            Json(serde_json::json!({"action": "move", "booking": booking})),
        ),
        DropOutcome::Copy(booking) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"action": "copy", "booking": booking})),
        ),
        DropOutcome::Reject(conflict) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"action": "reject", "error": conflict.to_string()})),
        ),
    };
    Ok(response.into_response())
}

// POST /api/conflicts/check
#[derive(Deserialize)]
pub struct ConflictCheckRequest {
    pub id: Option<String>,
    pub staff_id: Option<String>,
    pub resource_id: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub async fn check_conflict(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ConflictCheckRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let range = TimeRange::checked(body.start, body.end)
        .ok_or_else(|| AppError::BadRequest("end must be after start".to_string()))?;
    let candidate = Candidate {
        id: body.id.as_deref(),
        staff_id: body.staff_id.as_deref(),
        resource_id: body.resource_id.as_deref(),
        ..Candidate::new(range)
    };

    let conflict = {
        let store = state.store()?;
        state.scheduler.check(store.as_ref(), &candidate)?
    };

    Ok(Json(serde_json::json!({
        "conflict": conflict.is_some(),
        "reason": conflict.map(|c| c.to_string()),
    })))
}
