use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{blocked, bookings, catalog, health};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/bookings/:id",
            put(bookings::update_booking).delete(bookings::delete_booking),
        )
        .route("/bookings/:id/status", post(bookings::set_status))
        .route("/bookings/:id/drop", post(bookings::drop_booking))
        .route("/conflicts/check", post(bookings::check_conflict))
        .route(
            "/blocked-periods",
            get(blocked::list_blocked).post(blocked::create_blocked),
        )
        .route("/blocked-periods/:id", delete(blocked::delete_blocked))
        .route(
            "/services",
            get(catalog::list_services).post(catalog::create_service),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
