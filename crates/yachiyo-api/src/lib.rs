pub mod auth;
pub mod bookings;
pub mod error;
pub mod middleware;
pub mod reviews;
pub mod rooms;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use yachiyo_db::Database;

use crate::auth::AuthSettings;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub auth: AuthSettings,
}

/// All HTTP routes. Only `GET /bookings` sits behind the token check.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/jwt", post(auth::issue_token))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/details/{id}", get(rooms::get_room))
        .route(
            "/rooms/checkout/{id}",
            get(rooms::get_room).put(rooms::checkout),
        )
        .route("/bookings", post(bookings::create_booking))
        .route(
            "/bookings/{id}",
            put(bookings::update_booking_date).delete(bookings::delete_booking),
        )
        .route(
            "/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        );

    let protected_routes = Router::new()
        .route("/bookings", get(bookings::list_bookings))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn root() -> &'static str {
    "Yachiyo server is running...."
}
