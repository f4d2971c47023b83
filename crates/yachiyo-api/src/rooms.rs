use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::{info, warn};
use uuid::Uuid;

use yachiyo_db::SeatReservation;
use yachiyo_types::api::MessageResponse;
use yachiyo_types::models::Room;

use crate::AppState;
use crate::error::{ApiError, ApiResult, blocking};

/// GET /rooms: every room, unpaginated, in insertion order.
pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<Room>>> {
    let rooms = blocking(move || state.db.list_rooms()).await?;
    Ok(Json(rooms))
}

/// GET /rooms/details/{id} and GET /rooms/checkout/{id}.
pub async fn get_room(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Room>> {
    let Path(id) = path?;
    blocking(move || state.db.get_room(&id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Room not found"))
}

/// PUT /rooms/checkout/{id}: take one seat.
pub async fn checkout(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let outcome = blocking(move || state.db.reserve_seat(&id))
        .await
        .map_err(|e| e.with_public("Failed to book"))?;

    reservation_response(id, outcome).map(Json)
}

fn reservation_response(id: Uuid, outcome: SeatReservation) -> ApiResult<MessageResponse> {
    match outcome {
        SeatReservation::Reserved => {
            info!("Reserved a seat in room {}", id);
            Ok(MessageResponse {
                message: "Booking successful".to_string(),
            })
        }
        SeatReservation::SoldOut => {
            warn!("Checkout rejected, room {} is sold out", id);
            Err(ApiError::Conflict("No seats available"))
        }
        SeatReservation::RoomMissing => Err(ApiError::NotFound("Room not found")),
    }
}
