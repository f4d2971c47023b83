use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use tracing::{debug, info};
use uuid::Uuid;

use yachiyo_types::api::{
    BookingQuery, Claims, DeleteResult, InsertResult, NewBooking, UpdateBookingDateRequest,
    UpdateResult,
};
use yachiyo_types::models::Booking;

use crate::AppState;
use crate::error::{ApiError, ApiResult, blocking};

/// GET /bookings: all bookings, or only those for `?email=`.
///
/// The filter is not tied to the caller's token; any valid token may list
/// any email's bookings.
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<BookingQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Booking>>> {
    let Query(query) = query?;
    // An empty `?email=` means no filter
    let email = query.email.filter(|e| !e.is_empty());
    debug!(
        "Listing bookings for {:?} (token owner {:?})",
        email,
        claims.email()
    );

    let bookings = blocking(move || state.db.list_bookings(email.as_deref())).await?;
    Ok(Json(bookings))
}

/// POST /bookings: store a booking. Seat capacity is only touched by
/// checkout, not here.
pub async fn create_booking(
    State(state): State<AppState>,
    body: Result<Json<NewBooking>, JsonRejection>,
) -> ApiResult<Json<InsertResult>> {
    let Json(booking) = body?;
    validate_email(&booking.email)?;

    let inserted_id = blocking(move || state.db.insert_booking(&booking)).await?;
    info!("Created booking {}", inserted_id);

    Ok(Json(InsertResult {
        acknowledged: true,
        inserted_id,
    }))
}

/// DELETE /bookings/{id}: a missing booking reports `deletedCount: 0`.
pub async fn delete_booking(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeleteResult>> {
    let Path(id) = path?;
    let deleted_count = blocking(move || state.db.delete_booking(&id)).await?;
    if deleted_count > 0 {
        info!("Deleted booking {}", id);
    }

    Ok(Json(DeleteResult {
        acknowledged: true,
        deleted_count,
    }))
}

/// PUT /bookings/{id}: overwrite the booking date.
pub async fn update_booking_date(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateBookingDateRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateResult>> {
    let Path(id) = path?;
    let Json(req) = body?;

    let (matched_count, modified_count) =
        blocking(move || state.db.update_booking_date(&id, req.new_date)).await?;

    Ok(Json(UpdateResult {
        acknowledged: true,
        matched_count,
        modified_count,
    }))
}

fn validate_email(email: &str) -> ApiResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid email: {:?}", email)))
    }
}
