use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Extra;

// -- JWT Claims --

/// Token claims: whatever object the client posted to `/jwt`, plus the
/// issue and expiry timestamps the server stamps on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub payload: Extra,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.payload.get("email").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub status: bool,
}

// -- Rooms --

/// Seed entry for the rooms table. There is no HTTP route that creates rooms.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    pub title: String,
    pub seats: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Bookings --

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub email: String,
    pub date: NaiveDate,
    pub room_id: Uuid,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookingDateRequest {
    pub new_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingQuery {
    pub email: Option<String>,
}

// -- Reviews --

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub idx: i64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub room_id: Option<i64>,
}

// -- Write results --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
