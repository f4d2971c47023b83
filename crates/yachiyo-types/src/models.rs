use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form descriptive fields carried alongside the typed ones.
/// Stored as a JSON object and flattened back into the record on the wire.
pub type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub title: String,
    pub seats: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A booking is keyed to its owner by email. `room_id` is not checked
/// against the rooms table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub email: String,
    pub date: NaiveDate,
    pub room_id: Uuid,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub idx: i64,
    pub rating: u8,
    pub comment: String,
    #[serde(flatten)]
    pub extra: Extra,
}
