//! Database row types. These map directly to SQLite rows and are converted
//! into the shared `yachiyo-types` records before leaving this crate.

use anyhow::{Context, Result};
use yachiyo_types::models::{Booking, Extra, Review, Room};

pub struct RoomRow {
    pub id: String,
    pub title: String,
    pub seats: i64,
    pub extra: String,
}

pub struct BookingRow {
    pub id: String,
    pub email: String,
    pub date: String,
    pub room_id: String,
    pub extra: String,
}

pub struct ReviewRow {
    pub id: String,
    pub idx: i64,
    pub rating: i64,
    pub comment: String,
    pub extra: String,
}

/// Keys the server owns on every record. A client-supplied `id` in the
/// passthrough fields would shadow the real one on the wire.
const RESERVED_EXTRA_KEYS: &[&str] = &["id"];

pub(crate) fn encode_extra(extra: &Extra) -> Result<String> {
    let mut extra = extra.clone();
    for key in RESERVED_EXTRA_KEYS {
        extra.remove(*key);
    }
    Ok(serde_json::to_string(&extra)?)
}

fn parse_extra(raw: &str, id: &str) -> Result<Extra> {
    let mut extra: Extra =
        serde_json::from_str(raw).with_context(|| format!("Corrupt extra fields on '{}'", id))?;
    for key in RESERVED_EXTRA_KEYS {
        extra.remove(*key);
    }
    Ok(extra)
}

impl TryFrom<RoomRow> for Room {
    type Error = anyhow::Error;

    fn try_from(row: RoomRow) -> Result<Self> {
        Ok(Room {
            id: row.id.parse().with_context(|| format!("Corrupt room id '{}'", row.id))?,
            seats: u32::try_from(row.seats)
                .with_context(|| format!("Corrupt seat count {} on room '{}'", row.seats, row.id))?,
            extra: parse_extra(&row.extra, &row.id)?,
            title: row.title,
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = anyhow::Error;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Booking {
            id: row.id.parse().with_context(|| format!("Corrupt booking id '{}'", row.id))?,
            date: row
                .date
                .parse()
                .with_context(|| format!("Corrupt date '{}' on booking '{}'", row.date, row.id))?,
            room_id: row.room_id.parse().with_context(|| {
                format!("Corrupt room_id '{}' on booking '{}'", row.room_id, row.id)
            })?,
            extra: parse_extra(&row.extra, &row.id)?,
            email: row.email,
        })
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = anyhow::Error;

    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Review {
            id: row.id.parse().with_context(|| format!("Corrupt review id '{}'", row.id))?,
            rating: u8::try_from(row.rating)
                .with_context(|| format!("Corrupt rating {} on review '{}'", row.rating, row.id))?,
            extra: parse_extra(&row.extra, &row.id)?,
            idx: row.idx,
            comment: row.comment,
        })
    }
}
