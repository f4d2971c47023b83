use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use yachiyo_types::api::{NewBooking, NewReview, NewRoom};
use yachiyo_types::models::{Booking, Review, Room};

use crate::Database;
use crate::models::{BookingRow, ReviewRow, RoomRow, encode_extra};

/// Outcome of a single checkout attempt against a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatReservation {
    Reserved,
    SoldOut,
    RoomMissing,
}

impl Database {
    // -- Rooms --

    pub fn insert_room(&self, room: &NewRoom) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let extra = encode_extra(&room.extra)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO rooms (id, title, seats, extra) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.to_string(), room.title, room.seats, extra],
            )?;
            Ok(id)
        })
    }

    /// Load rooms from a JSON array file, but only into an empty table.
    /// Returns how many rooms were inserted.
    pub fn seed_rooms(&self, path: &Path) -> Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read room seed file {}", path.display()))?;
        let rooms: Vec<NewRoom> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid room seed file {}", path.display()))?;

        let inserted = self.with_conn_mut(|conn| {
            let existing: i64 = conn.query_row("SELECT COUNT(*) FROM rooms", [], |r| r.get(0))?;
            if existing > 0 {
                return Ok(0);
            }

            let tx = conn.unchecked_transaction()?;
            for room in &rooms {
                tx.execute(
                    "INSERT INTO rooms (id, title, seats, extra) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![
                        Uuid::new_v4().to_string(),
                        room.title,
                        room.seats,
                        encode_extra(&room.extra)?,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(rooms.len())
        })?;

        if inserted > 0 {
            info!("Seeded {} rooms from {}", inserted, path.display());
        } else {
            debug!("Rooms table already populated, skipping seed");
        }
        Ok(inserted)
    }

    pub fn list_rooms(&self) -> Result<Vec<Room>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, title, seats, extra FROM rooms ORDER BY rowid")?;
            let rows = stmt
                .query_map([], room_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Room::try_from).collect()
        })
    }

    pub fn get_room(&self, id: &Uuid) -> Result<Option<Room>> {
        self.with_conn(|conn| query_room(conn, id))
    }

    /// Take one seat from a room.
    ///
    /// The decrement and the `seats > 0` check are a single statement on the
    /// writer connection, so concurrent checkouts can never oversell.
    pub fn reserve_seat(&self, id: &Uuid) -> Result<SeatReservation> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE rooms SET seats = seats - 1 WHERE id = ?1 AND seats > 0",
                [id.to_string()],
            )?;
            if changed == 1 {
                return Ok(SeatReservation::Reserved);
            }

            let exists = conn
                .query_row("SELECT 1 FROM rooms WHERE id = ?1", [id.to_string()], |_| Ok(()))
                .optional()?
                .is_some();
            Ok(if exists {
                SeatReservation::SoldOut
            } else {
                SeatReservation::RoomMissing
            })
        })
    }

    // -- Bookings --

    pub fn list_bookings(&self, email: Option<&str>) -> Result<Vec<Booking>> {
        self.with_conn(|conn| {
            let rows = match email {
                Some(email) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, email, date, room_id, extra FROM bookings
                         WHERE email = ?1 ORDER BY rowid",
                    )?;
                    stmt.query_map([email], booking_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, email, date, room_id, extra FROM bookings ORDER BY rowid",
                    )?;
                    stmt.query_map([], booking_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
            };
            rows.into_iter().map(Booking::try_from).collect()
        })
    }

    pub fn insert_booking(&self, booking: &NewBooking) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let extra = encode_extra(&booking.extra)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO bookings (id, email, date, room_id, extra) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.to_string(),
                    booking.email,
                    booking.date.to_string(),
                    booking.room_id.to_string(),
                    extra,
                ],
            )?;
            Ok(id)
        })
    }

    /// Returns the number of bookings removed (0 or 1).
    pub fn delete_booking(&self, id: &Uuid) -> Result<u64> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM bookings WHERE id = ?1", [id.to_string()])?;
            Ok(deleted as u64)
        })
    }

    /// Overwrite a booking's date. Returns `(matched, modified)`: a booking
    /// that already has `date` is matched but not modified.
    pub fn update_booking_date(&self, id: &Uuid, date: NaiveDate) -> Result<(u64, u64)> {
        self.with_conn_mut(|conn| {
            let modified = conn.execute(
                "UPDATE bookings SET date = ?2 WHERE id = ?1 AND date IS NOT ?2",
                [id.to_string(), date.to_string()],
            )? as u64;
            if modified > 0 {
                return Ok((modified, modified));
            }

            let matched: i64 = conn.query_row(
                "SELECT COUNT(*) FROM bookings WHERE id = ?1",
                [id.to_string()],
                |r| r.get(0),
            )?;
            Ok((matched as u64, 0))
        })
    }

    // -- Reviews --

    pub fn list_reviews(&self, idx: Option<i64>) -> Result<Vec<Review>> {
        self.with_conn(|conn| {
            let rows = match idx {
                Some(idx) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, idx, rating, comment, extra FROM reviews
                         WHERE idx = ?1 ORDER BY rowid",
                    )?;
                    stmt.query_map([idx], review_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, idx, rating, comment, extra FROM reviews ORDER BY rowid",
                    )?;
                    stmt.query_map([], review_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
            };
            rows.into_iter().map(Review::try_from).collect()
        })
    }

    pub fn insert_review(&self, review: &NewReview) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let extra = encode_extra(&review.extra)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO reviews (id, idx, rating, comment, extra) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id.to_string(), review.idx, review.rating, review.comment, extra],
            )?;
            Ok(id)
        })
    }
}

fn query_room(conn: &Connection, id: &Uuid) -> Result<Option<Room>> {
    let mut stmt = conn.prepare("SELECT id, title, seats, extra FROM rooms WHERE id = ?1")?;
    let row = stmt.query_row([id.to_string()], room_row).optional()?;
    row.map(Room::try_from).transpose()
}

fn room_row(row: &Row<'_>) -> rusqlite::Result<RoomRow> {
    Ok(RoomRow {
        id: row.get(0)?,
        title: row.get(1)?,
        seats: row.get(2)?,
        extra: row.get(3)?,
    })
}

fn booking_row(row: &Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: row.get(0)?,
        email: row.get(1)?,
        date: row.get(2)?,
        room_id: row.get(3)?,
        extra: row.get(4)?,
    })
}

fn review_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        idx: row.get(1)?,
        rating: row.get(2)?,
        comment: row.get(3)?,
        extra: row.get(4)?,
    })
}
