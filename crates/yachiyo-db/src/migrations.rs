use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE rooms (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                seats       INTEGER NOT NULL CHECK (seats >= 0),
                extra       TEXT NOT NULL DEFAULT '{}'
            );

            -- No foreign key on room_id: bookings may reference rooms that
            -- were never seeded.
            CREATE TABLE bookings (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL,
                date        TEXT NOT NULL,
                room_id     TEXT NOT NULL,
                extra       TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_bookings_email ON bookings(email);

            CREATE TABLE reviews (
                id          TEXT PRIMARY KEY,
                idx         INTEGER NOT NULL,
                rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment     TEXT NOT NULL DEFAULT '',
                extra       TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_reviews_idx ON reviews(idx);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
