pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

pub use queries::SeatReservation;

const READER_POOL_SIZE: usize = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle over the booking database: one writer connection plus a small
/// round-robin pool of read-only connections.
///
/// Opened once at startup and shared behind an `Arc`. Call [`Database::close`]
/// once the last clone is gone to release the file cleanly.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.busy_timeout(BUSY_TIMEOUT)?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Private in-memory database. Every query runs on the writer connection,
    /// since separate in-memory connections would not share data.
    pub fn open_in_memory() -> Result<Self> {
        let writer = Connection::open_in_memory()?;
        migrations::run(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| anyhow!("Reader lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| anyhow!("Writer lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn close(self) -> Result<()> {
        for reader in self.readers {
            let conn = reader
                .into_inner()
                .map_err(|e| anyhow!("Reader lock poisoned: {}", e))?;
            conn.close().map_err(|(_, e)| e)?;
        }

        let writer = self
            .writer
            .into_inner()
            .map_err(|e| anyhow!("Writer lock poisoned: {}", e))?;
        writer.close().map_err(|(_, e)| e)?;

        info!("Database closed");
        Ok(())
    }
}
