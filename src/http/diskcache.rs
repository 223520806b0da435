//! Persistent response cache backed by SQLite.
//!
//! Same contract and freshness rules as [`MemoryCache`](super::httpcache::MemoryCache),
//! but entries survive restarts, which is what makes the offline fallback
//! useful on a cold start.

use crate::base::clock::{Clock, SystemClock};
use crate::base::neterror::NetError;
use crate::http::httpcache::{CacheEntry, ResponseCache};
use crate::http::response::{Mime, Payload};
use crate::urlrequest::fingerprint::Fingerprint;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
    fingerprint TEXT PRIMARY KEY NOT NULL,
    mime TEXT NOT NULL,
    payload BLOB NOT NULL,
    expires_at INTEGER NOT NULL
)";

/// SQLite-backed [`ResponseCache`].
///
/// Storage failures are logged and treated as misses; the engine never
/// fails a request because the cache could not be read or written.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    /// Open (or create) a cache database at `path`.
    pub fn open(path: &Path) -> Result<Self, NetError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// A cache that lives only as long as this value.
    pub fn in_memory() -> Result<Self, NetError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, NetError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use another time source for freshness checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> Result<usize, NetError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, NetError> {
        Ok(self.len()? == 0)
    }

    /// Drop every entry that expired before now. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, NetError> {
        let now = self.clock.now();
        let removed = self
            .conn()
            .execute("DELETE FROM responses WHERE expires_at <= ?1", params![now])?;
        Ok(removed)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, NetError> {
        let row = self
            .conn()
            .query_row(
                "SELECT mime, payload, expires_at FROM responses WHERE fingerprint = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(mime, payload, expires_at)| {
            let mime = Mime::parse(&mime).unwrap_or_default();
            let payload = Payload::parse(mime, &Bytes::from(payload));
            CacheEntry {
                fingerprint: key.clone(),
                payload,
                mime,
                expires_at,
            }
        }))
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), NetError> {
        self.conn().execute(
            "INSERT OR REPLACE INTO responses (fingerprint, mime, payload, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.fingerprint.as_str(),
                entry.mime.as_str(),
                entry.payload.to_bytes().to_vec(),
                entry.expires_at
            ],
        )?;
        Ok(())
    }
}

impl ResponseCache for SqliteCache {
    fn get(&self, key: &Fingerprint, allow_stale: bool) -> Option<CacheEntry> {
        match self.read(key) {
            Ok(Some(entry)) if allow_stale || entry.is_fresh(self.clock.now()) => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(fingerprint = %key, error = %e, "cache read failed");
                None
            }
        }
    }

    fn set(&self, entry: CacheEntry) {
        if let Err(e) = self.write(&entry) {
            tracing::warn!(fingerprint = %entry.fingerprint, error = %e, "cache write failed");
        }
    }

    fn delete(&self, key: &Fingerprint) {
        if let Err(e) = self
            .conn()
            .execute("DELETE FROM responses WHERE fingerprint = ?1", params![key.as_str()])
        {
            tracing::warn!(fingerprint = %key, error = %e, "cache delete failed");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.conn().execute("DELETE FROM responses", []) {
            tracing::warn!(error = %e, "cache clear failed");
        }
    }
}
