//! Durable client storage: a string key/value store in a WAL-mode SQLite file.
//!
//! Plays the role a browser's local storage plays for a web client. Every
//! consumer receives an explicit [`LocalStorage`] handle created once at startup.

use std::path::Path;
use std::time::Duration;

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// `busy_timeout` is set via the `Connection` method rather than a PRAGMA
/// string so it takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: impl AsRef<Path>) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path.as_ref()).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Cloneable handle to the key/value store.
///
/// Reads and writes are serialized on the connection's background thread, so
/// a read-modify-write performed by one caller between two awaits is never
/// interleaved with another write from the same process.
#[derive(Clone)]
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database at `path` and wraps it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, tokio_rusqlite::Error> {
        Ok(Self::new(open_db(path).await?))
    }

    /// Returns the value stored under `key`, if any.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, tokio_rusqlite::Error> {
        let key = key.to_owned();
        self.conn
            .call(move |db| {
                let value = db
                    .query_row(
                        "SELECT value FROM kv_store WHERE key = ?1",
                        rusqlite::params![&key],
                        |r| r.get::<_, String>(0),
                    )
                    .optional()?;
                Ok::<_, rusqlite::Error>(value)
            })
            .await
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), tokio_rusqlite::Error> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO kv_store (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key)
                     DO UPDATE SET value = excluded.value,
                                   updated_at = excluded.updated_at",
                    rusqlite::params![&key, &value, now_millis()],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
    }

    /// Deletes `key`. Removing an absent key is not an error.
    pub async fn remove_item(&self, key: &str) -> Result<(), tokio_rusqlite::Error> {
        let key = key.to_owned();
        self.conn
            .call(move |db| {
                db.execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![&key])?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
    }
}
