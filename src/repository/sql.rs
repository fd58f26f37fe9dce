use super::entities::Event;
use super::interface::RepositoryProvider;
use super::migrations::COMMANDS;
use super::DEFAULT_RECENT_LIMIT;
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::io::{Error, ErrorKind, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum DatabaseStorage {
    Ram,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Warehouse {
    pool: SqlitePool,
}

impl Warehouse {
    /// Create a new Warehouse connected to SQLite database.
    /// A file database and its parent directory are created when missing.
    ///
    pub async fn new(dbs: DatabaseStorage) -> Result<Self> {
        let (options, pool_options) = match dbs {
            DatabaseStorage::Ram => {
                let Ok(options) = SqliteConnectOptions::from_str("sqlite::memory:") else {
                    return Err(Error::new(ErrorKind::InvalidInput, "bad memory url"));
                };
                // A memory database lives as long as its connection does.
                let pool_options = SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);
                (options, pool_options)
            }
            DatabaseStorage::Path(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete);
                (options, SqlitePoolOptions::new())
            }
        };

        let pool = match pool_options.connect_with(options).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!(error = %e, "cannot open event store");
                return Err(Error::new(ErrorKind::NotConnected, "connection error"));
            }
        };
        Ok(Self { pool })
    }
}

impl RepositoryProvider for Warehouse {
    async fn migrate(&self) -> Result<()> {
        let Ok(mut conn) = self.pool.acquire().await else {
            return Err(Error::new(
                ErrorKind::ConnectionRefused,
                "cannot acquire connection",
            ));
        };
        for migration in COMMANDS {
            if let Err(e) = sqlx::query(migration).execute(&mut *conn).await {
                tracing::error!(error = %e, "migration failed");
                return Err(Error::new(ErrorKind::Interrupted, "cannot migrate"));
            };
        }
        Ok(())
    }

    /// Insert single event stamped with the current UTC time.
    ///
    async fn insert_event(&self, message: &str) -> Result<Event> {
        let Ok(mut conn) = self.pool.acquire().await else {
            return Err(Error::new(ErrorKind::NotConnected, "cannot acquire pool"));
        };
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let done = match sqlx::query("INSERT INTO events (ts, message) VALUES (?1, ?2)")
            .bind(&timestamp)
            .bind(message)
            .execute(&mut *conn)
            .await
        {
            Ok(done) => done,
            Err(e) => {
                tracing::error!(error = %e, "insert failed");
                return Err(Error::new(ErrorKind::Interrupted, "cannot execute query"));
            }
        };

        Ok(Event {
            id: done.last_insert_rowid(),
            timestamp,
            message: message.to_string(),
        })
    }

    /// Gets at most `limit` newest events, newest first.
    /// The limit never exceeds DEFAULT_RECENT_LIMIT.
    ///
    async fn recent_events(&self, limit: usize) -> Result<Vec<Event>> {
        let Ok(mut conn) = self.pool.acquire().await else {
            return Err(Error::new(ErrorKind::NotConnected, "cannot acquire pool"));
        };
        let limit = limit.min(DEFAULT_RECENT_LIMIT) as i64;

        match sqlx::query_as::<_, Event>(
            "SELECT id, ts AS timestamp, message FROM events ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        {
            Ok(events) => Ok(events),
            Err(e) => {
                tracing::error!(error = %e, "listing events failed");
                Err(Error::new(ErrorKind::Interrupted, "cannot execute query"))
            }
        }
    }

    async fn count_events(&self) -> Result<i64> {
        let Ok(mut conn) = self.pool.acquire().await else {
            return Err(Error::new(ErrorKind::NotConnected, "cannot acquire pool"));
        };
        let Ok(n) = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&mut *conn)
            .await
        else {
            return Err(Error::new(ErrorKind::Interrupted, "cannot execute query"));
        };

        Ok(n)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
