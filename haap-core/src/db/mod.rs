//! SQLite persistence for the location hierarchy, users, children,
//! usage logs, releases and the message log.
//!
//! All access goes through [`Database`], a cloneable handle around a single
//! connection. Operations that touch more than one row run inside one
//! transaction via [`Database::with_transaction`].

pub mod schema;

mod apk;
mod cascade;
mod children;
mod enrollment;
mod locations;
mod messages;
mod reports;
mod usage;
mod users;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Datelike, Local, SecondsFormat, SubsecRound, Utc};
use directories::ProjectDirs;
use rusqlite::{Connection, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{HaapError, Result};

pub use cascade::parse_id;
pub use users::normalize_whatsapp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                HaapError::Config(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        Ok(Self::from_connection(conn))
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "haap", "haap")
            .ok_or_else(|| HaapError::Config("no home directory for default database".into()))?;
        Ok(dirs.data_dir().join("haap.db"))
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self::from_connection(conn);
        db.migrate()?;
        Ok(db)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn migrate(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(schema::SCHEMA)?;
            Ok(())
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside one transaction; it commits only if `f` succeeds.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| HaapError::LockPoisoned)
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(row: &Row, col: &str, msg: String) -> rusqlite::Error {
    let idx = row.as_ref().column_index(col).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

pub(crate) fn uuid_col(row: &Row, col: &str) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(col)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(row, col, e.to_string()))
}

pub(crate) fn datetime_col(row: &Row, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, col, e.to_string()))
}

pub(crate) fn enum_col<T>(row: &Row, col: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    parse(&raw).ok_or_else(|| conversion_error(row, col, format!("unknown value '{}'", raw)))
}

pub(crate) fn count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<u64> {
    let n: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(n as u64)
}
