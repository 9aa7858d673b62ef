//! Database layer for nutri-core.

mod schema;
mod accounts;
mod patients;
mod questionnaires;
mod visits;
mod intake;

pub use schema::*;
#[allow(unused_imports)]
pub use accounts::*;
#[allow(unused_imports)]
pub use patients::*;
#[allow(unused_imports)]
pub use questionnaires::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid decimal value: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self { conn };
        db.initialize()?;
        tracing::info!(path = %path.as_ref().display(), "Opened database");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Insert a practitioner account with a fixed ID, for fixtures that
/// reference it as a patient's or visit's practitioner.
#[cfg(test)]
pub(crate) fn seed_practitioner(db: &Database, account_id: &str) {
    use crate::models::{Account, Role};

    let account = Account {
        account_id: account_id.to_string(),
        ..Account::new(&format!("{account_id}@example.com"), account_id.into(), Role::Practitioner)
    };
    db.insert_account(&account).unwrap();
}
