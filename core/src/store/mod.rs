//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Engine components call store methods — they never execute SQL directly.

mod booking;
mod ledger;
mod product;
mod rank;
mod wallet;

pub use booking::BookingRow;
pub use ledger::LedgerEntryRow;
pub use product::ProductRow;
pub use rank::{RankShareRow, UserRankRow};
pub use wallet::{WalletRow, WalletTxnRow};

use crate::{config::EngineConfig, error::EngineResult};
use rusqlite::Connection;

pub struct Store {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl Store {
    pub fn open(path: &str) -> EngineResult<Self> {
        Self::open_with_config(path, &EngineConfig::default())
    }

    pub fn open_with_config(path: &str, config: &EngineConfig) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(std::time::Duration::from_millis(config.db_busy_timeout_ms))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> EngineResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_marketplace.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_ranks.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_revenue_ledger.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_wallets.sql"))?;
        Ok(())
    }

    /// Unit of work: run `f` inside one SQLite transaction.
    ///
    /// BEGIN IMMEDIATE takes the write lock up front, so racing recomputes
    /// for the same database serialize rather than interleave their
    /// delete+insert sequences. Any error rolls the whole unit back.
    ///
    /// Not re-entrant — components called inside `f` must not open their
    /// own transaction.
    pub fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Store) -> EngineResult<T>,
    ) -> EngineResult<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
