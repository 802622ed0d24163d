use super::Store;
use crate::{
    error::EngineResult,
    types::{Amount, BookingStatus, EntityId, Pct, Role},
};
use rusqlite::params;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntryRow {
    pub id: Option<i64>,
    pub booking_id: EntityId,
    pub role: Role,
    pub beneficiary_user_id: Option<EntityId>,
    pub amount: Amount,
    pub pct: Pct,
    pub created_at: String,
}

impl Store {
    // ── Revenue ledger ────────────────────────────────────────────

    /// Full replace step 1: drop every row for the booking.
    pub fn delete_ledger_for_booking(&self, booking_id: &str) -> EngineResult<usize> {
        let deleted = self.conn().execute(
            "DELETE FROM revenue_ledger WHERE booking_id = ?1",
            params![booking_id],
        )?;
        Ok(deleted)
    }

    pub fn insert_ledger_entry(&self, e: &LedgerEntryRow) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO revenue_ledger (
                booking_id, role, beneficiary_user_id, amount, pct, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                e.booking_id,
                e.role,
                e.beneficiary_user_id,
                e.amount,
                e.pct,
                e.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn ledger_for_booking(&self, booking_id: &str) -> EngineResult<Vec<LedgerEntryRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, booking_id, role, beneficiary_user_id, amount, pct, created_at
             FROM revenue_ledger WHERE booking_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![booking_id], |row| {
                Ok(LedgerEntryRow {
                    id: Some(row.get(0)?),
                    booking_id: row.get(1)?,
                    role: row.get(2)?,
                    beneficiary_user_id: row.get(3)?,
                    amount: row.get(4)?,
                    pct: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Reporting rollups ─────────────────────────────────────────

    pub fn ledger_totals_by_role(&self) -> EngineResult<Vec<(Role, Amount, i64)>> {
        let mut stmt = self.conn().prepare(
            "SELECT role, COALESCE(SUM(amount), 0), COUNT(*)
             FROM revenue_ledger GROUP BY role ORDER BY role ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn ledger_totals_by_status(&self) -> EngineResult<Vec<(BookingStatus, Amount, i64)>> {
        let mut stmt = self.conn().prepare(
            "SELECT b.status, COALESCE(SUM(l.amount), 0), COUNT(DISTINCT l.booking_id)
             FROM revenue_ledger l
             JOIN booking b ON b.booking_id = l.booking_id
             GROUP BY b.status ORDER BY b.status ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn ledger_totals_by_user(&self) -> EngineResult<Vec<(EntityId, Amount, i64)>> {
        let mut stmt = self.conn().prepare(
            "SELECT beneficiary_user_id, COALESCE(SUM(amount), 0), COUNT(*)
             FROM revenue_ledger
             WHERE beneficiary_user_id IS NOT NULL
             GROUP BY beneficiary_user_id
             ORDER BY beneficiary_user_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn ledger_entry_count(&self) -> EngineResult<i64> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM revenue_ledger", [], |row| row.get(0))?;
        Ok(count)
    }
}
