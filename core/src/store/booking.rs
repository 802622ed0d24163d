use super::Store;
use crate::{
    error::EngineResult,
    types::{Amount, BookingStatus, EntityId},
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRow {
    pub booking_id: EntityId,
    pub product_id: EntityId,
    pub price: Amount,
    pub seller_user_id: EntityId,
    pub referrer_user_id: Option<EntityId>,
    pub manager_user_id: Option<EntityId>,
    pub status: BookingStatus,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl Store {
    // ── Booking ───────────────────────────────────────────────────

    pub fn insert_booking(&self, b: &BookingRow) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO booking (
                booking_id, product_id, price, seller_user_id,
                referrer_user_id, manager_user_id, status, created_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                b.booking_id,
                b.product_id,
                b.price,
                b.seller_user_id,
                b.referrer_user_id,
                b.manager_user_id,
                b.status,
                b.created_at,
                b.closed_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_booking(&self, booking_id: &str) -> EngineResult<Option<BookingRow>> {
        let row = self
            .conn()
            .query_row(
                "SELECT booking_id, product_id, price, seller_user_id,
                        referrer_user_id, manager_user_id, status, created_at, closed_at
                 FROM booking WHERE booking_id = ?1",
                params![booking_id],
                |row| {
                    Ok(BookingRow {
                        booking_id: row.get(0)?,
                        product_id: row.get(1)?,
                        price: row.get(2)?,
                        seller_user_id: row.get(3)?,
                        referrer_user_id: row.get(4)?,
                        manager_user_id: row.get(5)?,
                        status: row.get(6)?,
                        created_at: row.get(7)?,
                        closed_at: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        closed_at: Option<&str>,
    ) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE booking SET status = ?1, closed_at = ?2 WHERE booking_id = ?3",
            params![status, closed_at, booking_id],
        )?;
        Ok(())
    }

    /// All booking ids in ascending order — the bulk recalculation sweep
    /// visits them in this order.
    pub fn all_booking_ids(&self) -> EngineResult<Vec<EntityId>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT booking_id FROM booking ORDER BY booking_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn booking_count(&self) -> EngineResult<i64> {
        let count =
            self.conn()
                .query_row("SELECT COUNT(*) FROM booking", [], |row| row.get(0))?;
        Ok(count)
    }
}
