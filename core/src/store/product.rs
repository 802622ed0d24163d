use super::Store;
use crate::{
    error::EngineResult,
    types::{Amount, EntityId, Pct},
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub product_id: EntityId,
    pub owner_user_id: EntityId,
    pub name: String,
    pub base_price: Amount,
    pub commission_pct: Pct,
    pub provider_desired_pct: Pct,
}

impl Store {
    // ── User ──────────────────────────────────────────────────────

    pub fn insert_user(&self, user_id: &str, name: &str, created_at: &str) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO user (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, name, created_at],
        )?;
        Ok(())
    }

    pub fn user_exists(&self, user_id: &str) -> EngineResult<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM user WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ── Product ───────────────────────────────────────────────────

    pub fn insert_product(&self, p: &ProductRow, created_at: &str) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO product (
                product_id, owner_user_id, name, base_price,
                commission_pct, provider_desired_pct, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                p.product_id,
                p.owner_user_id,
                p.name,
                p.base_price,
                p.commission_pct,
                p.provider_desired_pct,
                created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_product(&self, product_id: &str) -> EngineResult<Option<ProductRow>> {
        let row = self
            .conn()
            .query_row(
                "SELECT product_id, owner_user_id, name, base_price,
                        commission_pct, provider_desired_pct
                 FROM product WHERE product_id = ?1",
                params![product_id],
                |row| {
                    Ok(ProductRow {
                        product_id: row.get(0)?,
                        owner_user_id: row.get(1)?,
                        name: row.get(2)?,
                        base_price: row.get(3)?,
                        commission_pct: row.get(4)?,
                        provider_desired_pct: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}
