use super::Store;
use crate::{
    error::EngineResult,
    types::{Amount, EntityId},
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct WalletRow {
    pub wallet_id: EntityId,
    pub user_id: EntityId,
    pub balance: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletTxnRow {
    pub id: Option<i64>,
    pub wallet_id: EntityId,
    pub amount: Amount,
    pub txn_type: String,
    pub ref_id: EntityId,
    pub description: String,
    pub balance_after: Amount,
    pub created_at: String,
}

impl Store {
    // ── Wallet ────────────────────────────────────────────────────

    pub fn wallet_for_user(&self, user_id: &str) -> EngineResult<Option<WalletRow>> {
        let row = self
            .conn()
            .query_row(
                "SELECT wallet_id, user_id, balance FROM wallet WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(WalletRow {
                        wallet_id: row.get(0)?,
                        user_id: row.get(1)?,
                        balance: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn insert_wallet(
        &self,
        wallet_id: &str,
        user_id: &str,
        created_at: &str,
    ) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO wallet (wallet_id, user_id, balance, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![wallet_id, user_id, created_at],
        )?;
        Ok(())
    }

    pub fn update_wallet_balance(&self, wallet_id: &str, balance: Amount) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE wallet SET balance = ?1 WHERE wallet_id = ?2",
            params![balance, wallet_id],
        )?;
        Ok(())
    }

    // ── Wallet transactions ───────────────────────────────────────

    pub fn insert_wallet_txn(&self, t: &WalletTxnRow) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO wallet_transaction (
                wallet_id, amount, txn_type, ref_id, description,
                balance_after, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                t.wallet_id,
                t.amount,
                t.txn_type,
                t.ref_id,
                t.description,
                t.balance_after,
                t.created_at,
            ],
        )?;
        Ok(())
    }

    /// Already-posted totals for one booking, grouped by beneficiary user
    /// and transaction type. The wallet poster diffs these against the
    /// current ledger to find the delta to post.
    pub fn posted_amounts_for_ref(
        &self,
        ref_id: &str,
    ) -> EngineResult<Vec<(EntityId, String, Amount)>> {
        let mut stmt = self.conn().prepare(
            "SELECT w.user_id, t.txn_type, COALESCE(SUM(t.amount), 0)
             FROM wallet_transaction t
             JOIN wallet w ON w.wallet_id = t.wallet_id
             WHERE t.ref_id = ?1
             GROUP BY w.user_id, t.txn_type
             ORDER BY w.user_id ASC, t.txn_type ASC",
        )?;
        let rows = stmt
            .query_map(params![ref_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Full transaction history for one user's wallet, oldest first.
    pub fn wallet_statement(&self, user_id: &str) -> EngineResult<Vec<WalletTxnRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT t.id, t.wallet_id, t.amount, t.txn_type, t.ref_id,
                    t.description, t.balance_after, t.created_at
             FROM wallet_transaction t
             JOIN wallet w ON w.wallet_id = t.wallet_id
             WHERE w.user_id = ?1
             ORDER BY t.id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(WalletTxnRow {
                    id: Some(row.get(0)?),
                    wallet_id: row.get(1)?,
                    amount: row.get(2)?,
                    txn_type: row.get(3)?,
                    ref_id: row.get(4)?,
                    description: row.get(5)?,
                    balance_after: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn wallet_txns_for_ref(&self, ref_id: &str) -> EngineResult<Vec<WalletTxnRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, wallet_id, amount, txn_type, ref_id,
                    description, balance_after, created_at
             FROM wallet_transaction WHERE ref_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![ref_id], |row| {
                Ok(WalletTxnRow {
                    id: Some(row.get(0)?),
                    wallet_id: row.get(1)?,
                    amount: row.get(2)?,
                    txn_type: row.get(3)?,
                    ref_id: row.get(4)?,
                    description: row.get(5)?,
                    balance_after: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_wallets(&self) -> EngineResult<Vec<WalletRow>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT wallet_id, user_id, balance FROM wallet ORDER BY user_id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(WalletRow {
                    wallet_id: row.get(0)?,
                    user_id: row.get(1)?,
                    balance: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
