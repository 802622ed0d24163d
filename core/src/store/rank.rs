use super::Store;
use crate::{
    error::EngineResult,
    types::{EntityId, Pct, Role},
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct RankShareRow {
    pub rank_id: EntityId,
    pub role: Role,
    pub pct: Pct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRankRow {
    pub user_id: EntityId,
    pub rank_id: EntityId,
    pub effective_from: String,
    pub effective_to: Option<String>,
}

impl Store {
    // ── Rank tiers ────────────────────────────────────────────────

    pub fn insert_rank(&self, rank_id: &str, name: &str, level: i64) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO rank_tier (rank_id, name, level) VALUES (?1, ?2, ?3)",
            params![rank_id, name, level],
        )?;
        Ok(())
    }

    pub fn rank_exists(&self, rank_id: &str) -> EngineResult<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM rank_tier WHERE rank_id = ?1",
                params![rank_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ── Rank shares ───────────────────────────────────────────────

    pub fn upsert_rank_share(&self, rank_id: &str, role: Role, pct: Pct) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO rank_share (rank_id, role, pct) VALUES (?1, ?2, ?3)
             ON CONFLICT (rank_id, role) DO UPDATE SET pct = excluded.pct",
            params![rank_id, role, pct],
        )?;
        Ok(())
    }

    /// Share for one (rank, role). A missing row means 0.
    pub fn rank_share(&self, rank_id: &str, role: Role) -> EngineResult<Pct> {
        let pct: Option<f64> = self
            .conn()
            .query_row(
                "SELECT pct FROM rank_share WHERE rank_id = ?1 AND role = ?2",
                params![rank_id, role],
                |row| row.get(0),
            )
            .optional()?;
        Ok(pct.unwrap_or(0.0))
    }

    pub fn rank_shares(&self, rank_id: &str) -> EngineResult<Vec<RankShareRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT rank_id, role, pct FROM rank_share WHERE rank_id = ?1 ORDER BY role ASC",
        )?;
        let rows = stmt
            .query_map(params![rank_id], |row| {
                Ok(RankShareRow {
                    rank_id: row.get(0)?,
                    role: row.get(1)?,
                    pct: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── User rank assignments ─────────────────────────────────────

    /// The user's currently active rank (`effective_to IS NULL`), if any.
    pub fn active_rank_for_user(&self, user_id: &str) -> EngineResult<Option<EntityId>> {
        let rank_id = self
            .conn()
            .query_row(
                "SELECT rank_id FROM user_rank
                 WHERE user_id = ?1 AND effective_to IS NULL
                 ORDER BY id DESC LIMIT 1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rank_id)
    }

    /// Close the user's open-ended assignment, if one exists. Keeps the
    /// invariant of at most one active row per user.
    pub fn close_open_user_rank(&self, user_id: &str, effective_to: &str) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE user_rank SET effective_to = ?1
             WHERE user_id = ?2 AND effective_to IS NULL",
            params![effective_to, user_id],
        )?;
        Ok(())
    }

    pub fn insert_user_rank(
        &self,
        user_id: &str,
        rank_id: &str,
        effective_from: &str,
    ) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO user_rank (user_id, rank_id, effective_from, effective_to)
             VALUES (?1, ?2, ?3, NULL)",
            params![user_id, rank_id, effective_from],
        )?;
        Ok(())
    }

    pub fn user_rank_history(&self, user_id: &str) -> EngineResult<Vec<UserRankRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id, rank_id, effective_from, effective_to
             FROM user_rank WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(UserRankRow {
                    user_id: row.get(0)?,
                    rank_id: row.get(1)?,
                    effective_from: row.get(2)?,
                    effective_to: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
