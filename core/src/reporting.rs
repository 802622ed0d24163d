//! Read-only rollups over the materialized ledger.
//!
//! Thin by design: the heavy lifting is the GROUP BY queries in the store;
//! this module just shapes them for reporting callers.

use crate::{
    error::EngineResult,
    store::Store,
    types::{Amount, BookingStatus, EntityId, Role},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RoleTotal {
    pub role: Role,
    pub total: Amount,
    pub entries: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusTotal {
    pub status: BookingStatus,
    pub total: Amount,
    pub bookings: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserTotal {
    pub user_id: EntityId,
    pub total: Amount,
    pub entries: i64,
}

/// Per-role amounts for one booking, straight from materialized rows —
/// the fast path reporting UIs read instead of recomputing the split.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerBreakdown {
    pub provider: Amount,
    pub seller: Amount,
    pub referrer: Amount,
    pub manager: Amount,
}

pub fn totals_by_role(store: &Store) -> EngineResult<Vec<RoleTotal>> {
    Ok(store
        .ledger_totals_by_role()?
        .into_iter()
        .map(|(role, total, entries)| RoleTotal {
            role,
            total,
            entries,
        })
        .collect())
}

pub fn totals_by_status(store: &Store) -> EngineResult<Vec<StatusTotal>> {
    Ok(store
        .ledger_totals_by_status()?
        .into_iter()
        .map(|(status, total, bookings)| StatusTotal {
            status,
            total,
            bookings,
        })
        .collect())
}

pub fn totals_by_user(store: &Store) -> EngineResult<Vec<UserTotal>> {
    Ok(store
        .ledger_totals_by_user()?
        .into_iter()
        .map(|(user_id, total, entries)| UserTotal {
            user_id,
            total,
            entries,
        })
        .collect())
}

pub fn booking_breakdown(store: &Store, booking_id: &str) -> EngineResult<LedgerBreakdown> {
    let mut out = LedgerBreakdown::default();
    for row in store.ledger_for_booking(booking_id)? {
        match row.role {
            Role::Provider => out.provider += row.amount,
            Role::Seller => out.seller += row.amount,
            Role::Referrer => out.referrer += row.amount,
            Role::Manager => out.manager += row.amount,
            Role::System => {}
        }
    }
    Ok(out)
}
