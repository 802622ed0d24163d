//! Revenue ledger writer — the idempotent "reconcile ledger for booking X"
//! operation.
//!
//! The ledger is a materialized snapshot of what each booking currently
//! owes whom: every reconcile deletes the booking's rows and rewrites them
//! from the current booking + product + rank state. Running it twice with
//! no intervening change produces identical rows.
//!
//! Callers own the transaction boundary; nothing here opens one.

use crate::{
    calculator::{self, CommissionInputs, Split},
    clock::Clock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    store::{BookingRow, LedgerEntryRow, Store},
    types::{Amount, BookingStatus, Role},
};

/// Recompute and rewrite the ledger rows for one booking.
///
/// Returns the split that was written, or `None` when there is nothing to
/// write (booking missing — logged, not an error, so bulk sweeps continue —
/// or booking cancelled, where the delete itself is the reversal).
///
/// Calculator errors (missing rank, zero commission rate) propagate so the
/// caller can roll back the enclosing transaction.
pub fn reconcile_booking(
    store: &Store,
    clock: &Clock,
    config: &EngineConfig,
    booking_id: &str,
) -> EngineResult<Option<Split>> {
    store.delete_ledger_for_booking(booking_id)?;

    let booking = match store.get_booking(booking_id)? {
        Some(b) => b,
        None => {
            log::error!("ledger reconcile: booking '{booking_id}' not found, skipping");
            return Ok(None);
        }
    };

    if booking.status == BookingStatus::Cancelled {
        log::debug!("ledger reconcile: booking '{booking_id}' cancelled, ledger cleared");
        return Ok(None);
    }

    let inputs = inputs_for_booking(store, &booking)?;
    let split = calculator::calculate(&inputs)?;
    if split.shares_normalized {
        log::warn!(
            "rank shares for booking '{booking_id}' sum over 100%; normalized proportionally"
        );
    }

    let created_at = clock.timestamp();
    let mut entries: Vec<LedgerEntryRow> = split
        .payouts()
        .into_iter()
        .map(|(role, payout)| LedgerEntryRow {
            id: None,
            booking_id: booking_id.to_string(),
            role,
            beneficiary_user_id: Some(payout.user_id.clone()),
            amount: payout.amount,
            pct: payout.pct,
            created_at: created_at.clone(),
        })
        .collect();
    entries.push(LedgerEntryRow {
        id: None,
        booking_id: booking_id.to_string(),
        role: Role::System,
        beneficiary_user_id: None,
        amount: split.system_residual,
        pct: split.residual_pct,
        created_at,
    });

    for entry in &entries {
        if entry.amount == 0 && !config.record_zero_amounts {
            continue;
        }
        store.insert_ledger_entry(entry)?;
    }

    log::debug!(
        "ledger reconcile: booking '{booking_id}' rewrote {} rows, pool {}",
        entries.len(),
        split.base_commission
    );
    Ok(Some(split))
}

/// Read-only calculation for an existing booking. Unlike the reconcile
/// path, a missing booking is an error here — callers asked about a
/// specific booking and deserve a typed answer.
pub fn split_for_booking(store: &Store, booking_id: &str) -> EngineResult<Split> {
    let booking = store
        .get_booking(booking_id)?
        .ok_or_else(|| EngineError::BookingNotFound {
            booking_id: booking_id.to_string(),
        })?;
    let inputs = inputs_for_booking(store, &booking)?;
    calculator::calculate(&inputs)
}

/// Preview the split for a booking that does not exist yet.
pub fn preview_split(
    store: &Store,
    product_id: &str,
    price: Amount,
    seller_user_id: &str,
    referrer_user_id: Option<&str>,
    manager_user_id: Option<&str>,
) -> EngineResult<Split> {
    let inputs = build_inputs(
        store,
        product_id,
        price,
        seller_user_id,
        referrer_user_id.map(str::to_string),
        manager_user_id.map(str::to_string),
    )?;
    calculator::calculate(&inputs)
}

fn inputs_for_booking(store: &Store, booking: &BookingRow) -> EngineResult<CommissionInputs> {
    build_inputs(
        store,
        &booking.product_id,
        booking.price,
        &booking.seller_user_id,
        booking.referrer_user_id.clone(),
        booking.manager_user_id.clone(),
    )
}

/// Resolve product rates and the seller's currently active rank shares.
fn build_inputs(
    store: &Store,
    product_id: &str,
    price: Amount,
    seller_user_id: &str,
    referrer_user_id: Option<String>,
    manager_user_id: Option<String>,
) -> EngineResult<CommissionInputs> {
    let product = store
        .get_product(product_id)?
        .ok_or_else(|| EngineError::ProductNotFound {
            product_id: product_id.to_string(),
        })?;

    let rank_id = store
        .active_rank_for_user(seller_user_id)?
        .ok_or_else(|| EngineError::SellerRankNotFound {
            user_id: seller_user_id.to_string(),
        })?;

    let seller_share = store.rank_share(&rank_id, Role::Seller)?;
    let referrer_share = match referrer_user_id {
        Some(_) => store.rank_share(&rank_id, Role::Referrer)?,
        None => 0.0,
    };
    let manager_share = match manager_user_id {
        Some(_) => store.rank_share(&rank_id, Role::Manager)?,
        None => 0.0,
    };

    Ok(CommissionInputs {
        product_id: product.product_id,
        price,
        commission_pct: product.commission_pct,
        provider_desired_pct: product.provider_desired_pct,
        provider_user_id: product.owner_user_id,
        seller_user_id: seller_user_id.to_string(),
        referrer_user_id,
        manager_user_id,
        seller_share,
        referrer_share,
        manager_share,
    })
}
