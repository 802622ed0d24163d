//! Wallet poster — turns ledger state into wallet balances and an
//! append-only transaction history.
//!
//! Posting is delta-based: for each (beneficiary, role) the target posted
//! total is the ledger amount when the booking is completed and 0
//! otherwise; the poster appends exactly the difference against what the
//! wallet history already carries for this booking. Completion posts the
//! full credits, cancellation posts the mirror-image negatives, and a
//! recompute after a rank change posts just the adjustment.
//!
//! Must run inside the same transaction as the ledger write it follows;
//! callers own the boundary.

use crate::{
    clock::Clock,
    error::EngineResult,
    store::{Store, WalletRow, WalletTxnRow},
    types::{Amount, BookingStatus, EntityId, Role},
};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Reconcile wallet postings for one booking against its ledger rows.
pub fn sync_booking(store: &Store, clock: &Clock, booking_id: &str) -> EngineResult<()> {
    let completed = matches!(
        store.get_booking(booking_id)?.map(|b| b.status),
        Some(BookingStatus::Completed)
    );

    // Target: what each (user, role) should have been paid in total.
    let mut target: BTreeMap<(EntityId, Role), Amount> = BTreeMap::new();
    if completed {
        for row in store.ledger_for_booking(booking_id)? {
            let Some(user_id) = row.beneficiary_user_id else {
                continue;
            };
            if row.amount == 0 {
                continue;
            }
            *target.entry((user_id, row.role)).or_insert(0) += row.amount;
        }
    }

    // Posted: what the wallet history already carries for this booking.
    let mut posted: BTreeMap<(EntityId, Role), Amount> = BTreeMap::new();
    for (user_id, txn_type, total) in store.posted_amounts_for_ref(booking_id)? {
        match role_of_txn_type(&txn_type) {
            Some(role) => *posted.entry((user_id, role)).or_insert(0) += total,
            None => log::warn!(
                "wallet sync: unrecognized txn_type '{txn_type}' on booking '{booking_id}'"
            ),
        }
    }

    let mut keys: BTreeSet<(EntityId, Role)> = target.keys().cloned().collect();
    keys.extend(posted.keys().cloned());

    for (user_id, role) in keys {
        let want = target.get(&(user_id.clone(), role)).copied().unwrap_or(0);
        let have = posted.get(&(user_id.clone(), role)).copied().unwrap_or(0);
        let delta = want - have;
        if delta != 0 {
            post_delta(store, clock, &user_id, role, delta, booking_id)?;
        }
    }
    Ok(())
}

/// Role-derived transaction type tag, e.g. `commission_seller` or
/// `reversal_referrer`.
pub fn txn_type_for(role: Role, amount: Amount) -> String {
    if amount >= 0 {
        format!("commission_{role}")
    } else {
        format!("reversal_{role}")
    }
}

fn role_of_txn_type(txn_type: &str) -> Option<Role> {
    txn_type.rsplit('_').next().and_then(Role::parse)
}

fn post_delta(
    store: &Store,
    clock: &Clock,
    user_id: &str,
    role: Role,
    delta: Amount,
    booking_id: &str,
) -> EngineResult<()> {
    // Lazily create the wallet at balance 0.
    let wallet = match store.wallet_for_user(user_id)? {
        Some(w) => w,
        None => {
            let wallet_id = format!("wal-{}", Uuid::new_v4());
            store.insert_wallet(&wallet_id, user_id, &clock.timestamp())?;
            WalletRow {
                wallet_id,
                user_id: user_id.to_string(),
                balance: 0,
            }
        }
    };

    let balance_after = wallet.balance + delta;
    let description = if delta >= 0 {
        format!("Commission ({role}) for booking {booking_id}")
    } else {
        format!("Reversal ({role}) for booking {booking_id}")
    };

    store.insert_wallet_txn(&WalletTxnRow {
        id: None,
        wallet_id: wallet.wallet_id.clone(),
        amount: delta,
        txn_type: txn_type_for(role, delta),
        ref_id: booking_id.to_string(),
        description,
        balance_after,
        created_at: clock.timestamp(),
    })?;
    store.update_wallet_balance(&wallet.wallet_id, balance_after)?;

    log::info!(
        "wallet: {delta:+} to user '{user_id}' ({role}) for booking '{booking_id}', \
         balance now {balance_after}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txn_type_round_trips_to_role() {
        for role in [Role::Provider, Role::Seller, Role::Referrer, Role::Manager] {
            assert_eq!(role_of_txn_type(&txn_type_for(role, 100)), Some(role));
            assert_eq!(role_of_txn_type(&txn_type_for(role, -100)), Some(role));
        }
        assert_eq!(role_of_txn_type("garbage"), None);
    }
}
