//! Booking lifecycle orchestrator — status transitions and the payout
//! work they trigger.
//!
//! Allowed edges:
//!   pending   -> confirmed | completed | cancelled
//!   confirmed -> completed | cancelled
//!   completed -> cancelled            (reversal path)
//!
//! Every transition runs in one transaction, guards included. Completion
//! and reversal add ledger reconcile + wallet sync to the status update;
//! a failure anywhere leaves the booking in its pre-transition status.

use crate::{
    calculator::Split,
    clock::Clock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    ledger,
    store::Store,
    types::BookingStatus,
    wallet,
};

/// Drive one status transition. Returns the posted split when the booking
/// entered `completed`, `None` otherwise.
///
/// The whole transition runs under one BEGIN IMMEDIATE: the status read
/// and the conflict/matrix guards hold the write lock, so a racing second
/// transition sees the committed status and gets `StatusConflict` instead
/// of silently re-applying the same edge.
pub fn change_status(
    store: &Store,
    clock: &Clock,
    config: &EngineConfig,
    booking_id: &str,
    new_status: BookingStatus,
) -> EngineResult<Option<Split>> {
    store.in_transaction(|s| {
        let booking = s
            .get_booking(booking_id)?
            .ok_or_else(|| EngineError::BookingNotFound {
                booking_id: booking_id.to_string(),
            })?;
        let from = booking.status;

        if from == new_status {
            return Err(EngineError::StatusConflict {
                booking_id: booking.booking_id,
                status: from,
            });
        }
        if !transition_allowed(from, new_status) {
            return Err(EngineError::InvalidTransition {
                from,
                to: new_status,
            });
        }

        // closed_at is stamped on every non-pending transition.
        let closed_at = clock.timestamp();

        match (from, new_status) {
            (_, BookingStatus::Completed) => {
                s.update_booking_status(booking_id, new_status, Some(&closed_at))?;
                let split = ledger::reconcile_booking(s, clock, config, booking_id)?;
                wallet::sync_booking(s, clock, booking_id)?;
                log::info!("booking '{booking_id}' completed, commission posted");
                Ok(split)
            }
            (BookingStatus::Completed, BookingStatus::Cancelled) => {
                s.update_booking_status(booking_id, new_status, Some(&closed_at))?;
                ledger::reconcile_booking(s, clock, config, booking_id)?;
                wallet::sync_booking(s, clock, booking_id)?;
                log::info!("booking '{booking_id}' cancelled, postings reversed");
                Ok(None)
            }
            _ => {
                // pending -> confirmed/cancelled, confirmed -> cancelled:
                // nothing was ever posted, a plain status update is enough.
                s.update_booking_status(booking_id, new_status, Some(&closed_at))?;
                log::info!("booking '{booking_id}' {from} -> {new_status}");
                Ok(None)
            }
        }
    })
}

fn transition_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed | Completed | Cancelled)
            | (Confirmed, Completed | Cancelled)
            | (Completed, Cancelled)
    )
}

/// Admin-triggered bulk recalculation: re-reconcile every booking in
/// ascending id order. Per-booking failures are logged and skipped so one
/// malformed booking cannot halt the sweep. This is the self-healing
/// backfill after rank or rate configuration changes.
pub fn recalculate_all_revenue(
    store: &Store,
    clock: &Clock,
    config: &EngineConfig,
) -> EngineResult<()> {
    let booking_ids = store.all_booking_ids()?;
    log::info!(
        "revenue recalculation sweep over {} bookings",
        booking_ids.len()
    );

    let mut failures = 0usize;
    for booking_id in booking_ids {
        let result = store.in_transaction(|s| {
            ledger::reconcile_booking(s, clock, config, &booking_id)?;
            wallet::sync_booking(s, clock, &booking_id)
        });
        if let Err(err) = result {
            failures += 1;
            log::error!("sweep: booking '{booking_id}' failed, skipping: {err}");
        }
    }

    if failures > 0 {
        log::warn!("revenue recalculation sweep finished with {failures} skipped bookings");
    }
    Ok(())
}
