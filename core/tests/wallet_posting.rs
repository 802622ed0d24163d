//! Wallet poster behaviour: completion credits, reversal on cancellation,
//! and delta postings after configuration changes.

use bookpay_core::{
    clock::Clock,
    config::EngineConfig,
    engine::{CommissionEngine, NewBooking},
    store::{ProductRow, Store},
    types::{BookingStatus, Role},
};
use chrono::{TimeZone, Utc};

fn build() -> CommissionEngine {
    let store = Store::in_memory().expect("in_memory store");
    store.migrate().expect("migrate");
    let clock = Clock::Fixed(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
    CommissionEngine::with_clock(store, EngineConfig::default(), clock)
}

fn seed(engine: &CommissionEngine) {
    for (id, name) in [
        ("u-provider", "Provider"),
        ("u-seller", "Seller"),
        ("u-referrer", "Referrer"),
    ] {
        engine.create_user(id, name).unwrap();
    }
    engine
        .create_product(&ProductRow {
            product_id: "tour-hanoi".into(),
            owner_user_id: "u-provider".into(),
            name: "Hanoi city tour".into(),
            base_price: 10_000_000,
            commission_pct: 0.05,
            provider_desired_pct: 0.01,
        })
        .unwrap();
    engine.create_rank("silver", "Seller level 5", 5).unwrap();
    engine.set_rank_share("silver", Role::Seller, 0.65).unwrap();
    engine
        .set_rank_share("silver", Role::Referrer, 0.06)
        .unwrap();
    engine.assign_rank("u-seller", "silver").unwrap();
}

fn booking(engine: &CommissionEngine, booking_id: &str) {
    engine
        .create_booking(&NewBooking {
            booking_id: booking_id.into(),
            product_id: "tour-hanoi".into(),
            price: 10_000_000,
            seller_user_id: "u-seller".into(),
            referrer_user_id: Some("u-referrer".into()),
            manager_user_id: None,
        })
        .unwrap();
}

#[test]
fn completion_credits_every_beneficiary() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    let split = engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap()
        .expect("completion returns the posted split");
    assert_eq!(split.seller.amount, 260_000);

    assert_eq!(engine.wallet_balance("u-provider").unwrap(), 100_000);
    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 260_000);
    assert_eq!(engine.wallet_balance("u-referrer").unwrap(), 24_000);

    let statement = engine.wallet_statement("u-seller").unwrap();
    assert_eq!(statement.len(), 1);
    let txn = &statement[0];
    assert_eq!(txn.amount, 260_000);
    assert_eq!(txn.balance_after, 260_000);
    assert_eq!(txn.txn_type, "commission_seller");
    assert_eq!(txn.ref_id, "bk-1");
}

#[test]
fn pending_booking_posts_nothing() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    // Materializes the ledger but pays nobody.
    engine.process_booking_revenue("bk-1").unwrap();
    assert!(engine.wallets().unwrap().is_empty());
    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 0);
}

#[test]
fn balance_after_tracks_running_balance_across_bookings() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");
    booking(&engine, "bk-2");

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    engine
        .on_booking_status_changed("bk-2", BookingStatus::Completed)
        .unwrap();

    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 520_000);
    let statement = engine.wallet_statement("u-seller").unwrap();
    assert_eq!(statement.len(), 2);
    assert_eq!(statement[0].balance_after, 260_000);
    assert_eq!(statement[1].balance_after, 520_000);
}

#[test]
fn cancelling_a_completed_booking_nets_to_zero() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    engine
        .on_booking_status_changed("bk-1", BookingStatus::Cancelled)
        .unwrap();

    for user in ["u-provider", "u-seller", "u-referrer"] {
        assert_eq!(
            engine.wallet_balance(user).unwrap(),
            0,
            "{user} must net to zero after reversal"
        );
    }

    // History keeps both directions rather than erasing the credit.
    let statement = engine.wallet_statement("u-seller").unwrap();
    assert_eq!(statement.len(), 2);
    assert_eq!(statement[0].amount, 260_000);
    assert_eq!(statement[1].amount, -260_000);
    assert_eq!(statement[1].txn_type, "reversal_seller");
    assert_eq!(statement[1].balance_after, 0);
}

#[test]
fn every_posting_references_the_triggering_booking() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    engine
        .on_booking_status_changed("bk-1", BookingStatus::Cancelled)
        .unwrap();

    // Three beneficiaries, one credit + one reversal each, all traceable
    // back through ref_id.
    let txns = engine.store.wallet_txns_for_ref("bk-1").unwrap();
    assert_eq!(txns.len(), 6);
    assert!(txns.iter().all(|t| t.ref_id == "bk-1"));
    assert_eq!(txns.iter().map(|t| t.amount).sum::<i64>(), 0);
}

#[test]
fn recalculation_posts_only_the_delta() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 260_000);

    // Rank share drops from 65% to 50%; the sweep reconciles wallets.
    engine.set_rank_share("silver", Role::Seller, 0.50).unwrap();
    engine.recalculate_all_revenue().unwrap();

    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 200_000);
    let statement = engine.wallet_statement("u-seller").unwrap();
    assert_eq!(statement.len(), 2);
    assert_eq!(statement[1].amount, -60_000);
    assert_eq!(statement[1].txn_type, "reversal_seller");

    // Untouched beneficiaries get no extra rows.
    assert_eq!(engine.wallet_statement("u-provider").unwrap().len(), 1);
    assert_eq!(engine.wallet_statement("u-referrer").unwrap().len(), 1);
}

#[test]
fn repeated_sync_is_idempotent() {
    let engine = build();
    seed(&engine);
    booking(&engine, "bk-1");

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    engine.process_booking_revenue("bk-1").unwrap();
    engine.process_booking_revenue("bk-1").unwrap();

    assert_eq!(engine.wallet_balance("u-seller").unwrap(), 260_000);
    assert_eq!(engine.wallet_statement("u-seller").unwrap().len(), 1);
}
