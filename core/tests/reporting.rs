//! Reporting rollups over the materialized ledger.

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
    engine
        .create_booking(&NewBooking {
            booking_id: "bk-1".into(),
            product_id: "tour-hanoi".into(),
            price: 10_000_000,
            seller_user_id: "u-seller".into(),
            referrer_user_id: Some("u-referrer".into()),
            manager_user_id: None,
        })
        .unwrap();
}

#[test]
fn breakdown_reads_the_materialized_rows() {
    let engine = build();
    seed(&engine);
    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();

    let breakdown = engine.booking_commission_from_ledger("bk-1").unwrap();
    assert_eq!(breakdown.provider, 100_000);
    assert_eq!(breakdown.seller, 260_000);
    assert_eq!(breakdown.referrer, 24_000);
    assert_eq!(breakdown.manager, 0);
}

#[test]
fn breakdown_is_empty_before_reconcile() {
    let engine = build();
    seed(&engine);
    let breakdown = engine.booking_commission_from_ledger("bk-1").unwrap();
    assert_eq!(breakdown.provider, 0);
    assert_eq!(breakdown.seller, 0);
}

#[test]
fn totals_by_role_cover_the_whole_pool() {
    let engine = build();
    seed(&engine);
    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();

    let totals = engine.report_totals_by_role().unwrap();
    let total_for = |role: Role| {
        totals
            .iter()
            .find(|t| t.role == role)
            .map(|t| t.total)
            .unwrap_or(0)
    };
    assert_eq!(total_for(Role::Provider), 100_000);
    assert_eq!(total_for(Role::Seller), 260_000);
    assert_eq!(total_for(Role::Referrer), 24_000);
    assert_eq!(total_for(Role::System), 116_000);

    let sum: i64 = totals.iter().map(|t| t.total).sum();
    assert_eq!(sum, 500_000, "role totals must cover the whole pool");
}

#[test]
fn totals_by_status_split_completed_and_pending() {
    let engine = build();
    seed(&engine);
    engine
        .create_booking(&NewBooking {
            booking_id: "bk-2".into(),
            product_id: "tour-hanoi".into(),
            price: 10_000_000,
            seller_user_id: "u-seller".into(),
            referrer_user_id: None,
            manager_user_id: None,
        })
        .unwrap();

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    engine.process_booking_revenue("bk-2").unwrap(); // materialize pending

    let totals = engine.report_totals_by_status().unwrap();
    let by_status = |status: BookingStatus| {
        totals
            .iter()
            .find(|t| t.status == status)
            .expect("status bucket")
    };
    assert_eq!(by_status(BookingStatus::Completed).bookings, 1);
    assert_eq!(by_status(BookingStatus::Completed).total, 500_000);
    assert_eq!(by_status(BookingStatus::Pending).bookings, 1);
    assert_eq!(by_status(BookingStatus::Pending).total, 500_000);
}

#[test]
fn counts_track_bookings_and_ledger_rows() {
    let engine = build();
    seed(&engine);
    assert_eq!(engine.store.booking_count().unwrap(), 1);
    assert_eq!(engine.store.ledger_entry_count().unwrap(), 0);

    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();
    assert_eq!(engine.store.ledger_entry_count().unwrap(), 4);

    engine
        .create_booking(&NewBooking {
            booking_id: "bk-2".into(),
            product_id: "tour-hanoi".into(),
            price: 10_000_000,
            seller_user_id: "u-seller".into(),
            referrer_user_id: None,
            manager_user_id: None,
        })
        .unwrap();
    assert_eq!(engine.store.booking_count().unwrap(), 2);
    // Only materialized bookings contribute ledger rows.
    assert_eq!(engine.store.ledger_entry_count().unwrap(), 4);
}

#[test]
fn totals_by_user_exclude_the_system_residual() {
    let engine = build();
    seed(&engine);
    engine
        .on_booking_status_changed("bk-1", BookingStatus::Completed)
        .unwrap();

    let totals = engine.report_totals_by_user().unwrap();
    assert_eq!(totals.len(), 3, "system rows carry no beneficiary");
    let sum: i64 = totals.iter().map(|t| t.total).sum();
    assert_eq!(sum, 384_000); // 100k + 260k + 24k
}
