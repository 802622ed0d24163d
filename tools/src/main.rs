//! payout-runner: headless admin runner for the bookpay commission engine.
//!
//! Usage:
//!   payout-runner --demo                      # seed + walk a demo marketplace
//!   payout-runner --db payouts.db --demo
//!   payout-runner --db payouts.db --recalculate
//!   payout-runner --db payouts.db --preview <product_id> <price> <seller_id>
//!   payout-runner --config engine.json ...

use anyhow::Result;
use bookpay_core::{
    config::EngineConfig,
    engine::{CommissionEngine, NewBooking},
    store::ProductRow,
    types::{BookingStatus, Role},
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let demo = args.iter().any(|a| a == "--demo");
    let recalculate = args.iter().any(|a| a == "--recalculate");
    let json = args.iter().any(|a| a == "--json");

    let config = match flag_value(&args, "--config") {
        Some(path) => EngineConfig::load(Path::new(path))?,
        None => EngineConfig::default(),
    };

    println!("bookpay — payout-runner");
    println!("  db:  {db}");
    println!();

    let engine = CommissionEngine::open(db, config)?;

    if let Some(idx) = args.iter().position(|a| a == "--preview") {
        let product_id = args.get(idx + 1).map(String::as_str).unwrap_or_default();
        let price: i64 = args
            .get(idx + 2)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();
        let seller = args.get(idx + 3).map(String::as_str).unwrap_or_default();
        let split = engine.commission_preview(product_id, price, seller, None, None)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&split)?);
        } else {
            print_split(&split);
        }
        return Ok(());
    }

    if demo {
        run_demo(&engine, json)?;
    }

    if recalculate {
        println!("running revenue recalculation sweep...");
        engine.recalculate_all_revenue()?;
    }

    print_summary(&engine)?;
    Ok(())
}

/// Seed a small marketplace and walk bookings through the lifecycle.
fn run_demo(engine: &CommissionEngine, json: bool) -> Result<()> {
    for (id, name) in [
        ("u-thao", "Thao (tour host)"),
        ("u-minh", "Minh (seller)"),
        ("u-lan", "Lan (referrer)"),
        ("u-quang", "Quang (manager)"),
    ] {
        engine.create_user(id, name)?;
    }

    engine.create_product(&ProductRow {
        product_id: "tour-hanoi".into(),
        owner_user_id: "u-thao".into(),
        name: "Hanoi city tour".into(),
        base_price: 10_000_000,
        commission_pct: 0.05,
        provider_desired_pct: 0.01,
    })?;

    engine.create_rank("silver", "Seller level 5", 5)?;
    engine.set_rank_share("silver", Role::Seller, 0.65)?;
    engine.set_rank_share("silver", Role::Referrer, 0.06)?;
    engine.assign_rank("u-minh", "silver")?;

    let completed = format!("bk-{}", uuid::Uuid::new_v4());
    engine.create_booking(&NewBooking {
        booking_id: completed.clone(),
        product_id: "tour-hanoi".into(),
        price: 10_000_000,
        seller_user_id: "u-minh".into(),
        referrer_user_id: Some("u-lan".into()),
        manager_user_id: None,
    })?;

    let split = engine
        .on_booking_status_changed(&completed, BookingStatus::Completed)?
        .ok_or_else(|| anyhow::anyhow!("completing {completed} produced no split"))?;
    println!("completed booking {completed}:");
    if json {
        println!("{}", serde_json::to_string_pretty(&split)?);
    } else {
        print_split(&split);
    }

    // A second booking that gets completed and then cancelled: its wallet
    // postings net to zero while the history keeps both directions.
    let reversed = format!("bk-{}", uuid::Uuid::new_v4());
    engine.create_booking(&NewBooking {
        booking_id: reversed.clone(),
        product_id: "tour-hanoi".into(),
        price: 6_000_000,
        seller_user_id: "u-minh".into(),
        referrer_user_id: None,
        manager_user_id: None,
    })?;
    engine.on_booking_status_changed(&reversed, BookingStatus::Completed)?;
    engine.on_booking_status_changed(&reversed, BookingStatus::Cancelled)?;
    println!("completed+cancelled booking {reversed} (postings reversed)");
    println!();

    Ok(())
}

fn print_split(split: &bookpay_core::calculator::Split) {
    println!("  base commission: {:>12}", split.base_commission);
    println!(
        "  provider:        {:>12}  ({})",
        split.provider.amount, split.provider.user_id
    );
    println!(
        "  seller:          {:>12}  ({})",
        split.seller.amount, split.seller.user_id
    );
    if let Some(r) = &split.referrer {
        println!("  referrer:        {:>12}  ({})", r.amount, r.user_id);
    }
    if let Some(m) = &split.manager {
        println!("  manager:         {:>12}  ({})", m.amount, m.user_id);
    }
    println!("  system residual: {:>12}", split.system_residual);
}

fn print_summary(engine: &CommissionEngine) -> Result<()> {
    println!("=== LEDGER SUMMARY ===");
    println!(
        "  {} bookings, {} ledger rows",
        engine.store.booking_count()?,
        engine.store.ledger_entry_count()?
    );
    let by_role = engine.report_totals_by_role()?;
    if by_role.is_empty() {
        println!("  (ledger empty)");
    }
    for row in &by_role {
        println!(
            "  {:<10} total {:>12}  ({} entries)",
            row.role.to_string(),
            row.total,
            row.entries
        );
    }

    println!();
    println!("=== BY BOOKING STATUS ===");
    for row in engine.report_totals_by_status()? {
        println!(
            "  {:<10} total {:>12}  ({} bookings)",
            row.status.to_string(),
            row.total,
            row.bookings
        );
    }

    println!();
    println!("=== WALLETS ===");
    let wallets = engine.wallets()?;
    if wallets.is_empty() {
        println!("  (no wallets yet)");
    }
    for w in &wallets {
        println!("  {:<12} balance {:>12}", w.user_id, w.balance);
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
