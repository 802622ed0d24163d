//! The engine facade — wires store, clock and config together and exposes
//! the operations the surrounding CRUD/HTTP layer consumes.

use crate::{
    calculator::Split,
    clock::Clock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    ledger, lifecycle, reporting,
    reporting::{LedgerBreakdown, RoleTotal, StatusTotal, UserTotal},
    store::{BookingRow, LedgerEntryRow, ProductRow, Store, WalletRow, WalletTxnRow},
    types::{Amount, BookingStatus, EntityId, Pct, Role},
    wallet,
};

/// A booking as submitted by the booking layer; always created pending.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_id: EntityId,
    pub product_id: EntityId,
    pub price: Amount,
    pub seller_user_id: EntityId,
    pub referrer_user_id: Option<EntityId>,
    pub manager_user_id: Option<EntityId>,
}

pub struct CommissionEngine {
    pub store: Store,
    clock: Clock,
    config: EngineConfig,
}

impl CommissionEngine {
    pub fn new(store: Store, config: EngineConfig) -> Self {
        Self::with_clock(store, config, Clock::System)
    }

    /// Tests pin the clock so recomputes are byte-identical.
    pub fn with_clock(store: Store, config: EngineConfig, clock: Clock) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// In-memory engine with migrations applied (used in tests and demos).
    pub fn in_memory() -> EngineResult<Self> {
        let store = Store::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store, EngineConfig::default()))
    }

    /// File-backed engine with migrations applied.
    pub fn open(path: &str, config: EngineConfig) -> EngineResult<Self> {
        let store = Store::open_with_config(path, &config)?;
        store.migrate()?;
        Ok(Self::new(store, config))
    }

    // ── Commission operations ─────────────────────────────────────

    /// Read-only split for an existing booking under the current
    /// configuration. Does not touch the ledger.
    pub fn calculate_commission_by_booking_id(&self, booking_id: &str) -> EngineResult<Split> {
        ledger::split_for_booking(&self.store, booking_id)
    }

    /// Split preview for a booking that has not been created yet.
    pub fn commission_preview(
        &self,
        product_id: &str,
        price: Amount,
        seller_user_id: &str,
        referrer_user_id: Option<&str>,
        manager_user_id: Option<&str>,
    ) -> EngineResult<Split> {
        ledger::preview_split(
            &self.store,
            product_id,
            price,
            seller_user_id,
            referrer_user_id,
            manager_user_id,
        )
    }

    /// Drive a status transition and the payout work it triggers.
    /// Returns the posted split when the booking entered `completed`.
    pub fn on_booking_status_changed(
        &self,
        booking_id: &str,
        new_status: BookingStatus,
    ) -> EngineResult<Option<Split>> {
        lifecycle::change_status(&self.store, &self.clock, &self.config, booking_id, new_status)
    }

    /// Idempotent ledger recompute + wallet sync for one booking, in one
    /// transaction.
    pub fn process_booking_revenue(&self, booking_id: &str) -> EngineResult<()> {
        self.store.in_transaction(|s| {
            ledger::reconcile_booking(s, &self.clock, &self.config, booking_id)?;
            wallet::sync_booking(s, &self.clock, booking_id)
        })
    }

    /// Admin sweep: recompute every booking, skipping and logging failures.
    pub fn recalculate_all_revenue(&self) -> EngineResult<()> {
        lifecycle::recalculate_all_revenue(&self.store, &self.clock, &self.config)
    }

    /// Per-role amounts from the materialized ledger rows.
    pub fn booking_commission_from_ledger(
        &self,
        booking_id: &str,
    ) -> EngineResult<LedgerBreakdown> {
        reporting::booking_breakdown(&self.store, booking_id)
    }

    // ── Reporting ─────────────────────────────────────────────────

    pub fn report_totals_by_role(&self) -> EngineResult<Vec<RoleTotal>> {
        reporting::totals_by_role(&self.store)
    }

    pub fn report_totals_by_status(&self) -> EngineResult<Vec<StatusTotal>> {
        reporting::totals_by_status(&self.store)
    }

    pub fn report_totals_by_user(&self) -> EngineResult<Vec<UserTotal>> {
        reporting::totals_by_user(&self.store)
    }

    pub fn ledger_entries(&self, booking_id: &str) -> EngineResult<Vec<LedgerEntryRow>> {
        self.store.ledger_for_booking(booking_id)
    }

    pub fn wallet_balance(&self, user_id: &str) -> EngineResult<Amount> {
        Ok(self
            .store
            .wallet_for_user(user_id)?
            .map(|w| w.balance)
            .unwrap_or(0))
    }

    pub fn wallet_statement(&self, user_id: &str) -> EngineResult<Vec<WalletTxnRow>> {
        self.store.wallet_statement(user_id)
    }

    pub fn wallets(&self) -> EngineResult<Vec<WalletRow>> {
        self.store.all_wallets()
    }

    // ── Record administration (consumed by the CLI and tests) ─────

    pub fn create_user(&self, user_id: &str, name: &str) -> EngineResult<()> {
        self.store.insert_user(user_id, name, &self.clock.timestamp())
    }

    pub fn create_product(&self, product: &ProductRow) -> EngineResult<()> {
        if product.provider_desired_pct > product.commission_pct {
            return Err(EngineError::InvalidProductConfig {
                product_id: product.product_id.clone(),
                commission_pct: product.commission_pct,
                provider_desired_pct: product.provider_desired_pct,
            });
        }
        self.store.insert_product(product, &self.clock.timestamp())
    }

    pub fn create_booking(&self, new: &NewBooking) -> EngineResult<()> {
        if self.store.get_product(&new.product_id)?.is_none() {
            return Err(EngineError::ProductNotFound {
                product_id: new.product_id.clone(),
            });
        }
        let participants = [
            Some(&new.seller_user_id),
            new.referrer_user_id.as_ref(),
            new.manager_user_id.as_ref(),
        ];
        for user_id in participants.into_iter().flatten() {
            if !self.store.user_exists(user_id)? {
                return Err(EngineError::UserNotFound {
                    user_id: user_id.clone(),
                });
            }
        }
        self.store.insert_booking(&BookingRow {
            booking_id: new.booking_id.clone(),
            product_id: new.product_id.clone(),
            price: new.price,
            seller_user_id: new.seller_user_id.clone(),
            referrer_user_id: new.referrer_user_id.clone(),
            manager_user_id: new.manager_user_id.clone(),
            status: BookingStatus::Pending,
            created_at: self.clock.timestamp(),
            closed_at: None,
        })
    }

    pub fn create_rank(&self, rank_id: &str, name: &str, level: i64) -> EngineResult<()> {
        self.store.insert_rank(rank_id, name, level)
    }

    pub fn set_rank_share(&self, rank_id: &str, role: Role, pct: Pct) -> EngineResult<()> {
        if !role.is_rank_shareable() || !(0.0..=1.0).contains(&pct) {
            return Err(EngineError::InvalidRankShare {
                role: role.to_string(),
                pct,
            });
        }
        if !self.store.rank_exists(rank_id)? {
            return Err(EngineError::RankNotFound {
                rank_id: rank_id.to_string(),
            });
        }
        self.store.upsert_rank_share(rank_id, role, pct)
    }

    /// Assign a rank to a user, closing any prior open-ended assignment so
    /// at most one row per user stays active.
    pub fn assign_rank(&self, user_id: &str, rank_id: &str) -> EngineResult<()> {
        if !self.store.rank_exists(rank_id)? {
            return Err(EngineError::RankNotFound {
                rank_id: rank_id.to_string(),
            });
        }
        let now = self.clock.timestamp();
        self.store.in_transaction(|s| {
            s.close_open_user_rank(user_id, &now)?;
            s.insert_user_rank(user_id, rank_id, &now)
        })
    }
}
