//! Commission calculator — the pure split computation.
//!
//! RULE: no I/O, no logging, no clock. Same inputs always produce the
//! same `Split`. The ledger writer assembles inputs from the store and
//! callers log the `shares_normalized` data-integrity flag.
//!
//! Fixed calculation order:
//!   1. c0         = round(price × commission_pct)       — base pool
//!   2. c_provider = round(c0 × provider_desired/commission)
//!   3. c_remain   = c0 − c_provider                     — exact, no rounding
//!   4. per-role   = round(c_remain × rank share)
//!   5. residual   = c_remain − Σ per-role               — platform's take

use crate::{
    error::{EngineError, EngineResult},
    types::{Amount, EntityId, Pct, Role},
};
use serde::{Deserialize, Serialize};

/// One role's cut of a split: who gets it, how much, and the effective
/// percentage that was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePayout {
    pub user_id: EntityId,
    pub amount: Amount,
    pub pct: Pct,
}

/// The deterministic outcome of one commission calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// c0: total commission pool reserved from the booking price.
    pub base_commission: Amount,
    /// c_remain: pool left after the provider's fixed cut.
    pub remaining_pool: Amount,
    pub provider: RolePayout,
    pub seller: RolePayout,
    pub referrer: Option<RolePayout>,
    pub manager: Option<RolePayout>,
    /// Unallocated remainder of `remaining_pool`; never paid to a user.
    pub system_residual: Amount,
    /// Fraction of `remaining_pool` the residual corresponds to.
    pub residual_pct: Pct,
    /// Set when the configured rank shares summed over 100% and were
    /// proportionally scaled down. Callers should log a warning.
    pub shares_normalized: bool,
}

impl Split {
    /// Payouts in canonical role order, for ledger row construction.
    pub fn payouts(&self) -> Vec<(Role, &RolePayout)> {
        let mut out = vec![(Role::Provider, &self.provider), (Role::Seller, &self.seller)];
        if let Some(r) = &self.referrer {
            out.push((Role::Referrer, r));
        }
        if let Some(m) = &self.manager {
            out.push((Role::Manager, m));
        }
        out
    }

    /// Total paid to users (everything except the residual).
    pub fn total_distributed(&self) -> Amount {
        self.payouts().iter().map(|(_, p)| p.amount).sum()
    }
}

/// Everything the calculation needs, resolved ahead of time by the caller.
#[derive(Debug, Clone)]
pub struct CommissionInputs {
    pub product_id: EntityId,
    /// Actual transacted amount, not the product's base price.
    pub price: Amount,
    pub commission_pct: Pct,
    pub provider_desired_pct: Pct,
    pub provider_user_id: EntityId,
    pub seller_user_id: EntityId,
    pub referrer_user_id: Option<EntityId>,
    pub manager_user_id: Option<EntityId>,
    /// Rank shares for the seller's currently active rank. Missing share
    /// rows are passed as 0.
    pub seller_share: Pct,
    pub referrer_share: Pct,
    pub manager_share: Pct,
}

/// Round-half-up to the nearest whole currency unit.
pub fn round_half_up(x: f64) -> Amount {
    (x + 0.5).floor() as Amount
}

pub fn calculate(inputs: &CommissionInputs) -> EngineResult<Split> {
    if inputs.commission_pct <= 0.0 {
        return Err(EngineError::NoCommissionPool {
            product_id: inputs.product_id.clone(),
        });
    }
    if inputs.provider_desired_pct > inputs.commission_pct {
        return Err(EngineError::InvalidProductConfig {
            product_id: inputs.product_id.clone(),
            commission_pct: inputs.commission_pct,
            provider_desired_pct: inputs.provider_desired_pct,
        });
    }

    let c0 = round_half_up(inputs.price as f64 * inputs.commission_pct);

    // The provider's cut is a fraction of the pool, not of the price.
    let provider_ratio = inputs.provider_desired_pct / inputs.commission_pct;
    let c_provider = round_half_up(c0 as f64 * provider_ratio);
    let c_remain = c0 - c_provider;

    let mut seller_share = inputs.seller_share;
    let mut referrer_share = match inputs.referrer_user_id {
        Some(_) => inputs.referrer_share,
        None => 0.0,
    };
    let mut manager_share = match inputs.manager_user_id {
        Some(_) => inputs.manager_share,
        None => 0.0,
    };

    // Safety clamp against misconfigured rank data: shares over 100% are
    // scaled down proportionally so the split can never exceed the pool.
    let share_sum = seller_share + referrer_share + manager_share;
    let shares_normalized = share_sum > 1.0;
    if shares_normalized {
        seller_share /= share_sum;
        referrer_share /= share_sum;
        manager_share /= share_sum;
    }

    let c_seller = round_half_up(c_remain as f64 * seller_share);
    let c_referrer = round_half_up(c_remain as f64 * referrer_share);
    let c_manager = round_half_up(c_remain as f64 * manager_share);
    let system_residual = c_remain - (c_seller + c_referrer + c_manager);

    Ok(Split {
        base_commission: c0,
        remaining_pool: c_remain,
        provider: RolePayout {
            user_id: inputs.provider_user_id.clone(),
            amount: c_provider,
            pct: provider_ratio,
        },
        seller: RolePayout {
            user_id: inputs.seller_user_id.clone(),
            amount: c_seller,
            pct: seller_share,
        },
        referrer: inputs.referrer_user_id.clone().map(|user_id| RolePayout {
            user_id,
            amount: c_referrer,
            pct: referrer_share,
        }),
        manager: inputs.manager_user_id.clone().map(|user_id| RolePayout {
            user_id,
            amount: c_manager,
            pct: manager_share,
        }),
        system_residual,
        residual_pct: (1.0 - (seller_share + referrer_share + manager_share)).max(0.0),
        shares_normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> CommissionInputs {
        CommissionInputs {
            product_id: "prod-1".into(),
            price: 10_000_000,
            commission_pct: 0.05,
            provider_desired_pct: 0.01,
            provider_user_id: "provider".into(),
            seller_user_id: "seller".into(),
            referrer_user_id: Some("referrer".into()),
            manager_user_id: None,
            seller_share: 0.65,
            referrer_share: 0.06,
            manager_share: 0.0,
        }
    }

    #[test]
    fn round_half_up_behaviour() {
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(1.4), 1);
        assert_eq!(round_half_up(1.5), 2);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(99.999), 100);
    }

    #[test]
    fn reference_scenario() {
        let split = calculate(&inputs()).unwrap();
        assert_eq!(split.base_commission, 500_000);
        assert_eq!(split.provider.amount, 100_000);
        assert_eq!(split.remaining_pool, 400_000);
        assert_eq!(split.seller.amount, 260_000);
        assert_eq!(split.referrer.as_ref().unwrap().amount, 24_000);
        assert!(split.manager.is_none());
        assert_eq!(split.system_residual, 116_000);
        assert!(!split.shares_normalized);
    }

    #[test]
    fn pool_is_conserved_at_every_step() {
        let split = calculate(&inputs()).unwrap();
        assert_eq!(split.provider.amount + split.remaining_pool, split.base_commission);
        let distributed: Amount = split.seller.amount
            + split.referrer.as_ref().map_or(0, |r| r.amount)
            + split.manager.as_ref().map_or(0, |m| m.amount);
        assert_eq!(distributed + split.system_residual, split.remaining_pool);
    }

    #[test]
    fn absent_referrer_share_goes_to_residual() {
        let mut i = inputs();
        i.referrer_user_id = None;
        let split = calculate(&i).unwrap();
        assert!(split.referrer.is_none());
        // 35% of the remaining pool is unallocated.
        assert_eq!(split.seller.amount, 260_000);
        assert_eq!(split.system_residual, 140_000);
    }

    #[test]
    fn zero_commission_pct_is_rejected() {
        let mut i = inputs();
        i.commission_pct = 0.0;
        match calculate(&i) {
            Err(EngineError::NoCommissionPool { product_id }) => {
                assert_eq!(product_id, "prod-1");
            }
            other => panic!("expected NoCommissionPool, got {other:?}"),
        }
    }

    #[test]
    fn provider_share_above_commission_is_rejected() {
        let mut i = inputs();
        i.provider_desired_pct = 0.06;
        assert!(matches!(
            calculate(&i),
            Err(EngineError::InvalidProductConfig { .. })
        ));
    }

    #[test]
    fn overcommitted_shares_are_normalized() {
        let mut i = inputs();
        i.manager_user_id = Some("manager".into());
        i.seller_share = 0.9;
        i.referrer_share = 0.4;
        i.manager_share = 0.2; // 1.5 total, over 100%
        let split = calculate(&i).unwrap();
        assert!(split.shares_normalized);
        let distributed = split.total_distributed() - split.provider.amount;
        // Payouts must sum to the remaining pool within a rounding unit.
        assert!((split.remaining_pool - distributed - split.system_residual) == 0);
        assert!(distributed <= split.remaining_pool);
        assert!(split.system_residual >= 0);
    }

    #[test]
    fn determinism_same_inputs_same_output() {
        let a = calculate(&inputs()).unwrap();
        let b = calculate(&inputs()).unwrap();
        assert_eq!(a, b);
    }
}
