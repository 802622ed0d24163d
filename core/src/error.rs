use crate::types::{BookingStatus, EntityId, Pct};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Booking '{booking_id}' not found")]
    BookingNotFound { booking_id: EntityId },

    #[error("Product '{product_id}' not found")]
    ProductNotFound { product_id: EntityId },

    #[error("User '{user_id}' not found")]
    UserNotFound { user_id: EntityId },

    #[error("Rank '{rank_id}' not found")]
    RankNotFound { rank_id: EntityId },

    #[error("No active rank for seller '{user_id}'")]
    SellerRankNotFound { user_id: EntityId },

    #[error("Product '{product_id}' has no commission pool (commission_pct = 0)")]
    NoCommissionPool { product_id: EntityId },

    #[error(
        "Invalid commission config for product '{product_id}': \
         provider_desired_pct {provider_desired_pct} exceeds commission_pct {commission_pct}"
    )]
    InvalidProductConfig {
        product_id: EntityId,
        commission_pct: Pct,
        provider_desired_pct: Pct,
    },

    #[error("Invalid rank share {pct} for role '{role}'")]
    InvalidRankShare { role: String, pct: Pct },

    #[error("Booking '{booking_id}' is already {status}")]
    StatusConflict {
        booking_id: EntityId,
        status: BookingStatus,
    },

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
