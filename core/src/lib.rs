//! bookpay-core — commission calculation and revenue distribution for a
//! booking marketplace.
//!
//! A completed booking splits its commission pool among up to four
//! stakeholder roles (provider, seller, referrer, manager) plus a residual
//! retained by the platform, posting the result as both a materialized
//! revenue ledger and mutating wallet balances.
//!
//! Layering, leaf-first:
//!   - [`calculator`]: the pure split computation
//!   - [`ledger`]: idempotent delete-and-rewrite of a booking's ledger rows
//!   - [`wallet`]: delta-based wallet posting with append-only history
//!   - [`lifecycle`]: status transitions and the transactions around them
//!   - [`engine`]: the facade the outer CRUD/HTTP layer consumes

pub mod calculator;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod reporting;
pub mod store;
pub mod types;
pub mod wallet;
