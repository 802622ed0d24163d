//! Shared primitive types used across the entire engine.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, unique identifier for any entity (user, product, booking, rank).
pub type EntityId = String;

/// An amount in whole currency units. The engine never deals in fractions
/// of the currency unit; all rounding happens at calculation time.
pub type Amount = i64;

/// A percentage expressed as a fraction in `[0, 1]`.
pub type Pct = f64;

/// Stakeholder roles a ledger entry can be attributed to.
///
/// Canonical casing is lowercase snake (`provider`, `seller`, ...);
/// the enum is the only place role names are spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Provider,
    Seller,
    Referrer,
    Manager,
    /// The platform's residual take. Ledger rows with this role never
    /// have a beneficiary.
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Provider => "provider",
            Role::Seller => "seller",
            Role::Referrer => "referrer",
            Role::Manager => "manager",
            Role::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "provider" => Some(Role::Provider),
            "seller" => Some(Role::Seller),
            "referrer" => Some(Role::Referrer),
            "manager" => Some(Role::Manager),
            "system" => Some(Role::System),
            _ => None,
        }
    }

    /// Roles that can carry a rank share. Provider and system shares are
    /// derived, never configured per rank.
    pub fn is_rank_shareable(&self) -> bool {
        matches!(self, Role::Seller | Role::Referrer | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Role::parse(s).ok_or(FromSqlError::InvalidType))
    }
}

/// Booking lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for BookingStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookingStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| BookingStatus::parse(s).ok_or(FromSqlError::InvalidType))
    }
}
