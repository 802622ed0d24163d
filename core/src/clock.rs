//! Engine clock — all persisted timestamps flow through here.
//!
//! Production code uses the system clock; tests pin a fixed instant so
//! repeated recomputes produce identical rows.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// RFC 3339 timestamp as stored in `created_at` / `closed_at` columns.
    pub fn timestamp(&self) -> String {
        self.now().to_rfc3339()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
