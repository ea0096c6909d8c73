//! Auction domain model.
//!
//! # Responsibility
//! - Define the user, auction and bid records handled by the repositories.
//! - Own the one-way lifecycle transitions of an auction (`closed`, `used`).
//!
//! # Invariants
//! - Entity identity is an explicit `Uuid`, assigned on first persistence.
//! - An auction exclusively owns its bids; users are referenced by id only.

pub mod auction;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// One day in epoch milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Returns the current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
