//! Repository layer for users and auctions.
//!
//! # Responsibility
//! - Expose use-case oriented operations over a `StorageGateway`.
//! - Turn semantic questions ("stale", "contested") into gateway criteria.
//!
//! # Invariants
//! - Repositories never commit or roll back; the caller owns the session.
//! - Empty results are `Ok`; only storage failures are errors.

pub mod auction_repo;
pub mod user_repo;
