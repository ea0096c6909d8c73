//! Persistence and query layer for auctions, users and bids.
//!
//! Callers open a migrated connection with [`db::open_db`], start a
//! [`Session`] and hand it to [`UserRepository`] / [`AuctionRepository`].
//! The session decides whether the work is committed.

pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, Session};
pub use gateway::{AuctionCriteria, Entity, RepoError, RepoResult, StorageGateway, UserCriteria};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::auction::{Auction, AuctionBuilder, AuctionId, Bid};
pub use model::user::{User, UserId};
pub use model::{now_epoch_ms, DAY_MS};
pub use repo::auction_repo::{AuctionRepository, CONTESTED_MIN_BIDS, STALE_AFTER_DAYS};
pub use repo::user_repo::UserRepository;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
