//! Auction repository and derived auction queries.
//!
//! # Responsibility
//! - Provide CRUD over auctions and their bids.
//! - Answer the derived questions: active count, unused, stale, open within
//!   a period, contested within a value band, and bid on by a user.
//!
//! # Invariants
//! - Every list is ordered by creation time, oldest first.
//! - "Stale" is purely an age predicate; closed auctions are eligible.
//! - Listing by user matches bidder ids, never owners or name/email text.

use crate::gateway::{AuctionCriteria, RepoResult, StorageGateway};
use crate::model::auction::{Auction, AuctionId};
use crate::model::user::User;
use crate::model::{now_epoch_ms, DAY_MS};
use log::{debug, error};
use std::time::Instant;

/// Minimum age, in days, at which an auction is considered stale.
pub const STALE_AFTER_DAYS: i64 = 7;
/// Minimum number of bids for an auction to count as contested.
pub const CONTESTED_MIN_BIDS: u32 = 3;

/// Persistence and queries of auctions through a storage gateway.
pub struct AuctionRepository<'g, G: StorageGateway<Auction>> {
    gateway: &'g G,
}

impl<'g, G: StorageGateway<Auction>> AuctionRepository<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Persists a new auction with its bids and stores the assigned id on it.
    ///
    /// The owner and every bidder must already be saved.
    pub fn save(&self, auction: &mut Auction) -> RepoResult<AuctionId> {
        let id = self.gateway.insert(auction)?;
        auction.set_id(id);
        debug!(
            "event=auction_save module=repo status=ok bids={}",
            auction.bids().len()
        );
        Ok(id)
    }

    /// Persists changed fields and replaces the stored bid sequence.
    pub fn update(&self, auction: &Auction) -> RepoResult<()> {
        self.gateway.update(auction)
    }

    /// Removes the auction together with its bids.
    pub fn delete(&self, auction: &Auction) -> RepoResult<()> {
        self.gateway.delete(auction)?;
        debug!("event=auction_delete module=repo status=ok");
        Ok(())
    }

    pub fn find_by_id(&self, id: AuctionId) -> RepoResult<Option<Auction>> {
        self.gateway.fetch_by_id(id)
    }

    /// Counts auctions that are not closed.
    pub fn count_active(&self) -> RepoResult<u64> {
        let started_at = Instant::now();
        let result = self.gateway.count(&AuctionCriteria::Active);
        match &result {
            Ok(total) => debug!(
                "event=auction_query module=repo status=ok query=count_active count={} duration_ms={}",
                total,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=auction_query module=repo status=error query=count_active error={}",
                err
            ),
        }
        result
    }

    /// Lists auctions that never received a bid nor were marked used.
    pub fn list_unused(&self) -> RepoResult<Vec<Auction>> {
        self.list("unused", &AuctionCriteria::Unused)
    }

    /// Lists auctions created at least `STALE_AFTER_DAYS` ago.
    pub fn list_stale(&self) -> RepoResult<Vec<Auction>> {
        self.list_stale_as_of(now_epoch_ms())
    }

    /// Same as [`Self::list_stale`] with an explicit "now" in epoch ms.
    ///
    /// An auction exactly `STALE_AFTER_DAYS` old at `now` is included.
    pub fn list_stale_as_of(&self, now: i64) -> RepoResult<Vec<Auction>> {
        let cutoff = now.saturating_sub(STALE_AFTER_DAYS * DAY_MS);
        self.list("stale", &AuctionCriteria::CreatedAtOrBefore(cutoff))
    }

    /// Lists open auctions created within `[start, end]` (epoch ms, inclusive).
    pub fn list_in_period(&self, start: i64, end: i64) -> RepoResult<Vec<Auction>> {
        self.list(
            "in_period",
            &AuctionCriteria::OpenCreatedBetween { start, end },
        )
    }

    /// Lists auctions with at least `CONTESTED_MIN_BIDS` bids whose initial
    /// value lies in `[min_value, max_value]`.
    pub fn list_contested(&self, min_value: f64, max_value: f64) -> RepoResult<Vec<Auction>> {
        self.list(
            "contested",
            &AuctionCriteria::Contested {
                min_value,
                max_value,
                min_bids: CONTESTED_MIN_BIDS,
            },
        )
    }

    /// Lists each auction the user placed at least one bid on, once.
    ///
    /// An unsaved user cannot have bids, so the result is empty.
    pub fn list_by_user(&self, user: &User) -> RepoResult<Vec<Auction>> {
        match user.id() {
            Some(bidder) => self.list("by_user", &AuctionCriteria::BidBy(bidder)),
            None => {
                debug!("event=auction_query module=repo status=ok query=by_user count=0 reason=unsaved_user");
                Ok(Vec::new())
            }
        }
    }

    fn list(&self, query: &'static str, criteria: &AuctionCriteria) -> RepoResult<Vec<Auction>> {
        let started_at = Instant::now();
        let result = self.gateway.query(criteria);
        match &result {
            Ok(auctions) => debug!(
                "event=auction_query module=repo status=ok query={} count={} duration_ms={}",
                query,
                auctions.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=auction_query module=repo status=error query={} error={}",
                query, err
            ),
        }
        result
    }
}
