//! Auction and bid domain model.
//!
//! # Responsibility
//! - Define the auction record together with the bids it owns.
//! - Provide a builder for assembling auctions in fixtures and callers.
//!
//! # Invariants
//! - `closed` only moves from open to closed; there is no reopen.
//! - `used` only moves from unused to used; recording a bid marks it used.
//! - Bids keep insertion order and are never assumed to be increasing.

use crate::model::user::UserId;
use crate::model::{now_epoch_ms, DAY_MS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a persisted auction.
pub type AuctionId = Uuid;

/// One offer placed on an auction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Unix epoch milliseconds.
    pub placed_at: i64,
    /// Non-owning reference to the bidding user.
    pub bidder: UserId,
    pub value: f64,
}

impl Bid {
    pub fn new(placed_at: i64, bidder: UserId, value: f64) -> Self {
        Self {
            placed_at,
            bidder,
            value,
        }
    }
}

/// A listing with an owner, an initial value and the bids placed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuctionRecord")]
pub struct Auction {
    id: Option<AuctionId>,
    pub name: String,
    pub initial_value: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    closed: bool,
    used: bool,
    /// Non-owning reference to the user who listed the auction.
    pub owner: UserId,
    bids: Vec<Bid>,
}

/// Wire shape of an auction before its invariants are applied.
#[derive(Deserialize)]
struct AuctionRecord {
    id: Option<AuctionId>,
    name: String,
    initial_value: f64,
    created_at: i64,
    closed: bool,
    used: bool,
    owner: UserId,
    bids: Vec<Bid>,
}

impl From<AuctionRecord> for Auction {
    fn from(record: AuctionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            initial_value: record.initial_value,
            created_at: record.created_at,
            closed: record.closed,
            used: record.used || !record.bids.is_empty(),
            owner: record.owner,
            bids: record.bids,
        }
    }
}

impl Auction {
    /// Creates an open, unused auction stamped with the current time.
    pub fn new(name: impl Into<String>, initial_value: f64, owner: UserId) -> Self {
        Self {
            id: None,
            name: name.into(),
            initial_value,
            created_at: now_epoch_ms(),
            closed: false,
            used: false,
            owner,
            bids: Vec::new(),
        }
    }

    /// Rebuilds a persisted auction from storage without re-running transitions.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: AuctionId,
        name: String,
        initial_value: f64,
        created_at: i64,
        closed: bool,
        used: bool,
        owner: UserId,
        bids: Vec<Bid>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            initial_value,
            created_at,
            closed,
            used,
            owner,
            bids,
        }
    }

    pub fn id(&self) -> Option<AuctionId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AuctionId) {
        self.id = Some(id);
    }

    /// Returns whether both values denote the same persisted auction.
    pub fn is_same_entity(&self, other: &Auction) -> bool {
        matches!((self.id, other.id), (Some(left), Some(right)) if left == right)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns whether the auction still accepts attention as an open listing.
    pub fn is_active(&self) -> bool {
        !self.closed
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Closes the auction. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Marks the auction as used without recording a bid.
    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// Appends a bid and marks the auction as used.
    ///
    /// No ordering or value check is applied.
    pub fn record_bid(&mut self, bid: Bid) {
        self.bids.push(bid);
        self.used = true;
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Returns whether the auction is at least `days` old relative to `now`.
    ///
    /// The boundary is inclusive: exactly `days` old counts.
    pub fn is_older_than(&self, days: i64, now: i64) -> bool {
        now.saturating_sub(self.created_at) >= days.saturating_mul(DAY_MS)
    }
}

/// Fluent construction of auctions with sensible defaults.
#[derive(Debug, Clone)]
pub struct AuctionBuilder {
    auction: Auction,
}

impl AuctionBuilder {
    /// Starts an open, unused auction owned by `owner`, created now.
    pub fn new(owner: UserId) -> Self {
        Self {
            auction: Auction::new("Playstation 3", 300.0, owner),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.auction.name = name.into();
        self
    }

    pub fn initial_value(mut self, value: f64) -> Self {
        self.auction.initial_value = value;
        self
    }

    pub fn created_at(mut self, epoch_ms: i64) -> Self {
        self.auction.created_at = epoch_ms;
        self
    }

    /// Back-dates creation by whole days from the current time.
    pub fn created_days_ago(mut self, days: i64) -> Self {
        let age_ms = days.saturating_mul(DAY_MS);
        self.auction.created_at = now_epoch_ms().saturating_sub(age_ms);
        self
    }

    pub fn closed(mut self) -> Self {
        self.auction.close();
        self
    }

    pub fn used(mut self) -> Self {
        self.auction.mark_used();
        self
    }

    pub fn bid(mut self, placed_at: i64, bidder: UserId, value: f64) -> Self {
        self.auction.record_bid(Bid::new(placed_at, bidder, value));
        self
    }

    pub fn build(self) -> Auction {
        self.auction
    }
}

#[cfg(test)]
mod tests {
    use super::{AuctionBuilder, Bid};
    use crate::model::DAY_MS;
    use uuid::Uuid;

    #[test]
    fn recording_a_bid_marks_auction_used_and_keeps_order() {
        let owner = Uuid::new_v4();
        let bidder = Uuid::new_v4();
        let mut auction = AuctionBuilder::new(owner).build();
        assert!(!auction.is_used());

        auction.record_bid(Bid::new(10, bidder, 500.0));
        auction.record_bid(Bid::new(5, bidder, 400.0));

        assert!(auction.is_used());
        let values: Vec<f64> = auction.bids().iter().map(|bid| bid.value).collect();
        assert_eq!(values, vec![500.0, 400.0]);
    }

    #[test]
    fn close_is_one_way() {
        let mut auction = AuctionBuilder::new(Uuid::new_v4()).build();
        assert!(auction.is_active());

        auction.close();
        auction.close();

        assert!(auction.is_closed());
        assert!(!auction.is_active());
    }

    #[test]
    fn age_boundary_is_inclusive() {
        let auction = AuctionBuilder::new(Uuid::new_v4()).created_at(0).build();

        assert!(auction.is_older_than(7, 7 * DAY_MS));
        assert!(!auction.is_older_than(7, 7 * DAY_MS - 1));
    }

    #[test]
    fn age_check_saturates_at_clock_extremes() {
        let ancient = AuctionBuilder::new(Uuid::new_v4()).created_at(i64::MIN).build();
        let future = AuctionBuilder::new(Uuid::new_v4()).created_at(i64::MAX).build();

        assert!(ancient.is_older_than(7, i64::MAX));
        assert!(!future.is_older_than(7, i64::MIN));
        let fresh = AuctionBuilder::new(Uuid::new_v4()).created_at(0).build();
        assert!(!fresh.is_older_than(i64::MAX, i64::MAX / 2));
    }

    #[test]
    fn unsaved_auctions_are_never_the_same_entity() {
        let owner = Uuid::new_v4();
        let first = AuctionBuilder::new(owner).created_at(1).build();
        let copy = first.clone();

        assert_eq!(first, copy);
        assert!(!first.is_same_entity(&copy));
    }
}
