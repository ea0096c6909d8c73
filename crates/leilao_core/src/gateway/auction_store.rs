//! SQLite auction storage behind `StorageGateway<Auction>`.
//!
//! # Invariants
//! - Bids are rewritten together with their auction inside one savepoint.
//! - Bid order is persisted as `position` and restored on read.
//! - Bid-count filters aggregate in SQL and never rely on bid ordering.

use super::{
    bool_to_int, parse_bool, parse_uuid, require_id, AuctionCriteria, RepoError, RepoResult,
    StorageGateway,
};
use crate::db::Session;
use crate::model::auction::{Auction, Bid};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const AUCTION_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    initial_value,
    created_at,
    closed,
    used,
    owner_uuid
FROM auctions";

const AUCTION_ORDER_SQL: &str = "ORDER BY created_at ASC, rowid ASC";

impl StorageGateway<Auction> for Session<'_> {
    fn insert(&self, auction: &Auction) -> RepoResult<Uuid> {
        let id = auction.id().unwrap_or_else(Uuid::new_v4);
        self.atomically(|conn| {
            conn.execute(
                "INSERT INTO auctions (
                    uuid,
                    name,
                    initial_value,
                    created_at,
                    closed,
                    used,
                    owner_uuid
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.to_string(),
                    auction.name.as_str(),
                    auction.initial_value,
                    auction.created_at,
                    bool_to_int(auction.is_closed()),
                    bool_to_int(auction.is_used()),
                    auction.owner.to_string(),
                ],
            )?;
            insert_bids(conn, id, auction.bids())
        })?;
        Ok(id)
    }

    fn update(&self, auction: &Auction) -> RepoResult<()> {
        let id = require_id(auction)?;
        self.atomically(|conn| {
            let changed = conn.execute(
                "UPDATE auctions
                 SET
                    name = ?1,
                    initial_value = ?2,
                    created_at = ?3,
                    closed = ?4,
                    used = ?5,
                    owner_uuid = ?6
                 WHERE uuid = ?7;",
                params![
                    auction.name.as_str(),
                    auction.initial_value,
                    auction.created_at,
                    bool_to_int(auction.is_closed()),
                    bool_to_int(auction.is_used()),
                    auction.owner.to_string(),
                    id.to_string(),
                ],
            )?;

            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "auction",
                    id: Some(id),
                });
            }

            conn.execute("DELETE FROM bids WHERE auction_uuid = ?1;", [id.to_string()])?;
            insert_bids(conn, id, auction.bids())
        })
    }

    fn delete(&self, auction: &Auction) -> RepoResult<()> {
        let id = require_id(auction)?;
        // Bids go with the row through ON DELETE CASCADE.
        let changed = self
            .conn()
            .execute("DELETE FROM auctions WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "auction",
                id: Some(id),
            });
        }
        Ok(())
    }

    fn fetch_by_id(&self, id: Uuid) -> RepoResult<Option<Auction>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{AUCTION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_auction_row(self.conn(), row)?));
        }
        Ok(None)
    }

    fn query(&self, criteria: &AuctionCriteria) -> RepoResult<Vec<Auction>> {
        let (clause, bind_values) = criteria_clause(criteria);
        let sql = format!("{AUCTION_SELECT_SQL} WHERE {clause} {AUCTION_ORDER_SQL};");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut auctions = Vec::new();
        while let Some(row) = rows.next()? {
            auctions.push(parse_auction_row(self.conn(), row)?);
        }
        Ok(auctions)
    }

    fn count(&self, criteria: &AuctionCriteria) -> RepoResult<u64> {
        let (clause, bind_values) = criteria_clause(criteria);
        let total: i64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM auctions WHERE {clause};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}

fn criteria_clause(criteria: &AuctionCriteria) -> (&'static str, Vec<Value>) {
    match criteria {
        AuctionCriteria::Active => ("closed = 0", Vec::new()),
        AuctionCriteria::Unused => ("used = 0", Vec::new()),
        AuctionCriteria::CreatedAtOrBefore(cutoff) => {
            ("created_at <= ?", vec![Value::Integer(*cutoff)])
        }
        AuctionCriteria::OpenCreatedBetween { start, end } => (
            "closed = 0 AND created_at BETWEEN ? AND ?",
            vec![Value::Integer(*start), Value::Integer(*end)],
        ),
        AuctionCriteria::Contested {
            min_value,
            max_value,
            min_bids,
        } => (
            "initial_value BETWEEN ? AND ?
               AND (
                    SELECT COUNT(*)
                    FROM bids
                    WHERE bids.auction_uuid = auctions.uuid
               ) >= ?",
            vec![
                Value::Real(*min_value),
                Value::Real(*max_value),
                Value::Integer(i64::from(*min_bids)),
            ],
        ),
        AuctionCriteria::BidBy(bidder) => (
            "EXISTS (
                SELECT 1
                FROM bids
                WHERE bids.auction_uuid = auctions.uuid
                  AND bids.bidder_uuid = ?
             )",
            vec![Value::Text(bidder.to_string())],
        ),
    }
}

fn insert_bids(conn: &Connection, auction_id: Uuid, bids: &[Bid]) -> RepoResult<()> {
    let auction_uuid = auction_id.to_string();
    let mut stmt = conn.prepare(
        "INSERT INTO bids (auction_uuid, position, bidder_uuid, value, placed_at)
         VALUES (?1, ?2, ?3, ?4, ?5);",
    )?;
    for (position, bid) in bids.iter().enumerate() {
        stmt.execute(params![
            auction_uuid.as_str(),
            position as i64,
            bid.bidder.to_string(),
            bid.value,
            bid.placed_at,
        ])?;
    }
    Ok(())
}

fn load_bids(conn: &Connection, auction_uuid: &str) -> RepoResult<Vec<Bid>> {
    let mut stmt = conn.prepare(
        "SELECT bidder_uuid, value, placed_at
         FROM bids
         WHERE auction_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([auction_uuid])?;
    let mut bids = Vec::new();
    while let Some(row) = rows.next()? {
        let bidder_text: String = row.get("bidder_uuid")?;
        bids.push(Bid::new(
            row.get("placed_at")?,
            parse_uuid(&bidder_text, "bids.bidder_uuid")?,
            row.get("value")?,
        ));
    }
    Ok(bids)
}

fn parse_auction_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Auction> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "auctions.uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    let owner = parse_uuid(&owner_text, "auctions.owner_uuid")?;

    Ok(Auction::restore(
        id,
        row.get("name")?,
        row.get("initial_value")?,
        row.get("created_at")?,
        parse_bool(row.get("closed")?, "auctions.closed")?,
        parse_bool(row.get("used")?, "auctions.used")?,
        owner,
        load_bids(conn, &uuid_text)?,
    ))
}
