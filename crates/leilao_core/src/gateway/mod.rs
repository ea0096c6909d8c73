//! Storage gateway contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence boundary repositories call into.
//! - Translate semantic criteria into storage queries.
//! - Keep SQL details out of the repository layer.
//!
//! # Invariants
//! - "Not found" on fetch is `Ok(None)`, never an error.
//! - Writes of one entity plus its owned children are all-or-nothing.
//! - Storage failures are surfaced as `RepoError::Storage` and never retried.

use crate::db::DbError;
use crate::model::auction::Auction;
use crate::model::user::{User, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

mod auction_store;
mod user_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by the gateway and the repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Target entity has no identifier yet (`id: None`) or no persisted row.
    NotFound {
        entity: &'static str,
        id: Option<Uuid>,
    },
    /// Connectivity, transaction or constraint failure from the store.
    Storage(DbError),
    /// Reserved for field-level validation; no current operation raises it.
    Validation(String),
    /// Persisted data cannot be converted back to a domain value.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id: Some(id) } => write!(f, "{entity} not found: {id}"),
            Self::NotFound { entity, id: None } => {
                write!(f, "{entity} has no identifier; save it first")
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Validation(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// A persistable record with an optional stable identifier.
pub trait Entity {
    /// Human-readable kind used in errors and log events.
    const KIND: &'static str;
    /// Structured filter understood by the gateway for this entity.
    type Criteria;

    fn entity_id(&self) -> Option<Uuid>;
}

impl Entity for User {
    const KIND: &'static str = "user";
    type Criteria = UserCriteria;

    fn entity_id(&self) -> Option<Uuid> {
        self.id()
    }
}

impl Entity for Auction {
    const KIND: &'static str = "auction";
    type Criteria = AuctionCriteria;

    fn entity_id(&self) -> Option<Uuid> {
        self.id()
    }
}

/// Filters for user lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCriteria {
    /// Exact, case-sensitive match on both fields.
    NameAndEmail { name: String, email: String },
}

/// Filters for auction queries.
///
/// Results are ordered by `created_at ASC`, then insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum AuctionCriteria {
    /// `closed == false`.
    Active,
    /// `used == false`.
    Unused,
    /// `created_at <= cutoff` (epoch ms, inclusive).
    CreatedAtOrBefore(i64),
    /// `closed == false` and `created_at` in `[start, end]`.
    OpenCreatedBetween { start: i64, end: i64 },
    /// At least `min_bids` bids and `initial_value` in `[min_value, max_value]`.
    Contested {
        min_value: f64,
        max_value: f64,
        min_bids: u32,
    },
    /// At least one bid placed by the given user.
    BidBy(UserId),
}

/// Persistence boundary for one entity type.
///
/// Callers own transaction scope; implementations never commit.
pub trait StorageGateway<E: Entity> {
    /// Persists a new entity and returns its identifier.
    ///
    /// An entity that already carries an id keeps it.
    fn insert(&self, entity: &E) -> RepoResult<Uuid>;
    /// Persists in-place changes to an identified entity.
    fn update(&self, entity: &E) -> RepoResult<()>;
    /// Removes the entity and everything it exclusively owns.
    fn delete(&self, entity: &E) -> RepoResult<()>;
    fn fetch_by_id(&self, id: Uuid) -> RepoResult<Option<E>>;
    fn query(&self, criteria: &E::Criteria) -> RepoResult<Vec<E>>;
    /// Returns the first entity `query` would yield for `criteria`.
    fn fetch_first(&self, criteria: &E::Criteria) -> RepoResult<Option<E>> {
        Ok(self.query(criteria)?.into_iter().next())
    }
    fn count(&self, criteria: &E::Criteria) -> RepoResult<u64>;
}

pub(crate) fn require_id<E: Entity>(entity: &E) -> RepoResult<Uuid> {
    entity.entity_id().ok_or(RepoError::NotFound {
        entity: E::KIND,
        id: None,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
